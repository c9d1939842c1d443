//! songbook - song storage for pianola
//!
//! An in-memory song store behind three JSON-RPC methods:
//!
//! | method       | params                                 | result   |
//! |--------------|----------------------------------------|----------|
//! | `songs`      | none                                   | `[Song]` |
//! | `addSong`    | `{title, events, durationSeconds}`     | `Song`   |
//! | `deleteSong` | `{id}`                                 | `id`     |
//!
//! # Server Example
//!
//! ```rust,ignore
//! use songbook::{router, SongService};
//!
//! let service = Arc::new(SongService::in_memory(Duration::from_secs(2)));
//! let app = router(service);
//! axum::serve(listener, app).await?;
//! ```
//!
//! # Client Example (requires `client` feature)
//!
//! ```rust,ignore
//! use songbook::{SongApi, SongClient};
//!
//! let client = SongClient::new("http://127.0.0.1:4000/rpc");
//! let songs = client.list().await?;
//! ```

pub mod api;
pub mod error;
pub mod protocol;
pub mod service;
pub mod store;
pub mod transport;
pub mod types;

#[cfg(feature = "client")]
pub mod client;

pub use api::SongApi;
pub use error::{Error, Result};
pub use service::SongService;
pub use store::{InMemorySongStore, SongStore};
pub use transport::{router, AppState};
pub use types::error::ErrorData;
pub use types::jsonrpc::{JsonRpcMessage, JsonRpcReply, RequestId};
pub use types::song::{NewSong, NoteEvent, Song, SongId};

#[cfg(feature = "client")]
pub use client::SongClient;
