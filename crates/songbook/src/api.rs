//! The song operations every transport exposes.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::song::{NewSong, Song, SongId};

/// List/create/delete over stored songs.
///
/// Implemented in-process by [`crate::SongService`] and over HTTP by
/// `SongClient` (feature `client`).
#[async_trait]
pub trait SongApi: Send + Sync {
    /// All stored songs in insertion order.
    async fn list(&self) -> Result<Vec<Song>>;

    /// Store a new song and return it with its assigned id.
    async fn create(&self, song: NewSong) -> Result<Song>;

    /// Delete by id. Returns the id whether or not a song was removed.
    async fn delete(&self, id: SongId) -> Result<SongId>;
}
