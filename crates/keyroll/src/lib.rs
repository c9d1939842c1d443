//! keyroll - piano recorder for pianola
//!
//! Captures note-on/note-off input with the gap since the previous event,
//! replays recordings on a cancellable timer chain, and drives the
//! record/play session against a [`songbook::SongApi`].
//!
//! # Example
//!
//! ```rust,ignore
//! use keyroll::{Command, Controller, ControllerOptions};
//! use songbook::SongClient;
//!
//! let api = Arc::new(SongClient::new("http://127.0.0.1:4000/rpc"));
//! let (tx, rx) = tokio::sync::mpsc::channel(32);
//! let controller = Controller::new(api, ControllerOptions::default());
//! let mut views = controller.subscribe();
//! tokio::spawn(controller.run(rx));
//!
//! tx.send(Command::ToggleRecording).await?;
//! tx.send(Command::NoteInput { note: 60, on: true }).await?;
//! ```

pub mod clock;
pub mod controller;
pub mod display;
pub mod keys;
pub mod playback;
pub mod recorder;
pub mod session;

pub use clock::ClockHandle;
pub use controller::{Command, Controller, ControllerOptions};
pub use keys::{shortcut, KeyPress};
pub use playback::{PlaybackEvent, PlaybackHandle};
pub use recorder::{duration_to_ms, ms_to_duration, Recorder};
pub use session::{Mode, Session, SessionView, SongLibrary};
