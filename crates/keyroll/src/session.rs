//! Session state for one recorder client.
//!
//! `Session` is plain data. Only the [`Controller`](crate::Controller)
//! mutates it; everything here is either a field or a pure derivation.

use std::collections::BTreeSet;

use serde::Serialize;
use songbook::{NoteEvent, Song, SongId};

use crate::recorder::Recorder;

pub const ADD_SONG_FAILED: &str = "Unable to add song";
pub const DELETE_SONG_FAILED: &str = "Unable to delete song";
pub const LOAD_SONGS_FAILED: &str = "Could not load songs";

/// Secondary line shown under the load failure popup.
pub const LOAD_SONGS_HINT: &str = "Is the server running?";

/// What the session is doing with time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Idle,
    Recording,
    Playing,
}

/// Client-side copy of the stored song list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SongLibrary {
    #[default]
    Loading,
    Loaded { songs: Vec<Song> },
    Failed { dismissed: bool },
}

impl SongLibrary {
    pub fn is_loaded(&self) -> bool {
        matches!(self, SongLibrary::Loaded { .. })
    }

    pub fn songs(&self) -> &[Song] {
        match self {
            SongLibrary::Loaded { songs } => songs,
            _ => &[],
        }
    }

    pub fn find(&self, id: SongId) -> Option<&Song> {
        self.songs().iter().find(|song| song.id == id)
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub mode: Mode,
    pub active_notes: BTreeSet<u8>,
    pub recorder: Recorder,
    pub elapsed_seconds: u32,
    pub title: String,
    pub renaming: bool,
    pub error_message: Option<String>,
    pub library: SongLibrary,
    pub save_in_flight: bool,
}

impl Session {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            mode: Mode::Idle,
            active_notes: BTreeSet::new(),
            recorder: Recorder::new(),
            elapsed_seconds: 0,
            title: title.into(),
            renaming: false,
            error_message: None,
            library: SongLibrary::Loading,
            save_in_flight: false,
        }
    }

    pub fn recorded_events(&self) -> &[NoteEvent] {
        self.recorder.events()
    }

    pub fn can_play(&self) -> bool {
        !self.recorder.is_empty()
    }

    pub fn can_save(&self) -> bool {
        !self.recorder.is_empty() && self.library.is_loaded() && !self.save_in_flight
    }

    /// The popup currently covering the view, if any. A service error takes
    /// precedence over an undismissed load failure.
    pub fn blocking_message(&self) -> Option<&str> {
        if let Some(message) = &self.error_message {
            return Some(message);
        }
        match self.library {
            SongLibrary::Failed { dismissed: false } => Some(LOAD_SONGS_FAILED),
            _ => None,
        }
    }

    /// Keyboard shortcuts are off while the title has focus or a popup is up.
    pub fn shortcuts_blocked(&self) -> bool {
        self.renaming || self.blocking_message().is_some()
    }

    /// Apply a note transition to the sounding set.
    pub fn apply_note(&mut self, note: u8, on: bool) {
        if on {
            self.active_notes.insert(note);
        } else {
            self.active_notes.remove(&note);
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            mode: self.mode,
            active_notes: self.active_notes.clone(),
            recorded_events: self.recorder.events().to_vec(),
            elapsed_seconds: self.elapsed_seconds,
            title: self.title.clone(),
            renaming: self.renaming,
            error_message: self.error_message.clone(),
            library: self.library.clone(),
            save_in_flight: self.save_in_flight,
            can_play: self.can_play(),
            can_save: self.can_save(),
            blocking_message: self.blocking_message().map(str::to_string),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new("untitled")
    }
}

/// Read-only snapshot of a [`Session`] for rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub mode: Mode,
    pub active_notes: BTreeSet<u8>,
    pub recorded_events: Vec<NoteEvent>,
    pub elapsed_seconds: u32,
    pub title: String,
    pub renaming: bool,
    pub error_message: Option<String>,
    pub library: SongLibrary,
    pub save_in_flight: bool,
    pub can_play: bool,
    pub can_save: bool,
    pub blocking_message: Option<String>,
}
