//! Song and note event types.
//!
//! Songs travel as structured event lists:
//!
//! ```json
//! {"id": "…", "title": "etude", "events": [{"delayMs": 0.0, "note": 60, "state": true}], "durationSeconds": 3}
//! ```
//!
//! `_id` is accepted on input as an alias of `id`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A single note-on/note-off signal, timed relative to the event before it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEvent {
    /// MIDI note number.
    pub note: u8,

    /// `true` for note-on, `false` for note-off.
    pub state: bool,

    /// Milliseconds since the previous event in the same recording.
    /// Zero for the first event.
    pub delay_ms: f64,
}

impl NoteEvent {
    pub fn on(note: u8, delay_ms: f64) -> Self {
        Self {
            note,
            state: true,
            delay_ms,
        }
    }

    pub fn off(note: u8, delay_ms: f64) -> Self {
        Self {
            note,
            state: false,
            delay_ms,
        }
    }
}

/// Store-assigned song identifier. Never reused after deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(Uuid);

impl SongId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SongId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SongId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A persisted, named recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    #[serde(alias = "_id")]
    pub id: SongId,
    pub title: String,
    pub events: Vec<NoteEvent>,
    pub duration_seconds: u32,
}

/// Everything needed to create a song; the store supplies the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSong {
    pub title: String,
    #[serde(default)]
    pub events: Vec<NoteEvent>,
    #[serde(default)]
    pub duration_seconds: u32,
}

impl NewSong {
    pub fn new(title: impl Into<String>, events: Vec<NoteEvent>, duration_seconds: u32) -> Self {
        Self {
            title: title.into(),
            events,
            duration_seconds,
        }
    }

    pub fn into_song(self, id: SongId) -> Song {
        Song {
            id,
            title: self.title,
            events: self.events,
            duration_seconds: self.duration_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn note_event_uses_camel_case() {
        let value = serde_json::to_value(NoteEvent::off(64, 700.0)).unwrap();
        assert_eq!(value, json!({"note": 64, "state": false, "delayMs": 700.0}));
    }

    #[test]
    fn song_accepts_legacy_id_key() {
        let id = SongId::new();
        let song: Song = serde_json::from_value(json!({
            "_id": id.to_string(),
            "title": "etude",
            "events": [{"delayMs": 0, "note": 60, "state": true}],
            "durationSeconds": 2
        }))
        .unwrap();

        assert_eq!(song.id, id);
        assert_eq!(song.events, vec![NoteEvent::on(60, 0.0)]);
        assert_eq!(song.duration_seconds, 2);
    }

    #[test]
    fn fractional_delays_survive_json() {
        let event = NoteEvent::on(61, 123.456_789_012_345);
        let text = serde_json::to_string(&event).unwrap();
        let back: NoteEvent = serde_json::from_str(&text).unwrap();
        assert_eq!(back.delay_ms.to_bits(), event.delay_ms.to_bits());
    }

    #[test]
    fn song_id_parse_rejects_garbage() {
        assert!("not-a-uuid".parse::<SongId>().is_err());
        let id = SongId::new();
        assert_eq!(id.to_string().parse::<SongId>().unwrap(), id);
    }

    #[test]
    fn ids_are_not_reused() {
        assert_ne!(SongId::new(), SongId::new());
    }
}
