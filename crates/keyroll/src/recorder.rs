//! Note capture.
//!
//! Turns raw note-on/note-off input into [`NoteEvent`]s whose `delay_ms` is
//! the gap since the previous event. Nothing is filtered: repeated on/on or
//! off/off input is kept as-is.

use songbook::NoteEvent;
use std::time::Duration;
use tokio::time::Instant;

/// Recording buffer plus the timestamp of the last captured event.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Vec<NoteEvent>,
    last_event_at: Option<Instant>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture an event at the current time.
    pub fn record(&mut self, note: u8, is_on: bool) -> NoteEvent {
        self.record_at(note, is_on, Instant::now())
    }

    /// Capture an event at `now`.
    pub fn record_at(&mut self, note: u8, is_on: bool, now: Instant) -> NoteEvent {
        let delay_ms = self
            .last_event_at
            .map(|last| duration_to_ms(now.saturating_duration_since(last)))
            .unwrap_or(0.0);

        let event = NoteEvent {
            note,
            state: is_on,
            delay_ms,
        };
        self.events.push(event);
        self.last_event_at = Some(now);

        tracing::trace!(note, state = is_on, delay_ms, "Captured note event");
        event
    }

    /// Forget the timestamp reference so the next event starts at delay 0.
    /// The buffer is kept.
    pub fn end_take(&mut self) {
        self.last_event_at = None;
    }

    /// Empty the buffer and the timestamp reference.
    pub fn clear(&mut self) {
        self.events.clear();
        self.last_event_at = None;
    }

    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Milliseconds as f64, computed from whole nanoseconds so integral
/// millisecond gaps come out exact.
pub fn duration_to_ms(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}

/// Inverse of [`duration_to_ms`]. Negative, NaN and infinite delays map to zero.
pub fn ms_to_duration(ms: f64) -> Duration {
    if !ms.is_finite() || ms <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_nanos((ms * 1_000_000.0).round() as u64)
}
