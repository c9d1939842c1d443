//! Text helpers for rendering a session.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Playable keys: C3 through F4.
pub const KEYBOARD_RANGE: RangeInclusive<u8> = 48..=65;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// `mm:ss`, minutes uncapped.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Scientific pitch name, MIDI 60 = C4.
pub fn note_name(note: u8) -> String {
    let octave = i32::from(note / 12) - 1;
    format!("{}{}", NOTE_NAMES[usize::from(note % 12)], octave)
}

pub fn is_black_key(note: u8) -> bool {
    NOTE_NAMES[usize::from(note % 12)].ends_with('#')
}

/// One cell per key in [`KEYBOARD_RANGE`]: `#` for a sounding key, `-` for a
/// white key at rest, `^` for a black key at rest.
pub fn render_keyboard(active: &BTreeSet<u8>) -> String {
    KEYBOARD_RANGE
        .map(|note| {
            if active.contains(&note) {
                '#'
            } else if is_black_key(note) {
                '^'
            } else {
                '-'
            }
        })
        .collect()
}
