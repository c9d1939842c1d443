//! Keyboard shortcuts.

use crate::controller::Command;

/// A key press as delivered by the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: char,
    pub ctrl: bool,
}

impl KeyPress {
    pub fn new(key: char) -> Self {
        Self { key, ctrl: false }
    }

    pub fn ctrl(key: char) -> Self {
        Self { key, ctrl: true }
    }
}

/// Map a key press to its command. `suppressed` is true while the title has
/// focus or a popup is shown, and turns every shortcut off.
pub fn shortcut(press: KeyPress, suppressed: bool) -> Option<Command> {
    if suppressed {
        return None;
    }
    match (press.key.to_ascii_lowercase(), press.ctrl) {
        ('s', true) => Some(Command::Save),
        (' ', false) => Some(Command::TogglePlayback),
        ('r', false) => Some(Command::ToggleRecording),
        _ => None,
    }
}
