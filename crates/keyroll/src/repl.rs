//! Line parser for `keyroll session`.

use keyroll::{Command, KeyPress};
use songbook::SongId;

pub const HELP: &str = "\
commands:
  r                 toggle recording (shortcut)
  p | space         toggle playback (shortcut)
  save | ^s         save the recording (shortcut)
  on <note>         note-on, MIDI number
  off <note>        note-off, MIDI number
  play <id>         play a stored song
  delete <id>       delete a stored song
  list              show stored songs
  reload            reload stored songs
  rename | done     focus / unfocus the title
  title <text>      set the title
  ok                dismiss the error popup
  quit              leave";

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Command(Command),
    List,
    Help,
    Quit,
    Empty,
}

pub fn parse_line(line: &str) -> Result<Input, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim();
    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (trimmed, ""),
    };

    let input = match word {
        "" if line.contains(' ') => Input::Command(Command::Key(KeyPress::new(' '))),
        "" => Input::Empty,
        "r" => Input::Command(Command::Key(KeyPress::new('r'))),
        "p" | "space" => Input::Command(Command::Key(KeyPress::new(' '))),
        "save" | "^s" => Input::Command(Command::Key(KeyPress::ctrl('s'))),
        "on" | "off" => {
            let note: u8 = rest
                .parse()
                .map_err(|_| format!("expected a MIDI note number, got '{}'", rest))?;
            if note > 127 {
                return Err(format!("MIDI note out of range: {}", note));
            }
            Input::Command(Command::NoteInput {
                note,
                on: word == "on",
            })
        }
        "play" | "delete" => {
            let id: SongId = rest
                .parse()
                .map_err(|e| format!("invalid song id '{}': {}", rest, e))?;
            if word == "play" {
                Input::Command(Command::PlaySong(id))
            } else {
                Input::Command(Command::DeleteSong(id))
            }
        }
        "title" => Input::Command(Command::SetTitle(rest.to_string())),
        "rename" => Input::Command(Command::SetRenaming(true)),
        "done" => Input::Command(Command::SetRenaming(false)),
        "ok" => Input::Command(Command::DismissError),
        "reload" => Input::Command(Command::LoadSongs),
        "list" | "ls" => Input::List,
        "help" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        other => return Err(format!("unknown command '{}' (try 'help')", other)),
    };
    Ok(input)
}
