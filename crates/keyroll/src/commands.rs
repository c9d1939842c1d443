//! CLI command implementations

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use keyroll::display::{format_clock, note_name, render_keyboard};
use keyroll::session::LOAD_SONGS_HINT;
use keyroll::{playback, Controller, ControllerOptions, Mode, PlaybackEvent, SessionView};
use pianoconf::SessionConfig;
use songbook::{SongApi, SongClient, SongId};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::repl::{self, Input, HELP};

fn parse_id(id: &str) -> Result<SongId> {
    id.parse()
        .with_context(|| format!("Invalid song id: '{}'", id))
}

/// Print every stored song
pub async fn list(client: &SongClient) -> Result<()> {
    let songs = client
        .list()
        .await
        .with_context(|| format!("Could not load songs from {}", client.endpoint()))?;

    if songs.is_empty() {
        println!("No songs");
        return Ok(());
    }

    for song in &songs {
        println!(
            "{}  {:>5}  {:>4} events  {}",
            song.id,
            format_clock(song.duration_seconds),
            song.events.len(),
            song.title
        );
    }
    Ok(())
}

/// Delete a song by id; unknown ids succeed too
pub async fn delete(client: &SongClient, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    let deleted = client.delete(id).await.context("Unable to delete song")?;
    println!("Deleted {}", deleted);
    Ok(())
}

/// Replay a stored song, printing each transition as it fires
pub async fn play(client: &SongClient, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    let songs = client.list().await.context("Could not load songs")?;
    let Some(song) = songs.into_iter().find(|song| song.id == id) else {
        bail!("No song with id {}", id);
    };

    println!(
        "Playing '{}' ({} events, {})",
        song.title,
        song.events.len(),
        format_clock(song.duration_seconds)
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let start = Instant::now();
    let handle = playback::spawn(song.events, 0, move |event| {
        let _ = tx.send(event);
    });

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                handle.cancel();
                println!("Stopped");
                break;
            }
            event = rx.recv() => match event {
                Some(PlaybackEvent::Note { note, state, .. }) => {
                    println!(
                        "{:>9.3}s  {:<3}  {:<4} ({})",
                        start.elapsed().as_secs_f64(),
                        if state { "on" } else { "off" },
                        note_name(note),
                        note
                    );
                }
                Some(PlaybackEvent::Finished { .. }) | None => {
                    println!("Done");
                    break;
                }
            },
        }
    }
    Ok(())
}

/// Interactive session driven by stdin lines
pub async fn session(
    client: SongClient,
    config: &SessionConfig,
    title: Option<String>,
    json: bool,
) -> Result<()> {
    let mut options = ControllerOptions::from(config);
    if let Some(title) = title {
        options.default_title = title;
    }

    let api: Arc<dyn SongApi> = Arc::new(client);
    let controller = Controller::new(api, options);
    let mut views = controller.subscribe();
    let (tx, rx) = mpsc::channel(32);
    let runner = tokio::spawn(controller.run(rx));

    if !json {
        println!("keyroll session, 'help' for commands");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last = views.borrow().clone();
    render(&last, None, json)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                match repl::parse_line(&line) {
                    Ok(Input::Command(command)) => {
                        if tx.send(command).await.is_err() {
                            break;
                        }
                    }
                    Ok(Input::List) => print_library(&views.borrow()),
                    Ok(Input::Help) => println!("{}", HELP),
                    Ok(Input::Empty) => {}
                    Ok(Input::Quit) => break,
                    Err(message) => eprintln!("{}", message),
                }
            }
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                render(&view, Some(&last), json)?;
                last = view;
            }
        }
    }

    drop(tx);
    runner.await.context("Session task failed")?;
    Ok(())
}

fn render(view: &SessionView, previous: Option<&SessionView>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(view)?);
        return Ok(());
    }

    let line = status_line(view);
    if previous.map(status_line).as_deref() != Some(line.as_str()) {
        println!("{}", line);
    }

    let popup_changed = previous.map(|p| &p.blocking_message) != Some(&view.blocking_message);
    if popup_changed {
        if let Some(message) = &view.blocking_message {
            println!("! {} ('ok' to dismiss)", message);
            if message == keyroll::session::LOAD_SONGS_FAILED {
                println!("  {}", LOAD_SONGS_HINT);
            }
        }
    }
    Ok(())
}

pub fn status_line(view: &SessionView) -> String {
    let mode = match view.mode {
        Mode::Idle => "idle",
        Mode::Recording => "rec",
        Mode::Playing => "play",
    };
    let title = if view.renaming {
        format!("[{}_]", view.title)
    } else {
        view.title.clone()
    };
    let library = match &view.library {
        keyroll::SongLibrary::Loading => "loading".to_string(),
        keyroll::SongLibrary::Loaded { songs } => format!("{} songs", songs.len()),
        keyroll::SongLibrary::Failed { .. } => "offline".to_string(),
    };
    let saving = if view.save_in_flight { " saving…" } else { "" };

    format!(
        "{:<4} {}  {}  {} events  {}  [{}]{}",
        mode,
        format_clock(view.elapsed_seconds),
        render_keyboard(&view.active_notes),
        view.recorded_events.len(),
        title,
        library,
        saving
    )
}

fn print_library(view: &SessionView) {
    match &view.library {
        keyroll::SongLibrary::Loaded { songs } if songs.is_empty() => println!("No songs"),
        keyroll::SongLibrary::Loaded { songs } => {
            for song in songs {
                println!(
                    "{}  {:>5}  {}",
                    song.id,
                    format_clock(song.duration_seconds),
                    song.title
                );
            }
        }
        keyroll::SongLibrary::Loading => println!("Loading songs…"),
        keyroll::SongLibrary::Failed { .. } => println!("{}", keyroll::session::LOAD_SONGS_FAILED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyroll::SongLibrary;

    #[test]
    fn status_line_summarizes_view() {
        let view = SessionView {
            mode: Mode::Recording,
            elapsed_seconds: 65,
            title: "etude".to_string(),
            library: SongLibrary::Loaded { songs: Vec::new() },
            ..SessionView::default()
        };
        let line = status_line(&view);
        assert!(line.starts_with("rec  01:05"));
        assert!(line.contains("0 events"));
        assert!(line.contains("etude"));
        assert!(line.contains("[0 songs]"));
    }

    #[test]
    fn renaming_marks_title() {
        let view = SessionView {
            title: "etude".to_string(),
            renaming: true,
            ..SessionView::default()
        };
        assert!(status_line(&view).contains("[etude_]"));
    }
}
