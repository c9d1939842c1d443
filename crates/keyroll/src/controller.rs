//! Session Controller
//!
//! Owns the [`Session`] and is its only writer. Input arrives two ways:
//!
//! - [`Command`]s from the view, applied with [`Controller::dispatch`]
//! - internal events from the tasks the controller spawns (recording clock,
//!   playback, song service calls), queued on an unbounded channel and
//!   applied by [`Controller::step`], [`Controller::drain`] or
//!   [`Controller::run`]
//!
//! Timer events carry the generation they were started under. Every mode
//! change bumps the generation, so anything a cancelled timer queued before
//! it noticed the cancellation is dropped on arrival.
//!
//! Service replies never touch mode, buffer, or timers. They only update the
//! library, the error popup, and the save-in-flight flag.

use std::sync::Arc;
use std::time::Duration;

use pianoconf::SessionConfig;
use songbook::{NewSong, Result, Song, SongApi, SongId};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::clock::ClockHandle;
use crate::keys::{shortcut, KeyPress};
use crate::playback::{self, PlaybackEvent, PlaybackHandle};
use crate::session::{
    Mode, Session, SessionView, SongLibrary, ADD_SONG_FAILED, DELETE_SONG_FAILED,
};

/// Requests from the view.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ToggleRecording,
    TogglePlayback,
    PlaySong(SongId),
    NoteInput { note: u8, on: bool },
    Save,
    DeleteSong(SongId),
    LoadSongs,
    SetTitle(String),
    SetRenaming(bool),
    DismissError,
    Key(KeyPress),
}

/// Events reported back by spawned tasks.
#[derive(Debug)]
enum Internal {
    Tick { generation: u64 },
    Playback(PlaybackEvent),
    SongsLoaded(Result<Vec<Song>>),
    SongAdded(Result<Song>),
    SongDeleted(Result<SongId>),
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Period of the elapsed-seconds clock.
    pub tick_period: Duration,
    /// Title a fresh session starts with.
    pub default_title: String,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

impl From<&SessionConfig> for ControllerOptions {
    fn from(config: &SessionConfig) -> Self {
        Self {
            tick_period: Duration::from_millis(config.tick_ms.max(1)),
            default_title: config.default_title.clone(),
        }
    }
}

pub struct Controller {
    session: Session,
    api: Arc<dyn SongApi>,
    tick_period: Duration,
    generation: u64,
    clock: Option<ClockHandle>,
    playback: Option<PlaybackHandle>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
    view_tx: watch::Sender<SessionView>,
}

impl Controller {
    pub fn new(api: Arc<dyn SongApi>, options: ControllerOptions) -> Self {
        let session = Session::new(options.default_title);
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let (view_tx, _) = watch::channel(session.view());

        Self {
            session,
            api,
            tick_period: options.tick_period,
            generation: 0,
            clock: None,
            playback: None,
            internal_tx,
            internal_rx,
            view_tx,
        }
    }

    pub fn from_config(api: Arc<dyn SongApi>, config: &SessionConfig) -> Self {
        Self::new(api, ControllerOptions::from(config))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn snapshot(&self) -> SessionView {
        self.session.view()
    }

    /// Receive every view published after a state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view_tx.subscribe()
    }

    pub fn dispatch(&mut self, command: Command) {
        debug!(?command, mode = ?self.session.mode, "Dispatching command");
        self.apply_command(command);
        self.publish();
    }

    /// Wait for the next internal event and apply it.
    pub async fn step(&mut self) {
        if let Some(event) = self.internal_rx.recv().await {
            self.apply(event);
        }
    }

    /// Apply every internal event already queued. Returns how many ran.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.internal_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Load the library, then process commands and internal events until the
    /// command channel closes. Timers are stopped on exit.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        self.dispatch(Command::LoadSongs);

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.dispatch(command),
                    None => break,
                },
                Some(event) = self.internal_rx.recv() => self.apply(event),
            }
        }

        debug!("Command channel closed, stopping session");
        self.set_idle();
        self.publish();
    }

    fn apply_command(&mut self, command: Command) {
        match command {
            Command::ToggleRecording => {
                if self.session.mode == Mode::Recording {
                    self.set_idle();
                } else {
                    self.start_recording();
                }
            }
            Command::TogglePlayback => {
                if self.session.mode == Mode::Playing {
                    self.set_idle();
                } else if self.session.can_play() {
                    let events = self.session.recorded_events().to_vec();
                    self.start_playback(events);
                }
            }
            Command::PlaySong(id) => match self.session.library.find(id) {
                Some(song) => {
                    let events = song.events.clone();
                    self.start_playback(events);
                }
                None => debug!(%id, "Song not in library, ignoring play"),
            },
            Command::NoteInput { note, on } => {
                if self.session.mode == Mode::Recording && !self.session.renaming {
                    self.session.recorder.record(note, on);
                }
            }
            Command::Save => self.save(),
            Command::DeleteSong(id) => {
                let api = self.api.clone();
                self.spawn_call(async move { Internal::SongDeleted(api.delete(id).await) });
            }
            Command::LoadSongs => {
                self.session.library = SongLibrary::Loading;
                let api = self.api.clone();
                self.spawn_call(async move { Internal::SongsLoaded(api.list().await) });
            }
            Command::SetTitle(title) => self.session.title = title,
            Command::SetRenaming(renaming) => self.session.renaming = renaming,
            Command::DismissError => {
                if self.session.error_message.take().is_none() {
                    if let SongLibrary::Failed { dismissed } = &mut self.session.library {
                        *dismissed = true;
                    }
                }
            }
            Command::Key(press) => {
                if let Some(command) = shortcut(press, self.session.shortcuts_blocked()) {
                    self.apply_command(command);
                }
            }
        }
    }

    fn apply(&mut self, event: Internal) {
        match event {
            Internal::Tick { generation } => {
                if generation != self.generation || self.session.mode != Mode::Recording {
                    return;
                }
                self.session.elapsed_seconds += 1;
            }
            Internal::Playback(event) => {
                if event.generation() != self.generation || self.session.mode != Mode::Playing {
                    debug!(?event, current = self.generation, "Dropping stale playback event");
                    return;
                }
                match event {
                    PlaybackEvent::Note { note, state, .. } => self.session.apply_note(note, state),
                    PlaybackEvent::Finished { .. } => {
                        debug!("Playback finished");
                        self.set_idle();
                    }
                }
            }
            Internal::SongsLoaded(Ok(songs)) => {
                debug!(count = songs.len(), "Loaded songs");
                self.session.library = SongLibrary::Loaded { songs };
            }
            Internal::SongsLoaded(Err(e)) => {
                warn!(error = %e, "Failed to load songs");
                self.session.library = SongLibrary::Failed { dismissed: false };
            }
            Internal::SongAdded(result) => {
                self.session.save_in_flight = false;
                match result {
                    Ok(song) => {
                        debug!(id = %song.id, title = %song.title, "Song saved");
                        if let SongLibrary::Loaded { songs } = &mut self.session.library {
                            songs.push(song);
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to add song");
                        self.session.error_message = Some(ADD_SONG_FAILED.to_string());
                    }
                }
            }
            Internal::SongDeleted(Ok(id)) => {
                debug!(%id, "Song deleted");
                if let SongLibrary::Loaded { songs } = &mut self.session.library {
                    songs.retain(|song| song.id != id);
                }
            }
            Internal::SongDeleted(Err(e)) => {
                warn!(error = %e, "Failed to delete song");
                self.session.error_message = Some(DELETE_SONG_FAILED.to_string());
            }
        }
        self.publish();
    }

    /// Stop whatever is running and return to Idle.
    fn set_idle(&mut self) {
        self.clock = None;
        if let Some(playback) = self.playback.take() {
            playback.cancel();
        }
        if self.session.mode == Mode::Recording {
            self.session.recorder.end_take();
        }
        self.generation += 1;
        self.session.mode = Mode::Idle;
        self.session.active_notes.clear();
    }

    fn start_recording(&mut self) {
        self.set_idle();
        self.session.recorder.clear();
        self.session.elapsed_seconds = 0;
        self.session.mode = Mode::Recording;

        let tx = self.internal_tx.clone();
        self.clock = Some(ClockHandle::spawn(
            self.tick_period,
            self.generation,
            move |generation| {
                let _ = tx.send(Internal::Tick { generation });
            },
        ));
        debug!(generation = self.generation, "Recording started");
    }

    fn start_playback(&mut self, events: Vec<songbook::NoteEvent>) {
        self.set_idle();
        self.session.mode = Mode::Playing;

        let tx = self.internal_tx.clone();
        self.playback = Some(playback::spawn(events, self.generation, move |event| {
            let _ = tx.send(Internal::Playback(event));
        }));
    }

    fn save(&mut self) {
        if !self.session.can_save() {
            debug!("Save not possible right now, ignoring");
            return;
        }
        self.session.save_in_flight = true;

        let song = NewSong::new(
            self.session.title.clone(),
            self.session.recorded_events().to_vec(),
            self.session.elapsed_seconds,
        );
        let api = self.api.clone();
        self.spawn_call(async move { Internal::SongAdded(api.create(song).await) });
    }

    fn spawn_call<F>(&self, call: F)
    where
        F: std::future::Future<Output = Internal> + Send + 'static,
    {
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(call.await);
        });
    }

    fn publish(&self) {
        let view = self.session.view();
        self.view_tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use songbook::{NoteEvent, SongService};

    fn controller() -> Controller {
        let api = Arc::new(SongService::in_memory(Duration::ZERO));
        Controller::new(api, ControllerOptions::default())
    }

    #[tokio::test(start_paused = true)]
    async fn toggling_recording_twice_leaves_empty_idle_session() {
        let mut controller = controller();
        controller.dispatch(Command::ToggleRecording);
        assert_eq!(controller.session().mode, Mode::Recording);

        controller.dispatch(Command::ToggleRecording);
        let view = controller.snapshot();
        assert_eq!(view.mode, Mode::Idle);
        assert!(view.recorded_events.is_empty());
        assert!(!view.can_play);
        assert!(!view.can_save);
    }

    #[tokio::test(start_paused = true)]
    async fn playback_with_empty_buffer_is_a_no_op() {
        let mut controller = controller();
        controller.dispatch(Command::TogglePlayback);
        assert_eq!(controller.session().mode, Mode::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn notes_outside_recording_are_ignored() {
        let mut controller = controller();
        controller.dispatch(Command::NoteInput { note: 60, on: true });
        assert!(controller.session().recorded_events().is_empty());

        controller.dispatch(Command::ToggleRecording);
        controller.dispatch(Command::SetRenaming(true));
        controller.dispatch(Command::NoteInput { note: 60, on: true });
        assert!(controller.session().recorded_events().is_empty());

        controller.dispatch(Command::SetRenaming(false));
        controller.dispatch(Command::NoteInput { note: 60, on: true });
        assert_eq!(
            controller.session().recorded_events(),
            &[NoteEvent::on(60, 0.0)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stale_tick_is_dropped() {
        let mut controller = controller();
        controller.dispatch(Command::ToggleRecording);
        let stale = controller.generation;

        controller.dispatch(Command::ToggleRecording);
        controller.dispatch(Command::ToggleRecording);
        controller.apply(Internal::Tick { generation: stale });
        assert_eq!(controller.session().elapsed_seconds, 0);

        controller.apply(Internal::Tick {
            generation: controller.generation,
        });
        assert_eq!(controller.session().elapsed_seconds, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dismiss_clears_error_before_load_failure() {
        let mut controller = controller();
        controller.session.library = SongLibrary::Failed { dismissed: false };
        controller.session.error_message = Some(ADD_SONG_FAILED.to_string());

        controller.dispatch(Command::DismissError);
        assert_eq!(
            controller.session().blocking_message(),
            Some(crate::session::LOAD_SONGS_FAILED)
        );

        controller.dispatch(Command::DismissError);
        assert_eq!(controller.session().blocking_message(), None);
        assert_eq!(
            controller.session().library,
            SongLibrary::Failed { dismissed: true }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn title_changes_are_published() {
        let mut controller = controller();
        let mut views = controller.subscribe();

        controller.dispatch(Command::SetTitle("nocturne".to_string()));
        assert!(views.has_changed().unwrap());
        assert_eq!(views.borrow_and_update().title, "nocturne");

        controller.dispatch(Command::SetTitle("nocturne".to_string()));
        assert!(!views.has_changed().unwrap());
    }
}
