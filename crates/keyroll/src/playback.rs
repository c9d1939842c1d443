//! Cancellable playback of a recorded event list.
//!
//! A playback runs as its own tokio task. Each event waits out its
//! `delay_ms` relative to the previous event, then reports the note
//! transition through the `emit` sink. Cancelling the handle stops the task
//! before any further transition is emitted.
//!
//! Every emitted [`PlaybackEvent`] carries the generation it was started
//! with, so a consumer that has moved on can recognise and drop anything
//! already queued from an older run.

use std::collections::VecDeque;

use songbook::NoteEvent;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::recorder::ms_to_duration;

/// Output of a running playback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackEvent {
    /// A note transition is due now.
    Note { generation: u64, note: u8, state: bool },
    /// Every event has been emitted.
    Finished { generation: u64 },
}

impl PlaybackEvent {
    pub fn generation(&self) -> u64 {
        match self {
            PlaybackEvent::Note { generation, .. } => *generation,
            PlaybackEvent::Finished { generation } => *generation,
        }
    }
}

/// Owner of a playback task. Dropping it cancels the playback.
#[derive(Debug)]
pub struct PlaybackHandle {
    generation: u64,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PlaybackHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stop emitting. Safe to call more than once.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the task to exit.
    pub async fn join(mut self) {
        let _ = (&mut self.task).await;
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Start playing `events` in order.
///
/// The first transition fires after the first event's delay (normally 0).
/// An empty list finishes immediately.
pub fn spawn<F>(events: Vec<NoteEvent>, generation: u64, mut emit: F) -> PlaybackHandle
where
    F: FnMut(PlaybackEvent) + Send + 'static,
{
    let token = CancellationToken::new();
    let task_token = token.clone();
    let mut queue: VecDeque<NoteEvent> = events.into();

    tracing::debug!(generation, events = queue.len(), "Starting playback");

    let task = tokio::spawn(async move {
        while let Some(event) = queue.pop_front() {
            let delay = ms_to_duration(event.delay_ms);
            if !delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => {
                        tracing::debug!(generation, remaining = queue.len(), "Playback cancelled");
                        return;
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            if task_token.is_cancelled() {
                return;
            }
            emit(PlaybackEvent::Note {
                generation,
                note: event.note,
                state: event.state,
            });
        }

        if !task_token.is_cancelled() {
            emit(PlaybackEvent::Finished { generation });
        }
    });

    PlaybackHandle {
        generation,
        token,
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::Instant;

    type Log = Arc<Mutex<Vec<(Duration, PlaybackEvent)>>>;

    fn recording_sink(start: Instant) -> (Log, impl FnMut(PlaybackEvent) + Send + 'static) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let sink_log = log.clone();
        let sink = move |event| {
            sink_log
                .lock()
                .unwrap()
                .push((start.elapsed(), event));
        };
        (log, sink)
    }

    #[tokio::test(start_paused = true)]
    async fn emits_transitions_on_cadence() {
        let start = Instant::now();
        let (log, sink) = recording_sink(start);

        let events = vec![
            NoteEvent::on(60, 0.0),
            NoteEvent::off(60, 500.0),
            NoteEvent::on(64, 0.0),
            NoteEvent::off(64, 700.0),
        ];
        spawn(events, 7, sink).join().await;

        let log = log.lock().unwrap();
        let got: Vec<_> = log.iter().map(|(at, e)| (at.as_millis(), *e)).collect();
        assert_eq!(
            got,
            vec![
                (0, PlaybackEvent::Note { generation: 7, note: 60, state: true }),
                (500, PlaybackEvent::Note { generation: 7, note: 60, state: false }),
                (500, PlaybackEvent::Note { generation: 7, note: 64, state: true }),
                (1200, PlaybackEvent::Note { generation: 7, note: 64, state: false }),
                (1200, PlaybackEvent::Finished { generation: 7 }),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn empty_list_finishes_immediately() {
        let (log, sink) = recording_sink(Instant::now());
        spawn(Vec::new(), 1, sink).join().await;

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].1, PlaybackEvent::Finished { generation: 1 });
        assert_eq!(log[0].0, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_further_transitions() {
        let (log, sink) = recording_sink(Instant::now());
        let events = vec![
            NoteEvent::on(60, 0.0),
            NoteEvent::off(60, 500.0),
            NoteEvent::on(62, 500.0),
        ];
        let handle = spawn(events, 2, sink);

        tokio::time::sleep(Duration::from_millis(250)).await;
        handle.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 1);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_cancels() {
        let (log, sink) = recording_sink(Instant::now());
        let handle = spawn(vec![NoteEvent::on(60, 100.0)], 3, sink);
        drop(handle);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn negative_delays_play_immediately() {
        let (log, sink) = recording_sink(Instant::now());
        spawn(vec![NoteEvent::on(60, -20.0), NoteEvent::off(60, f64::NAN)], 4, sink)
            .join()
            .await;

        let log = log.lock().unwrap();
        assert!(log.iter().all(|(at, _)| at.is_zero()));
        assert_eq!(log.len(), 3);
    }
}
