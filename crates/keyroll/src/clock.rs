//! Elapsed-time clock for a recording.
//!
//! Ticks once per period, starting one period after spawn. Each tick carries
//! the generation it was started with.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Running clock task. Dropping it stops the clock.
#[derive(Debug)]
pub struct ClockHandle {
    generation: u64,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl ClockHandle {
    pub fn spawn<F>(period: Duration, generation: u64, mut emit: F) -> Self
    where
        F: FnMut(u64) + Send + 'static,
    {
        let token = CancellationToken::new();
        let task_token = token.clone();

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    _ = ticker.tick() => emit(generation),
                }
            }
        });

        Self {
            generation,
            token,
            task,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
