//! Progress messages shown while a job runs.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Flavor text cycled through while waiting on the service.
pub const LOADING_MESSAGES: [&str; 9] = [
    "Summoning digital spirits...",
    "Painting with light and code...",
    "Rendering keyframes of imagination...",
    "Composing the digital orchestra...",
    "This can take a few minutes, hang tight!",
    "Weaving pixels into a story...",
    "The AI is dreaming up your anime...",
    "Assembling the animation cell by cell...",
    "Finalizing the color palette...",
];

/// Shown before the job is submitted.
pub const INITIALIZING_MESSAGE: &str = "Initializing video generation...";
/// Shown once the service has accepted the job.
pub const IN_PROGRESS_MESSAGE: &str = "Generation in progress... This may take several minutes.";
/// Shown when the operation reaches a terminal state.
pub const FINALIZING_MESSAGE: &str = "Finalizing video...";
/// Shown before the video bytes are fetched.
pub const DOWNLOADING_MESSAGE: &str = "Downloading generated video...";

/// Receives human-readable progress updates.
pub trait ProgressSink: Send + Sync {
    /// Replaces the currently displayed message.
    fn update(&self, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn update(&self, message: &str) {
        self(message)
    }
}

/// Message shown on the given tick. Ticks count from 1 and wrap around the list.
pub fn message_for_tick(tick: u64) -> &'static str {
    let index = tick.saturating_sub(1) % LOADING_MESSAGES.len() as u64;
    LOADING_MESSAGES[index as usize]
}

/// Periodic task that cycles [`LOADING_MESSAGES`] into a sink.
///
/// The task lives exactly as long as the value returned by [`StatusReporter::start`].
/// Dropping the reporter waits for an update already in progress, so no message
/// reaches the sink once the drop has returned.
#[must_use = "the reporter stops as soon as it is dropped"]
pub struct StatusReporter {
    stopped: Arc<Mutex<bool>>,
    _cancel: DropGuard,
}

impl StatusReporter {
    /// Starts ticking every `interval`; the first message appears after one interval.
    ///
    /// A tick missed behind a slow sink is delayed rather than replayed.
    pub fn start(interval: Duration, sink: Arc<dyn ProgressSink>) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let stopped = Arc::new(Mutex::new(false));
        let gate = Arc::clone(&stopped);

        tokio::spawn(async move {
            let first = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(first, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut tick: u64 = 0;
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        tick += 1;
                        if !emit(&gate, sink.as_ref(), tick) {
                            break;
                        }
                    }
                }
            }
            tracing::trace!(ticks = tick, "status reporter stopped");
        });

        Self {
            stopped,
            _cancel: token.drop_guard(),
        }
    }
}

impl Drop for StatusReporter {
    fn drop(&mut self) {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner) = true;
    }
}

/// Delivers one flavor message unless the reporter was stopped. Returns false once stopped.
///
/// The lock is held across the update so a concurrent drop waits for it to finish.
fn emit(gate: &Mutex<bool>, sink: &dyn ProgressSink, tick: u64) -> bool {
    let stopped = gate.lock().unwrap_or_else(PoisonError::into_inner);
    if *stopped {
        return false;
    }
    sink.update(message_for_tick(tick));
    true
}
