//! Daily advancement scheduler.
//!
//! A single tokio task that sleeps until the next local midnight of the
//! reference timezone, asks the tracker to count the new day, then sleeps
//! again. It does not poll and holds nothing but its next wake time.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Waiting -> Advancing -> Waiting -> ... -> Idle (stop)
//! ```
//!
//! Each cycle recomputes the next boundary from the current wall-clock time,
//! so late wake-ups (suspended process, DST shifts) never accumulate drift.
//! If the boundary cannot be computed, the cycle is skipped and the loop
//! waits `retry_delay` before trying again.
//!
//! Every spawned loop carries a generation number. A loop that was stopped
//! and replaced by a newer one no longer writes the shared state.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::events::Event;
use crate::storage::SchedulerConfig;
use crate::streak::StreakTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SchedulerState {
    /// Not started, or stopped.
    Idle,
    /// Sleeping until `until`: the next midnight, or the next retry after
    /// a failed boundary computation.
    Waiting { until: DateTime<Utc> },
    /// Running the advancement step.
    Advancing,
}

struct Running {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Observable state plus the generation of the loop allowed to change it.
struct Status {
    generation: u64,
    state: SchedulerState,
}

struct Inner {
    tracker: Arc<StreakTracker>,
    events: mpsc::Sender<Event>,
    retry_delay: Duration,
    status: Mutex<Status>,
    running: Mutex<Option<Running>>,
}

impl Inner {
    fn status(&self) -> MutexGuard<'_, Status> {
        self.status.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record `state` on behalf of loop `generation`.
    ///
    /// Returns `false` without writing if a newer loop has been started.
    fn set_state(&self, generation: u64, state: SchedulerState) -> bool {
        let mut status = self.status();
        if status.generation != generation {
            return false;
        }
        status.state = state;
        true
    }

    fn emit(&self, event: Event) {
        if let Err(err) = self.events.try_send(event) {
            tracing::warn!("dropping scheduler event: {err}");
        }
    }
}

/// Handle to the daily scheduler task. Clones control the same task.
#[derive(Clone)]
pub struct DailyScheduler {
    inner: Arc<Inner>,
}

impl DailyScheduler {
    /// Create a stopped scheduler and the receiver for its events.
    pub fn new(
        tracker: Arc<StreakTracker>,
        config: &SchedulerConfig,
    ) -> (Self, mpsc::Receiver<Event>) {
        let (events, rx) = mpsc::channel(config.announce_buffer.max(1));
        let inner = Inner {
            tracker,
            events,
            retry_delay: Duration::from_secs(config.retry_delay_secs),
            status: Mutex::new(Status {
                generation: 0,
                state: SchedulerState::Idle,
            }),
            running: Mutex::new(None),
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            rx,
        )
    }

    fn running(&self) -> MutexGuard<'_, Option<Running>> {
        self.inner.running.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SchedulerState {
        self.inner.status().state
    }

    pub fn next_wake(&self) -> Option<DateTime<Utc>> {
        match self.state() {
            SchedulerState::Waiting { until } => Some(until),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running()
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Spawn the loop on the current tokio runtime.
    ///
    /// Returns `false` if it was already running.
    pub fn start(&self) -> bool {
        let mut running = self.running();
        if running
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
        {
            return false;
        }
        let generation = {
            let mut status = self.inner.status();
            status.generation += 1;
            status.generation
        };
        let (shutdown, rx) = watch::channel(false);
        let handle = tokio::spawn(run(Arc::clone(&self.inner), generation, rx));
        *running = Some(Running { shutdown, handle });
        true
    }

    /// Signal the loop to stop. Returns `false` if it was not running.
    pub fn stop(&self) -> bool {
        match self.running().take() {
            Some(running) => {
                let _ = running.shutdown.send(true);
                !running.handle.is_finished()
            }
            None => false,
        }
    }

    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(&self) {
        let running = self.running().take();
        if let Some(running) = running {
            let _ = running.shutdown.send(true);
            if let Err(err) = running.handle.await {
                tracing::warn!("scheduler task ended abnormally: {err}");
            }
        }
    }
}

/// Sleep for `duration` unless shutdown is signalled first.
///
/// Returns `true` when shutting down.
async fn sleep_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return true;
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = shutdown.changed() => true,
    }
}

async fn run(inner: Arc<Inner>, generation: u64, mut shutdown: watch::Receiver<bool>) {
    let clock = inner.tracker.clock().clone();
    let mut first = true;

    loop {
        let now = clock.now();
        let target = match clock.next_midnight(&now) {
            Ok(target) => target.with_timezone(&Utc),
            Err(err) => {
                // Only this cycle is lost; try again after the retry delay.
                let now = now.with_timezone(&Utc);
                let retry_at = TimeDelta::from_std(inner.retry_delay)
                    .ok()
                    .and_then(|delay| now.checked_add_signed(delay))
                    .unwrap_or(now);
                tracing::warn!(%retry_at, "cannot compute next midnight: {err}");
                inner.set_state(generation, SchedulerState::Waiting { until: retry_at });
                if sleep_or_shutdown(inner.retry_delay, &mut shutdown).await {
                    break;
                }
                continue;
            }
        };

        inner.set_state(generation, SchedulerState::Waiting { until: target });
        if first {
            tracing::info!(next_wake = %target, "scheduler started");
            inner.emit(Event::SchedulerStarted {
                next_wake: target,
                at: Utc::now(),
            });
            first = false;
        } else {
            tracing::debug!(next_wake = %target, "scheduler waiting");
        }

        let wait = (target - now.with_timezone(&Utc))
            .to_std()
            .unwrap_or(Duration::ZERO);
        if sleep_or_shutdown(wait, &mut shutdown).await {
            break;
        }

        inner.set_state(generation, SchedulerState::Advancing);
        let today = clock.today();
        if let Some(event) = inner.tracker.try_advance(today) {
            inner.emit(event);
        }
    }

    if inner.set_state(generation, SchedulerState::Idle) {
        tracing::info!("scheduler stopped");
        inner.emit(Event::SchedulerStopped { at: Utc::now() });
    } else {
        tracing::debug!(generation, "replaced scheduler loop exited");
    }
}
