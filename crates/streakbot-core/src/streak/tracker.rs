//! Single owner of the process-wide streak state.
//!
//! Every read and read-modify-write goes through one mutex. Each method
//! locks, applies one transition, copies out its result and unlocks before
//! returning, so callers never hold the lock across an `.await`.

use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};

use super::policy::ReentryPolicy;
use super::state::StreakState;
use crate::clock::ClockSource;
use crate::error::StreakError;
use crate::events::Event;

#[derive(Debug)]
pub struct StreakTracker {
    state: Mutex<StreakState>,
    clock: ClockSource,
    policy: ReentryPolicy,
}

impl StreakTracker {
    pub fn new(clock: ClockSource, policy: ReentryPolicy) -> Self {
        Self {
            state: Mutex::new(StreakState::new()),
            clock,
            policy,
        }
    }

    pub fn clock(&self) -> &ClockSource {
        &self.clock
    }

    // The state is plain data and every critical section leaves it
    // consistent, so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, StreakState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> StreakState {
        self.lock().clone()
    }

    pub fn is_active(&self) -> bool {
        self.lock().is_active()
    }

    pub fn current(&self) -> Result<u64, StreakError> {
        self.lock().current()
    }

    /// Begin a streak at `count`. Returns the new count.
    pub fn start(&self, count: u64) -> Result<u64, StreakError> {
        let today = self.clock.today();
        let count = self.lock().start(count, today, &self.policy)?;
        tracing::info!(count, %today, "streak started");
        Ok(count)
    }

    /// End the streak. Returns the count it had.
    pub fn reset(&self) -> Result<u64, StreakError> {
        let today = self.clock.today();
        let previous = self.lock().reset(today, &self.policy)?;
        tracing::info!(previous, %today, "streak reset");
        Ok(previous)
    }

    /// Count `today` if it has not been counted yet.
    pub fn try_advance(&self, today: NaiveDate) -> Option<Event> {
        let advancement = self.lock().try_advance(today);
        match advancement {
            Some(adv) => {
                tracing::info!(count = adv.count, on = %adv.on, "streak advanced");
                Some(Event::StreakAdvanced {
                    count: adv.count,
                    on: adv.on,
                    at: Utc::now(),
                })
            }
            None => {
                tracing::debug!(%today, "no advancement");
                None
            }
        }
    }
}
