//! Streak state machine.
//!
//! Plain data with no clock and no locking: every transition takes the
//! reference-timezone date it applies to. [`StreakTracker`](super::StreakTracker)
//! owns the single instance and serializes access to it.
//!
//! ## State Transitions
//!
//! ```text
//! Inactive --start(n)--> Active(n)
//! Active(n) --try_advance(d > last)--> Active(n + 1)
//! Active(n) --reset--> Inactive
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::policy::{ReentryPolicy, ResetPolicy, StartPolicy};
use crate::error::StreakError;

/// Result of a successful daily advancement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advancement {
    pub count: u64,
    pub on: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    count: u64,
    active: bool,
    /// Date of the last increment, start or reset.
    #[serde(default)]
    last_advanced: Option<NaiveDate>,
}

impl StreakState {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn last_advanced(&self) -> Option<NaiveDate> {
        self.last_advanced
    }

    /// Count of the running streak.
    pub fn current(&self) -> Result<u64, StreakError> {
        if self.active {
            Ok(self.count)
        } else {
            Err(StreakError::NotActive)
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a streak at `count`. Returns the new count.
    pub fn start(
        &mut self,
        count: u64,
        today: NaiveDate,
        policy: &ReentryPolicy,
    ) -> Result<u64, StreakError> {
        if self.active && policy.start == StartPolicy::Guarded {
            return Err(StreakError::AlreadyActive { count: self.count });
        }
        // Overwriting a running streak must not move the date backwards.
        let on = match self.last_advanced {
            Some(last) if self.active => last.max(today),
            _ => today,
        };
        self.active = true;
        self.count = count;
        self.last_advanced = Some(on);
        Ok(count)
    }

    /// End the running streak. Returns the count it had.
    pub fn reset(&mut self, today: NaiveDate, policy: &ReentryPolicy) -> Result<u64, StreakError> {
        if !self.active && policy.reset == ResetPolicy::Guarded {
            return Err(StreakError::NotActive);
        }
        let previous = self.count;
        self.active = false;
        self.count = 0;
        self.last_advanced = Some(today);
        Ok(previous)
    }

    /// Count `today` as a completed day, at most once per date.
    ///
    /// Returns `None` when inactive, or when `today` is not after the last
    /// advanced date (already counted, or the clock moved backwards).
    pub fn try_advance(&mut self, today: NaiveDate) -> Option<Advancement> {
        if !self.active {
            return None;
        }
        if self.last_advanced.is_some_and(|last| today <= last) {
            return None;
        }
        self.count = self.count.saturating_add(1);
        self.last_advanced = Some(today);
        Some(Advancement {
            count: self.count,
            on: today,
        })
    }
}
