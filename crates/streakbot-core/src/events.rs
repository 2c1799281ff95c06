use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Everything the daily scheduler reports.
/// The bot turns `StreakAdvanced` into the daily announcement; the rest are
/// logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A new day was counted by the scheduler.
    StreakAdvanced {
        count: u64,
        on: NaiveDate,
        at: DateTime<Utc>,
    },
    SchedulerStarted {
        next_wake: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    SchedulerStopped {
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::StreakAdvanced { at, .. }
            | Event::SchedulerStarted { at, .. }
            | Event::SchedulerStopped { at } => *at,
        }
    }
}
