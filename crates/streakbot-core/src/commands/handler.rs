//! Command handler.
//!
//! Maps parsed commands onto [`StreakTracker`] operations. The `handle_*`
//! operations return plain values; [`CommandHandler::handle`] renders them
//! into reply text. User-input errors never escape as `Err` from `handle`.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, TimeZone};

use super::parse::Command;
use super::replies::Replies;
use crate::error::{CoreError, StreakError};
use crate::scheduler::DailyScheduler;
use crate::streak::StreakTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Success,
    Failure,
}

/// Text produced for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub kind: ReplyKind,
}

impl Reply {
    fn success(text: String) -> Self {
        Self {
            text,
            kind: ReplyKind::Success,
        }
    }

    fn failure(text: String) -> Self {
        Self {
            text,
            kind: ReplyKind::Failure,
        }
    }
}

pub struct CommandHandler {
    tracker: Arc<StreakTracker>,
    scheduler: DailyScheduler,
    replies: Replies,
}

impl CommandHandler {
    pub fn new(tracker: Arc<StreakTracker>, scheduler: DailyScheduler, replies: Replies) -> Self {
        Self {
            tracker,
            scheduler,
            replies,
        }
    }

    pub fn replies(&self) -> &Replies {
        &self.replies
    }

    /// Start a streak and make sure the daily scheduler is running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn handle_start(&self, requested: u64) -> Result<u64, StreakError> {
        let count = self.tracker.start(requested)?;
        if self.scheduler.start() {
            tracing::debug!("daily scheduler launched by start");
        }
        Ok(count)
    }

    /// End the streak. Returns the count it had.
    pub fn handle_reset(&self) -> Result<u64, StreakError> {
        self.tracker.reset()
    }

    pub fn handle_streak_query(&self) -> Result<u64, StreakError> {
        self.tracker.current()
    }

    /// Time from `now` until the streak next increases.
    pub fn handle_time_query_at<Z: TimeZone>(
        &self,
        now: &DateTime<Z>,
    ) -> Result<TimeDelta, CoreError> {
        if !self.tracker.is_active() {
            return Err(StreakError::NotActive.into());
        }
        Ok(self.tracker.clock().until_next_midnight(now)?)
    }

    pub fn handle_time_query(&self) -> Result<TimeDelta, CoreError> {
        let now = self.tracker.clock().now();
        self.handle_time_query_at(&now)
    }

    pub fn handle_help(&self) -> String {
        self.replies.help()
    }

    /// Run a parsed command (or a parse failure) and render the reply.
    pub fn handle(&self, parsed: Result<Command, StreakError>, author: &str) -> Reply {
        let command = match parsed {
            Ok(command) => command,
            Err(err) => return Reply::failure(self.replies.failure(None, &err)),
        };

        let result = match command {
            Command::Start { count } => self
                .handle_start(count)
                .map(|count| self.replies.started(count))
                .map_err(CoreError::from),
            Command::Reset => self
                .handle_reset()
                .map(|_| self.replies.reset(author))
                .map_err(CoreError::from),
            Command::Time => self
                .handle_time_query()
                .map(|remaining| self.replies.time_until(remaining)),
            Command::Streak => self
                .handle_streak_query()
                .map(|count| self.replies.streak(count))
                .map_err(CoreError::from),
            Command::Help => Ok(self.handle_help()),
        };

        match result {
            Ok(text) => Reply::success(text),
            Err(CoreError::Streak(err)) => {
                Reply::failure(self.replies.failure(Some(command), &err))
            }
            Err(err) => {
                tracing::warn!(command = command.name(), "command failed: {err}");
                Reply::failure(self.replies.internal_error(command))
            }
        }
    }
}
