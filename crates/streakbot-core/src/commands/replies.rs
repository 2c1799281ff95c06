//! Reply and announcement text.

use chrono::TimeDelta;
use indoc::formatdoc;

use super::parse::Command;
use crate::error::StreakError;

/// Render a duration as whole hours and minutes, truncating seconds.
pub fn format_time_until(remaining: TimeDelta) -> String {
    let total_seconds = remaining.num_seconds().max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    format!("{hours} hours {minutes} minutes")
}

/// Reply templates, parameterized by the configured command prefix.
#[derive(Debug, Clone)]
pub struct Replies {
    prefix: String,
}

impl Replies {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn started(&self, count: u64) -> String {
        format!("Streak started at {count}!")
    }

    pub fn reset(&self, author: &str) -> String {
        format!("@everyone {author} reset the streak! The count is now 0.")
    }

    pub fn streak(&self, count: u64) -> String {
        format!("The current streak count is {count} 🎉")
    }

    pub fn time_until(&self, remaining: TimeDelta) -> String {
        format!(
            "Time until the streak increases: {}",
            format_time_until(remaining)
        )
    }

    pub fn advanced(&self, count: u64) -> String {
        format!("@everyone Congrats, you made it another day! Day {count} completed. Keep it up! 🎉")
    }

    pub fn help(&self) -> String {
        formatdoc! {"
            **Commands:**
            `{p}start` - Start the streak.
            `{p}start {{#}}` - Start the streak from a specific point.
            `{p}reset` - Reset the streak.
            `{p}time` - See how much time until the streak increases.
            `{p}streak` - Get the current streak count.
            `{p}streakbot` - Get the commands list again.",
            p = self.prefix,
        }
    }

    pub fn greeting(&self) -> String {
        format!(
            "**Hello! I'm your Streak Bot. Let's keep the streak going!**\n{}",
            self.help()
        )
    }

    /// Text for a command that failed with `error`.
    pub fn failure(&self, command: Option<Command>, error: &StreakError) -> String {
        let p = &self.prefix;
        match error {
            StreakError::AlreadyActive { count } => format!(
                "There is already a streak running with a count of {count}. \
                 Do you want to stop that streak and start a new one? \
                 If yes, type `{p}reset` to reset the current streak first."
            ),
            StreakError::InvalidArgument(_) => format!(
                "Invalid input. Please use `{p}start {{#}}` where {{#}} is a positive integer."
            ),
            StreakError::NotActive => {
                let action = match command {
                    Some(Command::Reset) => "reset it",
                    Some(Command::Time) => "check the time",
                    _ => "check the streak count",
                };
                format!("There is no streak running. Start a streak before you can {action}.")
            }
        }
    }

    pub fn internal_error(&self, command: Command) -> String {
        format!(
            "An error occurred while running `{}{}`.",
            self.prefix,
            command.name()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_truncates_seconds() {
        assert_eq!(format_time_until(TimeDelta::seconds(1799)), "0 hours 29 minutes");
        assert_eq!(format_time_until(TimeDelta::seconds(1800)), "0 hours 30 minutes");
        assert_eq!(
            format_time_until(TimeDelta::milliseconds(1_799_999)),
            "0 hours 29 minutes"
        );
        assert_eq!(format_time_until(TimeDelta::seconds(86_399)), "23 hours 59 minutes");
        assert_eq!(format_time_until(TimeDelta::hours(25)), "25 hours 0 minutes");
        assert_eq!(format_time_until(TimeDelta::seconds(59)), "0 hours 0 minutes");
    }

    #[test]
    fn help_uses_prefix() {
        let help = Replies::new("?").help();
        assert!(help.starts_with("**Commands:**\n"));
        assert!(help.contains("`?start {#}` - Start the streak from a specific point."));
        assert!(help.ends_with("`?streakbot` - Get the commands list again."));
    }

    #[test]
    fn not_active_text_depends_on_command() {
        let replies = Replies::new("!");
        assert_eq!(
            replies.failure(Some(Command::Reset), &StreakError::NotActive),
            "There is no streak running. Start a streak before you can reset it."
        );
        assert_eq!(
            replies.failure(Some(Command::Time), &StreakError::NotActive),
            "There is no streak running. Start a streak before you can check the time."
        );
        assert_eq!(
            replies.failure(Some(Command::Streak), &StreakError::NotActive),
            "There is no streak running. Start a streak before you can check the streak count."
        );
    }

    #[test]
    fn already_active_mentions_reset() {
        let text = Replies::new("!").failure(
            Some(Command::Start { count: 0 }),
            &StreakError::AlreadyActive { count: 8 },
        );
        assert_eq!(
            text,
            "There is already a streak running with a count of 8. Do you want to stop that \
             streak and start a new one? If yes, type `!reset` to reset the current streak first."
        );
    }

    #[test]
    fn invalid_argument_text() {
        assert_eq!(
            Replies::new("!").failure(None, &StreakError::InvalidArgument("x".into())),
            "Invalid input. Please use `!start {#}` where {#} is a positive integer."
        );
    }
}
