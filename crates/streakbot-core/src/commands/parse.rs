//! Chat text to [`Command`].

use crate::error::StreakError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start a streak at `count` (default 0).
    Start { count: u64 },
    Reset,
    /// Time until the next advancement.
    Time,
    /// Current count.
    Streak,
    Help,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start { .. } => "start",
            Command::Reset => "reset",
            Command::Time => "time",
            Command::Streak => "streak",
            Command::Help => "streakbot",
        }
    }
}

/// Parse one message.
///
/// Returns `None` for anything that is not a known command: plain chat,
/// unknown names, or names in the wrong case. A known command with a bad
/// argument yields `Some(Err(InvalidArgument))`.
pub fn parse(content: &str, prefix: &str) -> Option<Result<Command, StreakError>> {
    let rest = content.strip_prefix(prefix)?;
    if rest.starts_with(char::is_whitespace) {
        return None;
    }
    let mut tokens = rest.split_whitespace();
    let command = match tokens.next()? {
        "start" => match tokens.next() {
            None => Ok(Command::Start { count: 0 }),
            Some(arg) => arg
                .parse::<u64>()
                .map(|count| Command::Start { count })
                .map_err(|_| StreakError::InvalidArgument(arg.to_string())),
        },
        "reset" => Ok(Command::Reset),
        "time" => Ok(Command::Time),
        "streak" => Ok(Command::Streak),
        "streakbot" | "commands" => Ok(Command::Help),
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse("!start", "!"), Some(Ok(Command::Start { count: 0 })));
        assert_eq!(parse("!start 12", "!"), Some(Ok(Command::Start { count: 12 })));
        assert_eq!(parse("!reset", "!"), Some(Ok(Command::Reset)));
        assert_eq!(parse("!time", "!"), Some(Ok(Command::Time)));
        assert_eq!(parse("!streak", "!"), Some(Ok(Command::Streak)));
        assert_eq!(parse("!streakbot", "!"), Some(Ok(Command::Help)));
        assert_eq!(parse("!commands", "!"), Some(Ok(Command::Help)));
    }

    #[test]
    fn ignores_extra_tokens() {
        assert_eq!(parse("!start 3 days", "!"), Some(Ok(Command::Start { count: 3 })));
        assert_eq!(parse("!streak please", "!"), Some(Ok(Command::Streak)));
    }

    #[test]
    fn rejects_bad_start_arguments() {
        for arg in ["abc", "-3", "1.5", "9999999999999999999999"] {
            assert_eq!(
                parse(&format!("!start {arg}"), "!"),
                Some(Err(StreakError::InvalidArgument(arg.to_string())))
            );
        }
    }

    #[test]
    fn ignores_non_commands() {
        assert_eq!(parse("hello there", "!"), None);
        assert_eq!(parse("", "!"), None);
        assert_eq!(parse("!", "!"), None);
        assert_eq!(parse("! start", "!"), None);
        assert_eq!(parse("!dance", "!"), None);
        assert_eq!(parse("!Start", "!"), None);
        assert_eq!(parse("!STREAK", "!"), None);
    }

    #[test]
    fn prefix_must_be_first_character() {
        assert_eq!(parse("   !start", "!"), None);
        assert_eq!(parse("\t!streak", "!"), None);
        assert_eq!(parse("well !reset", "!"), None);
    }

    #[test]
    fn honours_custom_prefix() {
        assert_eq!(parse("?time", "?"), Some(Ok(Command::Time)));
        assert_eq!(parse("!time", "?"), None);
        assert_eq!(parse("sb!reset", "sb!"), Some(Ok(Command::Reset)));
    }
}
