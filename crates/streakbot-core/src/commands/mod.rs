mod handler;
mod parse;
mod replies;

pub use handler::{CommandHandler, Reply, ReplyKind};
pub use parse::{parse, Command};
pub use replies::{format_time_until, Replies};
