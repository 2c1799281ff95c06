mod config;

pub use config::{Config, RepliesConfig, SchedulerConfig, CHANNEL_ID_ENV};

use std::path::PathBuf;

/// Returns `~/.config/streakbot[-dev]/` based on STREAKBOT_ENV.
///
/// Set STREAKBOT_ENV=dev to use a development config directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STREAKBOT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("streakbot-dev")
    } else {
        base_dir.join("streakbot")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
