//! Core error types for streakbot-core.
//!
//! User-input failures (`StreakError`) are recovered by the command handler
//! and turned into reply text. Everything else bubbles up through `CoreError`.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for streakbot-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Streak state errors
    #[error("Streak error: {0}")]
    Streak(#[from] StreakError),

    /// Clock and timezone errors
    #[error("Clock error: {0}")]
    Clock(#[from] ClockError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Message delivery errors
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors caused by a command that does not fit the current streak state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreakError {
    /// A streak is already running.
    #[error("a streak is already running with a count of {count}")]
    AlreadyActive { count: u64 },

    /// No streak is running.
    #[error("no streak is running")]
    NotActive,

    /// A command argument could not be understood.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Reference-timezone computation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    /// The configured timezone is not a known IANA name
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// No valid local time exists near midnight of the given date
    #[error("No valid local midnight on {date}")]
    NoMidnight { date: chrono::NaiveDate },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Outbound delivery errors.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The platform rejected or failed to deliver a message
    #[error("Failed to send to {target}: {message}")]
    Send { target: String, message: String },

    /// The adapter cannot perform this kind of delivery
    #[error("Unsupported by this gateway: {0}")]
    Unsupported(&'static str),

    /// Webhook URL is malformed or not a Discord webhook
    #[error("Invalid webhook URL: {0}")]
    InvalidWebhook(String),

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
