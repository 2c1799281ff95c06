//! TOML-based bot configuration.
//!
//! Stores:
//! - Reference timezone and command prefix
//! - Announcement channel
//! - Start/reset re-entry policy
//! - Scheduler tuning
//! - Reply routing
//!
//! Configuration is stored at `~/.config/streakbot/config.toml`. The
//! `CHANNEL_ID` environment variable overrides `announce_channel_id`.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::clock::{parse_timezone, DEFAULT_TIMEZONE};
use crate::error::{ClockError, ConfigError};
use crate::streak::ReentryPolicy;

pub const CHANNEL_ID_ENV: &str = "CHANNEL_ID";

/// Scheduler-specific configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Wait before retrying after a failed midnight computation.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    /// Capacity of the scheduler event channel.
    #[serde(default = "default_announce_buffer")]
    pub announce_buffer: usize,
}

/// Reply routing configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepliesConfig {
    /// Send failure replies to the sender privately.
    #[serde(default)]
    pub errors_via_dm: bool,
}

/// Bot configuration.
///
/// Serialized to/from TOML at `~/.config/streakbot/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// IANA name of the zone whose midnight ends a day.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_prefix")]
    pub command_prefix: String,
    /// Channel for announcements and the greeting. 0 = unset.
    #[serde(default)]
    pub announce_channel_id: u64,
    #[serde(default = "default_true")]
    pub greet_on_ready: bool,
    #[serde(default)]
    pub policy: ReentryPolicy,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub replies: RepliesConfig,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.into()
}
fn default_prefix() -> String {
    "!".into()
}
fn default_true() -> bool {
    true
}
fn default_retry_delay_secs() -> u64 {
    60
}
fn default_announce_buffer() -> usize {
    16
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            retry_delay_secs: default_retry_delay_secs(),
            announce_buffer: default_announce_buffer(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            command_prefix: default_prefix(),
            announce_channel_id: 0,
            greet_on_ready: true,
            policy: ReentryPolicy::default(),
            scheduler: SchedulerConfig::default(),
            replies: RepliesConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::MissingKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|e| invalid(e.to_string()))?
                            .into(),
                    ),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot set a whole section".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/streakbot"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults if absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed,
    /// fails validation, or if the default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Apply environment overrides (`CHANNEL_ID`).
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = lookup(CHANNEL_ID_ENV) {
            self.announce_channel_id =
                raw.trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                        key: CHANNEL_ID_ENV.into(),
                        message: e.to_string(),
                    })?;
        }
        Ok(())
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_timezone(&self.timezone).map_err(|e| ConfigError::InvalidValue {
            key: "timezone".into(),
            message: e.to_string(),
        })?;
        if self.command_prefix.is_empty() || self.command_prefix.chars().any(char::is_whitespace)
        {
            return Err(ConfigError::InvalidValue {
                key: "command_prefix".into(),
                message: "must be non-empty and contain no whitespace".into(),
            });
        }
        if self.scheduler.retry_delay_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "scheduler.retry_delay_secs".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.scheduler.announce_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                key: "scheduler.announce_buffer".into(),
                message: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    pub fn zone(&self) -> Result<Tz, ClockError> {
        parse_timezone(&self.timezone)
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key and validate the result.
    ///
    /// The change is in memory only; call [`Config::save`] to persist it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streak::{ResetPolicy, StartPolicy};

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str("announce_channel_id = 42\n[policy]\nreset = \"lenient\"\n").unwrap();
        assert_eq!(cfg.announce_channel_id, 42);
        assert_eq!(cfg.policy.start, StartPolicy::Guarded);
        assert_eq!(cfg.policy.reset, ResetPolicy::Lenient);
        assert_eq!(cfg.timezone, "America/Chicago");
        assert_eq!(cfg.scheduler.retry_delay_secs, 60);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("command_prefix").as_deref(), Some("!"));
        assert_eq!(cfg.get("policy.start").as_deref(), Some("guarded"));
        assert_eq!(cfg.get("scheduler.announce_buffer").as_deref(), Some("16"));
        assert!(cfg.get("policy.missing_key").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("policy.start", "overwrite").unwrap();
        cfg.set("replies.errors_via_dm", "true").unwrap();
        cfg.set("scheduler.retry_delay_secs", "5").unwrap();
        assert_eq!(cfg.policy.start, StartPolicy::Overwrite);
        assert!(cfg.replies.errors_via_dm);
        assert_eq!(cfg.scheduler.retry_delay_secs, 5);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("policy.nonexistent", "x"),
            Err(ConfigError::MissingKey(_))
        ));
    }

    #[test]
    fn set_rejects_invalid_values() {
        let mut cfg = Config::default();
        assert!(cfg.set("greet_on_ready", "maybe").is_err());
        assert!(cfg.set("policy.reset", "sometimes").is_err());
        assert!(cfg.set("timezone", "Nowhere/Special").is_err());
        assert!(cfg.set("command_prefix", "").is_err());
        assert!(cfg.set("policy", "guarded").is_err());
        assert!(cfg.set("scheduler.retry_delay_secs", "0").is_err());
        assert!(cfg.set("scheduler.announce_buffer", "0").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn env_override_sets_channel() {
        let mut cfg = Config::default();
        cfg.apply_overrides(|name| (name == CHANNEL_ID_ENV).then(|| " 1234 ".to_string()))
            .unwrap();
        assert_eq!(cfg.announce_channel_id, 1234);

        let err = cfg.apply_overrides(|_| Some("general".to_string()));
        assert!(matches!(err, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn load_from_rejects_bad_timezone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timezone = \"Atlantis/Central\"\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn load_from_rejects_zero_retry_delay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scheduler]\nretry_delay_secs = 0\n").unwrap();
        match Config::load_from(&path) {
            Err(ConfigError::InvalidValue { key, .. }) => {
                assert_eq!(key, "scheduler.retry_delay_secs")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn save_then_load_preserves_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("timezone", "Europe/Berlin").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().timezone, "Europe/Berlin");
    }
}
