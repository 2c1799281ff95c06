use serde::{Deserialize, Serialize};

/// What `start` does while a streak is already running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartPolicy {
    /// Refuse; the streak must be reset first.
    #[default]
    Guarded,
    /// Replace the running count.
    Overwrite,
}

/// What `reset` does while no streak is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetPolicy {
    /// Refuse with `NotActive`.
    #[default]
    Guarded,
    /// Succeed as a no-op.
    Lenient,
}

/// Re-entry rules for `start` and `reset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReentryPolicy {
    #[serde(default)]
    pub start: StartPolicy,
    #[serde(default)]
    pub reset: ResetPolicy,
}

impl ReentryPolicy {
    pub fn lenient() -> Self {
        Self {
            start: StartPolicy::Overwrite,
            reset: ResetPolicy::Lenient,
        }
    }
}
