use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a toggle does while a request for the same target is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoalescePolicy {
    /// Apply locally and owe one trailing request carrying the latest state.
    #[default]
    Coalesce,
    /// Ignore the toggle entirely, like a disabled button.
    DisableWhilePending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Time allowed for one toggle request before it counts as failed (default: 10)
    pub request_timeout_secs: u64,

    pub policy: CoalescePolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
            policy: CoalescePolicy::Coalesce,
        }
    }
}

impl SyncConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
