use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where and how to reach the Uttar REST backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the backend (default: http://localhost:5000)
    pub base_url: String,

    /// User agent sent with every request
    pub user_agent: String,

    /// TCP connect timeout in seconds (default: 5)
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            user_agent: "uttar/0.1.0".to_string(),
            connect_timeout_secs: 5,
        }
    }
}

impl ApiConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
