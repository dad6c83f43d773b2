//! Coordination configuration from TOML (`[coordination]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw coordination configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCoordinationConfig {
    /// Fixed per-step deadline; unset means the complexity tier's timeout
    pub step_timeout_seconds: Option<u64>,
    /// Deadline for a whole query
    pub query_timeout_seconds: u64,
    pub max_concurrent_queries: usize,
}

impl Default for FileCoordinationConfig {
    fn default() -> Self {
        Self {
            step_timeout_seconds: None,
            query_timeout_seconds: 300,
            max_concurrent_queries: 100,
        }
    }
}

impl FileCoordinationConfig {
    pub fn step_timeout(&self) -> Option<Duration> {
        self.step_timeout_seconds.map(Duration::from_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_seconds)
    }
}
