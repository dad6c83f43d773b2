//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for daily-rotated diagnostic logs; unset disables file logging
    pub directory: Option<String>,
    /// Path of the JSONL query event log; unset disables it
    pub query_log: Option<String>,
}
