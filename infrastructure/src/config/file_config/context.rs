//! Conversation context configuration from TOML (`[context]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileContextConfig {
    /// Messages loaded into each query's context
    pub max_history: usize,
    /// Conversations idle longer than this are dropped
    pub retention_hours: u64,
}

impl Default for FileContextConfig {
    fn default() -> Self {
        Self {
            max_history: 10,
            retention_hours: 24,
        }
    }
}
