//! Chat configuration from TOML (`[repl]` section)

use serde::{Deserialize, Serialize};

/// Settings for `tradedesk --chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Show per-wave progress bars while agents run
    pub show_progress: bool,
    /// History file; defaults to the platform data dir
    pub history_file: Option<String>,
    /// Input prompt
    pub prompt: String,
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
            prompt: "trade> ".to_string(),
        }
    }
}
