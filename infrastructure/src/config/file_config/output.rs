//! Output configuration from TOML (`[output]` section)

use serde::{Deserialize, Serialize};
use tradedesk_domain::OutputFormat;

/// How answers are rendered on the console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Default format when `--output` is not given
    pub format: Option<OutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
    /// Print the execution plan before every query, as `--show-plan` does
    pub show_plan: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            show_plan: false,
        }
    }
}
