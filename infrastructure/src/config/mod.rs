//! Configuration file loading for tradedesk
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `TRADEDESK_*` environment variables (`TRADEDESK_CONTEXT__MAX_HISTORY=20`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./tradedesk.toml` or `./.tradedesk.toml`
//! 4. Global: `$XDG_CONFIG_HOME/tradedesk/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAgentsConfig, FileConfig, FileContextConfig,
    FileCoordinationConfig, FileLoggingConfig, FileOutputConfig, FilePlanningConfig,
    FileReplConfig, FileTariffRate,
};
pub use loader::ConfigLoader;
