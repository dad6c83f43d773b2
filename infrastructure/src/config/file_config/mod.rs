//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application config
//! through [`FileConfig::to_orchestrator_config`].

mod agents;
mod context;
mod coordination;
mod logging;
mod output;
mod planning;
mod repl;

pub use agents::{FileAgentsConfig, FileTariffRate};
pub use context::FileContextConfig;
pub use coordination::FileCoordinationConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use planning::FilePlanningConfig;
pub use repl::FileReplConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tradedesk_application::OrchestratorConfig;
use tradedesk_domain::DomainError;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("{0} cannot be 0")]
    Zero(&'static str),

    #[error("tariff rate {rate} for {entry} is outside 0..=100")]
    InvalidRate { entry: String, rate: f64 },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Thresholds, analysis and dependency modes, limits
    pub planning: FilePlanningConfig,
    /// Step and query deadlines
    pub coordination: FileCoordinationConfig,
    /// Conversation history and retention
    pub context: FileContextConfig,
    /// Rule-based agent data
    pub agents: FileAgentsConfig,
    /// File sinks
    pub logging: FileLoggingConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Chat REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Validate the entire configuration, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.planning.to_planning_options()?;

        if self.coordination.query_timeout_seconds == 0 {
            return Err(ConfigValidationError::Zero("coordination.query_timeout_seconds"));
        }
        if self.coordination.step_timeout_seconds == Some(0) {
            return Err(ConfigValidationError::Zero("coordination.step_timeout_seconds"));
        }
        if self.coordination.max_concurrent_queries == 0 {
            return Err(ConfigValidationError::Zero("coordination.max_concurrent_queries"));
        }
        if self.context.max_history == 0 {
            return Err(ConfigValidationError::Zero("context.max_history"));
        }

        let valid_rate = |rate: f64| (0.0..=100.0).contains(&rate);
        if !valid_rate(self.agents.default_tariff_rate) {
            return Err(ConfigValidationError::InvalidRate {
                entry: "agents.default_tariff_rate".to_string(),
                rate: self.agents.default_tariff_rate,
            });
        }
        if let Some(entry) = self.agents.tariff_rates.iter().find(|e| !valid_rate(e.rate)) {
            return Err(ConfigValidationError::InvalidRate {
                entry: format!(
                    "{}/{}",
                    entry.country.as_deref().unwrap_or("*"),
                    entry.product.as_deref().unwrap_or("*")
                ),
                rate: entry.rate,
            });
        }

        Ok(())
    }

    pub fn to_orchestrator_config(&self) -> Result<OrchestratorConfig, ConfigValidationError> {
        self.validate()?;
        Ok(OrchestratorConfig::default()
            .with_planning(self.planning.to_planning_options()?)
            .with_step_timeout(self.coordination.step_timeout())
            .with_query_timeout(self.coordination.query_timeout())
            .with_max_concurrent_queries(self.coordination.max_concurrent_queries))
    }
}
