//! Infrastructure layer for tradedesk
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod agents;
pub mod config;
pub mod context;
pub mod logging;
pub mod synthesis;

// Re-export commonly used types
pub use agents::{
    Agent, AgentRegistry, ComplianceAgent, MarketAgent, OptimizationAgent, RiskAgent,
    TariffAgent, TariffRate, TariffTable,
};
pub use config::{
    ConfigLoader, ConfigValidationError, FileAgentsConfig, FileConfig, FileLoggingConfig,
    FileOutputConfig, FileReplConfig,
};
pub use context::InMemoryContextStore;
pub use logging::JsonlQueryLogger;
pub use synthesis::PrioritySynthesizer;
