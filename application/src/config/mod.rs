//! Application-level configuration.
//!
//! - [`OrchestratorConfig`]: planning knobs and pipeline timeouts

pub mod orchestrator_config;

pub use orchestrator_config::OrchestratorConfig;
