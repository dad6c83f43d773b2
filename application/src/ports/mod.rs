//! Port definitions (interfaces for external adapters)

pub mod agent_executor;
pub mod context_store;
pub mod progress;
pub mod query_logger;
pub mod synthesizer;
