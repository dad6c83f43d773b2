//! Application layer for tradedesk
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::OrchestratorConfig;
pub use ports::{
    agent_executor::{AgentError, AgentExecutorPort},
    context_store::{ContextStoreError, ContextStorePort},
    progress::{CoordinationProgress, NoProgress},
    query_logger::{NoQueryLogger, QueryEvent, QueryLogger},
    synthesizer::{SynthesisError, SynthesizerPort},
};
pub use use_cases::coordinate::{CoordinationError, CoordinationOutcome, ExecutionCoordinator};
pub use use_cases::degrade::DegradationHandler;
pub use use_cases::process_query::{ProcessQueryError, ProcessQueryUseCase};
pub use use_cases::synthesize::{APOLOGY, ResultSynthesizer};
