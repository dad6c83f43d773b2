//! Agent executor port
//!
//! Defines the interface for invoking specialized agents (tariff analysis,
//! compliance, risk, market intelligence, optimization).

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tradedesk_domain::{AgentOutput, AgentRequest, AgentType};

/// Errors raised by an agent invocation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("No agent registered for {0}")]
    NotRegistered(AgentType),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Port for agent execution
///
/// The coordinator calls [`invoke`](AgentExecutorPort::invoke) once per plan
/// step. Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait AgentExecutorPort: Send + Sync {
    /// Run the agent named in `request.agent_type`.
    async fn invoke(&self, request: &AgentRequest) -> Result<AgentOutput, AgentError>;

    /// Whether an agent of this type is available
    fn supports(&self, _agent_type: AgentType) -> bool {
        true
    }
}
