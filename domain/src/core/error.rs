//! Domain error types

use thiserror::Error;

/// Domain-level errors raised while parsing or validating value objects
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Unknown agent type: {0}")]
    InvalidAgentType(String),

    #[error("Unknown query intent: {0}")]
    InvalidIntent(String),

    #[error("Unknown entity type: {0}")]
    InvalidEntityType(String),

    #[error("Unknown option '{value}' for {field}")]
    InvalidOption { field: &'static str, value: String },

    #[error("Invalid complexity thresholds: medium={medium}, high={high} (need 0 < medium < high)")]
    InvalidThresholds { medium: u32, high: u32 },
}
