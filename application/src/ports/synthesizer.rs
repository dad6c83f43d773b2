//! Synthesizer port
//!
//! Combines successful agent results into one answer.

use async_trait::async_trait;
use thiserror::Error;
use tradedesk_domain::{AgentResult, QueryContext};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthesisError {
    #[error("No results to synthesize")]
    NoResults,

    #[error("Synthesis failed: {0}")]
    Failed(String),
}

/// Port for higher-level result synthesis (reasoning engine, LLM, ...)
#[async_trait]
pub trait SynthesizerPort: Send + Sync {
    /// `results` holds only successful results; `attempted_steps` counts
    /// every step the plan tried, failed ones included.
    async fn synthesize(
        &self,
        results: &[AgentResult],
        attempted_steps: usize,
        context: &QueryContext,
    ) -> Result<String, SynthesisError>;
}
