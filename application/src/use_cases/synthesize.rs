//! Result synthesis use case
//!
//! Turns agent results into the final answer text. Delegates to a
//! [`SynthesizerPort`] and falls back to plain concatenation when it fails.
//! Never returns an error.

use crate::ports::synthesizer::SynthesizerPort;
use crate::use_cases::coordinate::CoordinationOutcome;
use std::sync::Arc;
use tracing::{debug, warn};
use tradedesk_domain::{AgentResult, QueryContext};

/// Returned when no agent produced a usable result.
pub const APOLOGY: &str = "I apologize, but I wasn't able to gather enough information to provide a comprehensive answer.";

/// Returned when the fallback concatenation is empty too.
pub const SYNTHESIS_ISSUE: &str =
    "I encountered some issues processing your request, but I'm working to improve my responses.";

pub struct ResultSynthesizer {
    synthesizer: Option<Arc<dyn SynthesizerPort>>,
}

impl ResultSynthesizer {
    pub fn new(synthesizer: Arc<dyn SynthesizerPort>) -> Self {
        Self {
            synthesizer: Some(synthesizer),
        }
    }

    /// Concatenation only.
    pub fn concatenating() -> Self {
        Self { synthesizer: None }
    }

    pub async fn synthesize(&self, results: &[AgentResult], context: &QueryContext) -> String {
        self.synthesize_attempted(results, results.len(), context).await
    }

    /// Synthesize a coordination outcome; failed steps count as attempted.
    pub async fn synthesize_outcome(
        &self,
        outcome: &CoordinationOutcome,
        context: &QueryContext,
    ) -> String {
        let attempted = outcome.results.len() + outcome.failures.len();
        self.synthesize_attempted(&outcome.results, attempted, context)
            .await
    }

    async fn synthesize_attempted(
        &self,
        results: &[AgentResult],
        attempted_steps: usize,
        context: &QueryContext,
    ) -> String {
        let successful: Vec<AgentResult> = results.iter().filter(|r| r.success).cloned().collect();
        if successful.is_empty() {
            debug!("No successful results to synthesize");
            return APOLOGY.to_string();
        }

        if let Some(synthesizer) = &self.synthesizer {
            match synthesizer
                .synthesize(&successful, attempted_steps.max(successful.len()), context)
                .await
            {
                Ok(text) => return text,
                Err(e) => warn!("Synthesis failed, concatenating payloads: {}", e),
            }
        }

        let joined = concatenate(&successful);
        if joined.is_empty() {
            SYNTHESIS_ISSUE.to_string()
        } else {
            joined
        }
    }
}

fn concatenate(results: &[AgentResult]) -> String {
    results
        .iter()
        .map(|r| r.payload.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
