//! Synthesizer that orders agent payloads by priority.

use async_trait::async_trait;
use tracing::debug;
use tradedesk_application::{SynthesisError, SynthesizerPort};
use tradedesk_domain::{AgentResult, AgentType, QueryContext};

/// Below this success ratio the answer carries a confidence note.
const MODERATE_CONFIDENCE_RATIO: f64 = 0.6;

pub const MODERATE_CONFIDENCE_NOTE: &str =
    "Note: some analyses could not be completed, so this answer has moderate confidence.";

fn confidence_label(ratio: f64) -> &'static str {
    if ratio >= 0.8 {
        "high"
    } else if ratio >= MODERATE_CONFIDENCE_RATIO {
        "good"
    } else {
        "moderate"
    }
}

/// Builds the final answer from successful results:
///
/// 1. Executive summary with source count and confidence
/// 2. Payloads in agent priority order (tariff, compliance, risk, market,
///    optimization)
/// 3. Deduplicated key insights
/// 4. A confidence note when fewer than 60% of steps succeeded
#[derive(Debug, Default, Clone, Copy)]
pub struct PrioritySynthesizer;

impl PrioritySynthesizer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SynthesizerPort for PrioritySynthesizer {
    async fn synthesize(
        &self,
        results: &[AgentResult],
        attempted_steps: usize,
        context: &QueryContext,
    ) -> Result<String, SynthesisError> {
        if results.is_empty() {
            return Err(SynthesisError::NoResults);
        }

        let mut ordered: Vec<&AgentResult> = results.iter().collect();
        ordered.sort_by_key(|r| {
            r.agent_type()
                .map(|t| t.priority())
                .unwrap_or(AgentType::ALL.len())
        });

        let payloads: Vec<&str> = ordered
            .iter()
            .map(|r| r.payload.trim())
            .filter(|p| !p.is_empty())
            .collect();
        if payloads.is_empty() {
            return Err(SynthesisError::Failed("all payloads are empty".to_string()));
        }

        let ratio = results.len() as f64 / attempted_steps.max(results.len()) as f64;
        let sources = if results.len() == 1 { "source" } else { "sources" };
        let mut sections = vec![format!(
            "Analyzed {} data {} ({} confidence).",
            results.len(),
            sources,
            confidence_label(ratio)
        )];
        sections.extend(payloads.iter().map(|p| p.to_string()));

        let mut insights: Vec<&str> = Vec::new();
        for insight in ordered.iter().flat_map(|r| r.insights.iter()) {
            if !insights.contains(&insight.as_str()) {
                insights.push(insight);
            }
        }
        if !insights.is_empty() {
            let bullets: Vec<String> = insights.iter().map(|i| format!("- {}", i)).collect();
            sections.push(format!("Key insights:\n{}", bullets.join("\n")));
        }

        if ratio < MODERATE_CONFIDENCE_RATIO {
            sections.push(MODERATE_CONFIDENCE_NOTE.to_string());
        }

        debug!(
            "Synthesized {} of {} results for conversation {}",
            results.len(),
            attempted_steps,
            context.conversation_id
        );
        Ok(sections.join("\n\n"))
    }
}
