//! Degradation handling
//!
//! Converts failures into a well-formed response: a capability overview for
//! help-style queries, otherwise an apologetic message with recovery
//! suggestions.

use std::time::Instant;
use tracing::{info, warn};
use tradedesk_domain::query::patterns::HELP_REQUEST;
use tradedesk_domain::{
    AgentFailure, EntityExtractor, EntityType, IntentScorer, QueryIntent, QueryResponse,
};

pub const FALLBACK_TOOL: &str = "fallback";

const RECOVERY_SUGGESTIONS: &str = "Please try:\n\
• Simplifying your question\n\
• Breaking it into smaller parts\n\
• Trying again in a moment\n\
• Contacting support if the issue persists";

const CAPABILITY_OVERVIEW: &str = "Hello! I'm your trade assistant. I can help you with:\n\n\
Tariff lookups\n\
• \"What's the tariff for importing coffee from Brazil to the US?\"\n\
• \"Show me duty rates for electronics from China\"\n\n\
HS code classification\n\
• \"What's the HS code for leather handbags?\"\n\n\
Comparisons and sourcing\n\
• \"Compare the tariffs on electronics from China versus Germany\"\n\
• \"What's the cheapest country to source textiles from?\"\n\n\
Compliance and risk\n\
• \"What documentation do I need to import machinery into Canada?\"\n\n\
Tips for better results:\n\
• Be specific about products and countries\n\
• Ask one question at a time\n\n\
What would you like to know about international trade?";

#[derive(Default)]
pub struct DegradationHandler {
    extractor: EntityExtractor,
    scorer: IntentScorer,
}

impl DegradationHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank queries count as help requests. A help keyword only counts when
    /// the query names no country or product and scores as a general inquiry,
    /// so "can you help me find the tariff on steel" is still a trade question.
    pub fn is_help_query(&self, query: Option<&str>) -> bool {
        let q = match query.map(str::trim) {
            None | Some("") => return true,
            Some(q) => q,
        };
        if !HELP_REQUEST.is_match(q) {
            return false;
        }
        let entities = self.extractor.extract(q, &[]);
        let names_trade_subject = entities
            .iter()
            .any(|e| matches!(e.entity_type, EntityType::Country | EntityType::Product));
        !names_trade_subject && self.scorer.score_primary(q, &entities) == QueryIntent::GeneralInquiry
    }

    pub fn handle_failures(
        &self,
        failures: &[AgentFailure],
        query: Option<&str>,
        conversation_id: &str,
        started_at: Instant,
    ) -> QueryResponse {
        let elapsed_ms = started_at.elapsed().as_millis() as u64;

        if self.is_help_query(query) {
            info!("Answering help query with capability overview");
            return QueryResponse::success(
                CAPABILITY_OVERVIEW,
                conversation_id,
                vec![FALLBACK_TOOL.to_string()],
                elapsed_ms,
            );
        }

        warn!("Degrading response after {} failure(s)", failures.len());
        let headline = match failures {
            [single] => format!(
                "I encountered an issue while processing your request: {}",
                single.message
            ),
            many => format!(
                "I encountered {} issues while processing your complex request.",
                many.len()
            ),
        };

        QueryResponse::failure(
            format!("{}\n\n{}", headline, RECOVERY_SUGGESTIONS),
            conversation_id,
            Vec::new(),
            elapsed_ms,
        )
    }
}
