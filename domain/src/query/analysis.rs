//! The structured analysis of one query.

use super::complexity::ComplexityTier;
use super::entity::{Entity, EntityType};
use super::intent::QueryIntent;
use crate::agent::agent_type::AgentType;
use serde::{Deserialize, Serialize};

/// Completeness check produced by the advanced analysis mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryValidation {
    pub complete: bool,
    pub completeness_score: f64,
    pub missing_elements: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Result of analysing a query: entities, intents, complexity and the agents
/// that should answer it.
///
/// `required_agents` is never empty; tariff analysis is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub raw_query: String,
    pub normalized_query: String,
    pub primary_intent: QueryIntent,
    pub secondary_intents: Vec<QueryIntent>,
    pub complexity: ComplexityTier,
    pub complexity_score: u32,
    pub required_agents: Vec<AgentType>,
    pub entities: Vec<Entity>,
    pub has_contextual_references: bool,
    /// Sub-questions, when the advanced mode split a multi-part query.
    pub parts: Option<Vec<String>>,
    pub validation: Option<QueryValidation>,
}

impl QueryAnalysis {
    pub fn entities_of(&self, entity_type: EntityType) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.is_type(entity_type))
    }

    pub fn is_multi_part(&self) -> bool {
        self.parts.as_ref().is_some_and(|parts| parts.len() > 1)
    }

    /// Queries analysed without validation count as complete.
    pub fn is_complete(&self) -> bool {
        self.validation.as_ref().is_none_or(|v| v.complete)
    }

    pub fn suggestions(&self) -> &[String] {
        self.validation
            .as_ref()
            .map(|v| v.suggestions.as_slice())
            .unwrap_or_default()
    }

    pub fn requires_agent(&self, agent_type: AgentType) -> bool {
        self.required_agents.contains(&agent_type)
    }
}
