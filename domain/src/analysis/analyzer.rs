//! Query analysis: normalization, extraction, scoring, assessment and agent
//! selection in one pass.

use super::assessor::ComplexityAssessor;
use super::extractor::EntityExtractor;
use super::scorer::IntentScorer;
use super::validation::{decompose, validate_completeness};
use crate::agent::agent_type::AgentType;
use crate::context::entities::ContextualEntity;
use crate::core::error::DomainError;
use crate::query::analysis::QueryAnalysis;
use crate::query::complexity::ComplexityThresholds;
use crate::query::entity::{Entity, EntityType, count_of};
use crate::query::intent::QueryIntent;
use crate::query::normalize::normalize_query;
use crate::query::patterns::{CONTEXTUAL_REFERENCE, PRONOUN_REFERENCE, TRADE_KEYWORD};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// How much analysis to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Extraction, scoring and assessment only.
    Standard,
    /// Also validate completeness and decompose multi-part queries.
    #[default]
    Advanced,
}

impl FromStr for AnalysisMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "basic" => Ok(AnalysisMode::Standard),
            "advanced" => Ok(AnalysisMode::Advanced),
            _ => Err(DomainError::InvalidOption {
                field: "analysis_mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Composes the extractor, scorer and assessor.
pub struct QueryAnalyzer {
    extractor: EntityExtractor,
    scorer: IntentScorer,
    assessor: ComplexityAssessor,
    mode: AnalysisMode,
}

impl QueryAnalyzer {
    pub fn new(thresholds: ComplexityThresholds, mode: AnalysisMode) -> Self {
        Self {
            extractor: EntityExtractor::new(),
            scorer: IntentScorer::new(),
            assessor: ComplexityAssessor::new(thresholds),
            mode,
        }
    }

    /// Replace the entity extractor (e.g. to register extra rules).
    pub fn with_extractor(mut self, extractor: EntityExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    pub fn analyze(&self, query: &str, prior: &[ContextualEntity]) -> QueryAnalysis {
        let normalized = normalize_query(query);
        let entities = self.extractor.extract(&normalized, prior);
        let (primary, secondary) = self.scorer.classify(&normalized, &entities);
        let assessment = self.assessor.evaluate(&normalized, &entities, prior);
        let required_agents = select_agents(primary, &secondary, &normalized, &entities);

        let (parts, validation) = match self.mode {
            AnalysisMode::Standard => (None, None),
            AnalysisMode::Advanced => (
                Some(decompose(&normalized)),
                Some(validate_completeness(&normalized, &entities)),
            ),
        };

        debug!(
            "Analyzed query: intent={}, secondary={:?}, complexity={} (score {}), agents={:?}",
            primary,
            secondary,
            assessment.tier,
            assessment.score,
            required_agents
        );

        QueryAnalysis {
            raw_query: query.to_string(),
            has_contextual_references: CONTEXTUAL_REFERENCE.is_match(&normalized)
                || PRONOUN_REFERENCE.is_match(&normalized),
            normalized_query: normalized,
            primary_intent: primary,
            secondary_intents: secondary,
            complexity: assessment.tier,
            complexity_score: assessment.score,
            required_agents,
            entities,
            parts,
            validation,
        }
    }
}

impl Default for QueryAnalyzer {
    fn default() -> Self {
        Self::new(ComplexityThresholds::default(), AnalysisMode::default())
    }
}

/// Agents needed to answer a query, in insertion order without duplicates.
///
/// 1. The primary intent's agent
/// 2. Tariff analysis when trade wording appears
/// 3. Each secondary intent's agent
/// 4. Optimization for entity-rich multi-country or multi-product queries
/// 5. Tariff analysis if still missing
pub fn select_agents(
    primary: QueryIntent,
    secondary: &[QueryIntent],
    text: &str,
    entities: &[Entity],
) -> Vec<AgentType> {
    let mut agents: Vec<AgentType> = Vec::new();
    let mut add = |agent: AgentType| {
        if !agents.contains(&agent) {
            agents.push(agent);
        }
    };

    add(primary.agent());
    if TRADE_KEYWORD.is_match(text) {
        add(AgentType::TariffAnalysis);
    }
    for intent in secondary {
        add(intent.agent());
    }
    if entities.len() > 4
        && (count_of(entities, EntityType::Country) > 1
            || count_of(entities, EntityType::Product) > 1)
    {
        add(AgentType::Optimization);
    }
    add(AgentType::TariffAnalysis);

    agents
}
