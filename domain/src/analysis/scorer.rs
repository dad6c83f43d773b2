//! Intent scoring.
//!
//! Each scored intent accumulates weighted evidence from keyword patterns and
//! extracted entities. The primary intent is the argmax (ties resolved by
//! [`QueryIntent::SCORED`] order); secondary intents are every other intent
//! scoring above [`SECONDARY_INTENT_CUTOFF`].

use crate::query::entity::{Entity, EntityType, count_of};
use crate::query::intent::QueryIntent;
use crate::query::patterns::{
    CLASSIFICATION_KEYWORD, COMPARISON, COMPLIANCE, COST, MARKET, OPTIMIZATION, RISK,
    TARIFF_KEYWORD,
};

pub const SECONDARY_INTENT_CUTOFF: f64 = 0.3;

/// Per-intent scores in tie-break order.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentScores(Vec<(QueryIntent, f64)>);

impl IntentScores {
    pub fn get(&self, intent: QueryIntent) -> f64 {
        self.0
            .iter()
            .find(|(i, _)| *i == intent)
            .map(|(_, s)| *s)
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(QueryIntent, f64)> {
        self.0.iter()
    }

    /// Highest-scoring intent; earliest wins ties; all zero is a general inquiry.
    pub fn primary(&self) -> QueryIntent {
        let mut best = (QueryIntent::GeneralInquiry, 0.0);
        for &(intent, score) in &self.0 {
            if score > best.1 {
                best = (intent, score);
            }
        }
        best.0
    }

    /// Intents above the cutoff other than `primary`, in tie-break order.
    pub fn secondary(&self, primary: QueryIntent) -> Vec<QueryIntent> {
        self.0
            .iter()
            .filter(|(intent, score)| *intent != primary && *score > SECONDARY_INTENT_CUTOFF)
            .map(|(intent, _)| *intent)
            .collect()
    }
}

/// Stateless, deterministic intent scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentScorer;

impl IntentScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, intent: QueryIntent, text: &str, entities: &[Entity]) -> f64 {
        let countries = count_of(entities, EntityType::Country);
        let products = count_of(entities, EntityType::Product);
        let has = |t: EntityType| count_of(entities, t) > 0;
        let weight = |matched: bool, w: f64| if matched { w } else { 0.0 };

        match intent {
            QueryIntent::Comparison => {
                weight(COMPARISON.is_match(text), 0.8)
                    + weight(countries > 1, 0.3)
                    + weight(products > 1, 0.2)
            }
            QueryIntent::CostAnalysis => {
                weight(COST.is_match(text), 0.7) + weight(has(EntityType::MonetaryAmount), 0.5)
            }
            QueryIntent::ComplianceCheck => weight(COMPLIANCE.is_match(text), 0.8),
            QueryIntent::RiskAssessment => weight(RISK.is_match(text), 0.8),
            QueryIntent::MarketAnalysis => weight(MARKET.is_match(text), 0.8),
            QueryIntent::Optimization => weight(OPTIMIZATION.is_match(text), 0.8),
            QueryIntent::TariffLookup => {
                weight(TARIFF_KEYWORD.is_match(text), 0.7)
                    + weight(countries > 0 && products > 0, 0.2)
                    + weight(has(EntityType::Percentage), 0.1)
            }
            QueryIntent::ProductClassification => {
                weight(CLASSIFICATION_KEYWORD.is_match(text), 0.8)
                    + weight(has(EntityType::HsCode), 0.6)
            }
            QueryIntent::GeneralInquiry => 0.0,
        }
    }

    pub fn scores(&self, text: &str, entities: &[Entity]) -> IntentScores {
        IntentScores(
            QueryIntent::SCORED
                .iter()
                .map(|&intent| (intent, self.score(intent, text, entities)))
                .collect(),
        )
    }

    pub fn score_primary(&self, text: &str, entities: &[Entity]) -> QueryIntent {
        self.scores(text, entities).primary()
    }

    pub fn score_secondary(&self, text: &str, entities: &[Entity]) -> Vec<QueryIntent> {
        let scores = self.scores(text, entities);
        scores.secondary(scores.primary())
    }

    /// Primary and secondary intents from one scoring pass.
    pub fn classify(&self, text: &str, entities: &[Entity]) -> (QueryIntent, Vec<QueryIntent>) {
        let scores = self.scores(text, entities);
        let primary = scores.primary();
        (primary, scores.secondary(primary))
    }
}
