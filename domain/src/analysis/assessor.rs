//! Complexity assessment.

use crate::context::entities::ContextualEntity;
use crate::query::complexity::{ComplexityThresholds, ComplexityTier};
use crate::query::entity::{Entity, EntityType, count_of};
use crate::query::patterns::{
    COMPARISON, CONJUNCTION, CONTEXTUAL_REFERENCE, OPTIMIZATION, SCENARIO,
};
use serde::{Deserialize, Serialize};

/// Score plus the tier it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityAssessment {
    pub score: u32,
    pub tier: ComplexityTier,
}

/// Scores a query's complexity and maps the score onto a tier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexityAssessor {
    thresholds: ComplexityThresholds,
}

impl ComplexityAssessor {
    pub fn new(thresholds: ComplexityThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> ComplexityThresholds {
        self.thresholds
    }

    /// Additive complexity score.
    ///
    /// | factor | points |
    /// |--------|--------|
    /// | length > 300 / > 150 / > 75 chars | 3 / 2 / 1 |
    /// | entities | `min(n / 2, 3)` |
    /// | comparison / optimization / scenario wording | 2 / 3 / 2 |
    /// | more than one country / product | 2 / 2 |
    /// | back-reference to earlier turns | 1 |
    /// | more than two and/or segments | 2 |
    pub fn score(&self, text: &str, entities: &[Entity], prior: &[ContextualEntity]) -> u32 {
        let mut score = 0;

        let length = text.chars().count();
        score += match length {
            n if n > 300 => 3,
            n if n > 150 => 2,
            n if n > 75 => 1,
            _ => 0,
        };

        score += (entities.len() / 2).min(3) as u32;

        if COMPARISON.is_match(text) {
            score += 2;
        }
        if OPTIMIZATION.is_match(text) {
            score += 3;
        }
        if SCENARIO.is_match(text) {
            score += 2;
        }

        if count_of(entities, EntityType::Country) > 1 {
            score += 2;
        }
        if count_of(entities, EntityType::Product) > 1 {
            score += 2;
        }

        if CONTEXTUAL_REFERENCE.is_match(text) || !prior.is_empty() {
            score += 1;
        }

        if CONJUNCTION.split(text).count() > 2 {
            score += 2;
        }

        score
    }

    pub fn evaluate(
        &self,
        text: &str,
        entities: &[Entity],
        prior: &[ContextualEntity],
    ) -> ComplexityAssessment {
        let score = self.score(text, entities, prior);
        ComplexityAssessment {
            score,
            tier: self.thresholds.tier_for(score),
        }
    }

    pub fn assess(
        &self,
        text: &str,
        entities: &[Entity],
        prior: &[ContextualEntity],
    ) -> ComplexityTier {
        self.evaluate(text, entities, prior).tier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(t: EntityType, v: &str) -> Entity {
        Entity::new(t, v, 0.8)
    }

    #[test]
    fn test_simple_lookup_is_low() {
        let assessor = ComplexityAssessor::default();
        let entities = vec![
            entity(EntityType::Country, "China"),
            entity(EntityType::Country, "United States"),
            entity(EntityType::Product, "steel"),
        ];
        let text = "What's the tariff for importing steel from China to United States?";

        // entities 1 + two countries 2
        assert_eq!(assessor.score(text, &entities, &[]), 3);
        assert_eq!(
            ComplexityAssessor::new(ComplexityThresholds::STRICT).assess(text, &entities, &[]),
            ComplexityTier::Low
        );
    }

    #[test]
    fn test_comparison_query_is_medium() {
        let entities = vec![
            entity(EntityType::Country, "China"),
            entity(EntityType::Country, "Germany"),
            entity(EntityType::Product, "electronics"),
        ];
        let text = "Compare the tariffs on electronics from China versus Germany";

        for thresholds in [ComplexityThresholds::STANDARD, ComplexityThresholds::STRICT] {
            let assessment = ComplexityAssessor::new(thresholds).evaluate(text, &entities, &[]);
            assert_eq!(assessment.score, 5);
            assert_eq!(assessment.tier, ComplexityTier::Medium);
        }
    }

    #[test]
    fn test_multi_part_strategy_query_is_high() {
        let text = "What is the best strategy for importing cars and steel from Japan and Korea, \
                    or should we consider Mexico as an alternative supplier?";
        let entities = vec![
            entity(EntityType::Country, "Japan"),
            entity(EntityType::Country, "South Korea"),
            entity(EntityType::Country, "Mexico"),
            entity(EntityType::Product, "cars"),
            entity(EntityType::Product, "steel"),
        ];
        let assessor = ComplexityAssessor::default();
        assert_eq!(assessor.assess(text, &entities, &[]), ComplexityTier::High);
    }

    #[test]
    fn test_prior_context_adds_a_point() {
        let assessor = ComplexityAssessor::default();
        let prior = vec![ContextualEntity::new("country", "China", 0.8)];
        let without = assessor.score("rates?", &[], &[]);
        let with = assessor.score("rates?", &[], &prior);
        assert_eq!(with, without + 1);
    }

    #[test]
    fn test_length_bands() {
        let assessor = ComplexityAssessor::default();
        assert_eq!(assessor.score(&"x".repeat(76), &[], &[]), 1);
        assert_eq!(assessor.score(&"x".repeat(151), &[], &[]), 2);
        assert_eq!(assessor.score(&"x".repeat(301), &[], &[]), 3);
    }

    #[test]
    fn test_entity_points_are_capped() {
        let assessor = ComplexityAssessor::default();
        let entities: Vec<_> = (0..10)
            .map(|i| entity(EntityType::Percentage, &format!("{i}%")))
            .collect();
        assert_eq!(assessor.score("x", &entities, &[]), 3);
    }
}
