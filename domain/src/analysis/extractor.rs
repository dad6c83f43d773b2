//! Entity extraction.
//!
//! Each entity type has its own [`ExtractionRule`]. Rules run independently;
//! a failing rule is logged and skipped so extraction as a whole never fails.

use super::ExtractionError;
use crate::context::entities::ContextualEntity;
use crate::query::entity::{Entity, EntityType, dedupe_and_rank};
use crate::query::patterns::{
    COUNTRY, HS_CODE, MONETARY, PERCENTAGE, PRODUCT, QUANTITY, canonical_country,
};
use tracing::{debug, warn};

/// Confidence given to entities carried over from earlier turns.
pub const CONTEXT_ENTITY_CONFIDENCE: f64 = 0.7;

/// A single extraction strategy for one kind of entity.
pub trait ExtractionRule: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    fn extract(&self, text: &str) -> Result<Vec<Entity>, ExtractionError>;
}

/// Runs every registered rule and merges the results.
pub struct EntityExtractor {
    rules: Vec<Box<dyn ExtractionRule>>,
}

impl EntityExtractor {
    /// Extractor with the built-in country, product, HS code, money,
    /// percentage and quantity rules.
    pub fn new() -> Self {
        Self::empty()
            .with_rule(CountryRule)
            .with_rule(ProductRule)
            .with_rule(HsCodeRule)
            .with_rule(MonetaryRule)
            .with_rule(PercentageRule)
            .with_rule(QuantityRule)
    }

    /// Extractor with no rules; only context entities will be produced.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: impl ExtractionRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Extract, deduplicate and rank entities from `text`, adding entities
    /// referenced from earlier turns at a fixed confidence.
    pub fn extract(&self, text: &str, prior: &[ContextualEntity]) -> Vec<Entity> {
        let mut entities = Vec::new();

        for rule in &self.rules {
            match rule.extract(text) {
                Ok(found) => {
                    debug!("Rule '{}' found {} entities", rule.name(), found.len());
                    entities.extend(found);
                }
                Err(e) => {
                    warn!("Extraction rule '{}' failed, skipping: {}", rule.name(), e);
                }
            }
        }

        entities.extend(
            prior
                .iter()
                .filter_map(|e| e.to_entity(CONTEXT_ENTITY_CONFIDENCE)),
        );

        dedupe_and_rank(entities)
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

const COUNTRY_CUES: [&str; 8] = [
    "import from",
    "imports from",
    "importing from",
    "export to",
    "exports to",
    "exporting to",
    "trade with",
    "trading with",
];

const PRODUCT_CUES: [&str; 10] = [
    "tariff on",
    "tariffs on",
    "duty on",
    "duties on",
    "import",
    "imports",
    "importing",
    "export",
    "exports",
    "exporting",
];

fn has_cue(lower_text: &str, cues: &[&str], target: &str) -> bool {
    cues.iter()
        .any(|cue| lower_text.contains(&format!("{} {}", cue, target)))
}

/// Gazetteer lookup with alias canonicalization.
pub struct CountryRule;

impl ExtractionRule for CountryRule {
    fn name(&self) -> &str {
        "country"
    }

    fn extract(&self, text: &str) -> Result<Vec<Entity>, ExtractionError> {
        let lower = text.to_lowercase();
        let mut found = Vec::new();
        for m in COUNTRY.find_iter(text) {
            let matched = m.as_str().to_lowercase();
            let Some(canonical) = canonical_country(&matched) else {
                return Err(ExtractionError::RuleFailed {
                    rule: self.name().to_string(),
                    message: format!("no canonical name for '{}'", m.as_str()),
                });
            };
            let mut confidence = 0.8;
            if has_cue(&lower, &COUNTRY_CUES, &matched) {
                confidence += 0.15;
            }
            if matched.chars().count() > 5 {
                confidence += 0.05;
            }
            found.push(Entity::new(EntityType::Country, canonical, confidence));
        }
        Ok(found)
    }
}

pub struct ProductRule;

impl ExtractionRule for ProductRule {
    fn name(&self) -> &str {
        "product"
    }

    fn extract(&self, text: &str) -> Result<Vec<Entity>, ExtractionError> {
        let lower = text.to_lowercase();
        Ok(PRODUCT
            .find_iter(text)
            .map(|m| {
                let product = m.as_str().to_lowercase();
                let mut confidence = 0.7;
                if has_cue(&lower, &PRODUCT_CUES, &product) {
                    confidence += 0.2;
                }
                Entity::new(EntityType::Product, product, confidence)
            })
            .collect())
    }
}

pub struct HsCodeRule;

impl ExtractionRule for HsCodeRule {
    fn name(&self) -> &str {
        "hs_code"
    }

    fn extract(&self, text: &str) -> Result<Vec<Entity>, ExtractionError> {
        Ok(HS_CODE
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|code| Entity::new(EntityType::HsCode, code.as_str(), 0.95))
            .collect())
    }
}

pub struct MonetaryRule;

impl ExtractionRule for MonetaryRule {
    fn name(&self) -> &str {
        "monetary_amount"
    }

    fn extract(&self, text: &str) -> Result<Vec<Entity>, ExtractionError> {
        Ok(MONETARY
            .find_iter(text)
            .map(|m| Entity::new(EntityType::MonetaryAmount, m.as_str().trim(), 0.9))
            .collect())
    }
}

pub struct PercentageRule;

impl ExtractionRule for PercentageRule {
    fn name(&self) -> &str {
        "percentage"
    }

    fn extract(&self, text: &str) -> Result<Vec<Entity>, ExtractionError> {
        Ok(PERCENTAGE
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|value| Entity::new(EntityType::Percentage, format!("{}%", value.as_str()), 0.85))
            .collect())
    }
}

pub struct QuantityRule;

impl ExtractionRule for QuantityRule {
    fn name(&self) -> &str {
        "quantity"
    }

    fn extract(&self, text: &str) -> Result<Vec<Entity>, ExtractionError> {
        Ok(QUANTITY
            .captures_iter(text)
            .filter_map(|caps| Some(format!("{} {}", caps.get(1)?.as_str(), caps.get(2)?.as_str())))
            .map(|value| Entity::new(EntityType::Quantity, value.to_lowercase(), 0.8))
            .collect())
    }
}

/// Parse a monetary entity value ("$1,500.00", "2000 euros") into a number.
pub fn parse_amount(value: &str) -> Option<f64> {
    let digits: String = value
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .filter(|c| *c != ',')
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenRule;

    impl ExtractionRule for BrokenRule {
        fn name(&self) -> &str {
            "broken"
        }

        fn extract(&self, _text: &str) -> Result<Vec<Entity>, ExtractionError> {
            Err(ExtractionError::RuleFailed {
                rule: "broken".to_string(),
                message: "boom".to_string(),
            })
        }
    }

    fn find<'a>(entities: &'a [Entity], t: EntityType, value: &str) -> Option<&'a Entity> {
        entities.iter().find(|e| e.is_type(t) && e.value == value)
    }

    #[test]
    fn test_tariff_query_entities() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract(
            "What's the tariff for importing steel from China to United States?",
            &[],
        );

        let china = find(&entities, EntityType::Country, "China").unwrap();
        assert!((china.confidence() - 0.8).abs() < 1e-9);
        let us = find(&entities, EntityType::Country, "United States").unwrap();
        assert!((us.confidence() - 0.85).abs() < 1e-9);
        let steel = find(&entities, EntityType::Product, "steel").unwrap();
        assert!((steel.confidence() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_country_cue_raises_confidence() {
        let entities = EntityExtractor::new().extract("We import from Japan", &[]);
        let japan = find(&entities, EntityType::Country, "Japan").unwrap();
        assert!((japan.confidence() - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_aliases_collapse_to_one_country() {
        let entities = EntityExtractor::new().extract("USA or America?", &[]);
        let countries: Vec<_> = entities
            .iter()
            .filter(|e| e.is_type(EntityType::Country))
            .collect();
        assert_eq!(countries.len(), 1);
        assert_eq!(countries[0].value, "United States");
    }

    #[test]
    fn test_numeric_entities() {
        let entities = EntityExtractor::new().extract(
            "Ship 500 tons worth $1,500.00 under HS code: 7208 at 25% or 8703.23.01",
            &[],
        );

        assert!(find(&entities, EntityType::Quantity, "500 tons").is_some());
        assert!(find(&entities, EntityType::MonetaryAmount, "$1,500.00").is_some());
        assert!(find(&entities, EntityType::HsCode, "7208").is_some());
        assert!(find(&entities, EntityType::HsCode, "8703.23.01").is_some());
        assert!(find(&entities, EntityType::Percentage, "25%").is_some());
    }

    #[test]
    fn test_output_is_ranked_and_bounded() {
        let entities = EntityExtractor::new().extract(
            "hs code 8703 cars from Germany costing 2000 euros, 10% duty",
            &[],
        );
        assert!(
            entities
                .windows(2)
                .all(|w| w[0].confidence() >= w[1].confidence())
        );
        assert!(
            entities
                .iter()
                .all(|e| (0.0..=1.0).contains(&e.confidence()))
        );
        assert_eq!(entities[0].entity_type, EntityType::HsCode);
    }

    #[test]
    fn test_failing_rule_is_skipped() {
        let extractor = EntityExtractor::empty()
            .with_rule(BrokenRule)
            .with_rule(CountryRule);
        let entities = extractor.extract("steel from China", &[]);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].value, "China");
    }

    #[test]
    fn test_context_entities_are_added_at_fixed_confidence() {
        let prior = vec![
            ContextualEntity::new("product", "lumber", 0.8),
            ContextualEntity::new("concept", "tariff", 0.9),
        ];
        let entities = EntityExtractor::new().extract("and the rate for that?", &prior);

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].value, "lumber");
        assert!((entities[0].confidence() - CONTEXT_ENTITY_CONFIDENCE).abs() < 1e-9);
    }

    #[test]
    fn test_fresh_mention_beats_context_confidence() {
        let prior = vec![ContextualEntity::new("country", "China", 0.8)];
        let entities = EntityExtractor::new().extract("trade with China", &prior);
        let china = find(&entities, EntityType::Country, "China").unwrap();
        assert!((china.confidence() - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,500.00"), Some(1500.0));
        assert_eq!(parse_amount("2000 euros"), Some(2000.0));
        assert_eq!(parse_amount("euros"), None);
    }
}
