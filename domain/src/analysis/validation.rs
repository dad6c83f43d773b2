//! Completeness validation and multi-part decomposition (advanced mode).

use crate::query::analysis::QueryValidation;
use crate::query::entity::{Entity, EntityType, count_of};
use crate::query::patterns::{COMPARISON, SEGMENT_SPLIT, TARIFF_KEYWORD};

/// Check whether a query carries what its kind of question needs.
///
/// Tariff questions need a country and a product (or HS code); comparisons
/// need at least two countries. The completeness score starts at 1, loses 0.2
/// per missing element, gains up to 0.3 for entities and 0.1 for each length
/// band past 50 and 100 characters, and is clamped to `[0, 1]`.
pub fn validate_completeness(text: &str, entities: &[Entity]) -> QueryValidation {
    let mut missing = Vec::new();
    let mut suggestions = Vec::new();

    let countries = count_of(entities, EntityType::Country);
    let products =
        count_of(entities, EntityType::Product) + count_of(entities, EntityType::HsCode);

    if TARIFF_KEYWORD.is_match(text) {
        if countries == 0 {
            missing.push("country".to_string());
            suggestions
                .push("Specify the country you're importing from or exporting to".to_string());
        }
        if products == 0 {
            missing.push("product".to_string());
            suggestions.push("Specify the product or HS code you're interested in".to_string());
        }
    }

    if COMPARISON.is_match(text) && countries < 2 {
        missing.push("comparison_targets".to_string());
        suggestions.push("Specify at least two countries or options to compare".to_string());
    }

    let length = text.chars().count();
    let mut score = 1.0 - 0.2 * missing.len() as f64;
    score += (0.1 * entities.len() as f64).min(0.3);
    if length > 50 {
        score += 0.1;
    }
    if length > 100 {
        score += 0.1;
    }

    QueryValidation {
        complete: missing.is_empty(),
        completeness_score: score.clamp(0.0, 1.0),
        missing_elements: missing,
        suggestions,
    }
}

/// Split a multi-part question into its parts.
///
/// Splits on and/or/also/additionally/furthermore/moreover and keeps
/// fragments longer than ten characters. When fewer than two fragments
/// survive, the whole query is returned as the single part.
pub fn decompose(text: &str) -> Vec<String> {
    let parts: Vec<String> = SEGMENT_SPLIT
        .split(text)
        .map(|part| part.trim().trim_matches(|c: char| c == ',' || c == ';').trim())
        .filter(|part| part.chars().count() > 10)
        .map(str::to_string)
        .collect();

    if parts.len() <= 1 {
        vec![text.to_string()]
    } else {
        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tariff_query_without_route() {
        let v = validate_completeness("What is the tariff?", &[]);
        assert!(!v.complete);
        assert_eq!(v.missing_elements, vec!["country", "product"]);
        assert_eq!(v.suggestions.len(), 2);
        assert!((v.completeness_score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_hs_code_counts_as_product() {
        let entities = vec![
            Entity::new(EntityType::Country, "Japan", 0.8),
            Entity::new(EntityType::HsCode, "8703", 0.95),
        ];
        let v = validate_completeness("tariff for hs code 8703 from Japan", &entities);
        assert!(v.complete);
        assert_eq!(v.completeness_score, 1.0);
    }

    #[test]
    fn test_comparison_needs_two_targets() {
        let entities = vec![Entity::new(EntityType::Country, "China", 0.8)];
        let v = validate_completeness("compare China", &entities);
        assert_eq!(v.missing_elements, vec!["comparison_targets"]);
        assert_eq!(
            v.suggestions,
            vec!["Specify at least two countries or options to compare"]
        );
    }

    #[test]
    fn test_score_is_clamped() {
        let v = validate_completeness("compare tariff", &[]);
        assert_eq!(v.missing_elements.len(), 3);
        assert!((0.0..=1.0).contains(&v.completeness_score));
    }

    #[test]
    fn test_decompose_multi_part() {
        let parts = decompose(
            "What is the duty on steel from China and what permits do I need for Japan",
        );
        assert_eq!(
            parts,
            vec![
                "What is the duty on steel from China",
                "what permits do I need for Japan"
            ]
        );
    }

    #[test]
    fn test_decompose_drops_short_fragments() {
        let query = "steel and cars from Germany";
        assert_eq!(decompose(query), vec![query]);
    }
}
