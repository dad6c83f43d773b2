//! Resolving references to earlier turns of a conversation.
//!
//! Two sources feed the referenced-entity list of a query:
//! 1. Explicit references such as "the steel we discussed", resolved against
//!    entities recorded on earlier messages (newest first)
//! 2. Direct mentions of countries and products in the query itself

use super::entities::{ContextualEntity, ContextualMessage};
use crate::query::entity::EntityType;
use crate::query::patterns::{
    COUNTRY, DISCUSSED_REFERENCE, PRODUCT, TARIFF_KEYWORD, canonical_country,
};
use regex::Regex;
use std::sync::LazyLock;

/// Confidence for countries and products mentioned directly.
pub const DIRECT_MENTION_CONFIDENCE: f64 = 0.8;
/// Confidence for concept entities ("tariff", "trade_agreement").
pub const CONCEPT_CONFIDENCE: f64 = 0.9;

static AGREEMENT_CONCEPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(agreements?|trade deals?)\b").unwrap_or_else(|e| panic!("{e}"))
});

/// Entities a later turn may refer back to, found in one message.
pub fn entities_in_message(content: &str) -> Vec<ContextualEntity> {
    let mut entities = direct_mentions(content);
    if TARIFF_KEYWORD.is_match(content) {
        entities.push(ContextualEntity::new("concept", "tariff", CONCEPT_CONFIDENCE));
    }
    if AGREEMENT_CONCEPT.is_match(content) {
        entities.push(ContextualEntity::new(
            "concept",
            "trade_agreement",
            CONCEPT_CONFIDENCE,
        ));
    }
    entities
}

/// Entities the query refers to, explicitly or by direct mention.
///
/// The result holds each `(kind, value)` pair once.
pub fn extract_references(query: &str, history: &[ContextualMessage]) -> Vec<ContextualEntity> {
    let mut found: Vec<ContextualEntity> = Vec::new();

    for caps in DISCUSSED_REFERENCE.captures_iter(query) {
        let Some(phrase) = caps.get(1) else {
            continue;
        };
        if let Some(entity) = find_in_history(phrase.as_str(), history) {
            push_unique(&mut found, entity);
        }
    }

    for entity in direct_mentions(query) {
        push_unique(&mut found, entity);
    }

    found
}

fn direct_mentions(text: &str) -> Vec<ContextualEntity> {
    let countries = COUNTRY.find_iter(text).filter_map(|m| {
        canonical_country(m.as_str()).map(|name| {
            ContextualEntity::new(
                EntityType::Country.as_str(),
                name,
                DIRECT_MENTION_CONFIDENCE,
            )
        })
    });
    let products = PRODUCT.find_iter(text).map(|m| {
        ContextualEntity::new(
            EntityType::Product.as_str(),
            m.as_str().to_lowercase(),
            DIRECT_MENTION_CONFIDENCE,
        )
    });

    let mut entities = Vec::new();
    for entity in countries.chain(products) {
        push_unique(&mut entities, entity);
    }
    entities
}

/// Newest message first; a phrase matches an entity whose value it contains
/// or which contains it.
fn find_in_history(phrase: &str, history: &[ContextualMessage]) -> Option<ContextualEntity> {
    let phrase = phrase.to_lowercase();
    history.iter().rev().find_map(|message| {
        message
            .entities
            .iter()
            .find(|entity| {
                let value = entity.value.to_lowercase();
                phrase.contains(&value) || value.contains(&phrase)
            })
            .cloned()
    })
}

fn push_unique(entities: &mut Vec<ContextualEntity>, entity: ContextualEntity) {
    match entities
        .iter_mut()
        .find(|existing| existing.matches(&entity.kind, &entity.value))
    {
        Some(existing) => existing.record_mention(),
        None => entities.push(entity),
    }
}
