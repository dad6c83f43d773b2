//! Typed entities recognised in a trade query.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Kind of span the extractor can recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Country,
    Product,
    HsCode,
    MonetaryAmount,
    Percentage,
    Quantity,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Country => "country",
            EntityType::Product => "product",
            EntityType::HsCode => "hs_code",
            EntityType::MonetaryAmount => "monetary_amount",
            EntityType::Percentage => "percentage",
            EntityType::Quantity => "quantity",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EntityType::Country => "Country",
            EntityType::Product => "Product",
            EntityType::HsCode => "HS Code",
            EntityType::MonetaryAmount => "Monetary Amount",
            EntityType::Percentage => "Percentage",
            EntityType::Quantity => "Quantity",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "country" => Ok(EntityType::Country),
            "product" => Ok(EntityType::Product),
            "hs_code" | "hscode" => Ok(EntityType::HsCode),
            "monetary_amount" | "money" => Ok(EntityType::MonetaryAmount),
            "percentage" | "percent" => Ok(EntityType::Percentage),
            "quantity" => Ok(EntityType::Quantity),
            _ => Err(DomainError::InvalidEntityType(s.to_string())),
        }
    }
}

/// A typed span with a confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_type: EntityType,
    pub value: String,
    confidence: f64,
}

impl Entity {
    /// Create an entity; confidence is clamped to `[0, 1]` (NaN becomes 0).
    pub fn new(entity_type: EntityType, value: impl Into<String>, confidence: f64) -> Self {
        Self {
            entity_type,
            value: value.into(),
            confidence: clamp_confidence(confidence),
        }
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn is_high_confidence(&self) -> bool {
        self.confidence >= 0.8
    }

    /// Key used for deduplication: type plus case-folded value.
    pub fn dedup_key(&self) -> (EntityType, String) {
        (self.entity_type, self.value.to_lowercase())
    }

    pub fn is_type(&self, entity_type: EntityType) -> bool {
        self.entity_type == entity_type
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} ({:.2})",
            self.entity_type.display_name(),
            self.value,
            self.confidence
        )
    }
}

fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Collapse duplicates (same type and case-insensitive value) keeping the
/// highest confidence, then order by descending confidence.
///
/// Equal confidences keep first-seen order so output is deterministic.
pub fn dedupe_and_rank(entities: Vec<Entity>) -> Vec<Entity> {
    let mut index: HashMap<(EntityType, String), usize> = HashMap::new();
    let mut kept: Vec<Entity> = Vec::with_capacity(entities.len());

    for entity in entities {
        match index.get(&entity.dedup_key()) {
            Some(&pos) => {
                if entity.confidence > kept[pos].confidence {
                    kept[pos] = entity;
                }
            }
            None => {
                index.insert(entity.dedup_key(), kept.len());
                kept.push(entity);
            }
        }
    }

    kept.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    kept
}

/// Number of entities of the given type.
pub fn count_of(entities: &[Entity], entity_type: EntityType) -> usize {
    entities.iter().filter(|e| e.is_type(entity_type)).count()
}

/// Values of the given type, in ranking order.
pub fn values_of(entities: &[Entity], entity_type: EntityType) -> Vec<&str> {
    entities
        .iter()
        .filter(|e| e.is_type(entity_type))
        .map(|e| e.value.as_str())
        .collect()
}
