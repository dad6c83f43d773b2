//! Rule-based specialized agents
//!
//! Each [`Agent`] answers one kind of sub-question from static rule tables.
//! The [`AgentRegistry`] routes plan steps to them and implements the
//! application's [`AgentExecutorPort`](tradedesk_application::AgentExecutorPort).
//!
//! | Agent | Data source |
//! |-------|-------------|
//! | [`TariffAgent`] | [`TariffTable`] (built-in entries plus `[agents]` config) |
//! | [`ComplianceAgent`] | document checklists per destination and product |
//! | [`RiskAgent`] | country risk scores |
//! | [`MarketAgent`] | product market profiles |
//! | [`OptimizationAgent`] | upstream tariff (and market) results |

mod compliance;
mod market;
mod optimization;
mod registry;
mod risk;
mod tariff;

pub use compliance::ComplianceAgent;
pub use market::MarketAgent;
pub use optimization::OptimizationAgent;
pub use registry::AgentRegistry;
pub use risk::RiskAgent;
pub use tariff::{TariffAgent, TariffRate, TariffTable};

use async_trait::async_trait;
use tradedesk_application::AgentError;
use tradedesk_domain::query::patterns::{COUNTRY, PRODUCT_KEYWORDS, canonical_country};
use tradedesk_domain::{AgentOutput, AgentRequest, AgentType, Entity, EntityType};

/// A specialized agent
#[async_trait]
pub trait Agent: Send + Sync {
    fn agent_type(&self) -> AgentType;

    async fn execute(&self, request: &AgentRequest) -> Result<AgentOutput, AgentError>;
}

/// Origin and destination countries of a trade question.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Route {
    pub origins: Vec<String>,
    pub destination: Option<String>,
}

impl Route {
    /// A country directly after "to" or "into" is the destination; every
    /// other country is an origin.
    pub fn from_query(query: &str, entities: &[Entity]) -> Self {
        let mut destination = None;
        for m in COUNTRY.find_iter(query) {
            let before = query[..m.start()].trim_end().to_lowercase();
            if (before.ends_with(" to") || before.ends_with(" into") || before == "to")
                && let Some(name) = canonical_country(m.as_str())
            {
                destination = Some(name.to_string());
            }
        }

        let mut origins: Vec<String> = Vec::new();
        for entity in entities.iter().filter(|e| e.is_type(EntityType::Country)) {
            let is_destination = destination.as_deref() == Some(entity.value.as_str());
            if !is_destination && !origins.contains(&entity.value) {
                origins.push(entity.value.clone());
            }
        }

        Self {
            origins,
            destination,
        }
    }

    pub fn destination_or_default(&self) -> &str {
        self.destination.as_deref().unwrap_or("United States")
    }
}

/// Singular table key for a product mention ("electronics" → "electronic").
pub(crate) fn product_key(value: &str) -> String {
    let lower = value.trim().to_lowercase();
    match lower.strip_suffix('s') {
        Some(stem) if PRODUCT_KEYWORDS.contains(&stem) => stem.to_string(),
        _ => lower,
    }
}

/// Distinct product keys among the entities, in entity order.
pub(crate) fn products(entities: &[Entity]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for entity in entities.iter().filter(|e| e.is_type(EntityType::Product)) {
        let key = product_key(&entity.value);
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    fn country(name: &str) -> Entity {
        Entity::new(EntityType::Country, name, 0.9)
    }

    #[test]
    fn test_route_splits_origin_and_destination() {
        let route = Route::from_query(
            "What's the tariff for importing steel from China to USA?",
            &[country("China"), country("United States")],
        );
        assert_eq!(route.origins, vec!["China".to_string()]);
        assert_eq!(route.destination.as_deref(), Some("United States"));
    }

    #[test]
    fn test_route_without_destination_cue() {
        let route = Route::from_query(
            "Compare the tariffs on electronics from China versus Germany",
            &[country("China"), country("Germany")],
        );
        assert_eq!(route.origins.len(), 2);
        assert!(route.destination.is_none());
        assert_eq!(route.destination_or_default(), "United States");
    }

    #[test]
    fn test_product_keys_are_singular() {
        assert_eq!(product_key("Electronics"), "electronic");
        assert_eq!(product_key("steel"), "steel");
        assert_eq!(product_key("gas"), "gas");
        assert_eq!(product_key("medical devices"), "medical device");
    }
}
