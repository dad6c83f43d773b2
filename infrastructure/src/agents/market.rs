//! Product market profiles.

use super::{Agent, Route, products};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tradedesk_application::AgentError;
use tradedesk_domain::{AgentOutput, AgentRequest, AgentType};

#[derive(Debug, Clone, PartialEq, Serialize)]
struct MarketProfile {
    product: String,
    /// Year-over-year import volume growth in percent
    growth: f64,
    outlook: &'static str,
    leading_suppliers: &'static [&'static str],
    seasonality: &'static str,
}

fn profile(product: &str) -> MarketProfile {
    let (growth, outlook, leading_suppliers, seasonality): (f64, _, &'static [&'static str], _) =
        match product {
            "electronic" | "smartphone" | "computer" => (
                4.5,
                "Steady demand; sourcing shifting from China toward Vietnam and Mexico",
                &["China", "Vietnam", "Mexico", "Taiwan"],
                "Peaks ahead of Q4 holiday season",
            ),
            "semiconductor" => (
                9.0,
                "Strong growth driven by data center and automotive demand",
                &["Taiwan", "South Korea", "Japan", "Singapore"],
                "Largely non-seasonal",
            ),
            "steel" | "aluminum" => (
                -1.5,
                "Flat to declining imports under Section 232 measures",
                &["Canada", "Mexico", "Brazil", "South Korea"],
                "Construction-driven spring and summer peaks",
            ),
            "vehicle" | "car" | "automobile" => (
                2.0,
                "Electric vehicle share rising; supply chains regionalizing",
                &["Mexico", "Japan", "Canada", "South Korea", "Germany"],
                "Model-year changeover in late summer",
            ),
            "textile" | "clothing" => (
                1.0,
                "Price-sensitive market diversifying away from single sources",
                &["China", "Vietnam", "India", "Bangladesh"],
                "Spring and fall collection cycles",
            ),
            "solar panel" => (
                12.0,
                "Rapid growth with heavy trade-remedy exposure",
                &["Vietnam", "Malaysia", "Thailand", "India"],
                "Installation season drives Q2 and Q3 orders",
            ),
            "furniture" => (
                0.5,
                "Demand tracks housing activity",
                &["Vietnam", "China", "Mexico", "Italy"],
                "Moderate Q4 peak",
            ),
            "food" | "beverage" => (
                3.0,
                "Stable demand with strict regulatory oversight",
                &["Mexico", "Canada", "Italy", "France"],
                "Harvest-dependent",
            ),
            _ => (
                2.5,
                "Market data is limited; trends follow overall import growth",
                &[],
                "No pronounced seasonality",
            ),
        };

    MarketProfile {
        product: product.to_string(),
        growth,
        outlook,
        leading_suppliers,
        seasonality,
    }
}

/// Summarizes demand trends and leading suppliers per product.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarketAgent;

impl MarketAgent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Agent for MarketAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::MarketIntelligence
    }

    async fn execute(&self, request: &AgentRequest) -> Result<AgentOutput, AgentError> {
        let entities = request.entities();
        let route = Route::from_query(request.query(), &entities);
        let mut keys = products(&entities);
        if keys.is_empty() {
            keys.push("general goods".to_string());
        }
        let profiles: Vec<MarketProfile> = keys.iter().map(|k| profile(k)).collect();

        let mut lines = vec![format!(
            "Market intelligence for {}:",
            route.destination_or_default()
        )];
        let mut insights = Vec::new();
        for p in &profiles {
            lines.push(format!("- {}: {:+.1}% import growth. {}", p.product, p.growth, p.outlook));
            if !p.leading_suppliers.is_empty() {
                lines.push(format!("  Leading suppliers: {}", p.leading_suppliers.join(", ")));
            }
            lines.push(format!("  Seasonality: {}", p.seasonality));

            for origin in &route.origins {
                if p.leading_suppliers.contains(&origin.as_str()) {
                    insights.push(format!("{} is a leading supplier of {}", origin, p.product));
                }
            }
            if p.growth >= 5.0 {
                insights.push(format!("{} is a high-growth market", p.product));
            } else if p.growth < 0.0 {
                insights.push(format!("{} imports are contracting", p.product));
            }
        }

        Ok(AgentOutput::success(lines.join("\n"))
            .with_insights(insights)
            .with_data(json!({ "products": profiles })))
    }
}
