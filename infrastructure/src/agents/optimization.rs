//! Sourcing recommendations built from upstream tariff results.

use super::Agent;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use tradedesk_application::AgentError;
use tradedesk_domain::analysis::extractor::parse_amount;
use tradedesk_domain::query::entity::values_of;
use tradedesk_domain::{AgentOutput, AgentRequest, AgentType, EntityType};

/// Preferential-rate partners suggested when a single origin was analyzed.
const AGREEMENT_ALTERNATIVES: [&str; 2] = ["Mexico", "Canada"];

#[derive(Debug, Clone, Deserialize)]
struct RateRow {
    country: Option<String>,
    product: Option<String>,
    rate: f64,
}

/// Ranks origins by tariff rate and recommends the cheapest.
///
/// Needs the tariff agent's result as upstream input; the planner always
/// schedules tariff analysis ahead of optimization.
#[derive(Debug, Default, Clone, Copy)]
pub struct OptimizationAgent;

impl OptimizationAgent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Agent for OptimizationAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Optimization
    }

    async fn execute(&self, request: &AgentRequest) -> Result<AgentOutput, AgentError> {
        let tariff = request
            .upstream_from(AgentType::TariffAnalysis)
            .filter(|r| r.success)
            .ok_or_else(|| AgentError::DataUnavailable("tariff results are required".to_string()))?;
        let rows: Vec<RateRow> = tariff
            .data
            .as_ref()
            .and_then(|d| d.get("rates"))
            .and_then(|rates| serde_json::from_value(rates.clone()).ok())
            .ok_or_else(|| AgentError::DataUnavailable("tariff results carry no rates".to_string()))?;
        if rows.is_empty() {
            return Err(AgentError::DataUnavailable("tariff results carry no rates".to_string()));
        }

        let mut by_product: BTreeMap<String, Vec<RateRow>> = BTreeMap::new();
        for row in rows {
            let product = row.product.clone().unwrap_or_else(|| "goods".to_string());
            by_product.entry(product).or_default().push(row);
        }

        let amount = values_of(&request.entities(), EntityType::MonetaryAmount)
            .into_iter()
            .find_map(parse_amount);

        let mut lines = vec!["Sourcing optimization:".to_string()];
        let mut insights = Vec::new();
        let mut recommendations = Vec::new();

        for (product, mut rows) in by_product {
            rows.sort_by(|a, b| a.rate.total_cmp(&b.rate));
            let best = &rows[0];
            let worst = &rows[rows.len() - 1];
            let best_origin = best.country.clone().unwrap_or_else(|| "any origin".to_string());

            lines.push(format!("Ranking for {} by tariff rate:", product));
            for (rank, row) in rows.iter().enumerate() {
                lines.push(format!(
                    "{}. {} at {:.1}%",
                    rank + 1,
                    row.country.as_deref().unwrap_or("any origin"),
                    row.rate
                ));
            }

            if rows.len() > 1 {
                lines.push(format!(
                    "Recommendation: source {} from {} to minimize duties",
                    product, best_origin
                ));
                let spread = worst.rate - best.rate;
                if let Some(amount) = amount
                    && spread > 0.0
                {
                    insights.push(format!(
                        "Sourcing {} from {} instead of {} saves about ${:.2} in duties",
                        product,
                        best_origin,
                        worst.country.as_deref().unwrap_or("any origin"),
                        amount * spread / 100.0
                    ));
                } else if spread > 0.0 {
                    insights.push(format!(
                        "{} from {} carries {:.1} points less duty than the most expensive option",
                        product, best_origin, spread
                    ));
                }
            } else {
                lines.push(format!(
                    "Only one origin analyzed; consider {} under USMCA for preferential rates",
                    AGREEMENT_ALTERNATIVES.join(" or ")
                ));
            }
            recommendations.push(json!({
                "product": product,
                "origin": best.country,
                "rate": best.rate,
            }));
        }

        if let Some(market) = request.upstream_from(AgentType::MarketIntelligence)
            && market.success
        {
            insights.extend(
                market
                    .insights
                    .iter()
                    .filter(|i| i.contains("leading supplier"))
                    .cloned(),
            );
        }

        Ok(AgentOutput::success(lines.join("\n"))
            .with_insights(insights)
            .with_data(json!({ "recommendations": recommendations })))
    }
}
