//! Country risk scoring.
//!
//! Five categories are scored 0-100 per origin and averaged across origins,
//! then weighted into an overall score:
//!
//! | Category | Weight |
//! |----------|--------|
//! | Political | 0.25 |
//! | Economic | 0.25 |
//! | Supply chain | 0.20 |
//! | Financial | 0.15 |
//! | Force majeure | 0.15 |

use super::{Agent, Route};
use async_trait::async_trait;
use serde_json::json;
use tradedesk_application::AgentError;
use tradedesk_domain::analysis::extractor::parse_amount;
use tradedesk_domain::query::entity::values_of;
use tradedesk_domain::{AgentOutput, AgentRequest, AgentType, EntityType};

const HIGH_VALUE_TRADE: f64 = 1_000_000.0;

fn political(country: &str) -> u32 {
    match country {
        "China" | "Russia" | "Iran" | "Venezuela" => 70,
        "Turkey" | "Brazil" | "India" | "South Africa" => 50,
        "United States" | "Canada" | "United Kingdom" | "Germany" | "Japan" | "Australia" => 20,
        _ => 40,
    }
}

fn economic(country: &str) -> u32 {
    match country {
        "Venezuela" | "Argentina" | "Turkey" => 80,
        "Brazil" | "India" | "South Africa" | "Russia" => 60,
        "China" | "Mexico" | "South Korea" => 40,
        "United States" | "Canada" | "United Kingdom" | "Germany" | "Japan" | "Australia" => 25,
        _ => 45,
    }
}

fn financial(country: &str) -> u32 {
    match country {
        "Venezuela" | "Argentina" | "Iran" => 85,
        "Turkey" | "Brazil" | "Russia" => 65,
        "India" | "South Africa" | "Mexico" => 45,
        "China" | "South Korea" => 35,
        "United States" | "Canada" | "United Kingdom" | "Germany" | "Japan" | "Australia" => 20,
        _ => 50,
    }
}

fn force_majeure(country: &str) -> u32 {
    match country {
        "Japan" | "Philippines" | "Indonesia" => 70,
        "China" | "India" | "United States" => 50,
        "Canada" | "Australia" | "Brazil" => 40,
        "United Kingdom" | "Germany" | "France" => 30,
        _ => 45,
    }
}

fn region(country: &str) -> &'static str {
    match country {
        "United States" | "Canada" | "Mexico" => "North America",
        "Brazil" | "Argentina" | "Venezuela" => "South America",
        "China" | "Japan" | "South Korea" | "Taiwan" | "Vietnam" | "Singapore" | "India"
        | "Philippines" | "Indonesia" => "Asia",
        "Australia" => "Oceania",
        "South Africa" => "Africa",
        _ => "Europe",
    }
}

/// Risk band for a 0-100 score.
pub fn risk_level(score: u32) -> &'static str {
    match score {
        80.. => "CRITICAL",
        60..=79 => "HIGH",
        40..=59 => "MEDIUM",
        20..=39 => "LOW",
        _ => "MINIMAL",
    }
}

#[derive(Debug, Clone, PartialEq)]
struct RiskScores {
    political: u32,
    economic: u32,
    supply_chain: u32,
    financial: u32,
    force_majeure: u32,
}

impl RiskScores {
    fn assess(origins: &[String], trade_value: Option<f64>) -> Self {
        let average = |score: fn(&str) -> u32| -> u32 {
            let total: u32 = origins.iter().map(|o| score(o)).sum();
            total / origins.len().max(1) as u32
        };

        let mut supply_chain = 30;
        if origins.len() == 1 {
            supply_chain += 20;
        }
        let first_region = origins.first().map(|o| region(o));
        if origins.iter().all(|o| Some(region(o)) == first_region) {
            supply_chain += 15;
        }

        let mut financial_total: u32 = origins.iter().map(|o| financial(o)).sum();
        if trade_value.is_some_and(|v| v >= HIGH_VALUE_TRADE) {
            financial_total += 10;
        }

        Self {
            political: average(political),
            economic: average(economic),
            supply_chain: supply_chain.min(100),
            financial: (financial_total / origins.len().max(1) as u32).min(100),
            force_majeure: average(force_majeure),
        }
    }

    fn overall(&self) -> u32 {
        (self.political as f64 * 0.25
            + self.economic as f64 * 0.25
            + self.supply_chain as f64 * 0.2
            + self.financial as f64 * 0.15
            + self.force_majeure as f64 * 0.15) as u32
    }

    fn primary_risks(&self) -> Vec<&'static str> {
        let mut risks = Vec::new();
        if self.political >= 60 {
            risks.push("Political instability");
        }
        if self.economic >= 60 {
            risks.push("Economic volatility");
        }
        if self.supply_chain >= 60 {
            risks.push("Supply chain disruption");
        }
        if self.financial >= 60 {
            risks.push("Financial/currency risk");
        }
        if self.force_majeure >= 60 {
            risks.push("Force majeure events");
        }
        if risks.is_empty() {
            risks.push("Moderate operational risks");
        }
        risks
    }
}

/// Scores sourcing risk for the origin countries in a query.
#[derive(Debug, Default, Clone, Copy)]
pub struct RiskAgent;

impl RiskAgent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Agent for RiskAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::RiskAssessment
    }

    async fn execute(&self, request: &AgentRequest) -> Result<AgentOutput, AgentError> {
        let entities = request.entities();
        let route = Route::from_query(request.query(), &entities);
        let origins = if route.origins.is_empty() {
            route.destination.iter().cloned().collect::<Vec<_>>()
        } else {
            route.origins.clone()
        };
        if origins.is_empty() {
            return Err(AgentError::InvalidParameters(
                "no country to assess".to_string(),
            ));
        }

        let trade_value = values_of(&entities, EntityType::MonetaryAmount)
            .into_iter()
            .find_map(parse_amount);
        let scores = RiskScores::assess(&origins, trade_value);
        let overall = scores.overall();
        let level = risk_level(overall);

        let lines = [
            format!("Risk assessment for sourcing from {}:", origins.join(", ")),
            format!("Overall Risk Level: {} ({}/100)", level, overall),
            format!("- Political: {} ({})", scores.political, risk_level(scores.political)),
            format!("- Economic: {} ({})", scores.economic, risk_level(scores.economic)),
            format!(
                "- Supply chain: {} ({})",
                scores.supply_chain,
                risk_level(scores.supply_chain)
            ),
            format!("- Financial: {} ({})", scores.financial, risk_level(scores.financial)),
            format!(
                "- Force majeure: {} ({})",
                scores.force_majeure,
                risk_level(scores.force_majeure)
            ),
        ];

        let mut insights: Vec<String> = scores
            .primary_risks()
            .into_iter()
            .map(|r| format!("Primary risk: {}", r))
            .collect();
        if origins.len() == 1 {
            insights.push(format!(
                "Single-source dependency on {}; consider diversifying suppliers",
                origins[0]
            ));
        }

        Ok(AgentOutput::success(lines.join("\n"))
            .with_insights(insights)
            .with_data(json!({
                "origins": origins,
                "overall_score": overall,
                "risk_level": level,
            })))
    }
}
