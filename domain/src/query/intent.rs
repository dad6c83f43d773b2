//! Query intents.

use crate::agent::agent_type::AgentType;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What the user is asking for.
///
/// Declaration order of the first eight variants is significant: it breaks
/// ties when two intents score the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    Comparison,
    CostAnalysis,
    ComplianceCheck,
    RiskAssessment,
    MarketAnalysis,
    Optimization,
    TariffLookup,
    ProductClassification,
    GeneralInquiry,
}

impl QueryIntent {
    /// Every intent that can be scored, in tie-break order.
    pub const SCORED: [QueryIntent; 8] = [
        QueryIntent::Comparison,
        QueryIntent::CostAnalysis,
        QueryIntent::ComplianceCheck,
        QueryIntent::RiskAssessment,
        QueryIntent::MarketAnalysis,
        QueryIntent::Optimization,
        QueryIntent::TariffLookup,
        QueryIntent::ProductClassification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryIntent::Comparison => "comparison",
            QueryIntent::CostAnalysis => "cost_analysis",
            QueryIntent::ComplianceCheck => "compliance_check",
            QueryIntent::RiskAssessment => "risk_assessment",
            QueryIntent::MarketAnalysis => "market_analysis",
            QueryIntent::Optimization => "optimization",
            QueryIntent::TariffLookup => "tariff_lookup",
            QueryIntent::ProductClassification => "product_classification",
            QueryIntent::GeneralInquiry => "general_inquiry",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            QueryIntent::Comparison => "Compare options, countries or products",
            QueryIntent::CostAnalysis => "Calculate costs and landed prices",
            QueryIntent::ComplianceCheck => "Check regulatory and documentation requirements",
            QueryIntent::RiskAssessment => "Assess trade risks and exposure",
            QueryIntent::MarketAnalysis => "Analyze market trends and demand",
            QueryIntent::Optimization => "Recommend an optimal trade strategy",
            QueryIntent::TariffLookup => "Look up tariff and duty rates",
            QueryIntent::ProductClassification => "Classify a product under the HS",
            QueryIntent::GeneralInquiry => "General trade question",
        }
    }

    /// The agent that primarily serves this intent.
    pub fn agent(&self) -> AgentType {
        match self {
            QueryIntent::TariffLookup
            | QueryIntent::CostAnalysis
            | QueryIntent::ProductClassification
            | QueryIntent::GeneralInquiry => AgentType::TariffAnalysis,
            QueryIntent::ComplianceCheck => AgentType::Compliance,
            QueryIntent::RiskAssessment => AgentType::RiskAssessment,
            QueryIntent::MarketAnalysis => AgentType::MarketIntelligence,
            QueryIntent::Optimization | QueryIntent::Comparison => AgentType::Optimization,
        }
    }

    pub fn requires_data_analysis(&self) -> bool {
        matches!(
            self,
            QueryIntent::Comparison
                | QueryIntent::CostAnalysis
                | QueryIntent::RiskAssessment
                | QueryIntent::MarketAnalysis
                | QueryIntent::Optimization
        )
    }

    pub fn requires_external_data(&self) -> bool {
        matches!(
            self,
            QueryIntent::TariffLookup
                | QueryIntent::ComplianceCheck
                | QueryIntent::MarketAnalysis
                | QueryIntent::RiskAssessment
        )
    }

    pub fn involves_calculations(&self) -> bool {
        matches!(
            self,
            QueryIntent::CostAnalysis | QueryIntent::Comparison | QueryIntent::Optimization
        )
    }
}

impl std::fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QueryIntent {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        QueryIntent::SCORED
            .iter()
            .chain(std::iter::once(&QueryIntent::GeneralInquiry))
            .find(|intent| intent.as_str() == normalized)
            .copied()
            .ok_or_else(|| DomainError::InvalidIntent(s.to_string()))
    }
}
