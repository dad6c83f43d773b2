//! Specialized agents a plan can invoke.

use crate::core::error::DomainError;
use crate::query::intent::QueryIntent;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    TariffAnalysis,
    Compliance,
    RiskAssessment,
    MarketIntelligence,
    Optimization,
}

impl AgentType {
    /// All agents, in synthesis priority order.
    pub const ALL: [AgentType; 5] = [
        AgentType::TariffAnalysis,
        AgentType::Compliance,
        AgentType::RiskAssessment,
        AgentType::MarketIntelligence,
        AgentType::Optimization,
    ];

    /// Stable identifier used in results and `tools_used`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::TariffAnalysis => "tariff_analysis",
            AgentType::Compliance => "compliance",
            AgentType::RiskAssessment => "risk_assessment",
            AgentType::MarketIntelligence => "market_intelligence",
            AgentType::Optimization => "optimization",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AgentType::TariffAnalysis => "Tariff Analysis Agent",
            AgentType::Compliance => "Compliance Agent",
            AgentType::RiskAssessment => "Risk Assessment Agent",
            AgentType::MarketIntelligence => "Market Intelligence Agent",
            AgentType::Optimization => "Optimization Agent",
        }
    }

    /// Step description used when the agent is planned.
    pub fn description(&self) -> &'static str {
        match self {
            AgentType::TariffAnalysis => "Analyze tariff rates and trade costs",
            AgentType::Compliance => "Check regulatory compliance requirements",
            AgentType::RiskAssessment => "Assess trade risks and vulnerabilities",
            AgentType::MarketIntelligence => "Analyze market trends and opportunities",
            AgentType::Optimization => "Optimize trade strategy and recommendations",
        }
    }

    /// Estimated step duration before the complexity multiplier.
    pub fn base_duration_seconds(&self) -> u32 {
        match self {
            AgentType::TariffAnalysis => 5,
            AgentType::Compliance => 8,
            AgentType::RiskAssessment => 10,
            AgentType::MarketIntelligence => 12,
            AgentType::Optimization => 15,
        }
    }

    /// The intent this agent is the canonical answer for.
    pub fn canonical_intent(&self) -> QueryIntent {
        match self {
            AgentType::TariffAnalysis => QueryIntent::TariffLookup,
            AgentType::Compliance => QueryIntent::ComplianceCheck,
            AgentType::RiskAssessment => QueryIntent::RiskAssessment,
            AgentType::MarketIntelligence => QueryIntent::MarketAnalysis,
            AgentType::Optimization => QueryIntent::Optimization,
        }
    }

    pub fn requires_external_data(&self) -> bool {
        matches!(
            self,
            AgentType::TariffAnalysis | AgentType::Compliance | AgentType::MarketIntelligence
        )
    }

    pub fn performs_calculations(&self) -> bool {
        matches!(self, AgentType::TariffAnalysis | AgentType::Optimization)
    }

    /// Position in synthesis output; lower comes first.
    pub fn priority(&self) -> usize {
        Self::ALL.iter().position(|a| a == self).unwrap_or(Self::ALL.len())
    }
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for AgentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "tariff" | "tariff_analysis" => Ok(AgentType::TariffAnalysis),
            "compliance" => Ok(AgentType::Compliance),
            "risk" | "risk_assessment" => Ok(AgentType::RiskAssessment),
            "market" | "market_intelligence" => Ok(AgentType::MarketIntelligence),
            "optimization" | "optimisation" => Ok(AgentType::Optimization),
            _ => Err(DomainError::InvalidAgentType(s.to_string())),
        }
    }
}
