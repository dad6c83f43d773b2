//! Complexity tiers and the score thresholds that select them.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Coarse complexity of a query; drives step timeouts and duration estimates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityTier {
    #[default]
    Low,
    Medium,
    High,
}

impl ComplexityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityTier::Low => "low",
            ComplexityTier::Medium => "medium",
            ComplexityTier::High => "high",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ComplexityTier::Low => "Simple lookup",
            ComplexityTier::Medium => "Multi-step analysis",
            ComplexityTier::High => "Complex multi-agent analysis",
        }
    }

    pub fn timeout_seconds(&self) -> u64 {
        match self {
            ComplexityTier::Low => 30,
            ComplexityTier::Medium => 60,
            ComplexityTier::High => 120,
        }
    }

    /// Per-step deadline for plans of this tier.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds())
    }

    /// Multiplier applied to base step durations.
    pub fn resource_multiplier(&self) -> u32 {
        match self {
            ComplexityTier::Low => 1,
            ComplexityTier::Medium => 2,
            ComplexityTier::High => 3,
        }
    }

    pub fn requires_multi_agent(&self) -> bool {
        *self != ComplexityTier::Low
    }
}

impl std::fmt::Display for ComplexityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Score cut points: `score >= high` is HIGH, `score >= medium` is MEDIUM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityThresholds {
    pub medium: u32,
    pub high: u32,
}

impl ComplexityThresholds {
    /// Cut points 3 / 6.
    pub const STANDARD: Self = Self { medium: 3, high: 6 };
    /// Cut points 4 / 8.
    pub const STRICT: Self = Self { medium: 4, high: 8 };

    pub fn new(medium: u32, high: u32) -> Result<Self, DomainError> {
        let thresholds = Self { medium, high };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.medium == 0 || self.medium >= self.high {
            return Err(DomainError::InvalidThresholds {
                medium: self.medium,
                high: self.high,
            });
        }
        Ok(())
    }

    pub fn tier_for(&self, score: u32) -> ComplexityTier {
        if score >= self.high {
            ComplexityTier::High
        } else if score >= self.medium {
            ComplexityTier::Medium
        } else {
            ComplexityTier::Low
        }
    }
}

impl Default for ComplexityThresholds {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl FromStr for ComplexityThresholds {
    type Err = DomainError;

    /// Parse a preset name (`standard`, `strict`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "default" => Ok(Self::STANDARD),
            "strict" => Ok(Self::STRICT),
            _ => Err(DomainError::InvalidOption {
                field: "complexity_preset",
                value: s.to_string(),
            }),
        }
    }
}
