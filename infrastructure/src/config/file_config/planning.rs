//! Planning configuration from TOML (`[planning]` section)

use super::ConfigValidationError;
use serde::{Deserialize, Serialize};
use tradedesk_domain::{
    AnalysisMode, ComplexityThresholds, DependencyMode, DomainError, PlanningOptions,
};

/// Raw planning configuration from TOML
///
/// # Example
///
/// ```toml
/// [planning]
/// complexity_preset = "strict"   # or "standard"
/// high_threshold = 9             # overrides the preset's cut point
/// dependency_mode = "sequential"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePlanningConfig {
    /// Threshold preset: "standard" (3/6) or "strict" (4/8)
    pub complexity_preset: String,
    /// Explicit MEDIUM cut point, overrides the preset
    pub medium_threshold: Option<u32>,
    /// Explicit HIGH cut point, overrides the preset
    pub high_threshold: Option<u32>,
    /// "standard" or "advanced"
    pub analysis_mode: String,
    /// "data_flow" or "sequential"
    pub dependency_mode: String,
    pub max_execution_steps: usize,
    pub max_query_length: usize,
}

impl Default for FilePlanningConfig {
    fn default() -> Self {
        let options = PlanningOptions::default();
        Self {
            complexity_preset: "standard".to_string(),
            medium_threshold: None,
            high_threshold: None,
            analysis_mode: "advanced".to_string(),
            dependency_mode: "data_flow".to_string(),
            max_execution_steps: options.max_execution_steps,
            max_query_length: options.max_query_length,
        }
    }
}

impl FilePlanningConfig {
    /// Preset cut points with any explicit overrides applied.
    pub fn thresholds(&self) -> Result<ComplexityThresholds, DomainError> {
        let preset: ComplexityThresholds = self.complexity_preset.parse()?;
        ComplexityThresholds::new(
            self.medium_threshold.unwrap_or(preset.medium),
            self.high_threshold.unwrap_or(preset.high),
        )
    }

    pub fn to_planning_options(&self) -> Result<PlanningOptions, ConfigValidationError> {
        if self.max_execution_steps == 0 {
            return Err(ConfigValidationError::Zero("planning.max_execution_steps"));
        }
        if self.max_query_length == 0 {
            return Err(ConfigValidationError::Zero("planning.max_query_length"));
        }
        let analysis_mode: AnalysisMode = self.analysis_mode.parse()?;
        let dependency_mode: DependencyMode = self.dependency_mode.parse()?;

        Ok(PlanningOptions::default()
            .with_thresholds(self.thresholds()?)
            .with_analysis_mode(analysis_mode)
            .with_dependency_mode(dependency_mode)
            .with_max_execution_steps(self.max_execution_steps)
            .with_max_query_length(self.max_query_length))
    }
}
