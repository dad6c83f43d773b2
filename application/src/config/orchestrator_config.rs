//! Orchestrator parameters: pipeline timeouts and planning knobs.
//!
//! [`OrchestratorConfig`] groups the static parameters used by
//! [`ProcessQueryUseCase`](crate::use_cases::process_query::ProcessQueryUseCase)
//! and the [`ExecutionCoordinator`](crate::use_cases::coordinate::ExecutionCoordinator).

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tradedesk_domain::PlanningOptions;

/// Query pipeline parameters.
///
/// | Field | Default | Used by |
/// |-------|---------|---------|
/// | `planning` | standard thresholds, advanced analysis, data-flow deps | plan builder |
/// | `step_timeout` | `None` (complexity tier timeout) | coordinator |
/// | `query_timeout` | 300 s | orchestrator |
/// | `max_concurrent_queries` | 100 | orchestrator admission |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub planning: PlanningOptions,
    /// Overrides the per-tier step deadline when set.
    pub step_timeout: Option<Duration>,
    /// Deadline for the whole pipeline of one query.
    pub query_timeout: Duration,
    pub max_concurrent_queries: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            planning: PlanningOptions::default(),
            step_timeout: None,
            query_timeout: Duration::from_secs(300),
            max_concurrent_queries: 100,
        }
    }
}

impl OrchestratorConfig {
    // ==================== Builder Methods ====================

    pub fn with_planning(mut self, planning: PlanningOptions) -> Self {
        self.planning = planning;
        self
    }

    pub fn with_step_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.step_timeout = timeout;
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn with_max_concurrent_queries(mut self, max: usize) -> Self {
        self.max_concurrent_queries = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradedesk_domain::DependencyMode;

    #[test]
    fn test_default() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.query_timeout, Duration::from_secs(300));
        assert!(config.step_timeout.is_none());
        assert_eq!(config.max_concurrent_queries, 100);
        assert_eq!(config.planning.max_execution_steps, 10);
        assert_eq!(config.planning.dependency_mode, DependencyMode::DataFlow);
    }

    #[test]
    fn test_builder() {
        let config = OrchestratorConfig::default()
            .with_step_timeout(Some(Duration::from_secs(5)))
            .with_query_timeout(Duration::from_secs(30))
            .with_planning(PlanningOptions::default().with_max_execution_steps(3));

        assert_eq!(config.step_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.query_timeout, Duration::from_secs(30));
        assert_eq!(config.planning.max_execution_steps, 3);
    }
}
