//! Plan construction.
//!
//! [`PlanBuilder::build`] never fails: any planning error is logged and the
//! minimal single-step plan is returned instead.

use super::PlanningError;
use super::entities::{DependencyKind, ExecutionPlan, ExecutionStep, StepDependency};
use crate::agent::agent_type::AgentType;
use crate::agent::value_objects::StepId;
use crate::analysis::analyzer::{AnalysisMode, QueryAnalyzer};
use crate::analysis::extractor::EntityExtractor;
use crate::context::entities::QueryContext;
use crate::core::error::DomainError;
use crate::query::analysis::QueryAnalysis;
use crate::query::complexity::ComplexityThresholds;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, warn};

/// Data needs between agents: (dependent, prerequisite).
const DATA_FLOW_EDGES: [(AgentType, AgentType); 3] = [
    (AgentType::Optimization, AgentType::TariffAnalysis),
    (AgentType::Optimization, AgentType::MarketIntelligence),
    (AgentType::RiskAssessment, AgentType::MarketIntelligence),
];

/// How step dependencies are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyMode {
    /// Every step waits for the previous one.
    Sequential,
    /// Steps wait only for the agents whose output they consume.
    #[default]
    DataFlow,
}

impl FromStr for DependencyMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "sequential" => Ok(DependencyMode::Sequential),
            "data_flow" | "dataflow" => Ok(DependencyMode::DataFlow),
            _ => Err(DomainError::InvalidOption {
                field: "dependency_mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Knobs for analysis and planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningOptions {
    pub thresholds: ComplexityThresholds,
    pub analysis_mode: AnalysisMode,
    pub dependency_mode: DependencyMode,
    pub max_execution_steps: usize,
    pub max_query_length: usize,
}

impl Default for PlanningOptions {
    fn default() -> Self {
        Self {
            thresholds: ComplexityThresholds::STANDARD,
            analysis_mode: AnalysisMode::Advanced,
            dependency_mode: DependencyMode::DataFlow,
            max_execution_steps: 10,
            max_query_length: 4000,
        }
    }
}

impl PlanningOptions {
    pub fn with_thresholds(mut self, thresholds: ComplexityThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_analysis_mode(mut self, mode: AnalysisMode) -> Self {
        self.analysis_mode = mode;
        self
    }

    pub fn with_dependency_mode(mut self, mode: DependencyMode) -> Self {
        self.dependency_mode = mode;
        self
    }

    pub fn with_max_execution_steps(mut self, max: usize) -> Self {
        self.max_execution_steps = max;
        self
    }

    pub fn with_max_query_length(mut self, max: usize) -> Self {
        self.max_query_length = max;
        self
    }
}

/// A plan together with how it came about.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub plan: ExecutionPlan,
    /// Present when analysis succeeded.
    pub analysis: Option<QueryAnalysis>,
    /// Present when the minimal plan was substituted.
    pub fallback_reason: Option<PlanningError>,
}

pub struct PlanBuilder {
    analyzer: QueryAnalyzer,
    options: PlanningOptions,
}

impl PlanBuilder {
    pub fn new(options: PlanningOptions) -> Self {
        Self {
            analyzer: QueryAnalyzer::new(options.thresholds, options.analysis_mode),
            options,
        }
    }

    /// Use a custom entity extractor (extra rules).
    pub fn with_extractor(mut self, extractor: EntityExtractor) -> Self {
        self.analyzer = self.analyzer.with_extractor(extractor);
        self
    }

    pub fn options(&self) -> &PlanningOptions {
        &self.options
    }

    /// Build a plan, substituting the minimal plan on any planning error.
    pub fn build(&self, query: &str, context: &QueryContext) -> ExecutionPlan {
        self.build_detailed(query, context).plan
    }

    pub fn build_detailed(&self, query: &str, context: &QueryContext) -> PlanOutcome {
        match self.try_build(query, context) {
            Ok((analysis, plan)) => PlanOutcome {
                plan,
                analysis: Some(analysis),
                fallback_reason: None,
            },
            Err(e) => {
                warn!("Planning failed, using minimal plan: {}", e);
                PlanOutcome {
                    plan: ExecutionPlan::minimal(query),
                    analysis: None,
                    fallback_reason: Some(e),
                }
            }
        }
    }

    /// Analyze the query and build a plan, surfacing planning errors.
    pub fn try_build(
        &self,
        query: &str,
        context: &QueryContext,
    ) -> Result<(QueryAnalysis, ExecutionPlan), PlanningError> {
        if query.trim().is_empty() {
            return Err(PlanningError::EmptyQuery);
        }
        let length = query.chars().count();
        if length > self.options.max_query_length {
            return Err(PlanningError::QueryTooLong {
                length,
                max: self.options.max_query_length,
            });
        }

        let analysis = self.analyzer.analyze(query, &context.referenced_entities);
        if analysis.required_agents.len() > self.options.max_execution_steps {
            return Err(PlanningError::TooManySteps {
                count: analysis.required_agents.len(),
                max: self.options.max_execution_steps,
            });
        }

        let steps = steps_for(&analysis);
        let dependencies = match self.options.dependency_mode {
            DependencyMode::Sequential => sequential_dependencies(&steps),
            DependencyMode::DataFlow => data_flow_dependencies(&steps),
        };

        let plan = ExecutionPlan::new(query, analysis.complexity, steps, dependencies);
        plan.validate()?;

        debug!(
            "Built plan {} with {} steps, {} dependencies, ~{}s",
            plan.id,
            plan.steps.len(),
            plan.dependencies.len(),
            plan.estimated_duration_seconds
        );
        Ok((analysis, plan))
    }
}

impl Default for PlanBuilder {
    fn default() -> Self {
        Self::new(PlanningOptions::default())
    }
}

fn steps_for(analysis: &QueryAnalysis) -> Vec<ExecutionStep> {
    let primary_agent = analysis.primary_intent.agent();
    let multiplier = analysis.complexity.resource_multiplier();
    let entities = serde_json::to_value(&analysis.entities).unwrap_or_default();

    analysis
        .required_agents
        .iter()
        .zip(1u32..)
        .map(|(&agent_type, order)| {
            let parameters: HashMap<String, Value> = HashMap::from([
                ("query".to_string(), json!(analysis.normalized_query)),
                ("entities".to_string(), entities.clone()),
                ("complexity".to_string(), json!(analysis.complexity.as_str())),
                ("intent".to_string(), json!(analysis.primary_intent.as_str())),
            ]);
            ExecutionStep {
                id: StepId::for_order(order),
                order,
                agent_type,
                description: agent_type.description().to_string(),
                required: agent_type == AgentType::TariffAnalysis || agent_type == primary_agent,
                estimated_duration_seconds: agent_type.base_duration_seconds() * multiplier,
                parameters,
            }
        })
        .collect()
}

fn sequential_dependencies(steps: &[ExecutionStep]) -> Vec<StepDependency> {
    steps
        .windows(2)
        .map(|pair| {
            StepDependency::new(
                pair[1].id.clone(),
                pair[0].id.clone(),
                DependencyKind::Sequential,
            )
        })
        .collect()
}

fn data_flow_dependencies(steps: &[ExecutionStep]) -> Vec<StepDependency> {
    let id_of = |agent: AgentType| steps.iter().find(|s| s.agent_type == agent).map(|s| &s.id);

    DATA_FLOW_EDGES
        .iter()
        .filter_map(|&(dependent, prerequisite)| {
            Some(StepDependency::new(
                id_of(dependent)?.clone(),
                id_of(prerequisite)?.clone(),
                DependencyKind::DataDependency,
            ))
        })
        .collect()
}
