//! Execution plan entities.

use super::PlanningError;
use super::schedule::topological_waves;
use crate::agent::agent_type::AgentType;
use crate::agent::value_objects::StepId;
use crate::query::complexity::ComplexityTier;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use uuid::Uuid;

/// One agent invocation within a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub id: StepId,
    /// 1-based position; orders are dense within a plan.
    pub order: u32,
    pub agent_type: AgentType,
    pub description: String,
    pub required: bool,
    pub estimated_duration_seconds: u32,
    pub parameters: HashMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// Ordering only.
    Sequential,
    /// The dependent consumes the prerequisite's output.
    DataDependency,
    /// Both steps contend for the same resource.
    ResourceDependency,
}

/// `dependent` may only start once `prerequisite` has finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDependency {
    pub dependent: StepId,
    pub prerequisite: StepId,
    pub kind: DependencyKind,
}

impl StepDependency {
    pub fn new(dependent: StepId, prerequisite: StepId, kind: DependencyKind) -> Self {
        Self {
            dependent,
            prerequisite,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirement {
    pub resource_type: String,
    pub quantity: u32,
    pub duration_seconds: u32,
}

impl ResourceRequirement {
    pub fn cpu(duration_seconds: u32) -> Self {
        Self {
            resource_type: "cpu".to_string(),
            quantity: 1,
            duration_seconds,
        }
    }
}

/// Ordered steps plus the dependency graph between them.
///
/// Plans are built once by the planner and only read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub id: Uuid,
    pub source_query: String,
    pub complexity: ComplexityTier,
    pub steps: Vec<ExecutionStep>,
    pub dependencies: Vec<StepDependency>,
    pub estimated_duration_seconds: u32,
    pub resource_requirements: Vec<ResourceRequirement>,
}

impl ExecutionPlan {
    pub const MINIMAL_STEP_SECONDS: u32 = 10;

    /// Plan from steps and dependencies; totals and resources are derived.
    pub fn new(
        source_query: impl Into<String>,
        complexity: ComplexityTier,
        steps: Vec<ExecutionStep>,
        dependencies: Vec<StepDependency>,
    ) -> Self {
        let estimated_duration_seconds = steps.iter().map(|s| s.estimated_duration_seconds).sum();
        let resource_requirements = steps
            .iter()
            .map(|s| ResourceRequirement::cpu(s.estimated_duration_seconds))
            .collect();
        Self {
            id: Uuid::new_v4(),
            source_query: source_query.into(),
            complexity,
            steps,
            dependencies,
            estimated_duration_seconds,
            resource_requirements,
        }
    }

    /// Single required basic tariff lookup; used whenever planning fails.
    pub fn minimal(query: &str) -> Self {
        let step = ExecutionStep {
            id: StepId::for_order(1),
            order: 1,
            agent_type: AgentType::TariffAnalysis,
            description: "Basic tariff lookup".to_string(),
            required: true,
            estimated_duration_seconds: Self::MINIMAL_STEP_SECONDS,
            parameters: HashMap::from([("query".to_string(), json!(query))]),
        };
        Self::new(query, ComplexityTier::Low, vec![step], Vec::new())
    }

    pub fn step(&self, id: &StepId) -> Option<&ExecutionStep> {
        self.steps.iter().find(|s| &s.id == id)
    }

    pub fn steps_in_order(&self) -> Vec<&ExecutionStep> {
        let mut steps: Vec<_> = self.steps.iter().collect();
        steps.sort_by_key(|s| s.order);
        steps
    }

    pub fn required_steps(&self) -> impl Iterator<Item = &ExecutionStep> {
        self.steps.iter().filter(|s| s.required)
    }

    pub fn optional_steps(&self) -> impl Iterator<Item = &ExecutionStep> {
        self.steps.iter().filter(|s| !s.required)
    }

    pub fn agents(&self) -> Vec<AgentType> {
        self.steps_in_order().iter().map(|s| s.agent_type).collect()
    }

    pub fn prerequisites_of<'a>(&'a self, id: &'a StepId) -> impl Iterator<Item = &'a StepId> {
        self.dependencies
            .iter()
            .filter(move |d| &d.dependent == id)
            .map(|d| &d.prerequisite)
    }

    /// Prerequisites whose output the step consumes. Sequential edges only
    /// order steps and are not included.
    pub fn data_prerequisites_of<'a>(
        &'a self,
        id: &'a StepId,
    ) -> impl Iterator<Item = &'a StepId> {
        self.dependencies
            .iter()
            .filter(move |d| &d.dependent == id && d.kind == DependencyKind::DataDependency)
            .map(|d| &d.prerequisite)
    }

    pub fn dependents_of<'a>(&'a self, id: &'a StepId) -> impl Iterator<Item = &'a StepId> {
        self.dependencies
            .iter()
            .filter(move |d| &d.prerequisite == id)
            .map(|d| &d.dependent)
    }

    pub fn is_minimal(&self) -> bool {
        self.steps.len() == 1
            && self.dependencies.is_empty()
            && self.steps[0].description == "Basic tariff lookup"
    }

    /// Check dense ordering, known step references and acyclicity.
    pub fn validate(&self) -> Result<(), PlanningError> {
        if self.steps.is_empty() {
            return Err(PlanningError::NoSteps);
        }
        let mut orders: Vec<u32> = self.steps.iter().map(|s| s.order).collect();
        orders.sort_unstable();
        if orders.iter().zip(1u32..).any(|(order, expected)| *order != expected) {
            return Err(PlanningError::NonDenseOrder);
        }
        self.parallel_groups().map(|_| ())
    }

    /// Steps grouped into waves: every step's prerequisites sit in earlier
    /// waves, and steps within a wave are independent.
    pub fn parallel_groups(&self) -> Result<Vec<Vec<&ExecutionStep>>, PlanningError> {
        let waves = topological_waves(&self.steps, &self.dependencies)?;
        Ok(waves
            .into_iter()
            .map(|wave| wave.iter().filter_map(|id| self.step(id)).collect())
            .collect())
    }

    /// Wall-clock estimate when independent steps run concurrently: the
    /// longest duration-weighted path through the dependency graph.
    pub fn critical_path_seconds(&self) -> Result<u32, PlanningError> {
        let mut finish: HashMap<&StepId, u32> = HashMap::new();
        for wave in self.parallel_groups()? {
            for step in wave {
                let start = self
                    .prerequisites_of(&step.id)
                    .filter_map(|p| finish.get(p))
                    .max()
                    .copied()
                    .unwrap_or(0);
                finish.insert(&step.id, start + step.estimated_duration_seconds);
            }
        }
        Ok(finish.values().max().copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(order: u32, agent_type: AgentType, seconds: u32) -> ExecutionStep {
        ExecutionStep {
            id: StepId::for_order(order),
            order,
            agent_type,
            description: agent_type.description().to_string(),
            required: order == 1,
            estimated_duration_seconds: seconds,
            parameters: HashMap::new(),
        }
    }

    fn dep(dependent: u32, prerequisite: u32) -> StepDependency {
        StepDependency::new(
            StepId::for_order(dependent),
            StepId::for_order(prerequisite),
            DependencyKind::DataDependency,
        )
    }

    #[test]
    fn test_minimal_plan_shape() {
        let plan = ExecutionPlan::minimal("anything");
        assert!(plan.is_minimal());
        assert_eq!(plan.steps.len(), 1);
        let only = &plan.steps[0];
        assert_eq!(only.agent_type, AgentType::TariffAnalysis);
        assert!(only.required);
        assert_eq!(only.estimated_duration_seconds, 10);
        assert_eq!(only.parameters.get("query"), Some(&json!("anything")));
        assert_eq!(plan.estimated_duration_seconds, 10);
        assert_eq!(plan.resource_requirements, vec![ResourceRequirement::cpu(10)]);
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_totals_are_derived() {
        let plan = ExecutionPlan::new(
            "q",
            ComplexityTier::Medium,
            vec![step(1, AgentType::TariffAnalysis, 10), step(2, AgentType::Compliance, 16)],
            vec![],
        );
        assert_eq!(plan.estimated_duration_seconds, 26);
        assert_eq!(plan.resource_requirements.len(), 2);
    }

    #[test]
    fn test_parallel_groups_and_critical_path() {
        // 1 and 2 independent, 3 needs both
        let plan = ExecutionPlan::new(
            "q",
            ComplexityTier::Low,
            vec![
                step(1, AgentType::TariffAnalysis, 5),
                step(2, AgentType::MarketIntelligence, 12),
                step(3, AgentType::Optimization, 15),
            ],
            vec![dep(3, 1), dep(3, 2)],
        );

        let waves: Vec<Vec<u32>> = plan
            .parallel_groups()
            .unwrap()
            .iter()
            .map(|w| w.iter().map(|s| s.order).collect())
            .collect();
        assert_eq!(waves, vec![vec![1, 2], vec![3]]);
        assert_eq!(plan.critical_path_seconds().unwrap(), 27);
        assert_eq!(plan.estimated_duration_seconds, 32);
    }

    #[test]
    fn test_validate_rejects_gaps_and_cycles() {
        let gap = ExecutionPlan::new(
            "q",
            ComplexityTier::Low,
            vec![step(1, AgentType::TariffAnalysis, 5), step(3, AgentType::Compliance, 8)],
            vec![],
        );
        assert!(matches!(gap.validate(), Err(PlanningError::NonDenseOrder)));

        let cycle = ExecutionPlan::new(
            "q",
            ComplexityTier::Low,
            vec![step(1, AgentType::TariffAnalysis, 5), step(2, AgentType::Compliance, 8)],
            vec![dep(1, 2), dep(2, 1)],
        );
        assert!(matches!(
            cycle.validate(),
            Err(PlanningError::CycleDetected(_))
        ));
    }

    #[test]
    fn test_dependency_navigation() {
        let plan = ExecutionPlan::new(
            "q",
            ComplexityTier::Low,
            vec![step(1, AgentType::TariffAnalysis, 5), step(2, AgentType::Optimization, 15)],
            vec![dep(2, 1)],
        );
        let s1 = StepId::for_order(1);
        let s2 = StepId::for_order(2);
        assert_eq!(plan.dependents_of(&s1).collect::<Vec<_>>(), vec![&s2]);
        assert_eq!(plan.prerequisites_of(&s2).collect::<Vec<_>>(), vec![&s1]);
        assert_eq!(plan.required_steps().count(), 1);
        assert_eq!(plan.optional_steps().count(), 1);
    }

    #[test]
    fn test_sequential_edges_are_not_data_prerequisites() {
        let plan = ExecutionPlan::new(
            "q",
            ComplexityTier::Low,
            vec![
                step(1, AgentType::TariffAnalysis, 5),
                step(2, AgentType::MarketIntelligence, 12),
                step(3, AgentType::Optimization, 15),
            ],
            vec![
                StepDependency::new(
                    StepId::for_order(2),
                    StepId::for_order(1),
                    DependencyKind::Sequential,
                ),
                dep(3, 2),
            ],
        );
        let s2 = StepId::for_order(2);
        let s3 = StepId::for_order(3);
        assert_eq!(plan.prerequisites_of(&s2).count(), 1);
        assert_eq!(plan.data_prerequisites_of(&s2).count(), 0);
        assert_eq!(
            plan.data_prerequisites_of(&s3).collect::<Vec<_>>(),
            vec![&s2]
        );
    }
}
