//! Dependency-graph scheduling.

use super::PlanningError;
use super::entities::{ExecutionStep, StepDependency};
use crate::agent::value_objects::StepId;
use std::collections::HashMap;

/// Group steps into topological waves (Kahn's algorithm, one layer at a time).
///
/// Steps in a wave are sorted by `order`. Dependencies naming unknown steps
/// and cycles are errors.
pub fn topological_waves(
    steps: &[ExecutionStep],
    dependencies: &[StepDependency],
) -> Result<Vec<Vec<StepId>>, PlanningError> {
    let order_of: HashMap<&StepId, u32> = steps.iter().map(|s| (&s.id, s.order)).collect();

    let mut in_degree: HashMap<&StepId, usize> = steps.iter().map(|s| (&s.id, 0)).collect();
    let mut dependents: HashMap<&StepId, Vec<&StepId>> = HashMap::new();

    for dep in dependencies {
        for id in [&dep.dependent, &dep.prerequisite] {
            if !order_of.contains_key(id) {
                return Err(PlanningError::UnknownStep(id.clone()));
            }
        }
        if let Some(degree) = in_degree.get_mut(&dep.dependent) {
            *degree += 1;
        }
        dependents
            .entry(&dep.prerequisite)
            .or_default()
            .push(&dep.dependent);
    }

    let mut ready: Vec<&StepId> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();
    ready.sort_by_key(|id| order_of.get(*id).copied());

    let mut waves = Vec::new();
    let mut scheduled = 0;

    while !ready.is_empty() {
        let mut next = Vec::new();
        for id in &ready {
            for dependent in dependents.get(*id).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(*dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        next.push(*dependent);
                    }
                }
            }
        }
        scheduled += ready.len();
        waves.push(ready.iter().map(|id| (*id).clone()).collect());
        next.sort_by_key(|id| order_of.get(*id).copied());
        ready = next;
    }

    if scheduled < steps.len() {
        let stuck = steps
            .iter()
            .filter(|s| in_degree.get(&s.id).is_some_and(|d| *d > 0))
            .min_by_key(|s| s.order)
            .map(|s| s.id.clone())
            .unwrap_or_else(|| StepId::new("unknown"));
        return Err(PlanningError::CycleDetected(stuck));
    }

    Ok(waves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::agent_type::AgentType;
    use crate::plan::entities::DependencyKind;
    use std::collections::HashMap as Params;

    fn steps(n: u32) -> Vec<ExecutionStep> {
        (1..=n)
            .map(|order| ExecutionStep {
                id: StepId::for_order(order),
                order,
                agent_type: AgentType::TariffAnalysis,
                description: String::new(),
                required: false,
                estimated_duration_seconds: 1,
                parameters: Params::new(),
            })
            .collect()
    }

    fn edge(dependent: u32, prerequisite: u32) -> StepDependency {
        StepDependency::new(
            StepId::for_order(dependent),
            StepId::for_order(prerequisite),
            DependencyKind::Sequential,
        )
    }

    fn orders(waves: Vec<Vec<StepId>>) -> Vec<Vec<String>> {
        waves
            .into_iter()
            .map(|w| w.into_iter().map(|id| id.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_no_dependencies_is_one_wave() {
        let waves = topological_waves(&steps(3), &[]).unwrap();
        assert_eq!(orders(waves), vec![vec!["step_1", "step_2", "step_3"]]);
    }

    #[test]
    fn test_linear_chain_is_one_step_per_wave() {
        let waves = topological_waves(&steps(3), &[edge(2, 1), edge(3, 2)]).unwrap();
        assert_eq!(
            orders(waves),
            vec![vec!["step_1"], vec!["step_2"], vec!["step_3"]]
        );
    }

    #[test]
    fn test_diamond() {
        let deps = [edge(2, 1), edge(3, 1), edge(4, 2), edge(4, 3)];
        let waves = topological_waves(&steps(4), &deps).unwrap();
        assert_eq!(
            orders(waves),
            vec![vec!["step_1"], vec!["step_2", "step_3"], vec!["step_4"]]
        );
    }

    #[test]
    fn test_cycle_is_reported() {
        let result = topological_waves(&steps(3), &[edge(2, 3), edge(3, 2)]);
        assert_eq!(
            result.unwrap_err(),
            PlanningError::CycleDetected(StepId::for_order(2))
        );
    }

    #[test]
    fn test_unknown_step_is_reported() {
        let result = topological_waves(&steps(1), &[edge(2, 1)]);
        assert_eq!(
            result.unwrap_err(),
            PlanningError::UnknownStep(StepId::for_order(2))
        );
    }
}
