//! Execution coordination use case
//!
//! Runs a plan's steps in dependency waves. Steps in a wave run concurrently
//! on a `JoinSet`; each invocation carries a deadline. A failed required step
//! aborts the run. A failed optional step is recorded, and optional steps that
//! consume its output are skipped. Required steps always run, with whatever
//! upstream results exist.

use crate::ports::agent_executor::{AgentError, AgentExecutorPort};
use crate::ports::progress::{CoordinationProgress, NoProgress};
use crate::use_cases::shared::check_cancelled;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tradedesk_domain::{
    AgentFailure, AgentOutput, AgentRequest, AgentResult, AgentType, ExecutionPlan,
    ExecutionStep, PlanningError, StepId,
};

/// Errors that end coordination early
#[derive(Error, Debug)]
pub enum CoordinationError {
    #[error("Required step {step_id} ({agent}) failed: {message}")]
    RequiredStepFailed {
        step_id: StepId,
        agent: AgentType,
        message: String,
        /// Every failure recorded up to and including this one.
        failures: Vec<AgentFailure>,
    },

    #[error("Invalid execution plan: {0}")]
    InvalidPlan(#[from] PlanningError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl CoordinationError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CoordinationError::Cancelled)
    }
}

/// Results and non-fatal failures of a completed run.
#[derive(Debug, Clone, Default)]
pub struct CoordinationOutcome {
    pub results: Vec<AgentResult>,
    pub failures: Vec<AgentFailure>,
}

impl CoordinationOutcome {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Agent ids of the successful results, in completion order.
    pub fn tools_used(&self) -> Vec<String> {
        self.results
            .iter()
            .filter(|r| r.success)
            .map(|r| r.agent_id.clone())
            .collect()
    }
}

/// How a single step ended.
enum StepOutcome {
    Completed(AgentOutput),
    Failed(AgentError),
    TimedOut(Duration),
}

/// Use case for executing a plan against the agent executor
pub struct ExecutionCoordinator<A: AgentExecutorPort + 'static> {
    executor: Arc<A>,
    step_timeout: Option<Duration>,
    cancellation_token: Option<CancellationToken>,
}

impl<A: AgentExecutorPort + 'static> ExecutionCoordinator<A> {
    pub fn new(executor: Arc<A>) -> Self {
        Self {
            executor,
            step_timeout: None,
            cancellation_token: None,
        }
    }

    /// Fixed per-step deadline instead of the plan's complexity-tier timeout.
    pub fn with_step_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.step_timeout = timeout;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Execute the plan with default (no-op) progress
    pub async fn run(&self, plan: &ExecutionPlan) -> Result<CoordinationOutcome, CoordinationError> {
        self.run_with_progress(plan, &NoProgress).await
    }

    /// Execute the plan with progress callbacks
    pub async fn run_with_progress(
        &self,
        plan: &ExecutionPlan,
        progress: &dyn CoordinationProgress,
    ) -> Result<CoordinationOutcome, CoordinationError> {
        let waves = plan.parallel_groups()?;
        let timeout = self.step_timeout.unwrap_or_else(|| plan.complexity.timeout());

        info!(
            "Executing plan {} ({} steps in {} waves, step timeout {:?})",
            plan.id,
            plan.steps.len(),
            waves.len(),
            timeout
        );

        let mut outcome = CoordinationOutcome::default();
        let mut failed: HashSet<StepId> = HashSet::new();

        for (index, wave) in waves.iter().enumerate() {
            check_cancelled(&self.cancellation_token)?;
            progress.on_wave_start(index + 1, wave);

            let mut join_set = JoinSet::new();
            let mut task_steps: HashMap<tokio::task::Id, StepId> = HashMap::new();

            for step in wave {
                if !step.required
                    && let Some(blocker) = plan
                        .data_prerequisites_of(&step.id)
                        .find(|p| failed.contains(*p))
                {
                    warn!("Step {} skipped: prerequisite {} failed", step.id, blocker);
                    progress.on_step_complete(step, false);
                    outcome.failures.push(AgentFailure::new(
                        step.agent_type.as_str(),
                        format!("Skipped because prerequisite {} failed", blocker),
                    ));
                    failed.insert(step.id.clone());
                    continue;
                }

                let upstream: Vec<AgentResult> = plan
                    .prerequisites_of(&step.id)
                    .filter_map(|p| outcome.results.iter().find(|r| &r.task_id == p))
                    .cloned()
                    .collect();
                let request =
                    AgentRequest::new(step.id.clone(), step.agent_type, step.parameters.clone())
                        .with_upstream(upstream);

                progress.on_step_start(step);
                debug!("Dispatching {} ({})", step.id, step.agent_type);

                let executor = Arc::clone(&self.executor);
                let step_id = step.id.clone();
                let handle = join_set.spawn(async move {
                    let started = Instant::now();
                    let step_outcome =
                        match tokio::time::timeout(timeout, executor.invoke(&request)).await {
                            Ok(Ok(output)) => StepOutcome::Completed(output),
                            Ok(Err(e)) => StepOutcome::Failed(e),
                            Err(_elapsed) => StepOutcome::TimedOut(timeout),
                        };
                    (step_id, step_outcome, started.elapsed())
                });
                task_steps.insert(handle.id(), step.id.clone());
            }

            let mut wave_results = Vec::new();
            loop {
                let next = match &self.cancellation_token {
                    Some(token) => tokio::select! {
                        _ = token.cancelled() => None,
                        next = join_set.join_next_with_id() => Some(next),
                    },
                    None => Some(join_set.join_next_with_id().await),
                };
                let Some(next) = next else {
                    join_set.abort_all();
                    info!("Coordination cancelled during wave {}", index + 1);
                    return Err(CoordinationError::Cancelled);
                };
                let Some(joined) = next else {
                    break;
                };

                let (step_id, step_outcome, elapsed) = match joined {
                    Ok((_, value)) => value,
                    Err(e) => {
                        let Some(step) = task_steps.get(&e.id()).and_then(|id| plan.step(id))
                        else {
                            warn!("Unknown step task could not be joined: {}", e);
                            continue;
                        };
                        warn!("Step {} task could not be joined: {}", step.id, e);
                        progress.on_step_complete(step, false);
                        let message = if e.is_panic() {
                            "Agent panicked".to_string()
                        } else {
                            format!("Step task could not be joined: {}", e)
                        };
                        let failure = AgentFailure::new(step.agent_type.as_str(), message);
                        if let Err(e) =
                            self.record_failure(step, failure, &mut outcome, &mut failed, progress)
                        {
                            join_set.abort_all();
                            return Err(e);
                        }
                        continue;
                    }
                };
                let Some(step) = plan.step(&step_id) else {
                    continue;
                };

                let message = match step_outcome {
                    StepOutcome::Completed(output) if output.success => {
                        debug!("Step {} completed in {:?}", step.id, elapsed);
                        progress.on_step_complete(step, true);
                        wave_results.push(AgentResult::from_output(
                            step.agent_type,
                            step.id.clone(),
                            output,
                            elapsed.as_millis() as u64,
                        ));
                        continue;
                    }
                    StepOutcome::Completed(output) => {
                        format!("Agent reported failure: {}", output.payload)
                    }
                    StepOutcome::Failed(e) => e.to_string(),
                    StepOutcome::TimedOut(limit) => {
                        format!("Step timed out after {}s", limit.as_secs())
                    }
                };

                warn!("Step {} ({}) failed: {}", step.id, step.agent_type, message);
                progress.on_step_complete(step, false);
                let failure = AgentFailure::new(step.agent_type.as_str(), message)
                    .with_cause(format!("{} after {}ms", step.id, elapsed.as_millis()));
                if let Err(e) =
                    self.record_failure(step, failure, &mut outcome, &mut failed, progress)
                {
                    join_set.abort_all();
                    return Err(e);
                }
            }

            wave_results.sort_by_key(|r| plan.step(&r.task_id).map(|s| s.order));
            outcome.results.extend(wave_results);
        }

        if outcome.is_partial() {
            warn!(
                "Plan {} finished with {} failed steps",
                plan.id,
                outcome.failures.len()
            );
        } else {
            info!("Plan {} finished: {} results", plan.id, outcome.results.len());
        }
        progress.on_coordination_complete(&outcome.results, &outcome.failures);

        Ok(outcome)
    }

    /// Record a failure; required steps turn it into a fatal error.
    fn record_failure(
        &self,
        step: &ExecutionStep,
        failure: AgentFailure,
        outcome: &mut CoordinationOutcome,
        failed: &mut HashSet<StepId>,
        progress: &dyn CoordinationProgress,
    ) -> Result<(), CoordinationError> {
        let message = failure.message.clone();
        outcome.failures.push(failure);
        failed.insert(step.id.clone());

        if step.required {
            progress.on_coordination_complete(&outcome.results, &outcome.failures);
            return Err(CoordinationError::RequiredStepFailed {
                step_id: step.id.clone(),
                agent: step.agent_type,
                message,
                failures: outcome.failures.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tradedesk_domain::{ComplexityTier, DependencyKind, StepDependency};

    /// Per-agent scripted behaviour.
    #[derive(Clone)]
    enum Behaviour {
        Succeed,
        Fail(&'static str),
        Unsuccessful,
        Sleep(Duration),
        Panic,
    }

    struct MockExecutor {
        behaviours: HashMap<AgentType, Behaviour>,
        calls: Mutex<Vec<(AgentType, usize)>>,
    }

    impl MockExecutor {
        fn new(behaviours: impl IntoIterator<Item = (AgentType, Behaviour)>) -> Self {
            Self {
                behaviours: behaviours.into_iter().collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn succeeding() -> Self {
            Self::new([])
        }

        fn calls(&self) -> Vec<(AgentType, usize)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AgentExecutorPort for MockExecutor {
        async fn invoke(&self, request: &AgentRequest) -> Result<AgentOutput, AgentError> {
            self.calls
                .lock()
                .unwrap()
                .push((request.agent_type, request.upstream.len()));
            match self
                .behaviours
                .get(&request.agent_type)
                .cloned()
                .unwrap_or(Behaviour::Succeed)
            {
                Behaviour::Succeed => Ok(AgentOutput::success(format!(
                    "{} payload",
                    request.agent_type.as_str()
                ))
                .with_insight("insight")),
                Behaviour::Fail(msg) => Err(AgentError::ExecutionFailed(msg.to_string())),
                Behaviour::Unsuccessful => Ok(AgentOutput::unsuccessful("no data")),
                Behaviour::Sleep(d) => {
                    tokio::time::sleep(d).await;
                    Ok(AgentOutput::success("late"))
                }
                Behaviour::Panic => panic!("agent exploded"),
            }
        }
    }

    fn step(order: u32, agent_type: AgentType, required: bool) -> ExecutionStep {
        ExecutionStep {
            id: StepId::for_order(order),
            order,
            agent_type,
            description: agent_type.description().to_string(),
            required,
            estimated_duration_seconds: agent_type.base_duration_seconds(),
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

    /// tariff (required), market (optional), optimization (optional, needs both)
    fn three_step_plan() -> ExecutionPlan {
        ExecutionPlan::new(
            "q",
            ComplexityTier::Low,
            vec![
                step(1, AgentType::TariffAnalysis, true),
                step(2, AgentType::MarketIntelligence, false),
                step(3, AgentType::Optimization, false),
            ],
            vec![dep(3, 1), dep(3, 2)],
        )
    }

    #[tokio::test]
    async fn test_minimal_plan_round_trip() {
        let coordinator = ExecutionCoordinator::new(Arc::new(MockExecutor::succeeding()));
        let outcome = coordinator.run(&ExecutionPlan::minimal("anything")).await.unwrap();

        assert_eq!(outcome.results.len(), 1);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.tools_used(), vec!["tariff_analysis".to_string()]);
    }

    #[tokio::test]
    async fn test_all_steps_succeed_and_upstream_flows() {
        let executor = Arc::new(MockExecutor::succeeding());
        let coordinator = ExecutionCoordinator::new(Arc::clone(&executor));
        let outcome = coordinator.run(&three_step_plan()).await.unwrap();

        assert_eq!(outcome.results.len(), 3);
        assert!(!outcome.is_partial());
        let optimization_call = executor
            .calls()
            .into_iter()
            .find(|(a, _)| *a == AgentType::Optimization)
            .unwrap();
        assert_eq!(optimization_call.1, 2);
        assert_eq!(outcome.results[2].agent_id, "optimization");
    }

    #[tokio::test]
    async fn test_required_failure_is_fatal() {
        let executor = Arc::new(MockExecutor::new([(
            AgentType::TariffAnalysis,
            Behaviour::Fail("rate service down"),
        )]));
        let coordinator = ExecutionCoordinator::new(executor);
        let err = coordinator.run(&three_step_plan()).await.unwrap_err();

        match &err {
            CoordinationError::RequiredStepFailed {
                step_id, failures, ..
            } => {
                assert_eq!(step_id, &StepId::for_order(1));
                assert!(failures.iter().any(|f| f.agent_id == "tariff_analysis"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("rate service down"));
    }

    #[tokio::test]
    async fn test_optional_failure_skips_dependents() {
        let executor = Arc::new(MockExecutor::new([(
            AgentType::MarketIntelligence,
            Behaviour::Fail("feed offline"),
        )]));
        let coordinator = ExecutionCoordinator::new(Arc::clone(&executor));
        let outcome = coordinator.run(&three_step_plan()).await.unwrap();

        assert_eq!(outcome.tools_used(), vec!["tariff_analysis".to_string()]);
        assert_eq!(outcome.failures.len(), 2);
        assert!(outcome.failures[1].message.contains("Skipped"));
        assert!(
            !executor
                .calls()
                .iter()
                .any(|(a, _)| *a == AgentType::Optimization)
        );
    }

    #[tokio::test]
    async fn test_unsuccessful_output_counts_as_failure() {
        let executor = Arc::new(MockExecutor::new([(
            AgentType::MarketIntelligence,
            Behaviour::Unsuccessful,
        )]));
        let outcome = ExecutionCoordinator::new(executor)
            .run(&three_step_plan())
            .await
            .unwrap();
        assert!(outcome.failures[0].message.contains("no data"));
    }

    #[tokio::test]
    async fn test_step_timeout_is_a_failure() {
        let executor = Arc::new(MockExecutor::new([(
            AgentType::MarketIntelligence,
            Behaviour::Sleep(Duration::from_secs(5)),
        )]));
        let coordinator = ExecutionCoordinator::new(executor)
            .with_step_timeout(Some(Duration::from_millis(20)));
        let outcome = coordinator.run(&three_step_plan()).await.unwrap();

        assert!(outcome.failures[0].message.contains("timed out"));
        assert_eq!(outcome.results.len(), 1);
    }

    #[tokio::test]
    async fn test_panicking_agent_is_a_failure() {
        let executor = Arc::new(MockExecutor::new([(
            AgentType::MarketIntelligence,
            Behaviour::Panic,
        )]));
        let outcome = ExecutionCoordinator::new(executor)
            .run(&three_step_plan())
            .await
            .unwrap();
        assert_eq!(outcome.failures[0].message, "Agent panicked");
    }

    #[tokio::test]
    async fn test_required_panic_is_fatal() {
        let executor = Arc::new(MockExecutor::new([(
            AgentType::TariffAnalysis,
            Behaviour::Panic,
        )]));
        let err = ExecutionCoordinator::new(executor)
            .run(&three_step_plan())
            .await
            .unwrap_err();
        match err {
            CoordinationError::RequiredStepFailed { message, failures, .. } => {
                assert_eq!(message, "Agent panicked");
                assert!(failures.iter().any(|f| f.agent_id == "tariff_analysis"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    /// risk (required) consumes market (optional); tariff (required) is independent
    fn risk_market_tariff_plan(kind: DependencyKind) -> ExecutionPlan {
        let edges = match kind {
            DependencyKind::Sequential => vec![
                StepDependency::new(StepId::for_order(2), StepId::for_order(1), kind),
                StepDependency::new(StepId::for_order(3), StepId::for_order(2), kind),
            ],
            _ => vec![dep(1, 2)],
        };
        ExecutionPlan::new(
            "supply risk and market trends for toys",
            ComplexityTier::Medium,
            vec![
                step(1, AgentType::RiskAssessment, true),
                step(2, AgentType::MarketIntelligence, false),
                step(3, AgentType::TariffAnalysis, true),
            ],
            edges,
        )
    }

    #[tokio::test]
    async fn test_required_step_runs_when_its_data_source_fails() {
        let executor = Arc::new(MockExecutor::new([(
            AgentType::MarketIntelligence,
            Behaviour::Fail("feed offline"),
        )]));
        let outcome = ExecutionCoordinator::new(Arc::clone(&executor))
            .run(&risk_market_tariff_plan(DependencyKind::DataDependency))
            .await
            .unwrap();

        let mut used = outcome.tools_used();
        used.sort();
        assert_eq!(used, vec!["risk_assessment", "tariff_analysis"]);
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].message.contains("feed offline"));
        assert!(
            executor
                .calls()
                .contains(&(AgentType::RiskAssessment, 0))
        );
    }

    #[tokio::test]
    async fn test_sequential_edges_never_skip_after_optional_failure() {
        let executor = Arc::new(MockExecutor::new([(
            AgentType::MarketIntelligence,
            Behaviour::Fail("feed offline"),
        )]));
        let outcome = ExecutionCoordinator::new(Arc::clone(&executor))
            .run(&risk_market_tariff_plan(DependencyKind::Sequential))
            .await
            .unwrap();

        assert_eq!(
            outcome.tools_used(),
            vec!["risk_assessment".to_string(), "tariff_analysis".to_string()]
        );
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(executor.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let coordinator = ExecutionCoordinator::new(Arc::new(MockExecutor::succeeding()))
            .with_cancellation(token);
        let err = coordinator.run(&three_step_plan()).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancellation_aborts_in_flight_steps() {
        let token = CancellationToken::new();
        let executor = Arc::new(MockExecutor::new([(
            AgentType::TariffAnalysis,
            Behaviour::Sleep(Duration::from_secs(30)),
        )]));
        let coordinator = ExecutionCoordinator::new(executor).with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });
        let err = coordinator
            .run(&ExecutionPlan::minimal("slow"))
            .await
            .unwrap_err();
        canceller.await.unwrap();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_cyclic_plan_is_rejected() {
        let plan = ExecutionPlan::new(
            "q",
            ComplexityTier::Low,
            vec![
                step(1, AgentType::TariffAnalysis, true),
                step(2, AgentType::Compliance, false),
            ],
            vec![dep(1, 2), dep(2, 1)],
        );
        let err = ExecutionCoordinator::new(Arc::new(MockExecutor::succeeding()))
            .run(&plan)
            .await
            .unwrap_err();
        assert!(matches!(err, CoordinationError::InvalidPlan(_)));
    }
}
