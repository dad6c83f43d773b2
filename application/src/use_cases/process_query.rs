//! Process query use case
//!
//! The orchestrator: context → plan → coordination → synthesis → response.
//! Every failure path ends in the [`DegradationHandler`], so callers always
//! receive a well-formed [`QueryResponse`].

use crate::config::OrchestratorConfig;
use crate::ports::agent_executor::AgentExecutorPort;
use crate::ports::context_store::ContextStorePort;
use crate::ports::progress::{CoordinationProgress, NoProgress};
use crate::ports::query_logger::{NoQueryLogger, QueryEvent, QueryLogger};
use crate::ports::synthesizer::SynthesizerPort;
use crate::use_cases::coordinate::{CoordinationError, ExecutionCoordinator};
use crate::use_cases::degrade::DegradationHandler;
use crate::use_cases::synthesize::ResultSynthesizer;
use futures::FutureExt;
use serde_json::json;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tradedesk_domain::{
    AgentFailure, PlanBuilder, PlanOutcome, QueryContext, QueryRequest, QueryResponse,
    UserContext,
};
use uuid::Uuid;

/// Agent id used for failures raised by the pipeline itself.
pub const ORCHESTRATOR_ID: &str = "orchestrator";

/// Errors that abort the pipeline before a response is synthesized
#[derive(Error, Debug)]
pub enum ProcessQueryError {
    #[error(transparent)]
    Coordination(#[from] CoordinationError),

    #[error("Query timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Query processing panicked")]
    Panicked,
}

impl ProcessQueryError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProcessQueryError::Coordination(e) if e.is_cancelled())
    }

    /// The step failures behind a required-step abort, or one pipeline failure.
    fn into_failures(self) -> Vec<AgentFailure> {
        match self {
            ProcessQueryError::Coordination(CoordinationError::RequiredStepFailed {
                failures,
                ..
            }) if !failures.is_empty() => failures,
            other => vec![AgentFailure::new(ORCHESTRATOR_ID, other.to_string())],
        }
    }
}

/// Use case for answering one query end to end
pub struct ProcessQueryUseCase<A: AgentExecutorPort + 'static, C: ContextStorePort + 'static> {
    planner: PlanBuilder,
    coordinator: ExecutionCoordinator<A>,
    context_store: Arc<C>,
    synthesizer: ResultSynthesizer,
    degradation: DegradationHandler,
    query_timeout: Duration,
    admission: Arc<Semaphore>,
    logger: Arc<dyn QueryLogger>,
}

impl<A: AgentExecutorPort + 'static, C: ContextStorePort + 'static> ProcessQueryUseCase<A, C> {
    pub fn new(executor: Arc<A>, context_store: Arc<C>, config: &OrchestratorConfig) -> Self {
        Self {
            planner: PlanBuilder::new(config.planning.clone()),
            coordinator: ExecutionCoordinator::new(executor).with_step_timeout(config.step_timeout),
            context_store,
            synthesizer: ResultSynthesizer::concatenating(),
            degradation: DegradationHandler::new(),
            query_timeout: config.query_timeout,
            admission: Arc::new(Semaphore::new(config.max_concurrent_queries.max(1))),
            logger: Arc::new(NoQueryLogger),
        }
    }

    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn SynthesizerPort>) -> Self {
        self.synthesizer = ResultSynthesizer::new(synthesizer);
        self
    }

    pub fn with_planner(mut self, planner: PlanBuilder) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_query_logger(mut self, logger: Arc<dyn QueryLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.coordinator = self.coordinator.with_cancellation(token);
        self
    }

    /// Plan a query without executing it.
    pub fn preview_plan(&self, query: &str) -> PlanOutcome {
        self.planner
            .build_detailed(query, &QueryContext::minimal(query, "preview"))
    }

    /// Answer a query with default (no-op) progress
    pub async fn execute(&self, request: QueryRequest) -> QueryResponse {
        self.execute_with_progress(request, &NoProgress).await
    }

    /// Answer a query with progress callbacks
    pub async fn execute_with_progress(
        &self,
        request: QueryRequest,
        progress: &dyn CoordinationProgress,
    ) -> QueryResponse {
        let started_at = Instant::now();
        let conversation_id = request
            .existing_conversation()
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let request = request.with_conversation_id(conversation_id.clone());

        info!(
            "Processing query for user '{}' in conversation {}",
            request.user_id, conversation_id
        );

        // Queries beyond the concurrency limit wait here, outside the timeout.
        let _permit = self.admission.acquire().await.ok();

        let pipeline = AssertUnwindSafe(self.run_pipeline(&request, &conversation_id, progress, started_at))
            .catch_unwind();
        let outcome = match tokio::time::timeout(self.query_timeout, pipeline).await {
            Ok(Ok(result)) => result,
            Ok(Err(_panic)) => Err(ProcessQueryError::Panicked),
            Err(_elapsed) => Err(ProcessQueryError::Timeout(self.query_timeout)),
        };

        match outcome {
            Ok(response) => response,
            Err(e) => {
                if e.is_cancelled() {
                    info!("Query cancelled");
                } else {
                    error!("Query failed: {}", e);
                }
                let reason = e.to_string();
                let failures = e.into_failures();
                let response = self.degradation.handle_failures(
                    &failures,
                    Some(request.query.as_str()),
                    &conversation_id,
                    started_at,
                );
                self.logger.log(QueryEvent::new(
                    "query_degraded",
                    conversation_id.as_str(),
                    json!({
                        "query": request.query,
                        "reason": reason,
                        "failures": failures.len(),
                        "processing_time_ms": response.processing_time_ms,
                    }),
                ));
                response
            }
        }
    }

    async fn run_pipeline(
        &self,
        request: &QueryRequest,
        conversation_id: &str,
        progress: &dyn CoordinationProgress,
        started_at: Instant,
    ) -> Result<QueryResponse, ProcessQueryError> {
        let context = self.load_context(request, conversation_id).await;

        let outcome = self.planner.build_detailed(&request.query, &context);
        let plan = &outcome.plan;
        progress.on_plan_ready(plan);
        self.logger.log(QueryEvent::new(
            "plan_built",
            conversation_id,
            json!({
                "plan_id": plan.id.to_string(),
                "complexity": plan.complexity.as_str(),
                "agents": plan.agents().iter().map(|a| a.as_str()).collect::<Vec<_>>(),
                "estimated_duration_seconds": plan.estimated_duration_seconds,
                "fallback": outcome.fallback_reason.as_ref().map(|e| e.to_string()),
            }),
        ));

        let coordination = self.coordinator.run_with_progress(plan, progress).await?;
        let answer = self.synthesizer.synthesize_outcome(&coordination, &context).await;

        let response = QueryResponse::success(
            answer,
            conversation_id,
            coordination.tools_used(),
            started_at.elapsed().as_millis() as u64,
        );

        if let Err(e) = self
            .context_store
            .update_context(&context, request, &response)
            .await
        {
            warn!("Failed to update conversation context: {}", e);
        }

        self.logger.log(QueryEvent::new(
            "query_completed",
            conversation_id,
            json!({
                "tools_used": response.tools_used,
                "failures": coordination.failures.iter().map(|f| f.to_string()).collect::<Vec<_>>(),
                "processing_time_ms": response.processing_time_ms,
            }),
        ));
        info!(
            "Query answered in {}ms using {:?}",
            response.processing_time_ms, response.tools_used
        );
        Ok(response)
    }

    /// Context for the request; store errors fall back to a minimal context.
    async fn load_context(&self, request: &QueryRequest, conversation_id: &str) -> QueryContext {
        let user_context = match self.context_store.load_user_context(&request.user_id).await {
            Ok(user_context) => user_context,
            Err(e) => {
                warn!("Failed to load user context: {}", e);
                UserContext::anonymous()
            }
        };

        match self
            .context_store
            .build_query_context(request, &user_context)
            .await
        {
            Ok(context) => {
                debug!(
                    "Context has {} messages and {} referenced entities",
                    context.history.len(),
                    context.referenced_entities.len()
                );
                context
            }
            Err(e) => {
                warn!("Failed to build query context, using minimal context: {}", e);
                QueryContext::minimal(&request.query, conversation_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::agent_executor::AgentError;
    use crate::ports::context_store::ContextStoreError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tradedesk_domain::{AgentOutput, AgentRequest, AgentType};

    struct MockExecutor {
        failing: Vec<(AgentType, &'static str)>,
        delay: Option<Duration>,
        invoked: Mutex<Vec<AgentType>>,
    }

    impl MockExecutor {
        fn succeeding() -> Self {
            Self {
                failing: Vec::new(),
                delay: None,
                invoked: Mutex::new(Vec::new()),
            }
        }

        fn failing(agent_type: AgentType, message: &'static str) -> Self {
            Self::failing_all(vec![(agent_type, message)])
        }

        fn failing_all(failing: Vec<(AgentType, &'static str)>) -> Self {
            Self {
                failing,
                ..Self::succeeding()
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::succeeding()
            }
        }
    }

    #[async_trait]
    impl AgentExecutorPort for MockExecutor {
        async fn invoke(&self, request: &AgentRequest) -> Result<AgentOutput, AgentError> {
            self.invoked.lock().unwrap().push(request.agent_type);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self.failing.iter().find(|(a, _)| *a == request.agent_type) {
                Some((_, message)) => Err(AgentError::ExecutionFailed(message.to_string())),
                None => Ok(AgentOutput::success(format!(
                    "{} answer for: {}",
                    request.agent_type.display_name(),
                    request.query()
                ))),
            }
        }
    }

    #[derive(Default)]
    struct MockContextStore {
        broken: bool,
        updates: Mutex<Vec<(String, bool)>>,
    }

    #[async_trait]
    impl ContextStorePort for MockContextStore {
        async fn load_user_context(&self, user_id: &str) -> Result<UserContext, ContextStoreError> {
            if self.broken {
                return Err(ContextStoreError::Unavailable("offline".into()));
            }
            Ok(UserContext::new(user_id))
        }

        async fn build_query_context(
            &self,
            request: &QueryRequest,
            user_context: &UserContext,
        ) -> Result<QueryContext, ContextStoreError> {
            if self.broken {
                return Err(ContextStoreError::Unavailable("offline".into()));
            }
            let conversation_id = request.conversation_id.clone().unwrap_or_default();
            Ok(QueryContext::new(
                request.query.clone(),
                conversation_id,
                user_context.clone(),
            ))
        }

        async fn update_context(
            &self,
            context: &QueryContext,
            _request: &QueryRequest,
            response: &QueryResponse,
        ) -> Result<(), ContextStoreError> {
            if self.broken {
                return Err(ContextStoreError::Unavailable("offline".into()));
            }
            self.updates
                .lock()
                .unwrap()
                .push((context.conversation_id.clone(), response.success));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<&'static str>>,
    }

    impl QueryLogger for RecordingLogger {
        fn log(&self, event: QueryEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    fn use_case(
        executor: MockExecutor,
        store: Arc<MockContextStore>,
    ) -> ProcessQueryUseCase<MockExecutor, MockContextStore> {
        ProcessQueryUseCase::new(Arc::new(executor), store, &OrchestratorConfig::default())
    }

    #[tokio::test]
    async fn test_tariff_lookup_end_to_end() {
        let store = Arc::new(MockContextStore::default());
        let logger = Arc::new(RecordingLogger::default());
        let use_case = use_case(MockExecutor::succeeding(), Arc::clone(&store))
            .with_query_logger(logger.clone());

        let response = use_case
            .execute(QueryRequest::new(
                "What's the tariff for importing steel from China to USA?",
                "trader-1",
            ))
            .await;

        assert!(response.success);
        assert!(!response.response.is_empty());
        assert_eq!(response.tools_used, vec!["tariff_analysis".to_string()]);
        assert!(Uuid::parse_str(&response.conversation_id).is_ok());

        let updates = store.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, response.conversation_id);
        assert_eq!(
            *logger.events.lock().unwrap(),
            vec!["plan_built", "query_completed"]
        );
    }

    #[tokio::test]
    async fn test_comparison_uses_optimization() {
        let use_case = use_case(MockExecutor::succeeding(), Arc::new(MockContextStore::default()));

        let outcome = use_case.preview_plan("Compare the tariffs on electronics from China versus Germany");
        let analysis = outcome.analysis.unwrap();
        assert_eq!(
            analysis.primary_intent,
            tradedesk_domain::QueryIntent::Comparison
        );
        assert!(analysis.complexity >= tradedesk_domain::ComplexityTier::Medium);

        let response = use_case
            .execute(QueryRequest::new(
                "Compare the tariffs on electronics from China versus Germany",
                "trader-1",
            ))
            .await;
        assert!(response.success);
        assert_eq!(
            response.tools_used,
            vec!["tariff_analysis".to_string(), "optimization".to_string()]
        );
    }

    #[tokio::test]
    async fn test_required_failure_degrades_with_message() {
        let use_case = use_case(
            MockExecutor::failing(AgentType::TariffAnalysis, "tariff database unreachable"),
            Arc::new(MockContextStore::default()),
        );

        let response = use_case
            .execute(
                QueryRequest::new("What's the tariff on steel from China?", "trader-1")
                    .with_conversation_id("conv-7"),
            )
            .await;

        assert!(!response.success);
        assert_eq!(response.conversation_id, "conv-7");
        assert!(
            response
                .response
                .starts_with("I encountered an issue while processing your request:")
        );
        assert!(response.response.contains("tariff database unreachable"));
        assert!(!response.response.contains("Required step"));
        assert!(response.response.contains("Please try:"));
    }

    #[tokio::test]
    async fn test_optional_failure_keeps_required_steps_running() {
        let use_case = use_case(
            MockExecutor::failing(AgentType::MarketIntelligence, "feed offline"),
            Arc::new(MockContextStore::default()),
        );

        let response = use_case
            .execute(QueryRequest::new("supply risk and market trends for toys", "trader-1"))
            .await;

        assert!(response.success);
        assert!(response.tools_used.contains(&"risk_assessment".to_string()));
        assert!(response.tools_used.contains(&"tariff_analysis".to_string()));
        assert!(!response.tools_used.contains(&"market_intelligence".to_string()));
    }

    #[tokio::test]
    async fn test_several_failures_use_plural_wording() {
        let use_case = use_case(
            MockExecutor::failing_all(vec![
                (AgentType::MarketIntelligence, "feed offline"),
                (AgentType::RiskAssessment, "risk model unavailable"),
            ]),
            Arc::new(MockContextStore::default()),
        );

        let response = use_case
            .execute(QueryRequest::new("supply risk and market trends for toys", "trader-1"))
            .await;

        assert!(!response.success);
        assert!(
            response
                .response
                .starts_with("I encountered 2 issues while processing your complex request.")
        );
    }

    #[tokio::test]
    async fn test_help_keyword_in_trade_question_still_degrades() {
        let use_case = use_case(
            MockExecutor::failing(AgentType::TariffAnalysis, "down"),
            Arc::new(MockContextStore::default()),
        );

        let response = use_case
            .execute(QueryRequest::new(
                "Can you help me find the tariff on steel from China?",
                "trader-1",
            ))
            .await;

        assert!(!response.success);
        assert!(response.tools_used.is_empty());
    }

    #[tokio::test]
    async fn test_context_store_failures_are_not_fatal() {
        let store = Arc::new(MockContextStore {
            broken: true,
            ..Default::default()
        });
        let use_case = use_case(MockExecutor::succeeding(), Arc::clone(&store));

        let response = use_case
            .execute(QueryRequest::new("Tariff on coffee from Brazil", "trader-1"))
            .await;

        assert!(response.success);
        assert!(store.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_timeout_degrades() {
        let executor = MockExecutor::slow(Duration::from_secs(5));
        let config = OrchestratorConfig::default().with_query_timeout(Duration::from_millis(50));
        let use_case = ProcessQueryUseCase::new(
            Arc::new(executor),
            Arc::new(MockContextStore::default()),
            &config,
        );

        let response = use_case
            .execute(QueryRequest::new("Tariff on steel from China", "trader-1"))
            .await;

        assert!(!response.success);
        assert!(response.response.contains("timed out"));
    }

    #[tokio::test]
    async fn test_help_query_falls_back_to_overview_on_failure() {
        let use_case = use_case(
            MockExecutor::failing(AgentType::TariffAnalysis, "down"),
            Arc::new(MockContextStore::default()),
        );

        let response = use_case.execute(QueryRequest::new("hello", "trader-1")).await;

        assert!(response.success);
        assert_eq!(response.tools_used, vec!["fallback".to_string()]);
    }

    #[tokio::test]
    async fn test_cancelled_query_degrades() {
        let token = CancellationToken::new();
        token.cancel();
        let use_case = use_case(MockExecutor::succeeding(), Arc::new(MockContextStore::default()))
            .with_cancellation(token);

        let response = use_case
            .execute(QueryRequest::new("Tariff on steel from China", "trader-1"))
            .await;

        assert!(!response.success);
        assert!(response.response.contains("Operation cancelled"));
    }

    #[tokio::test]
    async fn test_empty_query_runs_minimal_plan() {
        let use_case = use_case(MockExecutor::succeeding(), Arc::new(MockContextStore::default()));
        let outcome = use_case.preview_plan("   ");
        assert!(outcome.plan.is_minimal());
        assert!(outcome.fallback_reason.is_some());
    }
}
