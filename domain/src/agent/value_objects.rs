//! Agent invocation value objects.
//!
//! # Identifiers
//! - [`StepId`] - Identifier of a step within an execution plan
//!
//! # Invocation
//! - [`AgentRequest`] - What an agent receives: step parameters plus upstream results
//! - [`AgentOutput`] - What an agent returns
//!
//! # Outcomes
//! - [`AgentResult`] - A recorded step outcome
//! - [`AgentFailure`] - A recorded step failure

use super::agent_type::AgentType;
use crate::query::entity::Entity;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Identifier of a step within a plan (`step_1`, `step_2`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StepId(String);

impl StepId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id for the step at a 1-based position.
    pub fn for_order(order: u32) -> Self {
        Self(format!("step_{}", order))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StepId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StepId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Input for one agent invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRequest {
    pub step_id: StepId,
    pub agent_type: AgentType,
    pub parameters: HashMap<String, Value>,
    /// Results of the steps this one depends on.
    pub upstream: Vec<AgentResult>,
}

impl AgentRequest {
    pub fn new(step_id: StepId, agent_type: AgentType, parameters: HashMap<String, Value>) -> Self {
        Self {
            step_id,
            agent_type,
            parameters,
            upstream: Vec::new(),
        }
    }

    pub fn with_upstream(mut self, upstream: Vec<AgentResult>) -> Self {
        self.upstream = upstream;
        self
    }

    pub fn query(&self) -> &str {
        self.parameters
            .get("query")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Entities passed by the planner; malformed or missing values yield none.
    pub fn entities(&self) -> Vec<Entity> {
        self.parameters
            .get("entities")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    pub fn parameter_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(Value::as_str)
    }

    /// Upstream result produced by the given agent, if it ran.
    pub fn upstream_from(&self, agent_type: AgentType) -> Option<&AgentResult> {
        self.upstream
            .iter()
            .find(|r| r.agent_id == agent_type.as_str())
    }
}

/// What an agent hands back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentOutput {
    pub success: bool,
    pub payload: String,
    pub insights: Vec<String>,
    /// Structured data for downstream agents.
    pub data: Option<Value>,
}

impl AgentOutput {
    pub fn success(payload: impl Into<String>) -> Self {
        Self {
            success: true,
            payload: payload.into(),
            insights: Vec::new(),
            data: None,
        }
    }

    /// An output the agent itself marks as unsuccessful.
    pub fn unsuccessful(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: reason.into(),
            insights: Vec::new(),
            data: None,
        }
    }

    pub fn with_insight(mut self, insight: impl Into<String>) -> Self {
        self.insights.push(insight.into());
        self
    }

    pub fn with_insights(mut self, insights: impl IntoIterator<Item = String>) -> Self {
        self.insights.extend(insights);
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Recorded outcome of one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub agent_id: String,
    pub task_id: StepId,
    pub success: bool,
    pub payload: String,
    pub insights: Vec<String>,
    pub data: Option<Value>,
    pub execution_time_ms: u64,
}

impl AgentResult {
    pub fn from_output(
        agent_type: AgentType,
        task_id: StepId,
        output: AgentOutput,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            agent_id: agent_type.as_str().to_string(),
            task_id,
            success: output.success,
            payload: output.payload,
            insights: output.insights,
            data: output.data,
            execution_time_ms,
        }
    }

    pub fn agent_type(&self) -> Option<AgentType> {
        self.agent_id.parse().ok()
    }
}

/// A step (or pipeline stage) that did not produce a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentFailure {
    pub agent_id: String,
    pub message: String,
    pub cause: Option<String>,
}

impl AgentFailure {
    pub fn new(agent_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

impl std::fmt::Display for AgentFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.agent_id, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::entity::EntityType;
    use serde_json::json;

    #[test]
    fn test_step_id_for_order() {
        assert_eq!(StepId::for_order(3).as_str(), "step_3");
    }

    #[test]
    fn test_request_reads_parameters() {
        let mut params = HashMap::new();
        params.insert("query".to_string(), json!("tariff on steel"));
        params.insert(
            "entities".to_string(),
            serde_json::to_value(vec![Entity::new(EntityType::Product, "steel", 0.9)]).unwrap(),
        );
        let request = AgentRequest::new(StepId::for_order(1), AgentType::TariffAnalysis, params);

        assert_eq!(request.query(), "tariff on steel");
        assert_eq!(request.entities().len(), 1);
        assert_eq!(request.parameter_str("intent"), None);
    }

    #[test]
    fn test_request_without_entities_is_empty() {
        let request = AgentRequest::new(
            StepId::for_order(1),
            AgentType::Compliance,
            HashMap::from([("entities".to_string(), json!("not a list"))]),
        );
        assert!(request.entities().is_empty());
        assert_eq!(request.query(), "");
    }

    #[test]
    fn test_result_from_output_records_agent_id() {
        let output = AgentOutput::success("rates").with_insight("25% on steel");
        let result =
            AgentResult::from_output(AgentType::TariffAnalysis, StepId::for_order(1), output, 12);

        assert_eq!(result.agent_id, "tariff_analysis");
        assert_eq!(result.agent_type(), Some(AgentType::TariffAnalysis));
        assert!(result.success);
        assert_eq!(result.insights, vec!["25% on steel".to_string()]);
    }

    #[test]
    fn test_upstream_lookup() {
        let upstream = AgentResult::from_output(
            AgentType::TariffAnalysis,
            StepId::for_order(1),
            AgentOutput::success("ok"),
            1,
        );
        let request = AgentRequest::new(StepId::for_order(2), AgentType::Optimization, HashMap::new())
            .with_upstream(vec![upstream]);

        assert!(request.upstream_from(AgentType::TariffAnalysis).is_some());
        assert!(request.upstream_from(AgentType::Compliance).is_none());
    }
}
