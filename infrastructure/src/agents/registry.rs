//! Agent Registry
//!
//! The [`AgentRegistry`] maps each [`AgentType`] to one [`Agent`] and
//! implements [`AgentExecutorPort`], so the coordinator can dispatch plan
//! steps without knowing which implementations are installed.
//!
//! ```ignore
//! let registry = AgentRegistry::with_defaults(&config.agents);
//! assert!(registry.supports(AgentType::TariffAnalysis));
//!
//! // Later registrations replace earlier ones for the same type
//! let registry = registry.register(MyTariffAgent::new());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use tradedesk_application::{AgentError, AgentExecutorPort};
use tradedesk_domain::{AgentOutput, AgentRequest, AgentType};

use super::{
    Agent, ComplianceAgent, MarketAgent, OptimizationAgent, RiskAgent, TariffAgent, TariffTable,
};
use crate::config::FileAgentsConfig;

/// Agent registry that routes requests by agent type
pub struct AgentRegistry {
    agents: HashMap<AgentType, Arc<dyn Agent>>,
}

impl AgentRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
        }
    }

    /// Registry with all five rule-based agents
    pub fn with_defaults(config: &FileAgentsConfig) -> Self {
        Self::new()
            .register(TariffAgent::new(TariffTable::from_config(config)))
            .register(ComplianceAgent::new())
            .register(RiskAgent::new())
            .register(MarketAgent::new())
            .register(OptimizationAgent::new())
    }

    /// Register an agent, replacing any agent of the same type
    pub fn register<A: Agent + 'static>(self, agent: A) -> Self {
        self.register_arc(Arc::new(agent))
    }

    /// Register an agent (Arc version)
    pub fn register_arc(mut self, agent: Arc<dyn Agent>) -> Self {
        let agent_type = agent.agent_type();
        if self.agents.insert(agent_type, agent).is_some() {
            debug!("Replaced agent for {}", agent_type.as_str());
        }
        self
    }

    /// Registered agent types in priority order
    pub fn agent_types(&self) -> Vec<AgentType> {
        let mut types: Vec<AgentType> = self.agents.keys().copied().collect();
        types.sort_by_key(|t| t.priority());
        types
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentExecutorPort for AgentRegistry {
    async fn invoke(&self, request: &AgentRequest) -> Result<AgentOutput, AgentError> {
        let agent = self
            .agents
            .get(&request.agent_type)
            .ok_or(AgentError::NotRegistered(request.agent_type))?;
        debug!(
            "Dispatching step {} to {}",
            request.step_id.as_str(),
            request.agent_type.as_str()
        );
        agent.execute(request).await
    }

    fn supports(&self, agent_type: AgentType) -> bool {
        self.agents.contains_key(&agent_type)
    }
}
