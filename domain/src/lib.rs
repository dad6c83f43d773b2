//! Domain layer for tradedesk
//!
//! This crate contains the core trade-query vocabulary and the pure analysis
//! and planning logic. It has no dependencies on async runtimes,
//! infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Query analysis
//!
//! A free-text question is normalized, then:
//!
//! - **Entity extraction**: countries, products, HS codes, money, percentages, quantities
//! - **Intent scoring**: a primary intent plus secondary intents above a cutoff
//! - **Complexity assessment**: an additive score mapped to LOW / MEDIUM / HIGH
//!
//! ## Planning
//!
//! The analysis selects specialized agents, which become ordered plan steps
//! with a dependency graph. Independent steps form waves that can run
//! concurrently.

pub mod agent;
pub mod analysis;
pub mod config;
pub mod context;
pub mod core;
pub mod plan;
pub mod query;
pub mod session;

// Re-export commonly used types
pub use agent::{
    agent_type::AgentType,
    value_objects::{AgentFailure, AgentOutput, AgentRequest, AgentResult, StepId},
};
pub use analysis::{
    ExtractionError,
    analyzer::{AnalysisMode, QueryAnalyzer},
    assessor::{ComplexityAssessment, ComplexityAssessor},
    extractor::{EntityExtractor, ExtractionRule},
    scorer::{IntentScorer, SECONDARY_INTENT_CUTOFF},
};
pub use config::OutputFormat;
pub use context::{
    ContextualEntity, ContextualMessage, MessageRole, QueryContext, UserContext, UserPreferences,
};
pub use core::error::DomainError;
pub use plan::{
    PlanningError,
    builder::{DependencyMode, PlanBuilder, PlanOutcome, PlanningOptions},
    entities::{
        DependencyKind, ExecutionPlan, ExecutionStep, ResourceRequirement, StepDependency,
    },
};
pub use query::{
    analysis::{QueryAnalysis, QueryValidation},
    complexity::{ComplexityThresholds, ComplexityTier},
    entity::{Entity, EntityType},
    intent::QueryIntent,
};
pub use session::{QueryRequest, QueryResponse};
