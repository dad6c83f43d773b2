//! Execution planning.
//!
//! - [`entities`]: plans, steps, dependencies and resource requirements
//! - [`schedule`]: topological wave scheduling over step dependencies
//! - [`builder::PlanBuilder`]: turns a query into a plan (never fails)

pub mod builder;
pub mod entities;
pub mod schedule;

use crate::agent::value_objects::StepId;
use thiserror::Error;

/// Why a plan could not be built or is malformed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanningError {
    #[error("Query is empty")]
    EmptyQuery,

    #[error("Query is too long ({length} characters, limit {max})")]
    QueryTooLong { length: usize, max: usize },

    #[error("Plan needs {count} steps but the limit is {max}")]
    TooManySteps { count: usize, max: usize },

    #[error("Plan has no steps")]
    NoSteps,

    #[error("Step orders are not dense 1..N")]
    NonDenseOrder,

    #[error("Dependency references unknown step {0}")]
    UnknownStep(StepId),

    #[error("Dependency cycle involving {0}")]
    CycleDetected(StepId),
}
