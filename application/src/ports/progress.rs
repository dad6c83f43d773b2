//! Progress notification port
//!
//! Defines the interface for reporting progress while a plan executes.

use tradedesk_domain::{AgentFailure, AgentResult, ExecutionPlan, ExecutionStep};

/// Callback for progress updates during query processing
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.)
pub trait CoordinationProgress: Send + Sync {
    /// Called once the plan is known
    fn on_plan_ready(&self, _plan: &ExecutionPlan) {}

    /// Called when a wave of independent steps starts
    fn on_wave_start(&self, _wave: usize, _steps: &[&ExecutionStep]) {}

    /// Called when a step is dispatched
    fn on_step_start(&self, _step: &ExecutionStep) {}

    /// Called when a step finishes, skips or fails
    fn on_step_complete(&self, _step: &ExecutionStep, _success: bool) {}

    /// Called when coordination ends, successfully or not
    fn on_coordination_complete(&self, _results: &[AgentResult], _failures: &[AgentFailure]) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl CoordinationProgress for NoProgress {}
