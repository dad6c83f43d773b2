//! Progress reporting for plan coordination

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use tradedesk_application::CoordinationProgress;
use tradedesk_domain::{AgentFailure, AgentResult, ExecutionPlan, ExecutionStep};

/// Reports progress during coordination with a progress bar per wave
pub struct ProgressReporter {
    multi: MultiProgress,
    wave_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            wave_bar: Mutex::new(None),
        }
    }

    fn wave_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn finish_wave(&self) {
        if let Ok(mut bar) = self.wave_bar.lock()
            && let Some(pb) = bar.take()
        {
            pb.finish_with_message("done".green().to_string());
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinationProgress for ProgressReporter {
    fn on_plan_ready(&self, plan: &ExecutionPlan) {
        let _ = self.multi.println(format!(
            "{} {} plan with {} step(s)",
            "->".cyan(),
            plan.complexity.as_str().bold(),
            plan.steps.len()
        ));
    }

    fn on_wave_start(&self, wave: usize, steps: &[&ExecutionStep]) {
        self.finish_wave();

        let pb = self.multi.add(ProgressBar::new(steps.len() as u64));
        pb.set_style(Self::wave_style());
        pb.set_prefix(format!("Wave {}", wave + 1));
        pb.set_message("Starting...");

        if let Ok(mut bar) = self.wave_bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_step_start(&self, step: &ExecutionStep) {
        if let Ok(bar) = self.wave_bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            pb.set_message(step.agent_type.display_name());
        }
    }

    fn on_step_complete(&self, step: &ExecutionStep, success: bool) {
        if let Ok(bar) = self.wave_bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), step.agent_type.as_str())
            } else {
                format!("{} {}", "x".red(), step.agent_type.as_str())
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_coordination_complete(&self, _results: &[AgentResult], failures: &[AgentFailure]) {
        self.finish_wave();
        for failure in failures {
            let _ = self
                .multi
                .println(format!("  {} {}", "x".red(), failure));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl CoordinationProgress for SimpleProgress {
    fn on_plan_ready(&self, plan: &ExecutionPlan) {
        println!(
            "{} {} plan ({} steps)",
            "->".cyan(),
            plan.complexity.as_str().bold(),
            plan.steps.len()
        );
    }

    fn on_step_complete(&self, step: &ExecutionStep, success: bool) {
        if success {
            println!("  {} {}", "v".green(), step.agent_type.as_str());
        } else {
            println!("  {} {} (failed)", "x".red(), step.agent_type.as_str());
        }
    }

    fn on_coordination_complete(&self, _results: &[AgentResult], _failures: &[AgentFailure]) {
        println!();
    }
}
