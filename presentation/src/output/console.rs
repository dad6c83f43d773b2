//! Console output formatter for query responses

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use tradedesk_domain::{PlanOutcome, QueryResponse};

/// Formats responses and plans for console display
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Disable ANSI colors for the rest of the process
    pub fn set_color(enabled: bool) {
        if !enabled {
            colored::control::set_override(false);
        }
    }

    /// Answer plus tools used, timing and status
    pub fn format_full(response: &QueryResponse) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Trade Query Results"));
        output.push('\n');

        output.push_str(&Self::section_header("Answer"));
        output.push_str(&format!("\n{}\n", response.response));

        output.push_str(&Self::section_header("Details"));
        let status = if response.success {
            "completed".green().bold()
        } else {
            "degraded".red().bold()
        };
        output.push_str(&format!("\n{} {}\n", "Status:".cyan().bold(), status));
        output.push_str(&format!(
            "{} {}\n",
            "Agents:".cyan().bold(),
            if response.tools_used.is_empty() {
                "none".to_string()
            } else {
                response.tools_used.join(", ")
            }
        ));
        output.push_str(&format!(
            "{} {} ms\n",
            "Time:".cyan().bold(),
            response.processing_time_ms
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Conversation:".cyan().bold(),
            response.conversation_id
        ));

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(response: &QueryResponse) -> String {
        serde_json::to_string_pretty(response).unwrap_or_else(|_| "{}".to_string())
    }

    /// Answer text only (concise output)
    pub fn format_answer(response: &QueryResponse) -> String {
        if response.success {
            response.response.clone()
        } else {
            format!("{}\n{}", "!! Could not complete the query".yellow().bold(), response.response)
        }
    }

    /// Plan preview for `--show-plan`
    pub fn format_plan(outcome: &PlanOutcome) -> String {
        let plan = &outcome.plan;
        let mut output = String::new();

        output.push_str(&format!("{}\n", "=== Execution Plan ===".cyan().bold()));

        if let Some(analysis) = &outcome.analysis {
            output.push_str(&format!(
                "{} {}\n",
                "Intent:".bold(),
                analysis.primary_intent.as_str()
            ));
            if !analysis.secondary_intents.is_empty() {
                let secondary: Vec<&str> = analysis.secondary_intents.iter().map(|i| i.as_str()).collect();
                output.push_str(&format!("{} {}\n", "Also:".bold(), secondary.join(", ")));
            }
            if !analysis.entities.is_empty() {
                let entities: Vec<String> = analysis
                    .entities
                    .iter()
                    .map(|e| format!("{}={}", e.entity_type.as_str(), e.value))
                    .collect();
                output.push_str(&format!("{} {}\n", "Entities:".bold(), entities.join(", ")));
            }
        }
        if let Some(reason) = &outcome.fallback_reason {
            output.push_str(&format!("{} {}\n", "Fallback:".yellow().bold(), reason));
        }

        output.push_str(&format!(
            "{} {} (~{}s)\n\n",
            "Complexity:".bold(),
            plan.complexity.as_str(),
            plan.estimated_duration_seconds
        ));

        match plan.parallel_groups() {
            Ok(waves) => {
                for (index, wave) in waves.iter().enumerate() {
                    output.push_str(&format!("{}\n", format!("Wave {}", index + 1).yellow().bold()));
                    for step in wave {
                        let prerequisites: Vec<String> =
                            plan.prerequisites_of(&step.id).map(|p| p.to_string()).collect();
                        output.push_str(&format!(
                            "  {} {}{}{}\n",
                            step.id,
                            step.agent_type.as_str(),
                            if step.required { " [required]" } else { "" },
                            if prerequisites.is_empty() {
                                String::new()
                            } else {
                                format!(" after {}", prerequisites.join(", "))
                            }
                        ));
                    }
                }
            }
            Err(e) => output.push_str(&format!("{} {}\n", "Invalid plan:".red().bold(), e)),
        }

        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_full(&self, response: &QueryResponse) -> String {
        Self::format_full(response)
    }

    fn format_json(&self, response: &QueryResponse) -> String {
        Self::format_json(response)
    }

    fn format_answer(&self, response: &QueryResponse) -> String {
        Self::format_answer(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradedesk_domain::{OutputFormat, PlanBuilder, PlanningOptions, QueryContext};

    fn response() -> QueryResponse {
        QueryResponse::success(
            "Steel from China carries a 25% tariff.",
            "c1",
            vec!["tariff_analysis".to_string()],
            12,
        )
    }

    #[test]
    fn test_render_dispatches_by_format() {
        colored::control::set_override(false);
        let formatter = ConsoleFormatter;
        let response = response();

        assert_eq!(
            formatter.render(&response, OutputFormat::Answer),
            "Steel from China carries a 25% tariff."
        );

        let full = formatter.render(&response, OutputFormat::Full);
        assert!(full.contains("Agents: tariff_analysis"));
        assert!(full.contains("Time: 12 ms"));
        assert!(full.contains("Status: completed"));

        let json: serde_json::Value =
            serde_json::from_str(&formatter.render(&response, OutputFormat::Json)).unwrap();
        assert_eq!(json["conversation_id"], "c1");
        assert_eq!(json["success"], true);
    }

    #[test]
    fn test_plan_preview_lists_waves() {
        colored::control::set_override(false);
        let builder = PlanBuilder::new(PlanningOptions::default());
        let outcome = builder.build_detailed(
            "Compare the tariffs on electronics from China versus Germany and tell me the cheapest option",
            &QueryContext::minimal("q", "c1"),
        );

        let preview = ConsoleFormatter::format_plan(&outcome);
        assert!(preview.contains("Wave 1"));
        assert!(preview.contains("tariff_analysis [required]"));
        assert!(preview.contains("Complexity:"));
    }
}
