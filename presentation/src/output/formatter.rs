//! Output formatter trait

use tradedesk_domain::{OutputFormat, QueryResponse};

/// Trait for formatting query responses
pub trait OutputFormatter {
    /// Answer with tools, timing and status
    fn format_full(&self, response: &QueryResponse) -> String;

    /// Format as JSON
    fn format_json(&self, response: &QueryResponse) -> String;

    /// Answer text only (concise output)
    fn format_answer(&self, response: &QueryResponse) -> String;

    fn render(&self, response: &QueryResponse, format: OutputFormat) -> String {
        match format {
            OutputFormat::Answer => self.format_answer(response),
            OutputFormat::Full => self.format_full(response),
            OutputFormat::Json => self.format_json(response),
        }
    }
}
