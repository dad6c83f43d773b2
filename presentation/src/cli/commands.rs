//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;
use tradedesk_domain::OutputFormat;

/// CLI arguments for tradedesk
#[derive(Parser, Debug)]
#[command(name = "tradedesk")]
#[command(author, version, about = "Trade query assistant - tariffs, compliance, risk and sourcing")]
#[command(long_about = r#"
tradedesk answers free-text trade questions by planning a set of specialized
agents and combining their results into one answer.

Each query is:
1. Analyzed: entities, intent and complexity are extracted
2. Planned: agents are selected and ordered by their data dependencies
3. Coordinated: independent agents run concurrently
4. Synthesized: results are combined into a single answer

Configuration files are loaded from (in priority order):
1. TRADEDESK_* environment variables
2. --config <path>         Explicit config file
3. ./tradedesk.toml        Project-level config
4. ~/.config/tradedesk/config.toml   Global config

Example:
  tradedesk "What's the tariff for importing steel from China to USA?"
  tradedesk --show-plan "Compare the tariffs on electronics from China versus Germany"
  tradedesk --chat --user trader-1
"#)]
pub struct Cli {
    /// The trade question (not required in chat mode)
    pub query: Option<String>,

    /// User the conversation belongs to
    #[arg(short, long, value_name = "ID", default_value = "anonymous")]
    pub user: String,

    /// Continue an existing conversation
    #[arg(long, value_name = "ID")]
    pub conversation: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Output format: answer, full or json [default: config or answer]
    #[arg(short, long, value_name = "FORMAT")]
    pub output: Option<OutputFormat>,

    /// Print the execution plan before running it
    #[arg(long)]
    pub show_plan: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Tracing filter directive for the `-v` count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_query() {
        let cli = Cli::try_parse_from(["tradedesk", "tariff on steel from China"]).unwrap();
        assert_eq!(cli.query.as_deref(), Some("tariff on steel from China"));
        assert_eq!(cli.user, "anonymous");
        assert!(cli.output.is_none());
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "tradedesk",
            "--chat",
            "--user",
            "trader-1",
            "--conversation",
            "c1",
            "-o",
            "json",
            "--show-plan",
            "-vv",
            "--no-config",
        ])
        .unwrap();
        assert!(cli.chat);
        assert_eq!(cli.user, "trader-1");
        assert_eq!(cli.conversation.as_deref(), Some("c1"));
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert!(cli.show_plan);
        assert_eq!(cli.log_level(), "debug");
        assert!(cli.no_config);
    }

    #[test]
    fn test_rejects_unknown_output_format() {
        assert!(Cli::try_parse_from(["tradedesk", "-o", "xml", "q"]).is_err());
    }
}
