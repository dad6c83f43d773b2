//! CLI entrypoint for tradedesk
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use tradedesk_application::ProcessQueryUseCase;
use tradedesk_domain::{OutputFormat, QueryRequest};
use tradedesk_infrastructure::{
    AgentRegistry, ConfigLoader, FileConfig, InMemoryContextStore, JsonlQueryLogger,
    PrioritySynthesizer,
};
use tradedesk_presentation::{
    ChatRepl, Cli, ConsoleFormatter, OutputFormatter, ProgressReporter, SimpleProgress,
};

/// Initialize tracing: stderr always, plus a daily-rotated file when configured.
///
/// The returned guard must stay alive for the file writer to flush.
fn init_logging(cli: &Cli, config: &FileConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::new(cli.log_level());
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr));

    match &config.logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "tradedesk.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    let _log_guard = init_logging(&cli, &file_config);
    info!("Starting tradedesk");

    let orchestrator_config = file_config
        .to_orchestrator_config()
        .context("Invalid configuration")?;
    let format = cli
        .output
        .or(file_config.output.format)
        .unwrap_or_default();
    ConsoleFormatter::set_color(file_config.output.color);

    // === Dependency Injection ===
    let context_store = Arc::new(InMemoryContextStore::new(
        file_config.context.max_history,
        file_config.context.retention_hours,
    ));
    let registry = Arc::new(AgentRegistry::with_defaults(&file_config.agents));

    let mut use_case = ProcessQueryUseCase::new(registry, context_store, &orchestrator_config)
        .with_synthesizer(Arc::new(PrioritySynthesizer::new()));

    if let Some(path) = &file_config.logging.query_log {
        match JsonlQueryLogger::new(path) {
            Some(logger) => {
                info!("Query events logged to {}", logger.path().display());
                use_case = use_case.with_query_logger(Arc::new(logger));
            }
            None => warn!("Query log disabled; could not open {}", path),
        }
    }

    // Chat mode
    if cli.chat {
        let mut repl = ChatRepl::new(Arc::new(use_case), cli.user.clone())
            .with_conversation(cli.conversation.clone())
            .with_format(format)
            .with_progress(!cli.quiet && file_config.repl.show_progress)
            .with_plan_preview(cli.show_plan || file_config.output.show_plan)
            .with_prompt(file_config.repl.prompt.clone())
            .with_history_file(file_config.repl.history_file.as_ref().map(PathBuf::from));

        repl.run().await?;
        return Ok(());
    }

    // Single query mode - query is required
    let query = match &cli.query {
        Some(q) => q.clone(),
        None => bail!("A query is required. Use --chat for interactive mode."),
    };

    if cli.show_plan || file_config.output.show_plan {
        println!("{}", ConsoleFormatter::format_plan(&use_case.preview_plan(&query)));
    }

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });
    let use_case = use_case.with_cancellation(token);

    let mut request = QueryRequest::new(query, cli.user.clone());
    if let Some(id) = &cli.conversation {
        request = request.with_conversation_id(id.clone());
    }

    // Progress goes to the terminal only, never into JSON output
    let response = if cli.quiet || format == OutputFormat::Json {
        use_case.execute(request).await
    } else if std::io::stderr().is_terminal() {
        let progress = ProgressReporter::new();
        use_case.execute_with_progress(request, &progress).await
    } else {
        use_case.execute_with_progress(request, &SimpleProgress).await
    };

    println!("{}", ConsoleFormatter.render(&response, format));

    Ok(())
}
