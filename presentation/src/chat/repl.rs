//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::ConsoleFormatter;
use crate::ProgressReporter;
use crate::output::formatter::OutputFormatter;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;
use std::sync::Arc;
use tradedesk_application::{AgentExecutorPort, ContextStorePort, ProcessQueryUseCase};
use tradedesk_domain::{OutputFormat, QueryRequest};

/// What a slash command asks the loop to do next.
#[derive(Debug, PartialEq)]
enum CommandAction {
    Continue,
    Exit,
    NewConversation,
    SetFormat(OutputFormat),
    ShowPlan(String),
}

/// Interactive chat REPL
///
/// Every question in a session shares one conversation, so follow-ups like
/// "what about the steel we discussed?" resolve against earlier answers.
pub struct ChatRepl<A: AgentExecutorPort + 'static, C: ContextStorePort + 'static> {
    use_case: Arc<ProcessQueryUseCase<A, C>>,
    user_id: String,
    conversation_id: Option<String>,
    format: OutputFormat,
    show_progress: bool,
    show_plan: bool,
    history_file: Option<PathBuf>,
    prompt: String,
}

impl<A: AgentExecutorPort + 'static, C: ContextStorePort + 'static> ChatRepl<A, C> {
    /// Create a new ChatRepl
    pub fn new(use_case: Arc<ProcessQueryUseCase<A, C>>, user_id: impl Into<String>) -> Self {
        Self {
            use_case,
            user_id: user_id.into(),
            conversation_id: None,
            format: OutputFormat::Answer,
            show_progress: true,
            show_plan: false,
            history_file: None,
            prompt: "trade> ".to_string(),
        }
    }

    /// Resume an existing conversation
    pub fn with_conversation(mut self, conversation_id: Option<String>) -> Self {
        self.conversation_id = conversation_id;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set whether to show progress
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Print the execution plan before each answer
    pub fn with_plan_preview(mut self, show: bool) -> Self {
        self.show_plan = show;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Override the history file location
    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        self.history_file = path;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = self
            .history_file
            .clone()
            .or_else(|| dirs::data_dir().map(|p| p.join("tradedesk").join("history.txt")));

        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            let readline = rl.readline(&self.prompt);

            match readline {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        match parse_command(line) {
                            CommandAction::Exit => {
                                println!("Bye!");
                                break;
                            }
                            CommandAction::NewConversation => {
                                self.conversation_id = None;
                                println!("Started a new conversation.");
                            }
                            CommandAction::SetFormat(format) => {
                                self.format = format;
                                println!("Output format: {}", format.as_str());
                            }
                            CommandAction::ShowPlan(query) => {
                                let outcome = self.use_case.preview_plan(&query);
                                println!("{}", ConsoleFormatter::format_plan(&outcome));
                            }
                            CommandAction::Continue => {}
                        }
                        continue;
                    }

                    let _ = rl.add_history_entry(line);

                    self.process_query(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│            tradedesk - Chat Mode            │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("User: {}", self.user_id);
        if let Some(id) = &self.conversation_id {
            println!("Conversation: {}", id);
        }
        println!();
        print_help();
    }

    async fn process_query(&mut self, query: &str) {
        println!();

        if self.show_plan {
            println!("{}", ConsoleFormatter::format_plan(&self.use_case.preview_plan(query)));
        }

        let mut request = QueryRequest::new(query, self.user_id.clone());
        if let Some(id) = &self.conversation_id {
            request = request.with_conversation_id(id.clone());
        }

        let response = if self.show_progress {
            let progress = ProgressReporter::new();
            self.use_case.execute_with_progress(request, &progress).await
        } else {
            self.use_case.execute(request).await
        };

        self.conversation_id = Some(response.conversation_id.clone());
        println!("{}", ConsoleFormatter.render(&response, self.format));
        println!();
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /help, /h, /?      - Show this help");
    println!("  /new               - Start a new conversation");
    println!("  /format <format>   - Switch output (answer, full, json)");
    println!("  /plan <question>   - Show the execution plan without running it");
    println!("  /quit, /exit, /q   - Exit chat");
    println!();
}

/// Parse a slash command, printing help or errors as a side effect.
fn parse_command(line: &str) -> CommandAction {
    let (command, argument) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "/quit" | "/exit" | "/q" => CommandAction::Exit,
        "/help" | "/h" | "/?" => {
            println!();
            print_help();
            CommandAction::Continue
        }
        "/new" => CommandAction::NewConversation,
        "/format" => match argument.parse::<OutputFormat>() {
            Ok(format) => CommandAction::SetFormat(format),
            Err(e) => {
                println!("{}", e);
                CommandAction::Continue
            }
        },
        "/plan" if !argument.is_empty() => CommandAction::ShowPlan(argument.to_string()),
        "/plan" => {
            println!("Usage: /plan <question>");
            CommandAction::Continue
        }
        _ => {
            println!("Unknown command: {}", command);
            println!("Type /help for available commands");
            CommandAction::Continue
        }
    }
}
