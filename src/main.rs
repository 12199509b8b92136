use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docqa::{
    AnswerEngine, AnswerEngineBuilder, AnthropicClientBuilder, AnthropicError, DocumentStore,
    Session,
};
use tracing_subscriber::EnvFilter;

/// docqa - ask questions about your documents and get cited answers
#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Ask questions about local documents and get answers with citations")]
#[command(version)]
struct Cli {
    /// Model to use instead of ANTHROPIC_MODEL or the default
    #[arg(long, global = true, value_name = "MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Ask a single question about the given files
    Ask(AskCommand),
    /// Start the interactive chat shell
    Chat(ChatCommand),
}

#[derive(Parser)]
struct AskCommand {
    /// The question to ask
    #[arg(value_name = "QUESTION")]
    question: String,

    /// Document to load (repeatable)
    #[arg(short, long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,

    /// Print the answer as JSON instead of delimited text
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct ChatCommand {
    /// Document to preload (repeatable)
    #[arg(short, long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,
}

fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Ask(cmd) => {
            init_stderr_logging();
            handle_ask(cmd, cli.model.as_deref())
        }
        Commands::Chat(cmd) => {
            init_file_logging().and_then(|()| handle_chat(cmd, cli.model.as_deref()))
        }
    };

    if let Err(e) = result {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docqa=info"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Sends logs to a file so they do not draw over the TUI.
fn init_file_logging() -> Result<()> {
    let log_path = docqa::utils::get_log_path()?;
    docqa::utils::ensure_log_directory(&log_path)?;

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// User errors are bad input or missing configuration; everything else is
/// an internal or provider failure.
fn is_user_error(error: &anyhow::Error) -> bool {
    if matches!(
        error.downcast_ref::<AnthropicError>(),
        Some(AnthropicError::MissingApiKey | AnthropicError::InvalidUrl(_))
    ) {
        return true;
    }
    error.to_string().contains("cannot be empty")
}

fn build_engine(model: Option<&str>) -> Result<AnswerEngine> {
    let client = AnthropicClientBuilder::new()
        .build()
        .context("Failed to configure Anthropic client")?;

    let mut builder = AnswerEngineBuilder::new(Arc::new(client));
    if let Some(model) = model {
        builder = builder.model(model);
    }
    Ok(builder.build())
}

fn handle_ask(cmd: &AskCommand, model: Option<&str>) -> Result<()> {
    if cmd.question.trim().is_empty() {
        anyhow::bail!("Question cannot be empty");
    }

    let engine = build_engine(model)?;
    execute_ask(&engine, cmd)
}

/// Runs the ask command against a configured engine.
fn execute_ask(engine: &AnswerEngine, cmd: &AskCommand) -> Result<()> {
    let mut store = DocumentStore::new();
    let added = cmd
        .files
        .iter()
        .filter(|path| store.add_document(path))
        .count();
    eprintln!("Processed {added} of {} document(s)", cmd.files.len());

    let output = if cmd.json {
        engine.ask_json(&store, &cmd.question)
    } else {
        engine.ask(&store, &cmd.question)
    }
    .context("Failed to get an answer")?;

    println!("{output}");
    Ok(())
}

fn handle_chat(cmd: &ChatCommand, model: Option<&str>) -> Result<()> {
    let engine = build_engine(model)?;
    let mut session = Session::new(engine);
    let added = session.add_paths(&cmd.files);
    tracing::info!(added, requested = cmd.files.len(), "preloaded documents");

    docqa::tui::run(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa::anthropic::AnthropicClientTrait;
    use docqa::anthropic::types::{MessageRequest, MessageResponse};

    struct EmptyClient;

    impl AnthropicClientTrait for EmptyClient {
        fn create_message(
            &self,
            _request: &MessageRequest,
        ) -> Result<MessageResponse, AnthropicError> {
            Ok(serde_json::from_str(r#"{"content": []}"#).unwrap())
        }
    }

    fn ask_command(question: &str) -> AskCommand {
        AskCommand {
            question: question.to_string(),
            files: Vec::new(),
            json: false,
        }
    }

    #[test]
    fn question_validation_rejects_whitespace_only() {
        let result = handle_ask(&ask_command("   \n\t  "), None);
        let error = result.unwrap_err();
        assert!(error.to_string().contains("cannot be empty"));
        assert!(is_user_error(&error));
    }

    #[test]
    fn missing_api_key_is_a_user_error() {
        let error = anyhow::Error::new(AnthropicError::MissingApiKey).context("configuring");
        assert!(is_user_error(&error));
    }

    #[test]
    fn provider_failure_is_not_a_user_error() {
        let error = anyhow::Error::new(AnthropicError::Http { status: 500 });
        assert!(!is_user_error(&error));
    }

    #[test]
    fn execute_ask_skips_unreadable_files() {
        let engine = AnswerEngine::new(Arc::new(EmptyClient));
        let cmd = AskCommand {
            question: "q".to_string(),
            files: vec![PathBuf::from("/nonexistent/file.txt")],
            json: true,
        };
        assert!(execute_ask(&engine, &cmd).is_ok());
    }

    #[test]
    fn cli_parses_repeated_files_and_json_flag() {
        let cli = Cli::try_parse_from([
            "docqa", "ask", "--file", "a.txt", "-f", "b.pdf", "--json", "What is RAG?",
        ])
        .unwrap();

        match cli.command {
            Commands::Ask(cmd) => {
                assert_eq!(cmd.files, vec![PathBuf::from("a.txt"), PathBuf::from("b.pdf")]);
                assert!(cmd.json);
                assert_eq!(cmd.question, "What is RAG?");
            }
            Commands::Chat(_) => panic!("expected ask command"),
        }
    }

    #[test]
    fn cli_accepts_global_model_after_subcommand() {
        let cli = Cli::try_parse_from(["docqa", "chat", "--model", "claude-test"]).unwrap();
        assert_eq!(cli.model.as_deref(), Some("claude-test"));
        assert!(matches!(cli.command, Commands::Chat(ref c) if c.files.is_empty()));
    }
}
