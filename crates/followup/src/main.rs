use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use secrecy::SecretString;

use followup_core::{InterviewError, SessionStore};
use followup_llm::AnthropicClient;
use followup_logging::{init_tracing, LogFormat, Logger};

mod config;
mod interview;

use config::{ProjectConfig, Settings};
use interview::{print_feedback, InterviewOptions, Interviewer, TerminalAnswers};

const DEFAULT_OPENING_QUESTION: &str = "Tell me about your recent product";

#[derive(Parser, Debug)]
#[command(
    name = "followup",
    about = "Interview feedback and quality-gated follow-up questions",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory to look for followup.toml in (default: current directory)
    #[arg(short = 'd', long, global = true)]
    working_dir: Option<PathBuf>,

    /// Model for every call (overrides followup.toml)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Diagnostic log level (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log_format: LogFormatChoice,

    /// Also write diagnostic logs to this file (JSON lines)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Append interview events to this file (JSON lines)
    #[arg(long, global = true)]
    events_file: Option<PathBuf>,

    /// Show the resolved configuration without calling the provider
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run an interactive interview
    Interview {
        /// Opening question
        #[arg(short, long, default_value = DEFAULT_OPENING_QUESTION)]
        question: String,

        /// Number of follow-up rounds
        #[arg(short = 'n', long, default_value_t = 10)]
        rounds: usize,

        /// Session id (default: random)
        #[arg(short, long)]
        session: Option<String>,

        /// Generate feedback for every answer, not only the first
        #[arg(long)]
        feedback_every_answer: bool,

        /// Print the transcript as JSON when done
        #[arg(long)]
        json_output: bool,
    },

    /// Get feedback on a single answer
    Feedback {
        /// Interview question
        #[arg(short, long)]
        question: String,

        /// Candidate's answer
        #[arg(short, long)]
        answer: String,

        /// Print the raw feedback as JSON
        #[arg(long)]
        json_output: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    let _log_guard = init_tracing(&cli.log_level, log_format, cli.log_file.as_deref())
        .context("Failed to initialize logging")?;

    match run(cli, log_format).await {
        Ok(()) => Ok(()),
        Err(e) => match exit_code(&e) {
            Some(code) => {
                eprintln!("Error: {:#}", e);
                std::process::exit(code);
            }
            None => Err(e),
        },
    }
}

/// Exit code for errors caused by the user's input
fn exit_code(err: &anyhow::Error) -> Option<i32> {
    match err.downcast_ref::<InterviewError>() {
        Some(InterviewError::InvalidInput(_)) => Some(2),
        _ => None,
    }
}

async fn run(cli: Cli, log_format: LogFormat) -> Result<()> {
    let working_dir = match cli.working_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let loaded = ProjectConfig::load(&working_dir)?;
    let config_path = loaded.as_ref().map(|(_, path)| path.clone());
    let config = loaded.map(|(config, _)| config).unwrap_or_default();
    let settings = Settings::resolve(&config, cli.model.as_deref());

    if cli.dry_run {
        print_dry_run(&settings, config_path.as_deref());
        return Ok(());
    }

    let api_key = cli
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .context("No API key. Set ANTHROPIC_API_KEY or pass --api-key")?;
    let client = AnthropicClient::new(SecretString::from(api_key), settings.request_timeout)?
        .with_base_url(settings.api_base_url.clone());

    let logger = Arc::new(match cli.events_file {
        Some(ref path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open events file {}", path.display()))?,
        None => Logger::new(log_format),
    });
    let store = Arc::new(SessionStore::new());
    let interviewer = Interviewer::new(&client, &settings, store, logger);

    match cli.command {
        Command::Interview {
            question,
            rounds,
            session,
            feedback_every_answer,
            json_output,
        } => {
            let options = InterviewOptions {
                opening_question: question,
                rounds,
                session: session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                feedback_every_answer,
                json_output,
            };

            // Handle Ctrl+C between rounds
            let interrupted = Arc::new(AtomicBool::new(false));
            let handle = interrupted.clone();
            ctrlc::set_handler(move || {
                if handle.swap(true, Ordering::SeqCst) {
                    std::process::exit(130);
                }
                eprintln!("\nInterrupted. Finishing current round...");
            })
            .context("Failed to set Ctrl+C handler")?;

            let transcript = interviewer
                .run(&options, &TerminalAnswers, &interrupted)
                .await?;
            if options.json_output {
                println!("{}", serde_json::to_string_pretty(&transcript)?);
            }
        }
        Command::Feedback {
            question,
            answer,
            json_output,
        } => {
            let session = uuid::Uuid::new_v4().to_string();
            let feedback = interviewer
                .feedback_once(&question, &answer, &session)
                .await?
                .context("Feedback unavailable (provider request failed)")?;

            if json_output {
                let value = serde_json::json!({ "session": session, "feedback": feedback });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                print_feedback(&feedback);
            }
        }
    }

    Ok(())
}

fn print_dry_run(settings: &Settings, config_path: Option<&std::path::Path>) {
    println!("=== Dry Run ===");
    match config_path {
        Some(path) => println!("Config: {}", path.display()),
        None => println!("Config: none (built-in defaults)"),
    }
    println!("API: {}", settings.api_base_url);
    println!("Timeout: {}s", settings.request_timeout.as_secs());
    println!(
        "Feedback: {} (max {} tokens)",
        settings.feedback.model, settings.feedback.max_tokens
    );
    println!(
        "Follow-up: {} (max {} tokens)",
        settings.follow_up.model, settings.follow_up.max_tokens
    );
    println!(
        "Gate: {} (relevance >= {}, quality >= {})",
        settings.gate.relevance.model, settings.gate.min_relevance, settings.gate.min_quality
    );
    println!("Max attempts: {}", settings.max_attempts);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_interview_defaults() {
        let cli = Cli::try_parse_from(["followup", "interview"]).unwrap();
        match cli.command {
            Command::Interview {
                question,
                rounds,
                session,
                ..
            } => {
                assert_eq!(question, DEFAULT_OPENING_QUESTION);
                assert_eq!(rounds, 10);
                assert!(session.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "followup",
            "feedback",
            "-q",
            "Why?",
            "-a",
            "Because",
            "--model",
            "claude-test",
            "--log-format",
            "json",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.model.as_deref(), Some("claude-test"));
        assert!(cli.dry_run);
        assert!(matches!(cli.log_format, LogFormatChoice::Json));
    }

    #[test]
    fn test_invalid_input_exits_with_code_two() {
        let err = anyhow::Error::from(InterviewError::InvalidInput("empty answer".into()));
        assert_eq!(exit_code(&err), Some(2));

        let wrapped = err.context("Feedback failed");
        assert_eq!(exit_code(&wrapped), Some(2));
    }

    #[test]
    fn test_other_errors_use_default_exit() {
        let err = anyhow::Error::from(InterviewError::EmptySession("s1".into()));
        assert_eq!(exit_code(&err), None);
        assert_eq!(exit_code(&anyhow::anyhow!("No API key")), None);
    }

    #[test]
    fn test_feedback_requires_answer() {
        assert!(Cli::try_parse_from(["followup", "feedback", "-q", "Why?"]).is_err());
    }
}
