use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Structured log events for feedback and follow-up generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    FeedbackStarted {
        session: String,
        question_preview: String,
    },
    FeedbackCompleted {
        session: String,
        exchanges: usize,
        duration_secs: f64,
    },
    FeedbackFailed {
        session: String,
        error: String,
    },
    FollowUpStarted {
        session: String,
        exchanges: usize,
        max_attempts: usize,
    },
    CandidateProposed {
        session: String,
        attempt: usize,
        question: String,
    },
    GateCompleted {
        session: String,
        attempt: usize,
        valid: bool,
        decision: String,
    },
    FollowUpAccepted {
        session: String,
        attempts: usize,
    },
    AttemptsExhausted {
        session: String,
        attempts: usize,
    },
    FollowUpAborted {
        session: String,
        attempt: usize,
        error: String,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors and visual structure
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Event logger - renders to stderr and optionally appends JSON lines to a file
pub struct Logger {
    format: LogFormat,
    console: bool,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            console: true,
            file_writer: None,
        }
    }

    /// A logger that renders nothing
    pub fn silent() -> Self {
        Self {
            format: LogFormat::Compact,
            console: false,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            console: true,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        if !self.console {
            return;
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::FeedbackStarted {
                question_preview, ..
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "  {} {} {}",
                    "▶".bright_cyan(),
                    "FEEDBACK".bright_cyan().bold(),
                    Self::truncate(question_preview, 60).dimmed()
                );
            }
            LogEvent::FeedbackCompleted { duration_secs, .. } => {
                let _ = writeln!(
                    stderr,
                    "    {} Done ({:.1}s)",
                    "✓".bright_green(),
                    duration_secs
                );
            }
            LogEvent::FeedbackFailed { error, .. } => {
                let _ = writeln!(
                    stderr,
                    "    {} Feedback unavailable: {}",
                    "✗".bright_red(),
                    error.bright_red()
                );
            }
            LogEvent::FollowUpStarted {
                exchanges,
                max_attempts,
                ..
            } => {
                let header = format!("─ Follow-up after {} exchange(s) ", exchanges);
                let padding = "─".repeat(67usize.saturating_sub(header.chars().count()));
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{}{}{}",
                    "┌".bright_blue(),
                    header.bright_blue().bold(),
                    padding.bright_blue()
                );
                let _ = writeln!(
                    stderr,
                    "  {} up to {} attempts",
                    "▶".bright_magenta(),
                    max_attempts
                );
            }
            LogEvent::CandidateProposed {
                attempt, question, ..
            } => {
                let _ = writeln!(
                    stderr,
                    "    {} #{} {}",
                    "│".dimmed(),
                    attempt,
                    Self::truncate(question, 70)
                );
            }
            LogEvent::GateCompleted {
                valid, decision, ..
            } => {
                let styled = if *valid {
                    format!("✓ {}", decision).bright_green().to_string()
                } else {
                    format!("→ {}", decision).bright_yellow().to_string()
                };
                let _ = writeln!(stderr, "    {} {}", "│".dimmed(), styled);
            }
            LogEvent::FollowUpAccepted { attempts, .. } => {
                let _ = writeln!(
                    stderr,
                    "{} accepted after {} attempt(s)",
                    "└".bright_blue(),
                    attempts
                );
            }
            LogEvent::AttemptsExhausted { attempts, .. } => {
                let _ = writeln!(
                    stderr,
                    "{} {} No candidate passed after {} attempts, using the last one",
                    "└".bright_blue(),
                    "⚠".bright_yellow(),
                    attempts
                );
            }
            LogEvent::FollowUpAborted { attempt, error, .. } => {
                let _ = writeln!(
                    stderr,
                    "{} {} Generation failed on attempt {}: {}",
                    "└".bright_blue(),
                    "✗".bright_red(),
                    attempt,
                    error.bright_red()
                );
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::FeedbackStarted { session, .. } => {
                format!("[{}] feedback:start {}", timestamp, session)
            }
            LogEvent::FeedbackCompleted {
                session,
                exchanges,
                duration_secs,
            } => format!(
                "[{}] feedback:done {} exchanges={} {:.1}s",
                timestamp, session, exchanges, duration_secs
            ),
            LogEvent::FeedbackFailed { session, error } => {
                format!("[{}] feedback:error {} {}", timestamp, session, error)
            }
            LogEvent::FollowUpStarted {
                session, exchanges, ..
            } => format!(
                "[{}] followup:start {} exchanges={}",
                timestamp, session, exchanges
            ),
            LogEvent::CandidateProposed {
                attempt, question, ..
            } => format!("[{}] candidate:{} {}", timestamp, attempt, question),
            LogEvent::GateCompleted {
                attempt, decision, ..
            } => format!("[{}] gate:{} {}", timestamp, attempt, decision),
            LogEvent::FollowUpAccepted { session, attempts } => format!(
                "[{}] followup:accepted {} attempts={}",
                timestamp, session, attempts
            ),
            LogEvent::AttemptsExhausted { session, attempts } => format!(
                "[{}] followup:exhausted {} attempts={}",
                timestamp, session, attempts
            ),
            LogEvent::FollowUpAborted {
                session,
                attempt,
                error,
            } => format!(
                "[{}] followup:error {} attempt={} {}",
                timestamp, session, attempt, error
            ),
        };
        let _ = writeln!(stderr, "{}", msg);
    }

    fn truncate(s: &str, max_chars: usize) -> String {
        if s.chars().count() > max_chars {
            let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
            format!("{}...", head)
        } else {
            s.to_string()
        }
    }
}
