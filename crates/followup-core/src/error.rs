use thiserror::Error;

/// Contract violations surfaced to the caller.
///
/// Remote failures never appear here; they are absorbed by the component
/// that observed them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterviewError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No conversation history found for session '{0}'")]
    EmptySession(String),
}
