//! # followup-llm
//!
//! The text-generation collaborator used by every followup component.
//!
//! - [`TextGenerator`] - single-turn `complete(request)` abstraction
//! - [`AnthropicClient`] - implementation over the Anthropic Messages API
//! - `ScriptedGenerator` - canned responses for tests (feature `test-util`)

mod anthropic;
mod output;
#[cfg(any(test, feature = "test-util"))]
mod scripted;
mod traits;
mod types;

pub use anthropic::{AnthropicClient, DEFAULT_BASE_URL};
pub use output::Completion;
#[cfg(any(test, feature = "test-util"))]
pub use scripted::ScriptedGenerator;
pub use traits::{CompletionRequest, GenerationConfig, LlmError, TextGenerator, DEFAULT_MODEL};
