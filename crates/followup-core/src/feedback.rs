use std::sync::Arc;
use std::time::Instant;

use followup_llm::{GenerationConfig, TextGenerator};
use followup_logging::{LogEvent, Logger};
use tracing::{debug, warn};

use crate::{Exchange, InterviewError, InterviewPrompts, SessionStore};

/// Output cap for feedback responses
pub const FEEDBACK_MAX_TOKENS: u32 = 1024;

/// Produces structured feedback on an answer and seeds session history
pub struct FeedbackGenerator<'a> {
    generator: &'a dyn TextGenerator,
    store: Arc<SessionStore>,
    logger: Arc<Logger>,
    config: GenerationConfig,
}

impl<'a> FeedbackGenerator<'a> {
    pub fn new(
        generator: &'a dyn TextGenerator,
        store: Arc<SessionStore>,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            generator,
            store,
            logger,
            config: GenerationConfig::new(FEEDBACK_MAX_TOKENS),
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    /// Evaluate `answer` to `question` and record the exchange.
    ///
    /// Returns the provider's text verbatim (trimmed). A remote failure
    /// yields `Ok(None)` and records nothing.
    pub async fn evaluate(
        &self,
        question: &str,
        answer: &str,
        session_key: &str,
    ) -> Result<Option<String>, InterviewError> {
        if question.trim().is_empty() || answer.trim().is_empty() {
            return Err(InterviewError::InvalidInput(
                "both question and answer are required".to_string(),
            ));
        }

        self.logger.log(&LogEvent::FeedbackStarted {
            session: session_key.to_string(),
            question_preview: question.chars().take(100).collect(),
        });

        let start = Instant::now();
        let request = self.config.request(
            InterviewPrompts::FEEDBACK_SYSTEM,
            InterviewPrompts::build_feedback_prompt(question, answer),
        );
        debug!(session = session_key, model = %request.model, "Requesting feedback");

        match self.generator.complete(&request).await {
            Ok(completion) => {
                let exchanges = self
                    .store
                    .append(session_key, Exchange::new(question, answer));

                self.logger.log(&LogEvent::FeedbackCompleted {
                    session: session_key.to_string(),
                    exchanges,
                    duration_secs: start.elapsed().as_secs_f64(),
                });

                Ok(Some(completion.trimmed().to_string()))
            }
            Err(e) => {
                warn!(session = session_key, error = %e, "Error generating feedback");
                self.logger.log(&LogEvent::FeedbackFailed {
                    session: session_key.to_string(),
                    error: e.to_string(),
                });
                Ok(None)
            }
        }
    }
}
