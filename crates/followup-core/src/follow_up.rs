use std::sync::Arc;

use followup_gate::{GateConfig, QualityGate, QualityVerdict};
use followup_llm::{GenerationConfig, LlmError, TextGenerator};
use followup_logging::{LogEvent, Logger};
use tracing::{debug, info, warn};

use crate::{Exchange, FollowUpOutcome, InterviewError, InterviewPrompts, SessionStore};

/// Default cap on propose/gate cycles
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Output cap for a proposed question
pub const FOLLOW_UP_MAX_TOKENS: u32 = 150;

/// States of the bounded propose/gate loop.
///
/// `attempts` counts completed cycles.
#[derive(Debug, Clone, PartialEq)]
pub enum FollowUpState {
    Proposing {
        attempts: usize,
    },
    Gating {
        attempts: usize,
        candidate: String,
    },
    Retrying {
        attempts: usize,
        verdict: QualityVerdict,
    },
    Accepted {
        attempts: usize,
        candidate: String,
        verdict: QualityVerdict,
    },
    Exhausted {
        attempts: usize,
        candidate: String,
        verdict: QualityVerdict,
    },
}

impl FollowUpState {
    pub fn initial() -> Self {
        Self::Proposing { attempts: 0 }
    }

    /// Transition out of `Gating` once the verdict is in
    pub fn after_verdict(
        attempts: usize,
        max_attempts: usize,
        candidate: String,
        verdict: QualityVerdict,
    ) -> Self {
        let attempts = attempts + 1;
        if verdict.valid {
            Self::Accepted {
                attempts,
                candidate,
                verdict,
            }
        } else if attempts < max_attempts {
            Self::Retrying { attempts, verdict }
        } else {
            Self::Exhausted {
                attempts,
                candidate,
                verdict,
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted { .. } | Self::Exhausted { .. })
    }
}

/// Context shared by every proposal within one `next_question` call
struct ProposalContext<'h> {
    anchor: &'h Exchange,
    latest: &'h Exchange,
    answers: Vec<&'h str>,
}

/// Generates quality-gated follow-up questions from session history
pub struct FollowUpGenerator<'a> {
    generator: &'a dyn TextGenerator,
    gate: QualityGate<'a>,
    store: Arc<SessionStore>,
    logger: Arc<Logger>,
    config: GenerationConfig,
    max_attempts: usize,
}

impl<'a> FollowUpGenerator<'a> {
    pub fn new(
        generator: &'a dyn TextGenerator,
        store: Arc<SessionStore>,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            generator,
            gate: QualityGate::new(generator),
            store,
            logger,
            config: GenerationConfig::new(FOLLOW_UP_MAX_TOKENS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_gate_config(mut self, config: GateConfig) -> Self {
        self.gate = QualityGate::with_config(self.generator, config);
        self
    }

    /// Cap the number of propose/gate cycles (at least one)
    pub fn with_max_attempts(mut self, max: usize) -> Self {
        self.max_attempts = max.max(1);
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Propose the next interview question for `session_key`.
    ///
    /// The question is not added to the session; the caller records it
    /// together with the answer it receives. On exhaustion the last
    /// candidate is returned even though it failed the gate.
    pub async fn next_question(
        &self,
        session_key: &str,
    ) -> Result<FollowUpOutcome, InterviewError> {
        let history = self
            .store
            .history(session_key)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| InterviewError::EmptySession(session_key.to_string()))?;

        let context = ProposalContext {
            anchor: &history[0],
            latest: &history[history.len() - 1],
            answers: history.iter().map(Exchange::answer).collect(),
        };

        self.logger.log(&LogEvent::FollowUpStarted {
            session: session_key.to_string(),
            exchanges: history.len(),
            max_attempts: self.max_attempts,
        });

        let mut state = FollowUpState::initial();
        loop {
            state = match state {
                FollowUpState::Proposing { attempts } => match self.propose(&context).await {
                    Ok(candidate) => {
                        self.logger.log(&LogEvent::CandidateProposed {
                            session: session_key.to_string(),
                            attempt: attempts + 1,
                            question: candidate.clone(),
                        });
                        FollowUpState::Gating {
                            attempts,
                            candidate,
                        }
                    }
                    Err(e) => {
                        warn!(session = session_key, error = %e, "Error generating follow-up question");
                        self.logger.log(&LogEvent::FollowUpAborted {
                            session: session_key.to_string(),
                            attempt: attempts + 1,
                            error: e.to_string(),
                        });
                        return Ok(FollowUpOutcome::aborted(attempts, e.to_string()));
                    }
                },
                FollowUpState::Gating {
                    attempts,
                    candidate,
                } => {
                    let verdict = self
                        .gate
                        .assess(context.latest.question(), context.latest.answer(), &candidate)
                        .await;

                    self.logger.log(&LogEvent::GateCompleted {
                        session: session_key.to_string(),
                        attempt: attempts + 1,
                        valid: verdict.valid,
                        decision: verdict.short_description(),
                    });

                    FollowUpState::after_verdict(attempts, self.max_attempts, candidate, verdict)
                }
                FollowUpState::Retrying { attempts, verdict } => {
                    debug!(
                        session = session_key,
                        attempts,
                        reason = %verdict.reason,
                        "Candidate rejected, proposing again"
                    );
                    FollowUpState::Proposing { attempts }
                }
                FollowUpState::Accepted {
                    attempts,
                    candidate,
                    verdict,
                } => {
                    self.logger.log(&LogEvent::FollowUpAccepted {
                        session: session_key.to_string(),
                        attempts,
                    });
                    return Ok(FollowUpOutcome::accepted(candidate, attempts, verdict));
                }
                FollowUpState::Exhausted {
                    attempts,
                    candidate,
                    verdict,
                } => {
                    info!(
                        session = session_key,
                        attempts, "No candidate passed the quality gate, returning the last one"
                    );
                    self.logger.log(&LogEvent::AttemptsExhausted {
                        session: session_key.to_string(),
                        attempts,
                    });
                    return Ok(FollowUpOutcome::exhausted(candidate, attempts, verdict));
                }
            };
        }
    }

    async fn propose(&self, context: &ProposalContext<'_>) -> Result<String, LlmError> {
        let prompt = InterviewPrompts::build_follow_up_prompt(
            context.anchor.question(),
            context.latest.question(),
            context.latest.answer(),
            &context.answers,
        );
        let request = self
            .config
            .request(InterviewPrompts::FOLLOW_UP_SYSTEM, prompt);
        let completion = self.generator.complete(&request).await?;
        Ok(completion.trimmed().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_verdict_accepts() {
        let state = FollowUpState::after_verdict(
            0,
            DEFAULT_MAX_ATTEMPTS,
            "Why?".into(),
            QualityVerdict::accepted(8, 7),
        );
        assert!(matches!(state, FollowUpState::Accepted { attempts: 1, .. }));
        assert!(state.is_terminal());
    }

    #[test]
    fn test_rejection_below_cap_retries() {
        let state = FollowUpState::after_verdict(
            3,
            DEFAULT_MAX_ATTEMPTS,
            "Why?".into(),
            QualityVerdict::low_relevance(2),
        );
        assert!(matches!(state, FollowUpState::Retrying { attempts: 4, .. }));
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_rejection_at_cap_exhausts_with_candidate() {
        let state = FollowUpState::after_verdict(
            4,
            DEFAULT_MAX_ATTEMPTS,
            "Last one?".into(),
            QualityVerdict::low_quality(7, 3),
        );
        match state {
            FollowUpState::Exhausted {
                attempts,
                candidate,
                ..
            } => {
                assert_eq!(attempts, 5);
                assert_eq!(candidate, "Last one?");
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_single_attempt_cap_exhausts_immediately() {
        let state =
            FollowUpState::after_verdict(0, 1, "Q".into(), QualityVerdict::system_failure());
        assert!(matches!(state, FollowUpState::Exhausted { attempts: 1, .. }));
    }
}
