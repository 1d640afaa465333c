use followup_gate::QualityVerdict;
use serde::{Deserialize, Serialize};

/// Text returned when the proposal call itself fails
pub const GENERATION_FAILED_MESSAGE: &str = "Sorry, an error occurred.";

/// The final outcome of one follow-up generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FollowUpOutcome {
    /// A candidate passed the quality gate
    Accepted {
        question: String,
        attempts: usize,
        verdict: QualityVerdict,
    },
    /// Every attempt was rejected; the last candidate is returned anyway
    Exhausted {
        question: String,
        attempts: usize,
        last_verdict: QualityVerdict,
    },
    /// Proposing a candidate failed; generation stopped immediately
    Aborted {
        message: String,
        attempts: usize,
        error: String,
    },
}

impl FollowUpOutcome {
    pub fn accepted(question: String, attempts: usize, verdict: QualityVerdict) -> Self {
        Self::Accepted {
            question,
            attempts,
            verdict,
        }
    }

    pub fn exhausted(question: String, attempts: usize, last_verdict: QualityVerdict) -> Self {
        Self::Exhausted {
            question,
            attempts,
            last_verdict,
        }
    }

    pub fn aborted(attempts: usize, error: String) -> Self {
        Self::Aborted {
            message: GENERATION_FAILED_MESSAGE.to_string(),
            attempts,
            error,
        }
    }

    /// The text to put in front of the candidate, whatever the outcome
    pub fn question(&self) -> &str {
        match self {
            Self::Accepted { question, .. } => question,
            Self::Exhausted { question, .. } => question,
            Self::Aborted { message, .. } => message,
        }
    }

    /// Completed propose/gate cycles
    pub fn attempts(&self) -> usize {
        match self {
            Self::Accepted { attempts, .. } => *attempts,
            Self::Exhausted { attempts, .. } => *attempts,
            Self::Aborted { attempts, .. } => *attempts,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}
