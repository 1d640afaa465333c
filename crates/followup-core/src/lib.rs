//! # followup-core
//!
//! Interview orchestration: feedback on answers and quality-gated
//! follow-up questions over an in-memory [`SessionStore`].

mod error;
mod feedback;
mod follow_up;
mod outcome;
mod prompts;
mod report;
mod session;

pub use error::InterviewError;
pub use feedback::{FeedbackGenerator, FEEDBACK_MAX_TOKENS};
pub use follow_up::{
    FollowUpGenerator, FollowUpState, DEFAULT_MAX_ATTEMPTS, FOLLOW_UP_MAX_TOKENS,
};
pub use outcome::{FollowUpOutcome, GENERATION_FAILED_MESSAGE};
pub use prompts::InterviewPrompts;
pub use report::FeedbackReport;
pub use session::{Exchange, SessionStore};
