mod gate;
mod prompts;
mod score;
mod verdict;

pub use gate::{GateConfig, QualityGate, DEFAULT_MIN_SCORE, SCORE_MAX_TOKENS};
pub use prompts::GatePrompts;
pub use score::{extract_score, DEFAULT_SCORE};
pub use verdict::QualityVerdict;
