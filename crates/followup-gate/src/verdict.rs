use serde::{Deserialize, Serialize};

/// Result of one quality-gate evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityVerdict {
    /// Whether the candidate passed both checks
    pub valid: bool,
    /// Why it passed or failed
    pub reason: String,
    /// Relevance score, if the relevance check completed
    #[serde(default)]
    pub relevance_score: Option<u32>,
    /// Quality score, if the quality check was reached and completed
    #[serde(default)]
    pub quality_score: Option<u32>,
}

impl QualityVerdict {
    pub const SYSTEM_FAILURE_REASON: &'static str = "quality control system failed";

    pub fn accepted(relevance_score: u32, quality_score: u32) -> Self {
        Self {
            valid: true,
            reason: "follow-up question meets quality bar".to_string(),
            relevance_score: Some(relevance_score),
            quality_score: Some(quality_score),
        }
    }

    pub fn low_relevance(relevance_score: u32) -> Self {
        Self {
            valid: false,
            reason: format!("low relevance score ({}/10)", relevance_score),
            relevance_score: Some(relevance_score),
            quality_score: None,
        }
    }

    pub fn low_quality(relevance_score: u32, quality_score: u32) -> Self {
        Self {
            valid: false,
            reason: format!("low-quality response ({}/10)", quality_score),
            relevance_score: Some(relevance_score),
            quality_score: Some(quality_score),
        }
    }

    /// A remote failure during either check. Never a pass.
    pub fn system_failure() -> Self {
        Self {
            valid: false,
            reason: Self::SYSTEM_FAILURE_REASON.to_string(),
            relevance_score: None,
            quality_score: None,
        }
    }

    pub fn is_system_failure(&self) -> bool {
        !self.valid && self.relevance_score.is_none()
    }

    /// Get a short description of the verdict for logging
    pub fn short_description(&self) -> String {
        let scores = match (self.relevance_score, self.quality_score) {
            (Some(r), Some(q)) => format!(" [relevance {}, quality {}]", r, q),
            (Some(r), None) => format!(" [relevance {}]", r),
            _ => String::new(),
        };
        if self.valid {
            format!("ACCEPTED{}", scores)
        } else {
            format!("REJECTED: {}{}", self.reason, scores)
        }
    }
}
