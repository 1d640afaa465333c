use followup_llm::{GenerationConfig, LlmError, TextGenerator};
use tracing::{debug, info, warn};

use crate::{extract_score, GatePrompts, QualityVerdict};

/// Minimum passing score for both checks
pub const DEFAULT_MIN_SCORE: u32 = 6;

/// Output cap for the score-only checks
pub const SCORE_MAX_TOKENS: u32 = 100;

/// Thresholds and model settings for the two checks
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub relevance: GenerationConfig,
    pub quality: GenerationConfig,
    pub min_relevance: u32,
    pub min_quality: u32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            relevance: GenerationConfig::new(SCORE_MAX_TOKENS),
            quality: GenerationConfig::new(SCORE_MAX_TOKENS),
            min_relevance: DEFAULT_MIN_SCORE,
            min_quality: DEFAULT_MIN_SCORE,
        }
    }
}

impl GateConfig {
    /// Use the same model for both checks
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.relevance.model = model.clone();
        self.quality.model = model;
        self
    }
}

/// Two-stage relevance-then-quality check for generated follow-up questions
pub struct QualityGate<'a> {
    generator: &'a dyn TextGenerator,
    config: GateConfig,
}

impl<'a> QualityGate<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self::with_config(generator, GateConfig::default())
    }

    pub fn with_config(generator: &'a dyn TextGenerator, config: GateConfig) -> Self {
        Self { generator, config }
    }

    /// Judge `candidate` against the exchange it follows.
    ///
    /// The quality check only runs if relevance passed. A remote failure in
    /// either check rejects the candidate.
    pub async fn assess(
        &self,
        prior_question: &str,
        prior_answer: &str,
        candidate: &str,
    ) -> QualityVerdict {
        match self
            .try_assess(prior_question, prior_answer, candidate)
            .await
        {
            Ok(verdict) => {
                info!(
                    valid = verdict.valid,
                    relevance = ?verdict.relevance_score,
                    quality = ?verdict.quality_score,
                    "Quality gate verdict"
                );
                verdict
            }
            Err(e) => {
                warn!(error = %e, "Quality control check failed");
                QualityVerdict::system_failure()
            }
        }
    }

    async fn try_assess(
        &self,
        prior_question: &str,
        prior_answer: &str,
        candidate: &str,
    ) -> Result<QualityVerdict, LlmError> {
        let relevance = self
            .score(
                &self.config.relevance,
                GatePrompts::RELEVANCE_SYSTEM,
                GatePrompts::build_relevance_prompt(prior_answer, candidate),
            )
            .await?;

        if relevance < self.config.min_relevance {
            return Ok(QualityVerdict::low_relevance(relevance));
        }

        let quality = self
            .score(
                &self.config.quality,
                GatePrompts::QUALITY_SYSTEM,
                GatePrompts::build_quality_prompt(prior_question, prior_answer, candidate),
            )
            .await?;

        if quality < self.config.min_quality {
            return Ok(QualityVerdict::low_quality(relevance, quality));
        }

        Ok(QualityVerdict::accepted(relevance, quality))
    }

    async fn score(
        &self,
        settings: &GenerationConfig,
        system: &str,
        prompt: String,
    ) -> Result<u32, LlmError> {
        let request = settings.request(system, prompt);
        let completion = self.generator.complete(&request).await?;
        let score = extract_score(completion.trimmed());
        debug!(system, score, raw = completion.trimmed(), "Scored candidate");
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use followup_llm::ScriptedGenerator;

    const QUESTION: &str = "Tell me about your project";
    const ANSWER: &str = "I built X";
    const CANDIDATE: &str = "What was the hardest technical challenge?";

    #[tokio::test]
    async fn test_accepts_when_both_scores_pass() {
        let generator = ScriptedGenerator::new().respond("8").respond("7");
        let verdict = QualityGate::new(&generator)
            .assess(QUESTION, ANSWER, CANDIDATE)
            .await;

        assert!(verdict.valid);
        assert_eq!(verdict.relevance_score, Some(8));
        assert_eq!(verdict.quality_score, Some(7));
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_low_relevance_skips_quality_check() {
        let generator = ScriptedGenerator::new().respond("5").respond("10");
        let verdict = QualityGate::new(&generator)
            .assess(QUESTION, ANSWER, CANDIDATE)
            .await;

        assert!(!verdict.valid);
        assert!(verdict.reason.starts_with("low relevance score"));
        assert_eq!(verdict.quality_score, None);
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_low_quality_rejects_despite_high_relevance() {
        let generator = ScriptedGenerator::new().respond("10").respond("Score: 4");
        let verdict = QualityGate::new(&generator)
            .assess(QUESTION, ANSWER, CANDIDATE)
            .await;

        assert!(!verdict.valid);
        assert_eq!(verdict.reason, "low-quality response (4/10)");
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_score_free_relevance_is_rejected() {
        let generator = ScriptedGenerator::new().respond("Very relevant!");
        let verdict = QualityGate::new(&generator)
            .assess(QUESTION, ANSWER, CANDIDATE)
            .await;

        assert!(!verdict.valid);
        assert_eq!(verdict.relevance_score, Some(crate::DEFAULT_SCORE));
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_score_free_quality_is_rejected() {
        let generator = ScriptedGenerator::new().respond("9").respond("Great question.");
        let verdict = QualityGate::new(&generator)
            .assess(QUESTION, ANSWER, CANDIDATE)
            .await;

        assert!(!verdict.valid);
        assert_eq!(verdict.quality_score, Some(crate::DEFAULT_SCORE));
    }

    #[tokio::test]
    async fn test_boundary_score_six_passes() {
        let generator = ScriptedGenerator::new().respond("6").respond("6");
        let verdict = QualityGate::new(&generator)
            .assess(QUESTION, ANSWER, CANDIDATE)
            .await;
        assert!(verdict.valid);
    }

    #[tokio::test]
    async fn test_transport_error_in_relevance_rejects() {
        let generator = ScriptedGenerator::new().fail(LlmError::Transport("reset".into()));
        let verdict = QualityGate::new(&generator)
            .assess(QUESTION, ANSWER, CANDIDATE)
            .await;

        assert!(!verdict.valid);
        assert_eq!(verdict.reason, QualityVerdict::SYSTEM_FAILURE_REASON);
    }

    #[tokio::test]
    async fn test_transport_error_in_quality_rejects() {
        let generator = ScriptedGenerator::new()
            .respond("9")
            .fail(LlmError::RateLimited {
                retry_after_secs: None,
            });
        let verdict = QualityGate::new(&generator)
            .assess(QUESTION, ANSWER, CANDIDATE)
            .await;

        assert!(!verdict.valid);
        assert!(verdict.is_system_failure());
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_requests_use_configured_model_and_system_prompts() {
        let generator = ScriptedGenerator::new().respond("8").respond("8");
        let config = GateConfig::default().with_model("claude-test");
        QualityGate::with_config(&generator, config)
            .assess(QUESTION, ANSWER, CANDIDATE)
            .await;

        let requests = generator.requests();
        assert_eq!(requests[0].system, GatePrompts::RELEVANCE_SYSTEM);
        assert_eq!(requests[1].system, GatePrompts::QUALITY_SYSTEM);
        assert!(requests.iter().all(|r| r.model == "claude-test"));
        assert!(requests.iter().all(|r| r.max_tokens == SCORE_MAX_TOKENS));
    }
}
