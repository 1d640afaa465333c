/// Prompt templates for the quality gate
pub struct GatePrompts;

impl GatePrompts {
    pub const RELEVANCE_SYSTEM: &'static str = "You verify AI responses for relevance.";
    pub const QUALITY_SYSTEM: &'static str = "You score AI responses for clarity and quality.";

    /// Ask how well the candidate follows from the candidate's last answer
    pub fn build_relevance_prompt(prior_answer: &str, candidate: &str) -> String {
        format!(
            r#"Analyze the following follow-up question for contextual relevance.

Candidate's Response: {answer}
AI-Generated Follow-Up Question: {candidate}

On a scale from **1 to 10**, how well does this follow-up question logically relate to the candidate's response?
(A score of 1 means it is completely unrelated, 10 means it is perfectly relevant.)

Score (just a number, no explanation):"#,
            answer = prior_answer,
            candidate = candidate,
        )
    }

    /// Ask for an overall clarity/relevance/depth score
    pub fn build_quality_prompt(prior_question: &str, prior_answer: &str, candidate: &str) -> String {
        format!(
            r#"Evaluate the quality of the AI-generated follow-up question based on clarity, relevance, and depth.
Give a score from 1 to 10, with **ONLY the number** as the response.

Question: {question}
Candidate Response: {answer}
AI-Generated Follow-Up Question: {candidate}

Score (just a number, no explanation):"#,
            question = prior_question,
            answer = prior_answer,
            candidate = candidate,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevance_prompt_excludes_prior_question() {
        let prompt = GatePrompts::build_relevance_prompt("I built X", "Why X?");
        assert!(prompt.contains("Candidate's Response: I built X"));
        assert!(prompt.contains("AI-Generated Follow-Up Question: Why X?"));
        assert!(prompt.ends_with("Score (just a number, no explanation):"));
    }

    #[test]
    fn test_quality_prompt_includes_full_exchange() {
        let prompt =
            GatePrompts::build_quality_prompt("Tell me about your project", "I built X", "Why X?");
        assert!(prompt.contains("Question: Tell me about your project"));
        assert!(prompt.contains("Candidate Response: I built X"));
        assert!(prompt.contains("clarity, relevance, and depth"));
    }
}
