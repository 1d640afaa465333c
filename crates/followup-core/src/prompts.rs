/// Prompt templates for feedback and follow-up generation
pub struct InterviewPrompts;

impl InterviewPrompts {
    pub const FEEDBACK_SYSTEM: &'static str =
        "You extract interview feedback info into structured JSON.";
    pub const FOLLOW_UP_SYSTEM: &'static str = "You generate high-quality follow-up questions.";

    /// Ask for GRAIL-framework feedback on one answer
    pub fn build_feedback_prompt(question: &str, answer: &str) -> String {
        format!(
            r#"Return JSON data containing eval_summary, what_went_well, what_can_be_improved, and next_steps by evaluating
the following product management interview answer based on the GRAIL framework:

Question: {question}
Answer: {answer}

Output:
- eval_summary: Summary of response quality.
- what_went_well: 4-5 strengths in the response.
- what_can_be_improved: 3-4 areas for improvement.
- next_steps: Concise suggestions for refining the answer."#,
            question = question,
            answer = answer,
        )
    }

    /// Ask for the next question given the whole conversation so far
    pub fn build_follow_up_prompt(
        anchor_question: &str,
        last_question: &str,
        last_answer: &str,
        answers: &[&str],
    ) -> String {
        let previous_answers = answers
            .iter()
            .enumerate()
            .map(|(i, a)| format!("  {}. \"{}\"", i + 1, a))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"You are a professional interviewer conducting a product management interview.
Your goal is to generate a **natural and engaging** follow-up question while ensuring a dynamic, non-linear conversation.

### **Conversation Context**
- **Original Interview Question:** "{anchor}"
- **Last Question Asked:** "{last_question}"
- **Candidate's Last Response:** "{last_answer}"
- **Previous Related Answers:**
{previous_answers}

Now, based on the conversation flow, generate a well-structured and engaging follow-up question."#,
            anchor = anchor_question,
            last_question = last_question,
            last_answer = last_answer,
            previous_answers = previous_answers,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_prompt_names_all_fields() {
        let prompt = InterviewPrompts::build_feedback_prompt("Q?", "A.");
        for field in [
            "eval_summary",
            "what_went_well",
            "what_can_be_improved",
            "next_steps",
        ] {
            assert!(prompt.contains(field), "missing {field}");
        }
        assert!(prompt.contains("GRAIL"));
        assert!(prompt.contains("Question: Q?\nAnswer: A."));
    }

    #[test]
    fn test_follow_up_prompt_lists_answers_in_order() {
        let prompt = InterviewPrompts::build_follow_up_prompt(
            "Tell me about your project",
            "Why Rust?",
            "Speed",
            &["I built X", "Speed"],
        );
        assert!(prompt.contains("**Original Interview Question:** \"Tell me about your project\""));
        assert!(prompt.contains("**Last Question Asked:** \"Why Rust?\""));
        let first = prompt.find("1. \"I built X\"").unwrap();
        let second = prompt.find("2. \"Speed\"").unwrap();
        assert!(first < second);
    }
}
