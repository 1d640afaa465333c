//! Interactive interview driver.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::Colorize;
use dialoguer::Input;
use serde::Serialize;

use followup_core::{
    Exchange, FeedbackGenerator, FeedbackReport, FollowUpGenerator, FollowUpOutcome,
    InterviewError, SessionStore,
};
use followup_llm::TextGenerator;
use followup_logging::Logger;

use crate::config::Settings;

/// Options for one interactive interview
#[derive(Debug, Clone)]
pub struct InterviewOptions {
    pub opening_question: String,
    pub rounds: usize,
    pub session: String,
    pub feedback_every_answer: bool,
    pub json_output: bool,
}

/// Transcript printed with `--json-output`
#[derive(Debug, Serialize)]
pub struct Transcript {
    pub session: String,
    pub exchanges: Vec<Exchange>,
    pub follow_ups: Vec<FollowUpOutcome>,
}

/// Where the candidate's answers come from
#[async_trait]
pub trait AnswerSource: Send + Sync {
    /// Read the answer to `question`; `Ok(None)` when the user interrupted
    async fn answer(&self, question: &str) -> Result<Option<String>>;
}

/// Reads answers from the terminal
pub struct TerminalAnswers;

#[async_trait]
impl AnswerSource for TerminalAnswers {
    async fn answer(&self, _question: &str) -> Result<Option<String>> {
        let read = tokio::task::spawn_blocking(|| {
            Input::<String>::new()
                .with_prompt("Your answer")
                .validate_with(|input: &String| -> Result<(), &str> {
                    if input.trim().is_empty() {
                        Err("An answer is required")
                    } else {
                        Ok(())
                    }
                })
                .interact_text()
        })
        .await
        .context("Answer prompt task failed")?;

        match read {
            Ok(answer) => Ok(Some(answer)),
            // Ctrl+C in raw mode surfaces as an interrupted read
            Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e).context("Failed to read answer"),
        }
    }
}

/// Builds the components for one run
pub struct Interviewer<'a> {
    feedback: FeedbackGenerator<'a>,
    follow_up: FollowUpGenerator<'a>,
    store: Arc<SessionStore>,
}

impl<'a> Interviewer<'a> {
    pub fn new(
        generator: &'a dyn TextGenerator,
        settings: &Settings,
        store: Arc<SessionStore>,
        logger: Arc<Logger>,
    ) -> Self {
        let feedback = FeedbackGenerator::new(generator, store.clone(), logger.clone())
            .with_config(settings.feedback.clone());
        let follow_up = FollowUpGenerator::new(generator, store.clone(), logger)
            .with_config(settings.follow_up.clone())
            .with_gate_config(settings.gate.clone())
            .with_max_attempts(settings.max_attempts);

        Self {
            feedback,
            follow_up,
            store,
        }
    }

    /// One-shot feedback; `Ok(None)` when the provider failed
    pub async fn feedback_once(
        &self,
        question: &str,
        answer: &str,
        session: &str,
    ) -> Result<Option<String>> {
        Ok(self.feedback.evaluate(question, answer, session).await?)
    }

    /// Run the opening question plus up to `rounds` follow-ups.
    ///
    /// An interrupt ends the interview early; the transcript so far is
    /// still returned.
    pub async fn run(
        &self,
        options: &InterviewOptions,
        answers: &dyn AnswerSource,
        interrupted: &AtomicBool,
    ) -> Result<Transcript> {
        let session = options.session.as_str();
        let mut follow_ups = Vec::new();

        if options.opening_question.trim().is_empty() {
            return Err(InterviewError::InvalidInput(
                "the opening question must not be empty".to_string(),
            )
            .into());
        }

        print_question(0, &options.opening_question);
        match ask(answers, &options.opening_question).await? {
            Some(answer) => {
                self.record_with_feedback(&options.opening_question, &answer, session)
                    .await?
            }
            None => return Ok(self.transcript(session, follow_ups)),
        }

        for round in 1..=options.rounds {
            if interrupted.load(Ordering::SeqCst) {
                eprintln!("{}", "Interview stopped.".dimmed());
                break;
            }

            let outcome = self.follow_up.next_question(session).await?;
            if let FollowUpOutcome::Aborted { message, error, .. } = &outcome {
                eprintln!("{} {}", "✗".bright_red(), message);
                eprintln!("  {}", error.dimmed());
                follow_ups.push(outcome);
                break;
            }
            if let FollowUpOutcome::Exhausted { last_verdict, .. } = &outcome {
                eprintln!(
                    "{} {}",
                    "⚠".bright_yellow(),
                    format!("Unvetted question ({})", last_verdict.reason).dimmed()
                );
            }

            let question = outcome.question().to_string();
            follow_ups.push(outcome);

            print_question(round, &question);
            let Some(answer) = ask(answers, &question).await? else {
                eprintln!("{}", "Interview stopped.".dimmed());
                break;
            };

            if options.feedback_every_answer {
                self.record_with_feedback(&question, &answer, session).await?;
            } else {
                self.store.append(session, Exchange::new(question, answer));
            }
        }

        Ok(self.transcript(session, follow_ups))
    }

    /// Evaluate an answer; record it directly if feedback was unavailable
    async fn record_with_feedback(
        &self,
        question: &str,
        answer: &str,
        session: &str,
    ) -> Result<()> {
        match self.feedback.evaluate(question, answer, session).await? {
            Some(feedback) => print_feedback(&feedback),
            None => {
                eprintln!(
                    "{} {}",
                    "⚠".bright_yellow(),
                    "Feedback unavailable for this answer.".dimmed()
                );
                self.store.append(session, Exchange::new(question, answer));
            }
        }
        Ok(())
    }

    fn transcript(&self, session: &str, follow_ups: Vec<FollowUpOutcome>) -> Transcript {
        Transcript {
            session: session.to_string(),
            exchanges: self.store.history(session).unwrap_or_default(),
            follow_ups,
        }
    }
}

/// Ask until a non-blank answer arrives or the user interrupts
async fn ask(answers: &dyn AnswerSource, question: &str) -> Result<Option<String>> {
    loop {
        match answers.answer(question).await? {
            Some(answer) if answer.trim().is_empty() => {
                eprintln!("{}", "An answer is required.".dimmed());
            }
            other => return Ok(other),
        }
    }
}

fn print_question(round: usize, question: &str) {
    println!();
    if round == 0 {
        println!("{}", "Opening question".bold());
    } else {
        println!("{}", format!("Follow-up question {}", round).bold());
    }
    println!("  {}", question.bright_white());
}

/// Print feedback as sections when it parses, raw otherwise
pub fn print_feedback(raw: &str) {
    println!();
    println!("{}", "Feedback".bold().bright_cyan());

    let Some(report) = FeedbackReport::parse(raw) else {
        println!("{}", raw);
        return;
    };

    println!("  {}", report.eval_summary);
    print_section("What went well", &report.what_went_well, "+");
    print_section("What can be improved", &report.what_can_be_improved, "-");
    print_section("Next steps", &report.next_steps, "→");
}

fn print_section(title: &str, items: &[String], bullet: &str) {
    if items.is_empty() {
        return;
    }
    println!();
    println!("  {}", title.bold());
    for item in items {
        println!("    {} {}", bullet.dimmed(), item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use followup_core::InterviewPrompts;
    use followup_gate::GatePrompts;
    use followup_llm::{LlmError, ScriptedGenerator};
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    const FEEDBACK_JSON: &str = r#"{"eval_summary": "Solid", "what_went_well": [], "what_can_be_improved": [], "next_steps": []}"#;

    /// Answers from a fixed list; `None` once the list runs out
    struct ScriptedAnswers {
        answers: Mutex<VecDeque<String>>,
        asked: Mutex<Vec<String>>,
    }

    impl ScriptedAnswers {
        fn new(answers: &[&str]) -> Self {
            Self {
                answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
                asked: Mutex::new(Vec::new()),
            }
        }

        fn asked(&self) -> Vec<String> {
            self.asked.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AnswerSource for ScriptedAnswers {
        async fn answer(&self, question: &str) -> Result<Option<String>> {
            self.asked.lock().unwrap().push(question.to_string());
            Ok(self.answers.lock().unwrap().pop_front())
        }
    }

    /// Routes by system prompt; candidates are numbered
    fn generator(relevance: &'static str, quality: &'static str) -> ScriptedGenerator {
        let proposals = Arc::new(AtomicUsize::new(0));
        ScriptedGenerator::from_fn(move |request| match request.system.as_str() {
            InterviewPrompts::FEEDBACK_SYSTEM => Ok(FEEDBACK_JSON.to_string()),
            InterviewPrompts::FOLLOW_UP_SYSTEM => {
                let n = proposals.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(format!("Candidate question {n}?"))
            }
            GatePrompts::RELEVANCE_SYSTEM => Ok(relevance.to_string()),
            GatePrompts::QUALITY_SYSTEM => Ok(quality.to_string()),
            other => Err(LlmError::Provider {
                status: 400,
                message: format!("unexpected system prompt: {other}"),
            }),
        })
    }

    fn options(rounds: usize) -> InterviewOptions {
        InterviewOptions {
            opening_question: "Tell me about your project".to_string(),
            rounds,
            session: "s1".to_string(),
            feedback_every_answer: false,
            json_output: false,
        }
    }

    fn interviewer<'a>(generator: &'a ScriptedGenerator, max_attempts: usize) -> Interviewer<'a> {
        let mut settings = Settings::resolve(&ProjectConfig::default(), None);
        settings.max_attempts = max_attempts;
        Interviewer::new(
            generator,
            &settings,
            Arc::new(SessionStore::new()),
            Arc::new(Logger::silent()),
        )
    }

    #[tokio::test]
    async fn test_answered_follow_ups_are_recorded() {
        let generator = generator("8", "8");
        let interviewer = interviewer(&generator, 5);
        let answers = ScriptedAnswers::new(&["I built X", "Scaling ingestion"]);

        let transcript = interviewer
            .run(&options(1), &answers, &AtomicBool::new(false))
            .await
            .unwrap();

        assert_eq!(transcript.exchanges.len(), 2);
        assert_eq!(transcript.exchanges[0].answer(), "I built X");
        assert_eq!(transcript.exchanges[1].question(), "Candidate question 1?");
        assert_eq!(transcript.exchanges[1].answer(), "Scaling ingestion");
        assert_eq!(transcript.follow_ups.len(), 1);
        assert!(transcript.follow_ups[0].is_accepted());
        // feedback + propose + relevance + quality
        assert_eq!(generator.call_count(), 4);
    }

    #[tokio::test]
    async fn test_exhausted_candidate_is_still_asked() {
        let generator = generator("2", "9");
        let interviewer = interviewer(&generator, 2);
        let answers = ScriptedAnswers::new(&["I built X", "Fine"]);

        let transcript = interviewer
            .run(&options(1), &answers, &AtomicBool::new(false))
            .await
            .unwrap();

        assert!(matches!(
            transcript.follow_ups[0],
            FollowUpOutcome::Exhausted { attempts: 2, .. }
        ));
        assert_eq!(answers.asked()[1], "Candidate question 2?");
        assert_eq!(transcript.exchanges[1].question(), "Candidate question 2?");
    }

    #[tokio::test]
    async fn test_aborted_generation_ends_the_interview() {
        let generator = ScriptedGenerator::new()
            .respond(FEEDBACK_JSON)
            .fail(LlmError::Transport("connection reset".into()));
        let interviewer = interviewer(&generator, 5);
        let answers = ScriptedAnswers::new(&["I built X", "never asked"]);

        let transcript = interviewer
            .run(&options(3), &answers, &AtomicBool::new(false))
            .await
            .unwrap();

        assert_eq!(answers.asked().len(), 1);
        assert_eq!(transcript.exchanges.len(), 1);
        assert_eq!(transcript.follow_ups.len(), 1);
        assert!(transcript.follow_ups[0].is_aborted());
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_exchange_is_recorded_when_feedback_fails() {
        let generator = ScriptedGenerator::new().fail(LlmError::Overloaded("busy".into()));
        let interviewer = interviewer(&generator, 5);
        let answers = ScriptedAnswers::new(&["I built X"]);

        let transcript = interviewer
            .run(&options(0), &answers, &AtomicBool::new(false))
            .await
            .unwrap();

        assert_eq!(transcript.exchanges.len(), 1);
        assert_eq!(transcript.exchanges[0].question(), "Tell me about your project");
    }

    #[tokio::test]
    async fn test_blank_answer_is_asked_again() {
        let generator = generator("8", "8");
        let interviewer = interviewer(&generator, 5);
        let answers = ScriptedAnswers::new(&["I built X", "   ", "Scaling ingestion"]);
        let mut options = options(1);
        options.feedback_every_answer = true;

        let transcript = interviewer
            .run(&options, &answers, &AtomicBool::new(false))
            .await
            .unwrap();

        assert_eq!(answers.asked().len(), 3);
        assert_eq!(transcript.exchanges.len(), 2);
        assert_eq!(transcript.exchanges[1].answer(), "Scaling ingestion");
        // two feedback calls + propose + relevance + quality
        assert_eq!(generator.call_count(), 5);
    }

    #[tokio::test]
    async fn test_interrupted_prompt_keeps_transcript() {
        let generator = generator("8", "8");
        let interviewer = interviewer(&generator, 5);
        let answers = ScriptedAnswers::new(&["I built X"]);

        let transcript = interviewer
            .run(&options(3), &answers, &AtomicBool::new(false))
            .await
            .unwrap();

        assert_eq!(transcript.session, "s1");
        assert_eq!(transcript.exchanges.len(), 1);
        assert_eq!(transcript.follow_ups.len(), 1);
    }

    #[tokio::test]
    async fn test_interrupt_flag_stops_before_next_round() {
        let generator = generator("8", "8");
        let interviewer = interviewer(&generator, 5);
        let answers = ScriptedAnswers::new(&["I built X", "unused"]);

        let transcript = interviewer
            .run(&options(3), &answers, &AtomicBool::new(true))
            .await
            .unwrap();

        assert_eq!(transcript.exchanges.len(), 1);
        assert!(transcript.follow_ups.is_empty());
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_opening_question_is_invalid_input() {
        let generator = generator("8", "8");
        let interviewer = interviewer(&generator, 5);
        let answers = ScriptedAnswers::new(&["I built X"]);
        let mut options = options(1);
        options.opening_question = "  ".to_string();

        let err = interviewer
            .run(&options, &answers, &AtomicBool::new(false))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<InterviewError>(),
            Some(InterviewError::InvalidInput(_))
        ));
        assert!(answers.asked().is_empty());
        assert_eq!(generator.call_count(), 0);
    }
}
