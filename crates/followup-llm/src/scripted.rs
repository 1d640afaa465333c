use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::{Completion, CompletionRequest, LlmError, TextGenerator};

type Responder = Box<dyn Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync>;

/// Generator that replays canned responses and records every request.
///
/// Queued responses are consumed first, in order. Once the queue is empty
/// the responder closure (if any) answers; otherwise the call fails with
/// [`LlmError::EmptyResponse`].
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    responder: Option<Responder>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            responder: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every unscripted call with the given closure
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(responder)),
            ..Self::new()
        }
    }

    /// Queue a successful response
    pub fn respond(self, text: impl Into<String>) -> Self {
        self.lock_script().push_back(Ok(text.into()));
        self
    }

    /// Queue a failure
    pub fn fail(self, error: LlmError) -> Self {
        self.lock_script().push_back(Err(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.lock_requests().len()
    }

    /// Snapshot of every request received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.lock_requests().clone()
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, LlmError>>> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_requests(&self) -> std::sync::MutexGuard<'_, Vec<CompletionRequest>> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        self.lock_requests().push(request.clone());

        let next = self.lock_script().pop_front();
        let text = match next {
            Some(result) => result?,
            None => match &self.responder {
                Some(responder) => responder(request)?,
                None => return Err(LlmError::EmptyResponse),
            },
        };

        Ok(Completion::new(
            text,
            request.model.clone(),
            Duration::from_millis(1),
        ))
    }
}
