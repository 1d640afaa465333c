use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// One question/answer pair. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    question: String,
    answer: String,
    recorded_at: DateTime<Utc>,
}

impl Exchange {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            recorded_at: Utc::now(),
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// In-memory session histories keyed by session id.
///
/// Histories are append-only. The lock is held only for the in-memory
/// read or push, never across a remote call.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Vec<Exchange>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an exchange, creating the session if needed.
    /// Returns the session length after the append.
    pub fn append(&self, key: &str, exchange: Exchange) -> usize {
        let mut sessions = self.lock();
        let history = sessions.entry(key.to_string()).or_default();
        history.push(exchange);
        history.len()
    }

    /// Snapshot of a session's history, oldest first
    pub fn history(&self, key: &str) -> Option<Vec<Exchange>> {
        self.lock().get(key).cloned()
    }

    pub fn len(&self, key: &str) -> usize {
        self.lock().get(key).map_or(0, Vec::len)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// All session keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Exchange>>> {
        // Appends are single pushes, so a poisoned map is still consistent
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}
