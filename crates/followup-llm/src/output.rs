use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Text returned by a provider for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// Raw generated text
    pub text: String,
    /// Model that produced the text
    pub model: String,
    /// Wall-clock time of the round trip
    #[serde(with = "duration_secs")]
    pub duration: Duration,
    #[serde(default)]
    pub input_tokens: Option<u32>,
    #[serde(default)]
    pub output_tokens: Option<u32>,
}

impl Completion {
    pub fn new(text: String, model: String, duration: Duration) -> Self {
        Self {
            text,
            model,
            duration,
            input_tokens: None,
            output_tokens: None,
        }
    }

    pub fn with_usage(mut self, input_tokens: u32, output_tokens: u32) -> Self {
        self.input_tokens = Some(input_tokens);
        self.output_tokens = Some(output_tokens);
        self
    }

    /// The generated text without surrounding whitespace
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs))
    }
}
