use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Feedback fields, when the provider's text happens to be valid JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackReport {
    pub eval_summary: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub what_went_well: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub what_can_be_improved: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub next_steps: Vec<String>,
}

impl FeedbackReport {
    /// Best-effort parse of raw feedback text.
    ///
    /// Takes the outermost `{...}` span, so code fences and surrounding
    /// prose are ignored. Returns `None` when that span is not a report.
    pub fn parse(raw: &str) -> Option<Self> {
        let start = raw.find('{')?;
        let end = raw.rfind('}')?;
        if end <= start {
            return None;
        }

        match serde_json::from_str(&raw[start..=end]) {
            Ok(report) => Some(report),
            Err(e) => {
                debug!(error = %e, "Feedback is not a structured report");
                None
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrList::deserialize(deserializer)? {
        StringOrList::One(s) => vec![s],
        StringOrList::Many(v) => v,
    })
}
