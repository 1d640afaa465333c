use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Score used when a response carries no usable number.
///
/// It sits below [`DEFAULT_MIN_SCORE`](crate::DEFAULT_MIN_SCORE), so a
/// score-free response is rejected.
pub const DEFAULT_SCORE: u32 = 5;

fn digits() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"\d+").expect("static pattern is valid"))
}

/// Best-effort score extraction: the first run of digits in `text`.
///
/// Falls back to [`DEFAULT_SCORE`] when there are no digits or the run does
/// not fit in a `u32`. No range check: "8/10" is 8, "12" is 12.
pub fn extract_score(text: &str) -> u32 {
    match digits().find(text).map(|m| m.as_str().parse::<u32>()) {
        Some(Ok(score)) => score,
        Some(Err(_)) | None => {
            debug!(response = text, "No score in response, using default");
            DEFAULT_SCORE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_number() {
        assert_eq!(extract_score("8"), 8);
        assert_eq!(extract_score("  10\n"), 10);
    }

    #[test]
    fn test_first_number_wins() {
        assert_eq!(extract_score("Score: 7/10"), 7);
        assert_eq!(extract_score("I'd give it a 3, maybe 4"), 3);
    }

    #[test]
    fn test_no_digits_defaults() {
        assert_eq!(extract_score("Highly relevant."), DEFAULT_SCORE);
        assert_eq!(extract_score(""), DEFAULT_SCORE);
    }

    #[test]
    fn test_overflowing_run_defaults() {
        assert_eq!(extract_score("99999999999999999999"), DEFAULT_SCORE);
    }
}
