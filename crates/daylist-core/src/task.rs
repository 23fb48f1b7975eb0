use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_TEXT_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("task text is empty")]
    Empty,
    #[error("task text is {0} characters; the limit is {MAX_TEXT_LEN}")]
    TooLong(usize),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: i64,
    pub text: String,
    pub completed: bool,
}

impl Task {
    pub fn new(id: i64, text: String) -> Self {
        Self {
            id,
            text,
            completed: false,
        }
    }
}

/// Trims the raw input and enforces the length limit, counted in
/// Unicode scalar values.
pub fn validate_text(raw: &str) -> Result<String, TextError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TextError::Empty);
    }

    let len = trimmed.chars().count();
    if len > MAX_TEXT_LEN {
        return Err(TextError::TooLong(len));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{MAX_TEXT_LEN, TextError, validate_text};

    #[test]
    fn accepts_and_trims_plain_text() {
        assert_eq!(
            validate_text("  Buy milk  ").expect("valid text"),
            "Buy milk"
        );
    }

    #[test]
    fn rejects_whitespace_only_text() {
        assert_eq!(validate_text("   \t "), Err(TextError::Empty));
        assert_eq!(validate_text(""), Err(TextError::Empty));
    }

    #[test]
    fn limit_is_inclusive() {
        let at_limit = "x".repeat(MAX_TEXT_LEN);
        assert_eq!(validate_text(&at_limit).expect("at limit"), at_limit);

        let over = "x".repeat(MAX_TEXT_LEN + 1);
        assert_eq!(validate_text(&over), Err(TextError::TooLong(MAX_TEXT_LEN + 1)));
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        let text = "ä".repeat(MAX_TEXT_LEN);
        assert!(text.len() > MAX_TEXT_LEN);
        assert!(validate_text(&text).is_ok());
    }
}
