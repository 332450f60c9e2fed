//! User-supplied topic validation.

use std::fmt;
use thiserror::Error;

/// Minimum topic length, in characters, after trimming.
pub const MIN_TOPIC_CHARS: usize = 2;

/// Reasons a raw topic string is rejected before any generation call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopicError {
    #[error("Topic cannot be empty.")]
    Empty,
    #[error("Topic must be at least 2 characters.")]
    TooShort,
}

/// A trimmed topic of at least [`MIN_TOPIC_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
    pub fn parse(raw: &str) -> Result<Self, TopicError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TopicError::Empty);
        }
        if trimmed.chars().count() < MIN_TOPIC_CHARS {
            return Err(TopicError::TooShort);
        }
        Ok(Topic(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_surrounding_whitespace() {
        let topic = Topic::parse("  Kubernetes \n").unwrap();
        assert_eq!(topic.as_str(), "Kubernetes");
    }

    #[test]
    fn test_rejects_empty_and_blank() {
        assert_eq!(Topic::parse(""), Err(TopicError::Empty));
        assert_eq!(Topic::parse(" \t\n "), Err(TopicError::Empty));
    }

    #[test]
    fn test_rejects_single_character() {
        assert_eq!(Topic::parse(" C "), Err(TopicError::TooShort));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        assert_eq!(Topic::parse("é"), Err(TopicError::TooShort));
        assert!(Topic::parse("Go").is_ok());
    }

    #[test]
    fn test_error_messages_are_user_facing() {
        assert_eq!(TopicError::Empty.to_string(), "Topic cannot be empty.");
        assert_eq!(
            TopicError::TooShort.to_string(),
            "Topic must be at least 2 characters."
        );
    }
}
