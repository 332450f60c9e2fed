//! Core data models produced by the generation pipeline.
//!
//! Field names serialize in camelCase so the JSON seen by providers, the
//! HTTP API and the persistence layer matches the flashcard schema
//! (`topicName`, `keyConcepts`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Difficulty rating attached to a [`Flashcard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flashcard generated with up-to-date information.
///
/// Immutable once created; owned by the session [`History`](crate::history::History).
/// `key_concepts` is expected to hold 3 to 5 entries but the count is not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub topic_name: String,
    pub summary: String,
    pub key_concepts: Vec<String>,
    pub example: String,
    pub tip: String,
    pub difficulty: Difficulty,
}

/// A flashcard produced without live information and without a difficulty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainFlashcard {
    pub topic: String,
    pub summary: String,
    pub key_concepts: Vec<String>,
    pub example: String,
    pub tip: String,
}

/// Two-sentence summary of a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortSummary {
    pub summary: String,
}

/// Multi-paragraph markdown explanation of a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedExplanation {
    pub explanation: String,
}

/// Structured output of one generation call, tagged by the kind that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Generated {
    Flashcard(Flashcard),
    PlainFlashcard(PlainFlashcard),
    ShortSummary(ShortSummary),
    DetailedExplanation(DetailedExplanation),
}

impl Generated {
    pub fn into_flashcard(self) -> Option<Flashcard> {
        match self {
            Generated::Flashcard(card) => Some(card),
            _ => None,
        }
    }

    pub fn into_plain_flashcard(self) -> Option<PlainFlashcard> {
        match self {
            Generated::PlainFlashcard(card) => Some(card),
            _ => None,
        }
    }

    pub fn into_short_summary(self) -> Option<ShortSummary> {
        match self {
            Generated::ShortSummary(summary) => Some(summary),
            _ => None,
        }
    }

    pub fn into_detailed_explanation(self) -> Option<DetailedExplanation> {
        match self {
            Generated::DetailedExplanation(explanation) => Some(explanation),
            _ => None,
        }
    }
}

/// Caller-facing outcome of a generation action.
///
/// Serializes as `{"success": true, "data": ...}` or
/// `{"success": false, "error": "..."}`. The error text is always a fixed,
/// user-facing message; underlying causes are logged, never carried here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult<T> {
    Success(T),
    Failure(String),
}

impl<T> GenerationResult<T> {
    pub fn failure(message: impl Into<String>) -> Self {
        GenerationResult::Failure(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            GenerationResult::Success(data) => Some(data),
            GenerationResult::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            GenerationResult::Success(_) => None,
            GenerationResult::Failure(message) => Some(message),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct WireResult<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> Serialize for GenerationResult<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GenerationResult::Success(data) => WireResult {
                success: true,
                data: Some(data),
                error: None,
            }
            .serialize(serializer),
            GenerationResult::Failure(message) => WireResult::<&T> {
                success: false,
                data: None,
                error: Some(message.clone()),
            }
            .serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for GenerationResult<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireResult::<T>::deserialize(deserializer)?;
        match (wire.success, wire.data, wire.error) {
            (true, Some(data), None) => Ok(GenerationResult::Success(data)),
            (false, None, Some(error)) => Ok(GenerationResult::Failure(error)),
            _ => Err(serde::de::Error::custom(
                "generation result must carry exactly one of data (success) or error (failure)",
            )),
        }
    }
}
