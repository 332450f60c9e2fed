//! Output schema contracts and strict output parsing.
//!
//! The schemas are standard JSON Schema objects with every property
//! required and `additionalProperties: false`, which is the shape
//! strict structured-output modes accept. Providers that use a different
//! dialect convert from these (see the application's Gemini client).
//!
//! Parsing is all-or-nothing: a payload missing a field, carrying a field
//! of the wrong JSON type, or naming an unknown difficulty is rejected.
//! Unknown extra fields are ignored.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::models::{DetailedExplanation, Flashcard, Generated, PlainFlashcard, ShortSummary};
use crate::prompts::GenerationKind;

pub fn flashcard_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "topicName": { "type": "string", "description": "The name of the topic." },
            "summary": { "type": "string", "description": "A 2-3 line summary of the topic." },
            "keyConcepts": {
                "type": "array",
                "items": { "type": "string" },
                "description": "An array of key concepts/subtopics."
            },
            "example": { "type": "string", "description": "A real-world example or use case of the topic." },
            "tip": { "type": "string", "description": "A short learning tip or key takeaway." },
            "difficulty": {
                "type": "string",
                "enum": ["Beginner", "Intermediate", "Advanced"],
                "description": "The difficulty level of the topic."
            }
        },
        "required": ["topicName", "summary", "keyConcepts", "example", "tip", "difficulty"],
        "additionalProperties": false
    })
}

pub fn plain_flashcard_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "topic": { "type": "string", "description": "The topic of the flashcard." },
            "summary": { "type": "string", "description": "A 2-3 line summary of the topic." },
            "keyConcepts": {
                "type": "array",
                "items": { "type": "string" },
                "description": "3-5 key concepts/subtopics related to the topic."
            },
            "example": { "type": "string", "description": "A real-world example or use case of the topic." },
            "tip": { "type": "string", "description": "A short learning tip or key takeaway for the topic." }
        },
        "required": ["topic", "summary", "keyConcepts", "example", "tip"],
        "additionalProperties": false
    })
}

pub fn short_summary_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "summary": { "type": "string", "description": "A two-sentence summary of the topic." }
        },
        "required": ["summary"],
        "additionalProperties": false
    })
}

pub fn detailed_explanation_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "explanation": {
                "type": "string",
                "description": "A detailed, multi-paragraph explanation of the topic, suitable for someone who wants to learn more. Use Markdown for formatting (e.g., paragraphs, bolding, lists)."
            }
        },
        "required": ["explanation"],
        "additionalProperties": false
    })
}

/// Parse a provider's text payload into the output shape for `kind`.
///
/// A single surrounding markdown code fence (```` ```json ... ``` ````) is
/// removed first; nothing else is repaired.
pub fn parse_output(kind: GenerationKind, raw: &str) -> Result<Generated> {
    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(body)
        .with_context(|| format!("{} output is not valid JSON", kind))?;
    parse_value(kind, value)
}

/// Validate an already-decoded JSON value against the schema for `kind`.
pub fn parse_value(kind: GenerationKind, value: Value) -> Result<Generated> {
    if !value.is_object() {
        anyhow::bail!("{} output must be a JSON object", kind);
    }
    Ok(match kind {
        GenerationKind::FlashcardWithSearch => Generated::Flashcard(decode::<Flashcard>(kind, value)?),
        GenerationKind::FlashcardPlain => {
            Generated::PlainFlashcard(decode::<PlainFlashcard>(kind, value)?)
        }
        GenerationKind::ShortSummary => Generated::ShortSummary(decode::<ShortSummary>(kind, value)?),
        GenerationKind::DetailedExplanation => {
            Generated::DetailedExplanation(decode::<DetailedExplanation>(kind, value)?)
        }
    })
}

fn decode<T: DeserializeOwned>(kind: GenerationKind, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .with_context(|| format!("{} output does not match its schema", kind))
}

/// Remove one surrounding markdown code fence, if present.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening fence line.
    match inner.find('\n') {
        Some(newline) => inner[newline + 1..].trim(),
        None => inner.trim(),
    }
}
