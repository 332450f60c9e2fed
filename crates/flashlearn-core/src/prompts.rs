//! Prompt templates and the generation-kind lookup table.
//!
//! Each [`GenerationKind`] maps to one [`Operation`]: a pure template
//! function with a single `topic` substitution point, the JSON Schema the
//! model output must satisfy, and the fixed user-facing failure message.
//! The table is immutable; dispatch is by variant, never by name lookup at
//! runtime.
//!
//! | Kind | Output | Live information |
//! |------|--------|------------------|
//! | `flashcard` | [`Flashcard`](crate::models::Flashcard) | yes |
//! | `flashcard-plain` | [`PlainFlashcard`](crate::models::PlainFlashcard) | no |
//! | `short-summary` | [`ShortSummary`](crate::models::ShortSummary) | no |
//! | `detailed-explanation` | [`DetailedExplanation`](crate::models::DetailedExplanation) | no |

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::schema;

/// One of the four generation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationKind {
    #[serde(rename = "flashcard")]
    FlashcardWithSearch,
    FlashcardPlain,
    ShortSummary,
    DetailedExplanation,
}

impl GenerationKind {
    pub const ALL: [GenerationKind; 4] = [
        GenerationKind::FlashcardWithSearch,
        GenerationKind::FlashcardPlain,
        GenerationKind::ShortSummary,
        GenerationKind::DetailedExplanation,
    ];

    /// Returns the table entry for this kind.
    pub fn operation(self) -> &'static Operation {
        match self {
            GenerationKind::FlashcardWithSearch => &OPERATIONS[0],
            GenerationKind::FlashcardPlain => &OPERATIONS[1],
            GenerationKind::ShortSummary => &OPERATIONS[2],
            GenerationKind::DetailedExplanation => &OPERATIONS[3],
        }
    }

    /// Stable identifier used in URLs and on the command line.
    pub fn slug(self) -> &'static str {
        self.operation().slug
    }

    /// Renders this kind's prompt for `topic`.
    pub fn render_prompt(self, topic: &str) -> String {
        (self.operation().template)(topic)
    }

    /// JSON Schema the model output must conform to.
    pub fn output_schema(self) -> Value {
        (self.operation().schema)()
    }

    /// Fixed message returned to callers when generation fails.
    pub fn failure_message(self) -> &'static str {
        self.operation().failure_message
    }

    /// Whether this kind asks the model for live, up-to-date information.
    pub fn wants_live_information(self) -> bool {
        self.operation().live_information
    }
}

impl fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for GenerationKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GenerationKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown generation kind: '{}'. Must be flashcard, flashcard-plain, short-summary, or detailed-explanation.",
                    s
                )
            })
    }
}

/// A (template, schema) pair plus per-kind metadata.
pub struct Operation {
    pub kind: GenerationKind,
    pub slug: &'static str,
    /// Name sent to providers that label structured-output schemas.
    pub schema_name: &'static str,
    pub template: fn(&str) -> String,
    pub schema: fn() -> Value,
    pub failure_message: &'static str,
    pub live_information: bool,
}

pub static OPERATIONS: [Operation; 4] = [
    Operation {
        kind: GenerationKind::FlashcardWithSearch,
        slug: "flashcard",
        schema_name: "flashcard",
        template: flashcard_with_search_prompt,
        schema: schema::flashcard_schema,
        failure_message: "Failed to generate flashcard. The topic may be too broad or unsupported. Please try again with a more specific topic.",
        live_information: true,
    },
    Operation {
        kind: GenerationKind::FlashcardPlain,
        slug: "flashcard-plain",
        schema_name: "plain_flashcard",
        template: flashcard_plain_prompt,
        schema: schema::plain_flashcard_schema,
        failure_message: "Failed to generate flashcard. Please try again with a more specific topic.",
        live_information: false,
    },
    Operation {
        kind: GenerationKind::ShortSummary,
        slug: "short-summary",
        schema_name: "short_summary",
        template: short_summary_prompt,
        schema: schema::short_summary_schema,
        failure_message: "Failed to generate summary. Please try again.",
        live_information: false,
    },
    Operation {
        kind: GenerationKind::DetailedExplanation,
        slug: "detailed-explanation",
        schema_name: "detailed_explanation",
        template: detailed_explanation_prompt,
        schema: schema::detailed_explanation_schema,
        failure_message: "Failed to generate detailed explanation. Please try again.",
        live_information: false,
    },
];

pub fn flashcard_with_search_prompt(topic: &str) -> String {
    format!(
        "You are an AI learning assistant with access to real-time information. \
         Generate a short flashcard to teach someone about the topic: \"{topic}\".\n\
         Include:\n\
         - A 2-3 line summary\n\
         - 3-5 key points (as bullet points)\n\
         - One real-world example or application\n\
         - One short takeaway or tip\n\
         - A difficulty rating (Beginner, Intermediate, or Advanced).\n\
         Keep it concise and easy to understand for a tech professional. \
         Use your access to real-time information to provide up-to-date and accurate details. \
         Format key points as bullet points. \
         Bold important keywords by wrapping them in double asterisks, like **this**."
    )
}

pub fn flashcard_plain_prompt(topic: &str) -> String {
    format!(
        "You are an AI learning assistant. Generate a short flashcard to teach someone about \
         the topic: \"{topic}\". Include: - 2-line summary - 3-5 key points - One real-world \
         example or application - One short takeaway or tip. Keep it concise and easy to \
         understand for a tech professional."
    )
}

pub fn short_summary_prompt(topic: &str) -> String {
    format!(
        "You are an AI learning assistant. Summarize the following topic in exactly two \
         sentences: \"{topic}\"."
    )
}

pub fn detailed_explanation_prompt(topic: &str) -> String {
    format!(
        "You are an AI learning assistant. A user wants to learn more about the topic: \
         \"{topic}\". Provide a detailed, multi-paragraph explanation. Go deeper than a simple \
         summary. Explain the context, how it works, and its importance. Use markdown for \
         formatting, like paragraphs, bolding key terms, and lists."
    )
}
