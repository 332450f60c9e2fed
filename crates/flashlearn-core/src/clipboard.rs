//! Plain-text rendering of a flashcard for copy/paste.

use crate::markup::strip_bold;
use crate::models::Flashcard;

/// Render `card` as plain text with bold markers removed.
///
/// ```text
/// Topic: Rust
/// Difficulty: Intermediate
///
/// Summary:
/// ...
///
/// Key Concepts:
/// - Ownership
/// - Borrowing
///
/// Real-World Example:
/// ...
///
/// Learning Tip:
/// ...
/// ```
pub fn plain_text(card: &Flashcard) -> String {
    let concepts = card
        .key_concepts
        .iter()
        .map(|c| format!("- {}", strip_bold(c.trim())))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Topic: {}\nDifficulty: {}\n\nSummary:\n{}\n\nKey Concepts:\n{}\n\nReal-World Example:\n{}\n\nLearning Tip:\n{}",
        strip_bold(card.topic_name.trim()),
        card.difficulty,
        strip_bold(card.summary.trim()),
        concepts,
        strip_bold(card.example.trim()),
        strip_bold(card.tip.trim()),
    )
}
