//! # FlashLearn Core
//!
//! Shared, I/O-free logic for FlashLearn: schema contracts, prompt
//! templates, bounded session collections, bold-markup helpers, the
//! plain-text formatter, and the key-value persistence port.
//!
//! This crate contains no tokio, HTTP client, or filesystem dependencies.

pub mod clipboard;
pub mod history;
pub mod markup;
pub mod models;
pub mod prompts;
pub mod schema;
pub mod store;
pub mod topic;

pub use history::{Cursor, Direction, History, RecentTopics};
pub use models::{
    DetailedExplanation, Difficulty, Flashcard, Generated, GenerationResult, PlainFlashcard,
    ShortSummary,
};
pub use prompts::GenerationKind;
pub use topic::{Topic, TopicError};
