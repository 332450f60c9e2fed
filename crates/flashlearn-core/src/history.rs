//! Bounded, most-recent-first collections kept by a learning session.
//!
//! - [`History`] holds the generated flashcards (newest first, at most
//!   [`HISTORY_LIMIT`]). Overflow evicts the oldest; there is no dedup by topic.
//! - [`RecentTopics`] holds topic strings (newest first, at most
//!   [`RECENT_TOPICS_LIMIT`], unique by exact match). Re-inserting a topic
//!   moves it to the front.
//! - [`Cursor`] points at the displayed card and is clamped, never wrapping.

use serde::{Deserialize, Serialize};

use crate::models::Flashcard;

pub const HISTORY_LIMIT: usize = 3;
pub const RECENT_TOPICS_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct History {
    cards: Vec<Flashcard>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `card`, dropping the oldest entries beyond the limit.
    pub fn push(&mut self, card: Flashcard) {
        self.cards.insert(0, card);
        self.cards.truncate(HISTORY_LIMIT);
    }

    pub fn get(&self, index: usize) -> Option<&Flashcard> {
        self.cards.get(index)
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentTopics {
    topics: Vec<String>,
}

impl RecentTopics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a persisted list, restoring the uniqueness and size
    /// invariants if the stored data violates them. First occurrence wins.
    pub fn from_stored(stored: Vec<String>) -> Self {
        let mut topics: Vec<String> = Vec::with_capacity(RECENT_TOPICS_LIMIT);
        for topic in stored {
            if topics.len() == RECENT_TOPICS_LIMIT {
                break;
            }
            if !topics.contains(&topic) {
                topics.push(topic);
            }
        }
        Self { topics }
    }

    /// Move `topic` to the front, removing any earlier occurrence.
    pub fn touch(&mut self, topic: &str) {
        self.topics.retain(|t| t != topic);
        self.topics.insert(0, topic.to_string());
        self.topics.truncate(RECENT_TOPICS_LIMIT);
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.topics.get(index).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

/// Navigation direction through [`History`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards older cards (higher index).
    Older,
    /// Towards newer cards (index 0).
    Newer,
}

/// Index of the displayed card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cursor(usize);

impl Cursor {
    pub fn index(self) -> usize {
        self.0
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Step once in `direction` within `[0, len - 1]`. Returns whether the
    /// cursor moved.
    pub fn step(&mut self, direction: Direction, len: usize) -> bool {
        let next = match direction {
            Direction::Older if self.0 + 1 < len => self.0 + 1,
            Direction::Newer if self.0 > 0 => self.0 - 1,
            _ => return false,
        };
        self.0 = next;
        true
    }

    pub fn can_step(self, direction: Direction, len: usize) -> bool {
        match direction {
            Direction::Older => self.0 + 1 < len,
            Direction::Newer => self.0 > 0,
        }
    }
}
