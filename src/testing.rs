//! Test doubles shared by unit tests.

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use crate::generation::GenerationClient;
use crate::notify::{Notification, Notifier};
use flashlearn_core::{
    DetailedExplanation, Difficulty, Flashcard, Generated, GenerationKind, PlainFlashcard,
    ShortSummary,
};

pub fn card_for(topic: &str) -> Flashcard {
    Flashcard {
        topic_name: topic.to_string(),
        summary: format!("**{topic}** in two lines."),
        key_concepts: vec![
            "Ownership".to_string(),
            "Borrowing".to_string(),
            "Lifetimes".to_string(),
        ],
        example: format!("{topic} in production."),
        tip: format!("Practice {topic} daily."),
        difficulty: Difficulty::Intermediate,
    }
}

pub fn rust_card() -> Flashcard {
    card_for("Rust")
}

fn canned(kind: GenerationKind, topic: &str) -> Generated {
    match kind {
        GenerationKind::FlashcardWithSearch => Generated::Flashcard(card_for(topic)),
        GenerationKind::FlashcardPlain => Generated::PlainFlashcard(PlainFlashcard {
            topic: topic.to_string(),
            summary: "summary".to_string(),
            key_concepts: vec!["one".to_string()],
            example: "example".to_string(),
            tip: "tip".to_string(),
        }),
        GenerationKind::ShortSummary => Generated::ShortSummary(ShortSummary {
            summary: format!("{topic} is a topic. It is worth learning."),
        }),
        GenerationKind::DetailedExplanation => Generated::DetailedExplanation(DetailedExplanation {
            explanation: format!("# {topic}\n\nMore detail."),
        }),
    }
}

enum Script {
    Canned,
    Fail(String),
    Return(Generated),
}

/// Generation client that answers from a script and records every request.
pub struct ScriptedClient {
    script: Script,
    failing_topics: Vec<String>,
    requests: Mutex<Vec<(GenerationKind, String)>>,
}

impl ScriptedClient {
    pub fn succeeding() -> Self {
        Self::with_script(Script::Canned)
    }

    pub fn failing(message: &str) -> Self {
        Self::with_script(Script::Fail(message.to_string()))
    }

    pub fn returning(generated: Generated) -> Self {
        Self::with_script(Script::Return(generated))
    }

    /// Succeeds except for the listed topics.
    pub fn failing_for(topics: &[&str]) -> Self {
        let mut client = Self::succeeding();
        client.failing_topics = topics.iter().map(|t| t.to_string()).collect();
        client
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            failing_topics: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<(GenerationKind, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }

    async fn generate(&self, kind: GenerationKind, topic: &str) -> Result<Generated> {
        self.requests
            .lock()
            .unwrap()
            .push((kind, topic.to_string()));

        if self.failing_topics.iter().any(|t| t == topic) {
            anyhow::bail!("scripted failure for {}", topic);
        }
        match &self.script {
            Script::Canned => Ok(canned(kind, topic)),
            Script::Fail(message) => Err(anyhow::anyhow!("{}", message)),
            Script::Return(generated) => Ok(generated.clone()),
        }
    }
}

/// Notifier that keeps every notification for later assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}
