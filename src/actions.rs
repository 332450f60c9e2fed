//! Action layer: input validation and failure normalization.
//!
//! [`Actions`] is the boundary between callers (session, HTTP API, CLI)
//! and the [`GenerationClient`]. Above it, every outcome is a
//! [`GenerationResult`]; raw generation errors are logged here and replaced
//! by the kind's fixed user-facing message.
//!
//! Steps for every action:
//! 1. Trim and validate the topic. Invalid input fails immediately, with no
//!    client call and no log entry.
//! 2. Call the client exactly once.
//! 3. Wrap the output, or log the error and return the fixed message.

use std::sync::Arc;

use crate::generation::GenerationClient;
use flashlearn_core::{
    DetailedExplanation, Flashcard, Generated, GenerationKind, GenerationResult, PlainFlashcard,
    ShortSummary, Topic,
};

#[derive(Clone)]
pub struct Actions {
    client: Arc<dyn GenerationClient>,
}

impl Actions {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self { client }
    }

    /// Run `kind` for `raw_topic`, returning whichever output shape it produces.
    pub async fn perform(&self, kind: GenerationKind, raw_topic: &str) -> GenerationResult<Generated> {
        let topic = match Topic::parse(raw_topic) {
            Ok(topic) => topic,
            Err(e) => return GenerationResult::failure(e.to_string()),
        };

        match self.client.generate(kind, topic.as_str()).await {
            Ok(generated) => GenerationResult::Success(generated),
            Err(e) => {
                tracing::error!(
                    %kind,
                    topic = %topic,
                    provider = self.client.provider_name(),
                    "Error generating {}: {:#}",
                    kind,
                    e
                );
                GenerationResult::failure(kind.failure_message())
            }
        }
    }

    /// Flashcard with up-to-date information and a difficulty rating.
    pub async fn flashcard(&self, raw_topic: &str) -> GenerationResult<Flashcard> {
        self.perform_as(GenerationKind::FlashcardWithSearch, raw_topic, Generated::into_flashcard)
            .await
    }

    pub async fn plain_flashcard(&self, raw_topic: &str) -> GenerationResult<PlainFlashcard> {
        self.perform_as(
            GenerationKind::FlashcardPlain,
            raw_topic,
            Generated::into_plain_flashcard,
        )
        .await
    }

    pub async fn short_summary(&self, raw_topic: &str) -> GenerationResult<ShortSummary> {
        self.perform_as(
            GenerationKind::ShortSummary,
            raw_topic,
            Generated::into_short_summary,
        )
        .await
    }

    pub async fn detailed_explanation(
        &self,
        raw_topic: &str,
    ) -> GenerationResult<DetailedExplanation> {
        self.perform_as(
            GenerationKind::DetailedExplanation,
            raw_topic,
            Generated::into_detailed_explanation,
        )
        .await
    }

    async fn perform_as<T>(
        &self,
        kind: GenerationKind,
        raw_topic: &str,
        extract: fn(Generated) -> Option<T>,
    ) -> GenerationResult<T> {
        match self.perform(kind, raw_topic).await {
            GenerationResult::Success(generated) => match extract(generated) {
                Some(data) => GenerationResult::Success(data),
                None => {
                    tracing::error!(%kind, "generation client returned output of another kind");
                    GenerationResult::failure(kind.failure_message())
                }
            },
            GenerationResult::Failure(message) => GenerationResult::Failure(message),
        }
    }
}
