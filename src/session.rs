//! Session and history management.
//!
//! A [`Session`] owns the state of one learner's session:
//!
//! | State | Bound | Persisted |
//! |-------|-------|-----------|
//! | [`History`] of generated cards | 3, newest first | no |
//! | [`RecentTopics`] | 5, unique, newest first | yes, key `recentTopics` |
//! | [`Cursor`] into History | clamped | no |
//! | "new card" [`EntryFlag`] | 2 s | no |
//!
//! # Lifecycle
//!
//! ```text
//!   start ──▶ Idle ──submit──▶ Loading ──success──▶ Idle (card prepended,
//!              ▲                   │                topics saved, cursor 0,
//!              └──────failure──────┘                flag raised)
//! ```
//!
//! Only one submit may be in flight. Callers that hold the session behind a
//! lock can use [`Session::begin_submit`] / [`Session::complete_submit`] to
//! release the lock while the provider call runs; a submit arriving in the
//! meantime is refused with [`SessionError::Busy`].

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::actions::Actions;
use crate::notify::{Notification, Notifier};
use flashlearn_core::store::{load_json, save_json, KeyValueStore, RECENT_TOPICS_KEY};
use flashlearn_core::{Cursor, Direction, Flashcard, GenerationResult, History, RecentTopics};

/// How long a freshly generated card stays flagged as new.
pub const ENTRY_ANIMATION: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("A flashcard is already being generated")]
    Busy,
    #[error("No recent topic at position {0}")]
    NoSuchRecentTopic(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Loading,
}

/// One-shot flag that clears itself after a fixed window.
///
/// Each [`raise`](EntryFlag::raise) schedules its own clear on the tokio
/// runtime. Clears are epoch-guarded: a timer only lowers the flag it
/// raised, so raising again restarts the window.
#[derive(Clone)]
pub struct EntryFlag {
    window: Duration,
    next_epoch: Arc<AtomicU64>,
    // 0 when lowered, otherwise the epoch of the raise that set it.
    raised_epoch: Arc<AtomicU64>,
}

impl EntryFlag {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            next_epoch: Arc::new(AtomicU64::new(1)),
            raised_epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Raise the flag and schedule its clear. Must be called within a tokio runtime.
    pub fn raise(&self) {
        let epoch = self.next_epoch.fetch_add(1, Ordering::SeqCst);
        self.raised_epoch.store(epoch, Ordering::SeqCst);

        let raised = Arc::clone(&self.raised_epoch);
        let window = self.window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let _ = raised.compare_exchange(epoch, 0, Ordering::SeqCst, Ordering::SeqCst);
        });
    }

    pub fn is_raised(&self) -> bool {
        self.raised_epoch.load(Ordering::SeqCst) != 0
    }
}

/// Serializable view of a session for front ends.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub cursor: usize,
    pub history_length: usize,
    pub current_card: Option<Flashcard>,
    pub is_new: bool,
    pub can_go_older: bool,
    pub can_go_newer: bool,
    pub recent_topics: Vec<String>,
}

pub struct Session {
    actions: Actions,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    history: History,
    recent: RecentTopics,
    cursor: Cursor,
    phase: Phase,
    new_card: EntryFlag,
}

impl Session {
    /// Start a session, loading recent topics from `store`.
    ///
    /// Missing or unreadable stored topics start the session with an empty
    /// list; the next successful generation overwrites them.
    pub async fn start(
        actions: Actions,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let recent = match load_json::<Vec<String>>(store.as_ref(), RECENT_TOPICS_KEY).await {
            Ok(Some(stored)) => RecentTopics::from_stored(stored),
            Ok(None) => RecentTopics::new(),
            Err(e) => {
                tracing::warn!("Ignoring stored recent topics: {:#}", e);
                RecentTopics::new()
            }
        };
        tracing::debug!(recent = recent.len(), "session started");

        Self {
            actions,
            store,
            notifier,
            history: History::new(),
            recent,
            cursor: Cursor::default(),
            phase: Phase::Idle,
            new_card: EntryFlag::new(ENTRY_ANIMATION),
        }
    }

    /// Generate a flashcard for `raw_topic` and record it.
    pub async fn submit(
        &mut self,
        raw_topic: &str,
    ) -> Result<GenerationResult<Flashcard>, SessionError> {
        self.begin_submit()?;
        let result = self.actions.flashcard(raw_topic).await;
        Ok(self.complete_submit(raw_topic, result).await)
    }

    /// Re-run generation for a recent topic. Always regenerates, even when
    /// History already holds a card for it.
    pub async fn select_recent_topic(
        &mut self,
        topic: &str,
    ) -> Result<GenerationResult<Flashcard>, SessionError> {
        self.submit(topic).await
    }

    /// [`select_recent_topic`](Self::select_recent_topic) by position (0 = newest).
    pub async fn select_recent_index(
        &mut self,
        index: usize,
    ) -> Result<GenerationResult<Flashcard>, SessionError> {
        let topic = self
            .recent
            .get(index)
            .ok_or(SessionError::NoSuchRecentTopic(index))?
            .to_string();
        self.submit(&topic).await
    }

    /// Enter the loading phase, refusing if a submit is already in flight.
    pub fn begin_submit(&mut self) -> Result<(), SessionError> {
        if self.phase == Phase::Loading {
            return Err(SessionError::Busy);
        }
        self.phase = Phase::Loading;
        Ok(())
    }

    /// Apply the outcome of a submit started with [`begin_submit`](Self::begin_submit).
    pub async fn complete_submit(
        &mut self,
        raw_topic: &str,
        result: GenerationResult<Flashcard>,
    ) -> GenerationResult<Flashcard> {
        match &result {
            GenerationResult::Success(card) => {
                self.history.push(card.clone());
                self.recent.touch(raw_topic.trim());
                if let Err(e) = save_json(self.store.as_ref(), RECENT_TOPICS_KEY, &self.recent).await
                {
                    tracing::warn!("Failed to persist recent topics: {:#}", e);
                }
                self.cursor.reset();
                self.new_card.raise();
            }
            GenerationResult::Failure(message) => {
                self.notifier
                    .notify(Notification::error("An error occurred", message.clone()));
            }
        }
        self.phase = Phase::Idle;
        result
    }

    /// Move the displayed-card cursor. Returns whether it moved.
    pub fn navigate(&mut self, direction: Direction) -> bool {
        self.cursor.step(direction, self.history.len())
    }

    pub fn current_card(&self) -> Option<&Flashcard> {
        self.history.get(self.cursor.index())
    }

    /// Whether the displayed card is the newest one and still inside its
    /// entry-animation window.
    pub fn is_current_card_new(&self) -> bool {
        self.cursor.index() == 0 && self.new_card.is_raised()
    }

    pub fn actions(&self) -> &Actions {
        &self.actions
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn recent_topics(&self) -> &RecentTopics {
        &self.recent
    }

    pub fn cursor(&self) -> usize {
        self.cursor.index()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let len = self.history.len();
        SessionSnapshot {
            phase: self.phase,
            cursor: self.cursor.index(),
            history_length: len,
            current_card: self.current_card().cloned(),
            is_new: self.is_current_card_new(),
            can_go_older: self.cursor.can_step(Direction::Older, len),
            can_go_newer: self.cursor.can_step(Direction::Newer, len),
            recent_topics: self.recent.as_slice().to_vec(),
        }
    }
}
