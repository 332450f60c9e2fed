//! # FlashLearn
//!
//! Turn a topic into a structured study flashcard with a large language model.
//!
//! A topic goes through a prompt template and a JSON output schema to a
//! generation provider; the validated result becomes a [`Flashcard`] that a
//! learning session keeps in a short history, exports to PDF, or copies as
//! plain text.
//!
//! ## Architecture
//!
//! ```text
//!  ┌─────────┐   ┌──────────┐   ┌───────────┐   ┌──────────────────┐
//!  │ CLI/API │──▶│ Session  │──▶│  Actions  │──▶│ GenerationClient │
//!  └─────────┘   └────┬─────┘   │ validate, │   │ gemini / openai  │
//!                     │         │ normalize │   │ / ollama         │
//!                     ▼         └───────────┘   └──────────────────┘
//!              ┌──────────────┐
//!              │ KeyValueStore│  recentTopics
//!              └──────────────┘
//! ```
//!
//! Pure data types, prompt templates, schemas and the bounded history live in
//! the `flashlearn-core` crate.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`generation`] | Generation provider abstraction |
//! | [`actions`] | Input validation and failure normalization |
//! | [`session`] | History, recent topics, navigation |
//! | [`file_store`] | JSON-file persistence backend |
//! | [`notify`] | User-visible notifications |
//! | [`export`] | PDF export |
//! | [`clipboard`] | Plain-text copy |
//! | [`render`] | Terminal rendering |
//! | [`interactive`] | `study` loop |
//! | [`server`] | JSON HTTP API |
//!
//! [`Flashcard`]: flashlearn_core::Flashcard

pub mod actions;
pub mod clipboard;
pub mod config;
pub mod export;
pub mod file_store;
pub mod generation;
pub mod interactive;
pub mod notify;
pub mod render;
pub mod server;
pub mod session;

#[cfg(test)]
mod testing;
