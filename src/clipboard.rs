//! Clipboard collaborator.
//!
//! The formatted text comes from [`flashlearn_core::clipboard::plain_text`];
//! a [`Clipboard`] only decides where it goes. The CLI prints it, the HTTP
//! API returns it in the response body.

use anyhow::Result;
use std::io::Write;

use crate::notify::{Notification, Notifier};
use flashlearn_core::clipboard::plain_text;
use flashlearn_core::Flashcard;

pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}

/// Writes copied text to stdout, delimited so it is easy to select.
pub struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "----- 8< -----")?;
        writeln!(out, "{}", text)?;
        writeln!(out, "----- >8 -----")?;
        out.flush()?;
        Ok(())
    }
}

/// Copy `card` as plain text and report the outcome on `notifier`.
pub fn copy_card(clipboard: &dyn Clipboard, card: &Flashcard, notifier: &dyn Notifier) -> bool {
    match clipboard.write_text(&plain_text(card)) {
        Ok(()) => {
            notifier.notify(Notification::info(
                "Copied to Clipboard",
                "The flashcard content has been copied.",
            ));
            true
        }
        Err(e) => {
            tracing::error!("Failed to copy flashcard: {:#}", e);
            notifier.notify(Notification::error(
                "Copy Failed",
                "There was an issue copying the content.",
            ));
            false
        }
    }
}
