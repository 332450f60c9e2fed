//! Line-oriented study session (`flashlearn study`).
//!
//! Any line that is not a command is submitted as a topic. Commands:
//!
//! | Command | Effect |
//! |---------|--------|
//! | `:older` / `:newer` | Move through the last three cards |
//! | `:recent` | List recent topics |
//! | `:again N` | Regenerate recent topic N (1-based) |
//! | `:copy` | Copy the displayed card as plain text |
//! | `:pdf` | Export the displayed card to PDF |
//! | `:help` | Show commands |
//! | `:quit` | Leave (also end of input) |

use anyhow::Result;
use std::io::{BufRead, Write};

use crate::clipboard::{copy_card, Clipboard};
use crate::export::{export_card, Exporter};
use crate::render::{render_card, render_recent, Position, Style};
use crate::session::{Session, SessionError};
use flashlearn_core::{Direction, GenerationResult};

const HELP: &str = "\
Type a topic to generate a flashcard, or one of:
  :older  :newer  :recent  :again N  :copy  :pdf  :help  :quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudyCommand {
    Topic(String),
    Navigate(Direction),
    Recent,
    Again(usize),
    Copy,
    Pdf,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_command(line: &str) -> StudyCommand {
    let line = line.trim();
    if line.is_empty() {
        return StudyCommand::Empty;
    }
    let Some(command) = line.strip_prefix(':') else {
        return StudyCommand::Topic(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("older"), None, _) => StudyCommand::Navigate(Direction::Older),
        (Some("newer"), None, _) => StudyCommand::Navigate(Direction::Newer),
        (Some("recent"), None, _) => StudyCommand::Recent,
        (Some("again"), Some(n), None) => match n.parse::<usize>() {
            Ok(n) if n >= 1 => StudyCommand::Again(n),
            _ => StudyCommand::Unknown(line.to_string()),
        },
        (Some("copy"), None, _) => StudyCommand::Copy,
        (Some("pdf"), None, _) => StudyCommand::Pdf,
        (Some("help"), None, _) => StudyCommand::Help,
        (Some("quit" | "q" | "exit"), None, _) => StudyCommand::Quit,
        _ => StudyCommand::Unknown(line.to_string()),
    }
}

/// Front-end collaborators used by [`run_study`].
pub struct StudyIo<'a> {
    pub exporter: &'a dyn Exporter,
    pub clipboard: &'a dyn Clipboard,
    pub style: Style,
}

/// Run the study loop until `:quit` or end of input.
pub async fn run_study<R: BufRead, W: Write>(
    session: &mut Session,
    io: StudyIo<'_>,
    input: R,
    mut out: W,
) -> Result<()> {
    writeln!(out, "{}", HELP)?;
    if !session.recent_topics().is_empty() {
        writeln!(out, "\nRecent topics:")?;
        write!(out, "{}", render_recent(session.recent_topics().as_slice()))?;
    }

    for line in input.lines() {
        let line = line?;
        match parse_command(&line) {
            StudyCommand::Empty => continue,
            StudyCommand::Quit => break,
            StudyCommand::Help => writeln!(out, "{}", HELP)?,
            StudyCommand::Unknown(cmd) => writeln!(out, "Unknown command: {} (try :help)", cmd)?,
            StudyCommand::Topic(topic) => {
                writeln!(out, "Generating flashcard for \"{}\"...", topic.trim())?;
                let outcome = session.submit(&topic).await;
                show_outcome(session, outcome, io.style, &mut out)?;
            }
            StudyCommand::Again(n) => {
                let outcome = session.select_recent_index(n - 1).await;
                show_outcome(session, outcome, io.style, &mut out)?;
            }
            StudyCommand::Recent => {
                write!(out, "{}", render_recent(session.recent_topics().as_slice()))?
            }
            StudyCommand::Navigate(direction) => {
                if session.navigate(direction) {
                    show_current(session, io.style, &mut out)?;
                } else if session.history().is_empty() {
                    writeln!(out, "No flashcards yet.")?;
                } else {
                    let edge = match direction {
                        Direction::Older => "oldest",
                        Direction::Newer => "newest",
                    };
                    writeln!(out, "Already at the {} card.", edge)?;
                }
            }
            StudyCommand::Copy => match session.current_card() {
                Some(card) => {
                    copy_card(io.clipboard, card, session.notifier());
                }
                None => writeln!(out, "No flashcard to copy.")?,
            },
            StudyCommand::Pdf => match session.current_card() {
                Some(card) => {
                    export_card(io.exporter, card, session.notifier());
                }
                None => writeln!(out, "No flashcard to export.")?,
            },
        }
        out.flush()?;
    }
    Ok(())
}

// Failures are already reported through the session's notifier.
fn show_outcome<W: Write>(
    session: &Session,
    outcome: Result<GenerationResult<flashlearn_core::Flashcard>, SessionError>,
    style: Style,
    out: &mut W,
) -> Result<()> {
    match outcome {
        Ok(GenerationResult::Success(_)) => show_current(session, style, out),
        Ok(GenerationResult::Failure(_)) => Ok(()),
        Err(e) => {
            writeln!(out, "{}", e)?;
            Ok(())
        }
    }
}

fn show_current<W: Write>(session: &Session, style: Style, out: &mut W) -> Result<()> {
    if let Some(card) = session.current_card() {
        let position = Position {
            index: session.cursor(),
            len: session.history().len(),
            is_new: session.is_current_card_new(),
        };
        writeln!(out)?;
        write!(out, "{}", render_card(card, Some(position), style))?;
    }
    Ok(())
}
