//! Terminal rendering for the CLI.

use flashlearn_core::markup::{parse_bold, strip_bold};
use flashlearn_core::{Flashcard, Generated, PlainFlashcard};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Whether `**bold**` spans are shown with ANSI escapes or stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Ansi,
    Plain,
}

impl Style {
    /// ANSI when stdout is a terminal.
    pub fn detect() -> Self {
        use std::io::IsTerminal;
        if std::io::stdout().is_terminal() {
            Style::Ansi
        } else {
            Style::Plain
        }
    }

    fn inline(self, text: &str) -> String {
        match self {
            Style::Plain => strip_bold(text),
            Style::Ansi => parse_bold(text)
                .into_iter()
                .map(|span| {
                    if span.bold {
                        format!("{BOLD}{}{RESET}", span.text)
                    } else {
                        span.text.to_string()
                    }
                })
                .collect(),
        }
    }

    fn heading(self, text: &str) -> String {
        match self {
            Style::Plain => text.to_string(),
            Style::Ansi => format!("{BOLD}{text}{RESET}"),
        }
    }
}

/// Where a card sits in the session's history, for the header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// 0 is the newest card.
    pub index: usize,
    pub len: usize,
    pub is_new: bool,
}

pub fn render_card(card: &Flashcard, position: Option<Position>, style: Style) -> String {
    let mut out = String::new();

    let mut title = style.heading(card.topic_name.trim());
    if let Some(pos) = position {
        title.push_str(&format!("  [{}/{}]", pos.index + 1, pos.len));
        if pos.is_new {
            title.push_str("  (new)");
        }
    }
    out.push_str(&title);
    out.push('\n');
    out.push_str(&format!("Difficulty: {}\n", card.difficulty));

    push_section(&mut out, style, "Summary", &style.inline(card.summary.trim()));
    push_section(
        &mut out,
        style,
        "Key Concepts",
        &concept_list(&card.key_concepts, style),
    );
    push_section(
        &mut out,
        style,
        "Real-World Example",
        &style.inline(card.example.trim()),
    );
    push_section(&mut out, style, "Learning Tip", &style.inline(card.tip.trim()));
    out
}

pub fn render_generated(generated: &Generated, style: Style) -> String {
    match generated {
        Generated::Flashcard(card) => render_card(card, None, style),
        Generated::PlainFlashcard(card) => render_plain_card(card, style),
        Generated::ShortSummary(s) => format!("{}\n", style.inline(s.summary.trim())),
        Generated::DetailedExplanation(d) => format!("{}\n", style.inline(d.explanation.trim())),
    }
}

fn render_plain_card(card: &PlainFlashcard, style: Style) -> String {
    let mut out = style.heading(card.topic.trim());
    out.push('\n');
    push_section(&mut out, style, "Summary", &style.inline(card.summary.trim()));
    push_section(
        &mut out,
        style,
        "Key Concepts",
        &concept_list(&card.key_concepts, style),
    );
    push_section(
        &mut out,
        style,
        "Real-World Example",
        &style.inline(card.example.trim()),
    );
    push_section(&mut out, style, "Learning Tip", &style.inline(card.tip.trim()));
    out
}

/// Numbered list, 1-based to match `again <n>`.
pub fn render_recent(topics: &[String]) -> String {
    if topics.is_empty() {
        return "No recent topics.\n".to_string();
    }
    topics
        .iter()
        .enumerate()
        .map(|(i, topic)| format!("  {}. {}\n", i + 1, topic))
        .collect()
}

fn concept_list(concepts: &[String], style: Style) -> String {
    concepts
        .iter()
        .map(|c| format!("  - {}", style.inline(c.trim())))
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_section(out: &mut String, style: Style, heading: &str, body: &str) {
    out.push('\n');
    out.push_str(&style.heading(heading));
    out.push('\n');
    out.push_str(body);
    out.push('\n');
}
