//! PDF export of flashcards.
//!
//! Cards are laid out on A4 pages with the standard Helvetica Type1 fonts,
//! so no font files are embedded:
//!
//! ```text
//! Rust                              <- title, bold 20pt
//! Difficulty: Intermediate
//!
//! Summary                           <- section heading, bold 14pt
//! A **systems** language ...        <- body 11pt, **bold** spans in bold
//!
//! Key Concepts
//! - Ownership
//! ...
//! ```
//!
//! Text is word-wrapped against approximate Helvetica metrics and flows onto
//! further pages as needed. Fonts use `WinAnsiEncoding`; characters outside
//! Latin-1 are mapped to ASCII look-alikes where one exists and to `?`
//! otherwise.

use anyhow::{Context, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use std::path::PathBuf;

use crate::config::ExportConfig;
use crate::notify::{Notification, Notifier};
use flashlearn_core::markup::parse_bold;
use flashlearn_core::Flashcard;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 56.0;
const LINE_SPACING: f32 = 1.4;

const TITLE_SIZE: f32 = 20.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 11.0;
const BULLET_INDENT: f32 = 14.0;

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

/// File name an exported card is saved under.
///
/// ```
/// assert_eq!(
///     flashlearn::export::export_filename("Rust Ownership"),
///     "Rust_Ownership_flashcard.pdf"
/// );
/// ```
pub fn export_filename(topic_name: &str) -> String {
    format!("{}_flashcard.pdf", topic_name.replace(' ', "_"))
}

/// [`export_filename`] with path separators, quotes and control characters
/// replaced by `_`, so the result is always a single path component.
///
/// ```
/// assert_eq!(
///     flashlearn::export::safe_export_filename("CI/CD Pipelines"),
///     "CI_CD_Pipelines_flashcard.pdf"
/// );
/// ```
pub fn safe_export_filename(topic_name: &str) -> String {
    export_filename(topic_name)
        .chars()
        .map(|c| match c {
            '/' | '\\' | '"' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Destination for exported flashcards.
pub trait Exporter: Send + Sync {
    /// Export `card`, returning where it was written.
    fn export(&self, card: &Flashcard) -> Result<PathBuf>;
}

/// Writes PDFs into a directory, creating it on first use.
pub struct PdfExporter {
    dir: PathBuf,
}

impl PdfExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(&config.dir)
    }
}

impl Exporter for PdfExporter {
    fn export(&self, card: &Flashcard) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create export directory: {}", self.dir.display())
        })?;
        let path = self.dir.join(safe_export_filename(&card.topic_name));
        let bytes = render_pdf(card)?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write PDF: {}", path.display()))?;
        tracing::info!(path = %path.display(), "exported flashcard");
        Ok(path)
    }
}

/// Export `card` and report the outcome on `notifier`.
///
/// Failures are logged and notified but never propagated; callers' state is
/// unaffected either way.
pub fn export_card(
    exporter: &dyn Exporter,
    card: &Flashcard,
    notifier: &dyn Notifier,
) -> Option<PathBuf> {
    match exporter.export(card) {
        Ok(path) => {
            notifier.notify(Notification::info(
                "PDF Generated",
                format!("Saved to {}", path.display()),
            ));
            Some(path)
        }
        Err(e) => {
            tracing::error!("Failed to generate PDF: {:#}", e);
            notifier.notify(Notification::error(
                "PDF Generation Failed",
                "There was an issue creating the PDF file.",
            ));
            None
        }
    }
}

/// Render `card` to PDF bytes.
pub fn render_pdf(card: &Flashcard) -> Result<Vec<u8>> {
    let lines = layout(card);
    let pages = paginate(&lines);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR_FONT => regular_id,
            BOLD_FONT => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in &pages {
        let content = Content {
            operations: page_operations(page),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(page_count),
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Real(0.0),
            Object::Real(0.0),
            Object::Real(PAGE_WIDTH),
            Object::Real(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(encode_text(&card.topic_name), StringFormat::Literal),
        "Producer" => Object::string_literal("FlashLearn"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).context("Failed to serialize PDF")?;
    Ok(bytes)
}

#[derive(Debug, Clone, PartialEq)]
struct Run {
    text: String,
    bold: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    runs: Vec<Run>,
    size: f32,
    indent: f32,
    space_before: f32,
}

impl Line {
    fn plain(text: &str, size: f32, bold: bool, space_before: f32) -> Self {
        Self {
            runs: vec![Run {
                text: text.to_string(),
                bold,
            }],
            size,
            indent: 0.0,
            space_before,
        }
    }

    fn height(&self) -> f32 {
        self.size * LINE_SPACING
    }
}

fn layout(card: &Flashcard) -> Vec<Line> {
    let body_width = PAGE_WIDTH - 2.0 * MARGIN;
    let mut lines = Vec::new();

    lines.extend(wrap(card.topic_name.trim(), TITLE_SIZE, 0.0, body_width, 0.0, true));
    lines.push(Line::plain(
        &format!("Difficulty: {}", card.difficulty),
        BODY_SIZE,
        false,
        4.0,
    ));

    lines.push(Line::plain("Summary", HEADING_SIZE, true, HEADING_SIZE));
    lines.extend(wrap(card.summary.trim(), BODY_SIZE, 0.0, body_width, 2.0, false));

    lines.push(Line::plain("Key Concepts", HEADING_SIZE, true, HEADING_SIZE));
    for concept in &card.key_concepts {
        let mut wrapped = wrap(
            concept.trim(),
            BODY_SIZE,
            BULLET_INDENT,
            body_width - BULLET_INDENT,
            2.0,
            false,
        );
        if let Some(first) = wrapped.first_mut() {
            first.indent = 0.0;
            first.runs.insert(
                0,
                Run {
                    text: "-  ".to_string(),
                    bold: false,
                },
            );
        }
        lines.extend(wrapped);
    }

    lines.push(Line::plain("Real-World Example", HEADING_SIZE, true, HEADING_SIZE));
    lines.extend(wrap(card.example.trim(), BODY_SIZE, 0.0, body_width, 2.0, false));

    lines.push(Line::plain("Learning Tip", HEADING_SIZE, true, HEADING_SIZE));
    lines.extend(wrap(card.tip.trim(), BODY_SIZE, 0.0, body_width, 2.0, false));

    lines
}

/// Split `text` into words, keeping `**bold**` runs. A word may mix bold and
/// regular runs when markers sit mid-word.
fn words(text: &str, all_bold: bool) -> Vec<Vec<Run>> {
    let mut words: Vec<Vec<Run>> = Vec::new();
    let mut glued = false;
    for span in parse_bold(text) {
        let bold = all_bold || span.bold;
        for (i, piece) in span.text.split(char::is_whitespace).enumerate() {
            if i > 0 {
                glued = false;
            }
            if piece.is_empty() {
                continue;
            }
            let run = Run {
                text: piece.to_string(),
                bold,
            };
            match words.last_mut() {
                Some(word) if glued => word.push(run),
                _ => words.push(vec![run]),
            }
            glued = true;
        }
    }
    words
}

/// Greedy word wrap into lines no wider than `max_width`. A single word wider
/// than the line is placed on its own line.
fn wrap(
    text: &str,
    size: f32,
    indent: f32,
    max_width: f32,
    space_before: f32,
    all_bold: bool,
) -> Vec<Line> {
    let space = char_width(' ', false) * size;
    let mut lines = Vec::new();
    let mut current: Vec<Run> = Vec::new();
    let mut width = 0.0;

    for word in words(text, all_bold) {
        let word_width: f32 = word.iter().map(|r| text_width(&r.text, r.bold) * size).sum();
        if !current.is_empty() && width + space + word_width > max_width {
            lines.push(std::mem::take(&mut current));
            width = 0.0;
        }
        if !current.is_empty() {
            append(&mut current, " ", false);
            width += space;
        }
        for run in word {
            append(&mut current, &run.text, run.bold);
        }
        width += word_width;
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
        .into_iter()
        .enumerate()
        .map(|(i, runs)| Line {
            runs,
            size,
            indent,
            space_before: if i == 0 { space_before } else { 0.0 },
        })
        .collect()
}

// Merges into the previous run when the style matches; separators join the
// previous run whatever its style.
fn append(runs: &mut Vec<Run>, text: &str, bold: bool) {
    match runs.last_mut() {
        Some(last) if last.bold == bold || text == " " => last.text.push_str(text),
        _ => runs.push(Run {
            text: text.to_string(),
            bold,
        }),
    }
}

/// Assign lines to pages. Every page holds at least one line.
fn paginate(lines: &[Line]) -> Vec<Vec<(f32, &Line)>> {
    let top = PAGE_HEIGHT - MARGIN;
    let mut pages = Vec::new();
    let mut page: Vec<(f32, &Line)> = Vec::new();
    let mut y = top;

    for line in lines {
        let mut next = y - line.space_before - line.height();
        if next < MARGIN && !page.is_empty() {
            pages.push(std::mem::take(&mut page));
            next = top - line.height();
        }
        page.push((next, line));
        y = next;
    }
    if !page.is_empty() || pages.is_empty() {
        pages.push(page);
    }
    pages
}

fn page_operations(page: &[(f32, &Line)]) -> Vec<Operation> {
    let mut ops = Vec::new();
    for (y, line) in page {
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Td",
            vec![(MARGIN + line.indent).into(), (*y).into()],
        ));
        for run in &line.runs {
            let font = if run.bold { BOLD_FONT } else { REGULAR_FONT };
            ops.push(Operation::new("Tf", vec![font.into(), line.size.into()]));
            ops.push(Operation::new(
                "Tj",
                vec![Object::String(encode_text(&run.text), StringFormat::Literal)],
            ));
        }
        ops.push(Operation::new("ET", vec![]));
    }
    ops
}

/// Encode for `WinAnsiEncoding`.
fn encode_text(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{2032}' => bytes.push(b'\''),
            '\u{201C}' | '\u{201D}' | '\u{2033}' => bytes.push(b'"'),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => bytes.push(b'-'),
            '\u{2022}' => bytes.push(b'-'),
            '\u{2026}' => bytes.extend_from_slice(b"..."),
            '\t' | '\n' | '\r' => bytes.push(b' '),
            // 0x80-0x9F differ between Latin-1 and WinAnsi.
            c if (' '..='~').contains(&c) || ('\u{A0}'..='\u{FF}').contains(&c) => {
                bytes.push(c as u32 as u8)
            }
            _ => bytes.push(b'?'),
        }
    }
    bytes
}

fn text_width(text: &str, bold: bool) -> f32 {
    text.chars().map(|c| char_width(c, bold)).sum()
}

/// Approximate Helvetica advance width, in ems.
fn char_width(c: char, bold: bool) -> f32 {
    let regular = match c {
        'i' | 'j' | 'l' | '\'' | '|' | '.' | ',' | ':' | ';' | '!' => 0.25,
        ' ' | 'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' => 0.3,
        'm' | 'w' | 'M' | 'W' | '@' => 0.85,
        'A'..='Z' => 0.68,
        _ => 0.55,
    };
    if bold {
        regular * 1.07
    } else {
        regular
    }
}
