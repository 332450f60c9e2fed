//! Minimal `**bold**` markup used inside generated text.
//!
//! Only paired double asterisks are recognized. An unmatched opening `**`
//! is kept as literal text.

/// A run of text that is either bold or regular.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span<'a> {
    pub text: &'a str,
    pub bold: bool,
}

/// Split `text` into regular and bold spans. Empty spans are omitted.
pub fn parse_bold(text: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("**") else {
            break;
        };
        if open > 0 {
            spans.push(Span {
                text: &rest[..open],
                bold: false,
            });
        }
        if close > 0 {
            spans.push(Span {
                text: &after_open[..close],
                bold: true,
            });
        }
        rest = &after_open[close + 2..];
    }
    if !rest.is_empty() {
        spans.push(Span {
            text: rest,
            bold: false,
        });
    }
    spans
}

/// Remove paired bold markers, keeping the enclosed text.
pub fn strip_bold(text: &str) -> String {
    parse_bold(text).into_iter().map(|s| s.text).collect()
}
