//! Caret-annotated excerpts for runtime errors.
//!
//! Columns are measured the way a monospaced terminal renders mixed ASCII and Japanese
//! text: half-width characters take one cell, everything else takes two.

use crate::environment::prelude::DnclObject;
use super::src_span::SrcSpan;

/// Lines of context shown above the offending line.
pub const CONTEXT_LINES: usize = 5;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPosition {
    /// Zero-based line holding the start of the span.
    pub line: usize,
    /// Characters between the start of the line and the span.
    pub column: usize,
    /// Terminal cells between the start of the line and the span.
    pub display_column: usize,
    pub caret_width: usize,
}

pub fn is_half_width(ch: char) -> bool {
    matches!(ch as u32, 0x0020..=0x007E | 0xFF61..=0xFF9F)
}

pub fn display_width(text: &str) -> usize {
    text.chars()
        .map(|ch| if is_half_width(ch) { 1 } else { 2 })
        .sum()
}

pub fn locate(src: &str, span: SrcSpan) -> ErrorPosition {
    let start = span.start as usize;

    let caret_width = src.get(start..span.end as usize)
        .map(|text| text.chars().filter(|ch| *ch != '\r').count())
        .unwrap_or(0)
        .max(1);

    let mut index = 0;

    for (line, text) in src.split('\n').enumerate() {
        if index + text.len() < start {
            index += text.len() + 1;
            continue;
        }

        let before = text.get(..start - index).unwrap_or(text);
        let before = before.strip_suffix('\r').unwrap_or(before);

        return ErrorPosition {
            line,
            column: before.chars().count(),
            display_column: display_width(before),
            caret_width,
        };
    }

    ErrorPosition {
        caret_width,
        ..Default::default()
    }
}

pub fn explain_span(src: &str, message: &str, span: SrcSpan) -> String {
    let position = locate(src, span);

    let lines = src.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect::<Vec<&str>>();
    let first = position.line.saturating_sub(CONTEXT_LINES);
    let excerpt = lines.get(first..=position.line)
        .map(|lines| lines.join("\n"))
        .unwrap_or_default();

    format!(
        "line: {}, column: {}\n{}\n{}\n{}{}",
        position.line,
        position.column,
        message,
        excerpt,
        " ".repeat(position.display_column),
        "^".repeat(position.caret_width)
    )
}

/// Renders an `Error`/`TypeError` value; any other value has nothing to explain.
pub fn explain(src: &str, value: &DnclObject) -> Option<String> {
    match value {
        DnclObject::Error { message, location }
        | DnclObject::TypeError { message, location } => {
            Some(explain_span(src, message, *location))
        },
        _ => None,
    }
}
