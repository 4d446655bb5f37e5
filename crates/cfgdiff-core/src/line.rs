//! Output line model shared by the classifier, the reconciler and the
//! normalizer.

use std::fmt;

use serde::Serialize;

/// Unified-diff change marker in column 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    None,
    Removed,
    Added,
}

impl Marker {
    /// Marker carried by the first character of `line`.
    pub fn of(line: &str) -> Self {
        match line.as_bytes().first() {
            Some(b'-') => Marker::Removed,
            Some(b'+') => Marker::Added,
            _ => Marker::None,
        }
    }

    pub fn symbol(self) -> Option<char> {
        match self {
            Marker::None => None,
            Marker::Removed => Some('-'),
            Marker::Added => Some('+'),
        }
    }

    pub fn is_change(self) -> bool {
        self != Marker::None
    }
}

/// A formatted line of minimized diff output.
///
/// `indent` counts the marker column, so a marked line renders as the marker
/// followed by `indent - 1` spaces and a context line as `indent` spaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputLine {
    pub marker: Marker,
    pub indent: usize,
    pub text: String,
}

impl OutputLine {
    pub fn new(marker: Marker, indent: usize, text: impl Into<String>) -> Self {
        Self {
            marker,
            indent,
            text: text.into(),
        }
    }

    /// Split a raw diff line into marker, leading spaces and text.
    ///
    /// Only spaces count toward the indent; tabs stay in `text`, so
    /// `OutputLine::raw(l).to_string() == l` for every input.
    pub fn raw(line: &str) -> Self {
        let marker = Marker::of(line);
        let body = if marker.is_change() { &line[1..] } else { line };
        let text = body.trim_start_matches(' ');
        let spaces = body.len() - text.len();
        let indent = if marker.is_change() { spaces + 1 } else { spaces };
        Self::new(marker, indent, text)
    }
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.marker.symbol() {
            Some(symbol) => write!(
                f,
                "{}{:pad$}{}",
                symbol,
                "",
                self.text,
                pad = self.indent.saturating_sub(1)
            ),
            None => write!(f, "{:pad$}{}", "", self.text, pad = self.indent),
        }
    }
}
