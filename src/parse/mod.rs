//! Parsing source text into [`SourceTree`]s.
//!
//! The merge engine only depends on the [`SourceParser`] trait. The Java
//! implementation lives in [`java`]; fragment preparation (wrapping bare
//! members in a class so they parse) lives in [`fragment`].

pub mod fragment;
pub mod java;

use std::fmt;

use crate::model::SourceTree;

pub use fragment::{Fragment, prepare_fragment};
pub use java::JavaParser;

/// Turns source text into a tree of [`Node`](crate::model::Node)s.
///
/// Implementations must preserve exact line/column extents: the splicer
/// copies lines by the locations they report.
pub trait SourceParser {
    /// Parse `source` into a tree.
    ///
    /// # Errors
    /// Returns a [`ParseError`] if the text is not syntactically valid.
    fn parse(&self, source: &str) -> Result<SourceTree, ParseError>;
}

// ---------------------------------------------------------------------------
// ParseError
// ---------------------------------------------------------------------------

/// Source text that failed to parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    /// What went wrong.
    pub message: String,
    /// 0-based line of the first error, when known.
    pub line: Option<usize>,
    /// The offending text.
    pub text: String,
}

impl ParseError {
    /// Create a parse error for `text`.
    #[must_use]
    pub fn new(message: impl Into<String>, line: Option<usize>, text: &str) -> Self {
        Self {
            message: message.into(),
            line,
            text: text.to_owned(),
        }
    }

    /// The offending text with 1-based line numbers, the failing line marked.
    #[must_use]
    pub fn numbered(&self) -> String {
        let width = self.text.lines().count().max(1).to_string().len();
        self.text
            .lines()
            .enumerate()
            .map(|(i, line)| {
                let marker = if Some(i) == self.line { '>' } else { ' ' };
                format!("{marker}{:>width$} | {line}\n", i + 1)
            })
            .collect()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line + 1, self.message)?,
            None => write!(f, "{}", self.message)?,
        }
        write!(f, "\n{}", self.numbered())
    }
}

impl std::error::Error for ParseError {}
