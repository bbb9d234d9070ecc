//! Applying an insertion plan to line arrays.
//!
//! The splicer works on whole lines. Entries are applied top to bottom while
//! tracking how many lines earlier entries added and removed, so every
//! target location (computed against the original file) lands where it was
//! meant to.

use crate::config::MergeConfig;
use crate::model::{InsertionEntry, InsertionPlan};

// ---------------------------------------------------------------------------
// SourceLines
// ---------------------------------------------------------------------------

/// Line terminator used when rendering lines back to text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// A source text split into lines, remembering how to join them again.
///
/// Splitting follows [`str::lines`], the same way the parsed tree counts
/// lines, so line numbers from the tree index straight into this array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLines {
    lines: Vec<String>,
    ending: LineEnding,
    trailing_newline: bool,
}

impl SourceLines {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_owned).collect(),
            ending: if text.contains("\r\n") {
                LineEnding::CrLf
            } else {
                LineEnding::Lf
            },
            // An empty file gets a newline once something is written to it.
            trailing_newline: text.is_empty() || text.ends_with('\n'),
        }
    }

    /// Replace the lines, keeping ending and trailing-newline state.
    #[must_use]
    pub fn with_lines(self, lines: Vec<String>) -> Self {
        Self { lines, ..self }
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub const fn ending(&self) -> LineEnding {
        self.ending
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Join the lines back into text.
    #[must_use]
    pub fn render(&self) -> String {
        let ending = self.ending.as_str();
        let mut text = self.lines.join(ending);
        if self.trailing_newline && !self.lines.is_empty() {
            text.push_str(ending);
        }
        text
    }
}

// ---------------------------------------------------------------------------
// apply
// ---------------------------------------------------------------------------

/// Result of applying a plan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpliceOutcome {
    /// The updated lines.
    pub lines: Vec<String>,
    /// Number of entries applied.
    pub applied: usize,
    /// Replacement entries left out because overriding was not allowed.
    pub skipped: Vec<InsertionEntry>,
}

/// Apply `plan` to `existing`, copying lines from `fragment`.
///
/// Entries are applied in target order. Replacements are skipped unless
/// `config.override_existing` is set; pure insertions are always applied.
/// Ranges past the end of either array are clamped.
///
/// An entry whose target overlaps lines an earlier entry already rewrote
/// only replaces what is left of its target, and its lines follow the
/// earlier entry's lines.
#[must_use]
pub fn apply<E, F>(
    config: &MergeConfig,
    existing: &[E],
    fragment: &[F],
    plan: &InsertionPlan,
) -> SpliceOutcome
where
    E: AsRef<str>,
    F: AsRef<str>,
{
    let mut entries: Vec<&InsertionEntry> = plan.iter().collect();
    entries.sort_by(|a, b| a.to.compare(&b.to));

    let mut lines: Vec<String> = existing.iter().map(|l| l.as_ref().to_owned()).collect();
    let mut outcome = SpliceOutcome::default();
    let (mut added, mut removed) = (0_usize, 0_usize);
    // First index not yet written by an applied entry.
    let mut floor = 0_usize;

    for entry in entries {
        if entry.is_replacement() && !config.override_existing {
            tracing::warn!(
                from = %entry.from,
                to = %entry.to,
                "skipping replacement of existing text (override is off)"
            );
            outcome.skipped.push(entry.clone());
            continue;
        }

        let target = entry.to.line_span();
        let start = (target.start + added)
            .saturating_sub(removed)
            .max(floor)
            .min(lines.len());
        let end = (target.end + added)
            .saturating_sub(removed)
            .clamp(start, lines.len());

        let source = entry.from.line_span();
        let source = source.start.min(fragment.len())..source.end.min(fragment.len());
        let inserted: Vec<String> = fragment[source]
            .iter()
            .map(|l| l.as_ref().to_owned())
            .collect();

        added += inserted.len();
        removed += end - start;
        floor = start + inserted.len();
        lines.splice(start..end, inserted);
        outcome.applied += 1;
    }

    outcome.lines = lines;
    outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
