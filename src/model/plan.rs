//! Insertion plans: where each piece of a fragment lands in a target file.
//!
//! The locator produces an [`InsertionPlan`]; the splicer consumes it. An
//! entry maps a fragment extent (`from`) to a target extent (`to`). A
//! zero-width `to` is a pure insertion, anything wider is a replacement.
//!
//! # Ordering
//!
//! The splicer walks entries top to bottom and tracks how far earlier edits
//! shifted later lines, so a plan handed to it must be sorted by target.
//! [`InsertionPlan::sort_by_target`] is stable: entries that share a target
//! keep the order the locator emitted them in, which is how several new
//! nodes anchored at the same point stay in fragment order.

use std::cmp::Ordering;

use serde::Serialize;

use super::location::Location;

// ---------------------------------------------------------------------------
// InsertionEntry
// ---------------------------------------------------------------------------

/// "The text spanning `from` in the fragment must appear at `to` in the
/// existing file."
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InsertionEntry {
    /// Extent in the fragment.
    pub from: Location,
    /// Extent in the existing file; empty for a pure insertion.
    pub to: Location,
}

impl InsertionEntry {
    /// Create an entry.
    #[must_use]
    pub const fn new(from: Location, to: Location) -> Self {
        Self { from, to }
    }

    /// `true` if the entry adds text without removing any.
    #[must_use]
    pub fn is_insertion(&self) -> bool {
        self.to.is_empty()
    }

    /// `true` if the entry replaces existing text.
    #[must_use]
    pub fn is_replacement(&self) -> bool {
        !self.to.is_empty()
    }
}

// ---------------------------------------------------------------------------
// InsertionPlan
// ---------------------------------------------------------------------------

/// An ordered collection of [`InsertionEntry`] values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InsertionPlan {
    entries: Vec<InsertionEntry>,
}

impl InsertionPlan {
    /// An empty plan.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// A plan with exactly one entry.
    #[must_use]
    pub fn single(from: Location, to: Location) -> Self {
        Self {
            entries: vec![InsertionEntry::new(from, to)],
        }
    }

    /// Append an entry, keeping insertion order.
    pub fn push(&mut self, from: Location, to: Location) {
        self.entries.push(InsertionEntry::new(from, to));
    }

    /// Append every entry of `other`, keeping both orders.
    pub fn append(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    #[must_use]
    pub fn entries(&self) -> &[InsertionEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InsertionEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of pure insertions.
    #[must_use]
    pub fn insertions(&self) -> usize {
        self.entries.iter().filter(|e| e.is_insertion()).count()
    }

    /// Number of replacements.
    #[must_use]
    pub fn replacements(&self) -> usize {
        self.entries.iter().filter(|e| e.is_replacement()).count()
    }

    /// Stable sort by target location.
    pub fn sort_by_target(&mut self) {
        self.entries.sort_by(|a, b| a.to.compare(&b.to));
    }

    /// Consume and return the plan sorted by target.
    #[must_use]
    pub fn sorted_by_target(mut self) -> Self {
        self.sort_by_target();
        self
    }

    /// `true` if targets never decrease from one entry to the next.
    #[must_use]
    pub fn is_sorted_by_target(&self) -> bool {
        self.entries
            .windows(2)
            .all(|pair| pair[0].to.compare(&pair[1].to) != Ordering::Greater)
    }

    /// Merge two plans that are each sorted by target into one sorted plan.
    ///
    /// On equal targets the entry from `a` comes first: an entry from `b` is
    /// only taken while its target is strictly before `a`'s current head.
    #[must_use]
    pub fn merge(a: Self, b: Self) -> Self {
        let mut merged = Vec::with_capacity(a.len() + b.len());
        let mut left = a.entries.into_iter().peekable();
        let mut right = b.entries.into_iter().peekable();

        loop {
            let take_right = match (left.peek(), right.peek()) {
                (Some(l), Some(r)) => r.to.compare(&l.to) == Ordering::Less,
                (None, Some(_)) => true,
                (Some(_), None) => false,
                (None, None) => break,
            };
            let next = if take_right { right.next() } else { left.next() };
            merged.extend(next);
        }

        Self { entries: merged }
    }
}

impl IntoIterator for InsertionPlan {
    type Item = InsertionEntry;
    type IntoIter = std::vec::IntoIter<InsertionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a InsertionPlan {
    type Item = &'a InsertionEntry;
    type IntoIter = std::slice::Iter<'a, InsertionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<InsertionEntry> for InsertionPlan {
    fn from_iter<T: IntoIterator<Item = InsertionEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
