//! Source locations for merge planning.
//!
//! A [`Location`] is a half-open `(line, column)` interval: the start is
//! inclusive, the end exclusive. Lines are 0-based rows, columns are byte
//! offsets within the row, exactly as the parser reports them.
//!
//! The splicer works on whole lines, so every location also exposes the
//! [`line_span`](Location::line_span) it touches. A zero-width location is an
//! insertion point *before* the line it sits on.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A single `(line, column)` position in a source text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Point {
    /// 0-based line (row).
    pub line: usize,
    /// 0-based byte column within the line.
    pub col: usize,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Humans count from 1.
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

// ---------------------------------------------------------------------------
// Origin
// ---------------------------------------------------------------------------

/// The node a location was derived from, kept for diagnostics only.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Origin {
    /// Node kind, rendered (e.g. `"MethodDecl"`).
    pub kind: String,
    /// Declared name, when the node has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} `{name}`", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// An immutable half-open interval in a source file.
///
/// Equality ignores [`origin`](Location::origin): two locations are the same
/// if they cover the same interval, whichever node they came from.
#[derive(Clone, Debug, Eq, Serialize)]
pub struct Location {
    start: Point,
    end: Point,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<Origin>,
}

impl Location {
    /// Create a location spanning `start..end`.
    ///
    /// # Panics
    /// Panics if `start` is after `end`. An inverted interval is a bug in
    /// whoever built it, never a property of the input text.
    #[must_use]
    pub fn new(start: Point, end: Point) -> Self {
        assert!(
            start <= end,
            "location start {start} is after its end {end}"
        );
        Self {
            start,
            end,
            origin: None,
        }
    }

    /// A zero-width insertion point at the start of `line`.
    #[must_use]
    pub const fn line_start(line: usize) -> Self {
        let point = Point::new(line, 0);
        Self {
            start: point,
            end: point,
            origin: None,
        }
    }

    /// Whole-line location covering `lines` (`lines.end` exclusive).
    #[must_use]
    pub fn lines(lines: Range<usize>) -> Self {
        Self::new(Point::new(lines.start, 0), Point::new(lines.end, 0))
    }

    /// Tag this location with the node it was derived from.
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// The zero-width insertion point on the line after `self`.
    ///
    /// Text inserted here lands immediately below the last line `self`
    /// touches. The origin is carried over so diagnostics still name the
    /// anchor node.
    #[must_use]
    pub fn after(&self) -> Self {
        Self {
            origin: self.origin.clone(),
            ..Self::line_start(self.line_span().end)
        }
    }

    /// The zero-width insertion point at the start of `self`'s first line.
    #[must_use]
    pub fn before(&self) -> Self {
        Self {
            origin: self.origin.clone(),
            ..Self::line_start(self.start.line)
        }
    }

    /// Inclusive start.
    #[must_use]
    pub const fn start(&self) -> Point {
        self.start
    }

    /// Exclusive end.
    #[must_use]
    pub const fn end(&self) -> Point {
        self.end
    }

    /// The node this location was derived from, if recorded.
    #[must_use]
    pub const fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    /// `true` for a zero-width location (a pure insertion point).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// `true` if `other` lies entirely inside `self`.
    #[must_use]
    pub fn includes(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Order two locations by their start position only.
    ///
    /// This is the order insertion plans are sorted in. It is deliberately
    /// coarser than `(start, end)`: entries that start at the same point keep
    /// their relative order under a stable sort.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        self.start.cmp(&other.start)
    }

    /// The range of whole lines this location touches.
    ///
    /// An empty location touches no lines; its range is empty and starts at
    /// its own line. A location ending at column 0 does not touch its end
    /// line.
    #[must_use]
    pub const fn line_span(&self) -> Range<usize> {
        if self.start.line == self.end.line && self.start.col == self.end.col {
            return self.start.line..self.start.line;
        }
        let end = if self.end.col == 0 {
            self.end.line
        } else {
            self.end.line + 1
        };
        self.start.line..end
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "@{}", self.start)?;
        } else {
            write!(f, "{}-{}", self.start, self.end)?;
        }
        if let Some(origin) = &self.origin {
            write!(f, " ({origin})")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
