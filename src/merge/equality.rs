//! "Same program element" comparison.
//!
//! [`NodeEquality`] decides whether a fragment node and an existing node
//! declare the same thing, ignoring incidental differences such as
//! whitespace or unrelated body content. The answer is three-valued: when
//! two nodes carry nothing to compare the result is
//! [`Equality::Undetermined`], which the locator treats as "no match".
//!
//! Comparison is a pure function of the two nodes and the policy flag. The
//! locator asks the same question across overlapping search windows and
//! relies on getting the same answer every time.

use crate::config::MergeConfig;
use crate::model::{Node, NodeKind};

// ---------------------------------------------------------------------------
// Equality
// ---------------------------------------------------------------------------

/// Outcome of comparing two nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Equality {
    Equal,
    NotEqual,
    /// Neither equal nor unequal can be confirmed.
    Undetermined,
}

impl Equality {
    /// `true` only for [`Equality::Equal`].
    #[must_use]
    pub const fn is_equal(self) -> bool {
        matches!(self, Self::Equal)
    }

    const fn from_bool(equal: bool) -> Self {
        if equal { Self::Equal } else { Self::NotEqual }
    }

    /// Combine two pairwise results: `NotEqual` dominates, then
    /// `Undetermined`.
    #[must_use]
    pub const fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::NotEqual, _) | (_, Self::NotEqual) => Self::NotEqual,
            (Self::Undetermined, _) | (_, Self::Undetermined) => Self::Undetermined,
            (Self::Equal, Self::Equal) => Self::Equal,
        }
    }
}

// ---------------------------------------------------------------------------
// NodeEquality
// ---------------------------------------------------------------------------

/// Kind-aware node comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeEquality {
    ignore_inner_code_blocks: bool,
}

impl Default for NodeEquality {
    fn default() -> Self {
        Self::new(true)
    }
}

impl NodeEquality {
    /// Create a comparator. With `ignore_inner_code_blocks`, any two blocks
    /// compare equal and nested blocks are left out of structural
    /// comparison.
    #[must_use]
    pub const fn new(ignore_inner_code_blocks: bool) -> Self {
        Self {
            ignore_inner_code_blocks,
        }
    }

    #[must_use]
    pub const fn from_config(config: &MergeConfig) -> Self {
        Self::new(config.ignore_inner_code_blocks)
    }

    /// `true` if `a` and `b` are confirmed to be the same element.
    #[must_use]
    pub fn is_equal(&self, a: &Node, b: &Node) -> bool {
        self.compare(a, b).is_equal()
    }

    /// Compare two nodes.
    #[must_use]
    pub fn compare(&self, a: &Node, b: &Node) -> Equality {
        if a.kind() != b.kind() {
            return Equality::NotEqual;
        }

        match a.kind() {
            NodeKind::PackageDecl | NodeKind::ThisExpr | NodeKind::NullLiteral => Equality::Equal,

            // Named by the parser: imports by normalized path, fields by
            // first variable, classes by simple name, leaves by token text.
            NodeKind::ImportDecl
            | NodeKind::FieldDecl
            | NodeKind::ClassDecl
            | NodeKind::SimpleName
            | NodeKind::NameExpr
            | NodeKind::StringLiteral
            | NodeKind::Literal
            | NodeKind::Modifiers
            | NodeKind::Parameter => Equality::from_bool(a.name() == b.name()),

            NodeKind::LineComment => Equality::from_bool(a.text().trim_end() == b.text().trim_end()),

            NodeKind::ConstructorDecl => Equality::from_bool(same_parameters(a, b)),
            NodeKind::MethodDecl => {
                Equality::from_bool(a.name() == b.name() && same_parameters(a, b))
            }

            NodeKind::IfStmt => match (a.children().first(), b.children().first()) {
                (Some(left), Some(right)) => self.compare(left, right),
                _ => Equality::Undetermined,
            },

            NodeKind::BlockStmt if self.ignore_inner_code_blocks => Equality::Equal,

            _ => self.structural(a, b),
        }
    }

    /// Fallback: same name, same number of children, pairwise equal.
    fn structural(&self, a: &Node, b: &Node) -> Equality {
        if a.name() != b.name() {
            return Equality::NotEqual;
        }

        let left = self.compared_children(a);
        let right = self.compared_children(b);
        if left.is_empty() || right.is_empty() {
            return Equality::Undetermined;
        }
        if left.len() != right.len() {
            return Equality::NotEqual;
        }

        left.iter()
            .zip(&right)
            .map(|(l, r)| self.compare(l, r))
            .fold(Equality::Equal, Equality::and)
    }

    fn compared_children<'n>(&self, node: &'n Node) -> Vec<&'n Node> {
        node.children()
            .iter()
            .filter(|child| !(self.ignore_inner_code_blocks && child.kind() == NodeKind::BlockStmt))
            .collect()
    }
}

/// Parameter lists of equal length with equal raw type names per position.
fn same_parameters(a: &Node, b: &Node) -> bool {
    a.parameter_types().eq(b.parameter_types())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
