//! Kind ordering for placing unmatched nodes.
//!
//! When a fragment node has no equal counterpart, the locator walks forward
//! through the existing nodes while they do not sort after the new one. The
//! order is coarse: kinds fall into buckets, and everything in one bucket is
//! equal here. A new field therefore lands after the last existing field and
//! before the first constructor, never between two methods.

use std::cmp::Ordering;

use crate::model::{Node, NodeKind};

/// Buckets in placement order, earliest first.
pub const DECLARATION_ORDER: &[NodeKind] = &[
    NodeKind::PackageDecl,
    NodeKind::ImportDecl,
    NodeKind::ClassDecl,
    NodeKind::FieldDecl,
    NodeKind::ConstructorDecl,
    NodeKind::MethodDecl,
    NodeKind::ExplicitConstructorInvocation,
    NodeKind::BlockStmt,
    NodeKind::ExpressionStmt,
    NodeKind::LineComment,
    NodeKind::ReturnStmt,
];

/// Total preorder over nodes, by bucket.
#[derive(Clone, Copy, Debug)]
pub struct NodeOrder {
    table: &'static [NodeKind],
}

impl Default for NodeOrder {
    fn default() -> Self {
        Self::new(DECLARATION_ORDER)
    }
}

impl NodeOrder {
    #[must_use]
    pub const fn new(table: &'static [NodeKind]) -> Self {
        Self { table }
    }

    /// Position of `kind` in the table.
    #[must_use]
    pub fn bucket(&self, kind: NodeKind) -> Option<usize> {
        self.table.iter().position(|k| *k == kind)
    }

    /// Compare by bucket. Nodes of kinds outside the table fall back to
    /// comparing their source text, which is stable but otherwise
    /// arbitrary.
    #[must_use]
    pub fn compare(&self, a: &Node, b: &Node) -> Ordering {
        match (self.bucket(a.kind()), self.bucket(b.kind())) {
            (Some(left), Some(right)) => left.cmp(&right),
            _ => a.text().cmp(b.text()),
        }
    }
}
