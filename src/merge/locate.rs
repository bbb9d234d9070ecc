//! Locating fragment nodes in an existing file.
//!
//! The [`Locator`] turns two parsed trees into an [`InsertionPlan`]. For
//! every fragment node it either finds an equal existing node (and maps the
//! fragment extent onto it, or recurses into it) or picks an anchor where
//! the new node belongs.
//!
//! Both the declaration-level and the statement-level walk are folds over
//! the fragment nodes carrying `(plan, last_matched)`:
//!
//! - the search for an equal node starts right after `last_matched`, so a
//!   later fragment node can never match an earlier existing node;
//! - an unmatched node does not move `last_matched`, so consecutive new
//!   nodes share one anchor and keep their fragment order once the plan is
//!   stably sorted.

use crate::config::{MergeConfig, MergeLevel};
use crate::error::MergeError;
use crate::model::{InsertionPlan, Location, Node, NodeKind, SourceTree};
use crate::parse::Fragment;

use super::equality::NodeEquality;
use super::order::NodeOrder;

use std::cmp::Ordering;

// ---------------------------------------------------------------------------
// Located
// ---------------------------------------------------------------------------

/// Result of a locate pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Located {
    /// Entries sorted by target.
    pub plan: InsertionPlan,
    /// Fragment nodes that were skipped because their kind cannot be placed
    /// at declaration level.
    pub unsupported: Vec<Location>,
}

// ---------------------------------------------------------------------------
// Locator
// ---------------------------------------------------------------------------

/// Computes insertion plans under one [`MergeConfig`].
#[derive(Clone, Debug)]
pub struct Locator {
    config: MergeConfig,
    equality: NodeEquality,
    order: NodeOrder,
}

impl Locator {
    /// A locator with the default kind order.
    #[must_use]
    pub fn new(config: MergeConfig) -> Self {
        Self::with_order(config, NodeOrder::default())
    }

    #[must_use]
    pub fn with_order(config: MergeConfig, order: NodeOrder) -> Self {
        Self {
            equality: NodeEquality::from_config(&config),
            config,
            order,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Plan the merge of `fragment` into `existing`.
    ///
    /// # Errors
    /// [`MergeError::Anchor`] if an existing class offers no anchor for its
    /// first member.
    pub fn locate(&self, existing: &SourceTree, fragment: &SourceTree) -> Result<InsertionPlan, MergeError> {
        self.locate_detailed(existing, fragment).map(|located| located.plan)
    }

    /// Like [`locate`](Self::locate), also reporting skipped fragment nodes.
    ///
    /// # Errors
    /// See [`locate`](Self::locate).
    pub fn locate_detailed(
        &self,
        existing: &SourceTree,
        fragment: &SourceTree,
    ) -> Result<Located, MergeError> {
        if self.config.level == MergeLevel::File {
            return Ok(Located {
                plan: InsertionPlan::single(fragment.whole(), existing.whole()),
                unsupported: Vec::new(),
            });
        }

        let existing_nodes: Vec<&Node> = existing.nodes().iter().collect();
        let fragment_nodes: Vec<&Node> = fragment.nodes().iter().collect();

        let mut pass = Pass {
            locator: self,
            unsupported: Vec::new(),
        };
        let plan = pass
            .declarations(&existing_nodes, &fragment_nodes, &Location::line_start(0))?
            .sorted_by_target();
        debug_assert!(plan.is_sorted_by_target());

        Ok(Located {
            plan,
            unsupported: pass.unsupported,
        })
    }

    /// Plan the merge of a prepared fragment.
    ///
    /// A synthetic wrapper class never contributes its header, and at
    /// [`MergeLevel::File`] only the fragment's own lines replace the file.
    ///
    /// # Errors
    /// See [`locate`](Self::locate).
    pub fn locate_fragment(&self, existing: &SourceTree, fragment: &Fragment) -> Result<Located, MergeError> {
        if self.config.level == MergeLevel::File {
            return Ok(Located {
                plan: InsertionPlan::single(fragment.content(), existing.whole()),
                unsupported: Vec::new(),
            });
        }
        if fragment.is_wrapped() && !self.config.ignore_class_declaration_header {
            let config = MergeConfig {
                ignore_class_declaration_header: true,
                ..self.config.clone()
            };
            return Self::with_order(config, self.order).locate_detailed(existing, fragment.tree());
        }
        self.locate_detailed(existing, fragment.tree())
    }
}

// ---------------------------------------------------------------------------
// Pass
// ---------------------------------------------------------------------------

/// State of one locate call.
struct Pass<'a> {
    locator: &'a Locator,
    unsupported: Vec<Location>,
}

impl Pass<'_> {
    /// Match fragment declarations against existing ones. `empty_anchor` is
    /// where new nodes go when there are no existing nodes at all.
    fn declarations(
        &mut self,
        existing: &[&Node],
        fragment: &[&Node],
        empty_anchor: &Location,
    ) -> Result<InsertionPlan, MergeError> {
        let (plan, _) = fragment.iter().try_fold(
            (InsertionPlan::new(), None::<usize>),
            |(mut plan, last), node| -> Result<_, MergeError> {
                if !node.kind().is_declaration_level() {
                    tracing::warn!(node = %node.location(), "skipping unsupported fragment node");
                    self.unsupported.push(node.location().clone());
                    return Ok((plan, last));
                }

                let from = next_index(last);
                let found = existing
                    .get(from..)
                    .unwrap_or_default()
                    .iter()
                    .position(|candidate| self.locator.equality.is_equal(candidate, node))
                    .map(|offset| from + offset);

                if let Some(index) = found {
                    plan.append(self.matched(existing[index], node)?);
                    Ok((plan, Some(index)))
                } else {
                    let anchor = self.anchor(existing, last, node, empty_anchor);
                    tracing::debug!(from = %node.location(), to = %anchor, "insert declaration");
                    plan.push(node.location().clone(), anchor);
                    Ok((plan, last))
                }
            },
        )?;
        Ok(plan)
    }

    /// Anchor for an unmatched declaration: after the last existing node,
    /// from `last` on, that does not sort after `node`.
    fn anchor(
        &self,
        existing: &[&Node],
        last: Option<usize>,
        node: &Node,
        empty_anchor: &Location,
    ) -> Location {
        let order = &self.locator.order;
        let after = (next_index(last)..existing.len())
            .take_while(|&i| order.compare(existing[i], node) != Ordering::Greater)
            .last()
            .or(last);

        match (after, existing.first()) {
            (Some(i), _) => existing[i].location().after(),
            (None, Some(first)) => first.location().before(),
            (None, None) => empty_anchor.clone(),
        }
    }

    /// Plan for a fragment declaration equal to `existing`.
    fn matched(&mut self, existing: &Node, fragment: &Node) -> Result<InsertionPlan, MergeError> {
        if existing.kind().is_class_like() && fragment.kind().is_class_like() {
            return self.matched_class(existing, fragment);
        }

        if self.locator.config.merges_lines()
            && existing.kind().is_callable()
            && fragment.kind().is_callable()
            && let (Some(existing_body), Some(fragment_body)) = (existing.body(), fragment.body())
        {
            return Ok(self.block((existing, fragment), existing_body, fragment_body));
        }

        tracing::debug!(from = %fragment.location(), to = %existing.location(), "replace declaration");
        Ok(InsertionPlan::single(
            fragment.location().clone(),
            existing.location().clone(),
        ))
    }

    fn matched_class(&mut self, existing: &Node, fragment: &Node) -> Result<InsertionPlan, MergeError> {
        let existing_members: Vec<&Node> = existing.members().collect();
        let fragment_members: Vec<&Node> = fragment.members().collect();

        let header = existing.header().ok_or_else(|| {
            MergeError::anchor(existing.name(), "class has no body to insert into")
        })?;
        let open_line = header.end().line;
        let header_plan = self.class_header(existing, fragment);
        if fragment_members.is_empty() && header_plan.is_empty() {
            return Ok(header_plan);
        }

        // `class Foo {}` or `class Foo { void m() {} }`: there is no line
        // between the braces to insert at, so the whole class is replaced.
        let fits = body_fits(open_line, existing.location().end().line, &existing_members)
            && (fragment_members.is_empty()
                || fragment
                    .header()
                    .is_some_and(|h| body_fits(h.end().line, fragment.location().end().line, &fragment_members)));
        if !fits {
            tracing::debug!(
                from = %fragment.location(),
                to = %existing.location(),
                "class body shares lines with its braces, replace class"
            );
            return Ok(InsertionPlan::single(
                fragment.location().clone(),
                existing.location().clone(),
            ));
        }

        let mut plan = header_plan;
        if existing_members.is_empty() {
            let name = existing.name_token().ok_or_else(|| {
                MergeError::anchor(existing.name(), "class has no name token to anchor its first member")
            })?;
            let anchor = Location::line_start(open_line + 1).with_origin(name.origin());
            plan.append(self.declarations(&[], &fragment_members, &anchor)?);
            return Ok(plan);
        }

        let empty_anchor = existing.location().before();
        plan.append(self.declarations(&existing_members, &fragment_members, &empty_anchor)?);
        Ok(plan)
    }

    /// A header entry when headers are compared and differ.
    fn class_header(&self, existing: &Node, fragment: &Node) -> InsertionPlan {
        if self.locator.config.ignore_class_declaration_header {
            return InsertionPlan::new();
        }
        match (existing.header(), fragment.header()) {
            (Some(to), Some(from))
                if existing.header_text().map(str::trim) != fragment.header_text().map(str::trim) =>
            {
                tracing::debug!(from = %from, to = %to, "replace class header");
                InsertionPlan::single(from.clone(), to.clone())
            }
            _ => InsertionPlan::new(),
        }
    }

    // -- statement level --

    /// Match the statements of two blocks. `outer` is the pair of nodes
    /// replaced wholesale when the blocks cannot be merged line by line.
    fn block(
        &self,
        outer: (&Node, &Node),
        existing_block: &Node,
        fragment_block: &Node,
    ) -> InsertionPlan {
        let existing: Vec<&Node> = existing_block.members().collect();
        let fragment: Vec<&Node> = fragment_block.members().collect();

        if fragment.is_empty() {
            return InsertionPlan::new();
        }

        let span = |block: &Node| (block.location().start().line, block.location().end().line);
        let (open_line, close_line) = span(existing_block);
        let (fragment_open, fragment_close) = span(fragment_block);
        if !body_fits(open_line, close_line, &existing) || !body_fits(fragment_open, fragment_close, &fragment) {
            return whole(outer);
        }

        self.statements(&existing, &fragment, &Location::line_start(open_line + 1))
    }

    fn statements(&self, existing: &[&Node], fragment: &[&Node], empty_anchor: &Location) -> InsertionPlan {
        let (plan, _) = fragment.iter().fold(
            (InsertionPlan::new(), None::<usize>),
            |(plan, last), node| {
                if let Some(index) = self.find_statement(existing, next_index(last), node) {
                    let sub = self.matched_statement(existing[index], node);
                    (InsertionPlan::merge(plan, sub), Some(index))
                } else {
                    let anchor = statement_anchor(existing, last, empty_anchor);
                    tracing::debug!(from = %node.location(), to = %anchor, "insert statement");
                    let mut plan = plan;
                    plan.push(node.location().clone(), anchor);
                    (plan, last)
                }
            },
        );
        plan
    }

    fn find_statement(&self, existing: &[&Node], from: usize, node: &Node) -> Option<usize> {
        let window = existing.get(from..).unwrap_or_default();
        window
            .iter()
            .position(|candidate| self.locator.equality.is_equal(candidate, node))
            .or_else(|| {
                // A changed return expression takes the place of the old
                // return instead of following it.
                (self.locator.config.level >= MergeLevel::Subline
                    && node.kind() == NodeKind::ReturnStmt)
                    .then(|| window.iter().position(|c| c.kind() == NodeKind::ReturnStmt))
                    .flatten()
            })
            .map(|offset| from + offset)
    }

    fn matched_statement(&self, existing: &Node, fragment: &Node) -> InsertionPlan {
        match (existing.kind(), fragment.kind()) {
            (NodeKind::IfStmt, NodeKind::IfStmt) => self.matched_if(existing, fragment),
            (NodeKind::BlockStmt, NodeKind::BlockStmt) => {
                self.block((existing, fragment), existing, fragment)
            }
            _ => whole((existing, fragment)),
        }
    }

    /// Recurse into the branches of two `if` statements with equal
    /// conditions.
    fn matched_if(&self, existing: &Node, fragment: &Node) -> InsertionPlan {
        let (Some((NodeKind::BlockStmt, existing_then)), Some((NodeKind::BlockStmt, fragment_then))) =
            (branch(existing, 1), branch(fragment, 1))
        else {
            return whole((existing, fragment));
        };
        let plan = self.block((existing, fragment), existing_then, fragment_then);

        match (branch(existing, 2), branch(fragment, 2)) {
            (_, None) => plan,
            (Some((NodeKind::BlockStmt, existing_else)), Some((NodeKind::BlockStmt, fragment_else))) => {
                InsertionPlan::merge(plan, self.block((existing, fragment), existing_else, fragment_else))
            }
            (Some((NodeKind::IfStmt, existing_else)), Some((NodeKind::IfStmt, fragment_else)))
                if self.locator.equality.is_equal(existing_else, fragment_else) =>
            {
                InsertionPlan::merge(plan, self.matched_if(existing_else, fragment_else))
            }
            _ => whole((existing, fragment)),
        }
    }
}

/// The `i`-th child of `node` with its kind, for matching `if` shapes.
fn branch(node: &Node, i: usize) -> Option<(NodeKind, &Node)> {
    node.children().get(i).map(|child| (child.kind(), child))
}

/// Anchor for an unmatched statement: after the last matched statement, or
/// before the first one (after a leading `this(...)`/`super(...)`).
fn statement_anchor(existing: &[&Node], last: Option<usize>, empty_anchor: &Location) -> Location {
    match (last, existing.first()) {
        (Some(i), _) => existing[i].location().after(),
        (None, Some(first)) if first.kind() == NodeKind::ExplicitConstructorInvocation => {
            first.location().after()
        }
        (None, Some(first)) => first.location().before(),
        (None, None) => empty_anchor.clone(),
    }
}

/// `true` when each member has lines of its own inside a body whose braces
/// sit on `open_line` and `close_line`. Only then can members be replaced
/// or inserted as whole lines without touching a brace or a sibling.
fn body_fits(open_line: usize, close_line: usize, members: &[&Node]) -> bool {
    let (Some(first), Some(last)) = (members.first(), members.last()) else {
        return open_line < close_line;
    };
    first.location().start().line > open_line
        && last.location().end().line < close_line
        && members
            .windows(2)
            .all(|pair| pair[0].location().end().line < pair[1].location().start().line)
}

fn whole((existing, fragment): (&Node, &Node)) -> InsertionPlan {
    tracing::debug!(from = %fragment.location(), to = %existing.location(), "replace statement");
    InsertionPlan::single(fragment.location().clone(), existing.location().clone())
}

const fn next_index(last: Option<usize>) -> usize {
    match last {
        Some(i) => i + 1,
        None => 0,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
