//! Immutable syntax nodes as the merge engine sees them.
//!
//! The parser adapter turns a grammar-specific tree into [`Node`]s once per
//! merge. Nothing downstream ever mutates a node: the locator only reads
//! kinds, names, children and extents, and every node of a tree shares the
//! tree's source text so [`Node::text`] costs nothing.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use super::location::{Location, Origin};

// ---------------------------------------------------------------------------
// NodeKind
// ---------------------------------------------------------------------------

/// The closed set of node kinds the merge engine distinguishes.
///
/// Anything the parser adapter has no dedicated kind for is [`Other`],
/// carrying the grammar's own kind name. `Other` nodes still take part in
/// structural equality below declaration level; at declaration level they
/// are unsupported and skipped.
///
/// [`Other`]: NodeKind::Other
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    PackageDecl,
    ImportDecl,
    /// A class or interface declaration.
    ClassDecl,
    FieldDecl,
    ConstructorDecl,
    MethodDecl,
    /// `this(...)` / `super(...)` at the top of a constructor body.
    ExplicitConstructorInvocation,
    BlockStmt,
    ExpressionStmt,
    ReturnStmt,
    IfStmt,
    MethodCallExpr,
    /// An identifier in name position (declared names, called method names,
    /// type names).
    SimpleName,
    /// An identifier used as an expression.
    NameExpr,
    StringLiteral,
    NullLiteral,
    ThisExpr,
    LineComment,
    /// A callable's parameter, named by its raw type.
    Parameter,
    /// Numeric, character, boolean and text-block literals.
    Literal,
    /// A modifier list (keywords and annotations) as one token.
    Modifiers,
    /// Any other grammar node.
    Other(&'static str),
}

impl NodeKind {
    /// Class-like containers whose members the locator recurses into.
    #[must_use]
    pub const fn is_class_like(self) -> bool {
        matches!(self, Self::ClassDecl)
    }

    /// Methods and constructors.
    #[must_use]
    pub const fn is_callable(self) -> bool {
        matches!(self, Self::MethodDecl | Self::ConstructorDecl)
    }

    /// Tokens that belong to a declaration's header rather than its body.
    #[must_use]
    pub const fn is_header_token(self) -> bool {
        matches!(self, Self::SimpleName | Self::Parameter | Self::Modifiers)
    }

    /// Kinds the locator can place at file or class-member level.
    #[must_use]
    pub const fn is_declaration_level(self) -> bool {
        matches!(
            self,
            Self::PackageDecl
                | Self::ImportDecl
                | Self::ClassDecl
                | Self::FieldDecl
                | Self::ConstructorDecl
                | Self::MethodDecl
                | Self::BlockStmt
                | Self::LineComment
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(kind) => write!(f, "{kind}"),
            other => write!(f, "{other:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A syntax-tree element: kind, optional name, children and source extent.
#[derive(Clone, Debug)]
pub struct Node {
    kind: NodeKind,
    name: Option<String>,
    location: Location,
    header: Option<(Location, Range<usize>)>,
    source: Arc<str>,
    bytes: Range<usize>,
    children: Vec<Self>,
}

impl Node {
    /// Create a node over `bytes` of the shared `source`.
    ///
    /// The location is tagged with the node's kind and name.
    #[must_use]
    pub fn new(kind: NodeKind, location: Location, source: Arc<str>, bytes: Range<usize>) -> Self {
        Self {
            kind,
            name: None,
            location: location.with_origin(Origin {
                kind: kind.to_string(),
                name: None,
            }),
            header: None,
            source,
            bytes,
            children: Vec::new(),
        }
    }

    /// Set the node's name (declared name, literal value, operator tokens).
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.location = self.location.with_origin(Origin {
            kind: self.kind.to_string(),
            name: Some(name.clone()),
        });
        self.name = Some(name);
        self
    }

    /// Set the declaration header: the declaration start up to the opening
    /// brace of its body.
    #[must_use]
    pub fn with_header(mut self, header: Location, bytes: Range<usize>) -> Self {
        self.header = Some((header.with_origin(self.origin()), bytes));
        self
    }

    /// Attach children in source order.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }

    /// Move the node's start back to where `leading` starts, keeping its
    /// end. Used to cover a doc comment written above a declaration.
    #[must_use]
    pub(crate) fn extended_over(mut self, leading: &Self) -> Self {
        let start = leading.location.start();
        self.bytes.start = leading.bytes.start;
        self.location = Location::new(start, self.location.end()).with_origin(self.origin());
        if let Some((header, bytes)) = self.header.take() {
            self.header = Some((
                Location::new(start, header.end()).with_origin(self.origin()),
                leading.bytes.start..bytes.end,
            ));
        }
        self
    }

    /// Move the node's end to where `trailing` ends. Used for a line
    /// comment written after a node on the same line.
    pub(crate) fn extend_through(&mut self, trailing: &Self) {
        self.bytes.end = trailing.bytes.end;
        self.location = Location::new(self.location.start(), trailing.location.end()).with_origin(self.origin());
    }

    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The node's full extent.
    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// The declaration header, for class-like and callable nodes.
    #[must_use]
    pub fn header(&self) -> Option<&Location> {
        self.header.as_ref().map(|(location, _)| location)
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// The exact source text of the node's extent.
    #[must_use]
    pub fn text(&self) -> &str {
        self.source.get(self.bytes.clone()).unwrap_or_default()
    }

    /// Source text of the header, if the node has one.
    #[must_use]
    pub fn header_text(&self) -> Option<&str> {
        let (_, bytes) = self.header.as_ref()?;
        self.source.get(bytes.clone())
    }

    /// The diagnostic tag for this node.
    #[must_use]
    pub fn origin(&self) -> Origin {
        Origin {
            kind: self.kind.to_string(),
            name: self.name.clone(),
        }
    }

    /// The first name token among the children (a class's own name).
    #[must_use]
    pub fn name_token(&self) -> Option<&Self> {
        self.children
            .iter()
            .find(|child| child.kind == NodeKind::SimpleName)
    }

    /// Children that are not header tokens: a class's members, a block's
    /// statements.
    pub fn members(&self) -> impl Iterator<Item = &Self> {
        self.children
            .iter()
            .filter(|child| !child.kind.is_header_token())
    }

    /// Raw parameter type names of a callable, in declaration order.
    pub fn parameter_types(&self) -> impl Iterator<Item = &str> {
        self.children
            .iter()
            .filter(|child| child.kind == NodeKind::Parameter)
            .filter_map(Self::name)
    }

    /// The body block of a callable, if it has one.
    #[must_use]
    pub fn body(&self) -> Option<&Self> {
        self.children
            .iter()
            .find(|child| child.kind == NodeKind::BlockStmt)
    }
}

// ---------------------------------------------------------------------------
// SourceTree
// ---------------------------------------------------------------------------

/// A parsed source file: its top-level nodes plus the text they point into.
#[derive(Clone, Debug)]
pub struct SourceTree {
    source: Arc<str>,
    nodes: Vec<Node>,
}

impl SourceTree {
    /// Create a tree from its source and top-level nodes.
    #[must_use]
    pub const fn new(source: Arc<str>, nodes: Vec<Node>) -> Self {
        Self { source, nodes }
    }

    /// The full source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Top-level nodes in source order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of lines in the source, as the splicer counts them.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.source.lines().count()
    }

    /// Location covering the whole source text.
    #[must_use]
    pub fn whole(&self) -> Location {
        Location::lines(0..self.line_count())
    }

    /// The first class-like top-level node.
    #[must_use]
    pub fn primary_class(&self) -> Option<&Node> {
        self.nodes.iter().find(|node| node.kind().is_class_like())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
