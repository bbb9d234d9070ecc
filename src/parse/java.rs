//! Java source parsing via tree-sitter.
//!
//! [`JavaParser`] runs the tree-sitter Java grammar and converts its concrete
//! syntax tree into engine [`Node`]s. The conversion decides what the merge
//! engine can see:
//!
//! - declarations get their declared name (`ClassDecl` and callables also a
//!   header location up to the body's opening brace);
//! - a `/** ... */` comment directly above a declaration is folded into that
//!   declaration's extent, so moving or replacing the declaration carries its
//!   documentation along (annotations are already inside the grammar's
//!   declaration node);
//! - parameters are named by their raw type (`List<String>` → `List`);
//! - parentheses and argument lists are transparent;
//! - everything without a dedicated kind becomes [`NodeKind::Other`], named
//!   by its anonymous tokens (operators, keywords) so that `a + b` and `a - b`
//!   do not look alike.

use std::sync::Arc;

use tree_sitter::{Language, Parser};

use super::{ParseError, SourceParser};
use crate::model::{Location, Node, NodeKind, Point, SourceTree};

type TsNode<'tree> = tree_sitter::Node<'tree>;

/// Grammar kinds converted to [`NodeKind::Literal`].
const LITERAL_KINDS: &[&str] = &[
    "decimal_integer_literal",
    "hex_integer_literal",
    "octal_integer_literal",
    "binary_integer_literal",
    "decimal_floating_point_literal",
    "hex_floating_point_literal",
    "character_literal",
    "text_block",
    "true",
    "false",
];

/// Grammar kinds for type names, converted to [`NodeKind::SimpleName`].
const TYPE_NAME_KINDS: &[&str] = &[
    "type_identifier",
    "integral_type",
    "floating_point_type",
    "boolean_type",
    "void_type",
];

// ---------------------------------------------------------------------------
// JavaParser
// ---------------------------------------------------------------------------

/// [`SourceParser`] for Java, backed by `tree-sitter-java`.
///
/// Stateless: a fresh tree-sitter parser is created per call, so one
/// `JavaParser` can be shared freely across threads.
#[derive(Clone, Copy, Debug, Default)]
pub struct JavaParser;

impl JavaParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SourceParser for JavaParser {
    fn parse(&self, source: &str) -> Result<SourceTree, ParseError> {
        let language: Language = tree_sitter_java::LANGUAGE.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| ParseError::new(format!("parser setup failed: {e}"), None, source))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseError::new("tree-sitter returned no tree", None, source))?;

        let root = tree.root_node();
        if root.has_error() {
            let (line, message) = first_error(root).map_or_else(
                || (None, "syntax error".to_owned()),
                |bad| (Some(bad.start_position().row), describe_error(bad, source)),
            );
            return Err(ParseError::new(message, line, source));
        }

        let shared: Arc<str> = Arc::from(source);
        let nodes = Converter { source: &shared }.sequence(root);
        Ok(SourceTree::new(shared, nodes))
    }
}

/// Depth-first search for the first ERROR or MISSING node.
fn first_error(node: TsNode<'_>) -> Option<TsNode<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find_map(first_error);
    found
}

fn describe_error(node: TsNode<'_>, source: &str) -> String {
    if node.is_missing() {
        return format!("missing `{}`", node.kind());
    }
    let text = source.get(node.byte_range()).unwrap_or_default();
    let snippet: String = text.chars().take(40).collect();
    format!("unexpected `{}`", snippet.trim())
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

struct Converter<'s> {
    source: &'s Arc<str>,
}

impl Converter<'_> {
    fn text(&self, node: TsNode<'_>) -> &str {
        self.source.get(node.byte_range()).unwrap_or_default()
    }

    fn base(&self, kind: NodeKind, node: TsNode<'_>) -> Node {
        Node::new(
            kind,
            Location::new(point(node.start_position()), point(node.end_position())),
            Arc::clone(self.source),
            node.byte_range(),
        )
    }

    /// Convert a statement or member list, folding doc comments into the
    /// declaration that follows them and line comments into the node they
    /// trail on the same line.
    fn sequence(&self, container: TsNode<'_>) -> Vec<Node> {
        let mut out: Vec<Node> = Vec::new();
        let mut doc: Option<Node> = None;

        for (child, field) in named_children(container) {
            if child.kind() == "line_comment"
                && doc.is_none()
                && let Some(last) = out.last_mut()
                && last.location().end().line == child.start_position().row
            {
                last.extend_through(&self.base(NodeKind::LineComment, child));
                continue;
            }
            if child.kind() == "block_comment" && self.text(child).starts_with("/**") {
                out.extend(doc.replace(self.base(NodeKind::Other("block_comment"), child)));
                continue;
            }

            let mut converted = self.convert(child, field).into_iter();
            match (doc.take(), converted.next()) {
                (Some(comment), Some(first)) if documents(&comment, &first) => {
                    out.push(first.extended_over(&comment));
                }
                (comment, first) => {
                    out.extend(comment);
                    out.extend(first);
                }
            }
            out.extend(converted);
        }

        out.extend(doc);
        out
    }

    /// Convert every named child, flattening transparent wrappers.
    fn children_of(&self, node: TsNode<'_>) -> Vec<Node> {
        named_children(node)
            .into_iter()
            .flat_map(|(child, field)| self.convert(child, field))
            .collect()
    }

    /// Convert one grammar node. Transparent wrappers produce their
    /// children; everything else produces exactly one node.
    fn convert(&self, node: TsNode<'_>, field: Option<&str>) -> Vec<Node> {
        let kind = node.kind();
        let converted = match kind {
            "package_declaration" => {
                let name = named_children(node)
                    .into_iter()
                    .map(|(child, _)| child)
                    .find(|child| matches!(child.kind(), "scoped_identifier" | "identifier"))
                    .map(|child| squash(self.text(child)))
                    .unwrap_or_default();
                self.base(NodeKind::PackageDecl, node).named(name)
            }
            "import_declaration" => {
                self.base(NodeKind::ImportDecl, node)
                    .named(normalize_import(self.text(node)))
            }
            "class_declaration" | "interface_declaration" => self.class(node),
            "field_declaration" | "constant_declaration" => self.field(node),
            "method_declaration" => self.callable(NodeKind::MethodDecl, node),
            "constructor_declaration" => self.callable(NodeKind::ConstructorDecl, node),
            "formal_parameter" | "spread_parameter" => self.parameter(node),
            "block" | "constructor_body" => {
                self.base(NodeKind::BlockStmt, node)
                    .with_children(self.sequence(node))
            }
            "expression_statement" => {
                self.base(NodeKind::ExpressionStmt, node)
                    .with_children(self.children_of(node))
            }
            "return_statement" => {
                self.base(NodeKind::ReturnStmt, node)
                    .with_children(self.children_of(node))
            }
            "if_statement" => self.if_statement(node),
            "explicit_constructor_invocation" => {
                let children = named_children(node)
                    .into_iter()
                    .flat_map(|(child, field)| {
                        if field == Some("constructor") {
                            let name = self.text(child).to_owned();
                            vec![self.base(NodeKind::SimpleName, child).named(name)]
                        } else {
                            self.convert(child, field)
                        }
                    })
                    .collect();
                self.base(NodeKind::ExplicitConstructorInvocation, node)
                    .with_children(children)
            }
            "method_invocation" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_owned())
                    .unwrap_or_default();
                self.base(NodeKind::MethodCallExpr, node)
                    .named(name)
                    .with_children(self.children_of(node))
            }
            "identifier" => {
                let name_kind = if matches!(field, Some("name" | "field")) {
                    NodeKind::SimpleName
                } else {
                    NodeKind::NameExpr
                };
                self.base(name_kind, node).named(self.text(node))
            }
            "string_literal" => self.base(NodeKind::StringLiteral, node).named(self.text(node)),
            "null_literal" => self.base(NodeKind::NullLiteral, node),
            "this" => self.base(NodeKind::ThisExpr, node),
            "line_comment" => self.base(NodeKind::LineComment, node),
            "modifiers" => {
                let words = self.text(node).split_whitespace().collect::<Vec<_>>().join(" ");
                self.base(NodeKind::Modifiers, node).named(words)
            }
            "parenthesized_expression" | "argument_list" => return self.children_of(node),
            k if LITERAL_KINDS.contains(&k) => {
                self.base(NodeKind::Literal, node).named(self.text(node))
            }
            k if TYPE_NAME_KINDS.contains(&k) => {
                self.base(NodeKind::SimpleName, node).named(self.text(node))
            }
            _ => {
                let other = self
                    .base(NodeKind::Other(kind), node)
                    .with_children(self.children_of(node));
                let tokens = anonymous_tokens(node, self.source);
                if tokens.is_empty() {
                    other
                } else {
                    other.named(tokens)
                }
            }
        };
        vec![converted]
    }

    fn class(&self, node: TsNode<'_>) -> Node {
        let name = node.child_by_field_name("name");
        let body = node.child_by_field_name("body");

        let mut children = Vec::new();
        let mut class = self.base(NodeKind::ClassDecl, node);
        if let Some(name) = name {
            let text = self.text(name);
            children.push(self.base(NodeKind::SimpleName, name).named(text));
            class = class.named(text);
        }
        if let Some(body) = body {
            children.extend(self.sequence(body));
            class = class.with_header(
                Location::new(point(node.start_position()), point(body.start_position())),
                node.start_byte()..body.start_byte(),
            );
        }
        class.with_children(children)
    }

    /// Fields are identified by their first declared variable.
    fn field(&self, node: TsNode<'_>) -> Node {
        let name = node
            .child_by_field_name("declarator")
            .and_then(|declarator| declarator.child_by_field_name("name"))
            .map(|name| self.text(name).to_owned())
            .unwrap_or_default();
        self.base(NodeKind::FieldDecl, node).named(name)
    }

    fn callable(&self, kind: NodeKind, node: TsNode<'_>) -> Node {
        let mut children = Vec::new();
        let mut callable = self.base(kind, node);

        if let Some(name) = node.child_by_field_name("name") {
            let text = self.text(name);
            children.push(self.base(NodeKind::SimpleName, name).named(text));
            callable = callable.named(text);
        }
        if let Some(params) = node.child_by_field_name("parameters") {
            children.extend(
                named_children(params)
                    .into_iter()
                    .filter(|(param, _)| {
                        matches!(param.kind(), "formal_parameter" | "spread_parameter")
                    })
                    .map(|(param, _)| self.parameter(param)),
            );
        }
        if let Some(body) = node.child_by_field_name("body") {
            children.extend(self.convert(body, Some("body")));
            callable = callable.with_header(
                Location::new(point(node.start_position()), point(body.start_position())),
                node.start_byte()..body.start_byte(),
            );
        }
        callable.with_children(children)
    }

    fn parameter(&self, node: TsNode<'_>) -> Node {
        let raw = if node.kind() == "spread_parameter" {
            let ty = named_children(node)
                .into_iter()
                .map(|(child, _)| child)
                .find(|child| !matches!(child.kind(), "modifiers" | "variable_declarator"));
            format!("{}...", ty.map(|t| self.raw_type(t)).unwrap_or_default())
        } else {
            let mut raw = node
                .child_by_field_name("type")
                .map(|t| self.raw_type(t))
                .unwrap_or_default();
            if let Some(dims) = node.child_by_field_name("dimensions") {
                raw.push_str(&squash(self.text(dims)));
            }
            raw
        };
        self.base(NodeKind::Parameter, node).named(raw)
    }

    /// A type's name without its type arguments.
    fn raw_type(&self, node: TsNode<'_>) -> String {
        match node.kind() {
            "generic_type" => node
                .named_child(0)
                .map_or_else(|| squash(self.text(node)), |base| self.raw_type(base)),
            "array_type" => {
                let element = node
                    .child_by_field_name("element")
                    .map(|e| self.raw_type(e))
                    .unwrap_or_default();
                let dims = node
                    .child_by_field_name("dimensions")
                    .map(|d| squash(self.text(d)))
                    .unwrap_or_default();
                format!("{element}{dims}")
            }
            "annotated_type" => {
                let count = node.named_child_count();
                count
                    .checked_sub(1)
                    .and_then(|last| node.named_child(last))
                    .map_or_else(|| squash(self.text(node)), |ty| self.raw_type(ty))
            }
            _ => squash(self.text(node)),
        }
    }

    fn if_statement(&self, node: TsNode<'_>) -> Node {
        let mut children = Vec::new();
        for field in ["condition", "consequence", "alternative"] {
            if let Some(part) = node.child_by_field_name(field) {
                children.extend(self.convert(part, Some(field)));
            }
        }
        self.base(NodeKind::IfStmt, node).with_children(children)
    }
}

/// `true` if `comment` sits directly above (or on the line of) `decl`.
fn documents(comment: &Node, decl: &Node) -> bool {
    matches!(
        decl.kind(),
        NodeKind::ClassDecl | NodeKind::FieldDecl | NodeKind::ConstructorDecl | NodeKind::MethodDecl
    ) && decl.location().start().line <= comment.location().end().line + 1
}

fn named_children(node: TsNode<'_>) -> Vec<(TsNode<'_>, Option<&'static str>)> {
    let mut cursor = node.walk();
    let mut out = Vec::new();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            if child.is_named() {
                out.push((child, cursor.field_name()));
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
    out
}

/// Concatenated text of a node's anonymous children (operators, keywords,
/// punctuation).
fn anonymous_tokens(node: TsNode<'_>, source: &str) -> String {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| !child.is_named())
        .filter_map(|child| source.get(child.byte_range()))
        .collect()
}

fn normalize_import(text: &str) -> String {
    let body = text.trim();
    let body = body.strip_prefix("import").unwrap_or(body);
    let body = body.trim().trim_end_matches(';').trim();
    match body.strip_prefix("static") {
        Some(rest) if rest.starts_with(char::is_whitespace) => format!("static {}", squash(rest)),
        _ => squash(body),
    }
}

fn squash(text: &str) -> String {
    text.split_whitespace().collect()
}

const fn point(p: tree_sitter::Point) -> Point {
    Point::new(p.row, p.column)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
