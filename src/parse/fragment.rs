//! Fragment preparation.
//!
//! Generated fragments come in two shapes: whole compilation units
//! (package, imports, a class) and bare members (a field, a method) meant to
//! go inside the target's class. Bare members do not parse on their own, so
//! they are wrapped in a synthetic class that copies the header of the
//! target's primary class. The wrapper then matches that class by name and
//! the locator sees only the members. When the class has to be replaced
//! whole, the copied header keeps the target's declaration as it was.

use crate::error::MergeError;
use crate::model::{Location, Node, NodeKind, SourceTree};

use super::SourceParser;

/// A parsed fragment ready for locating.
#[derive(Clone, Debug)]
pub struct Fragment {
    tree: SourceTree,
    /// Lines the wrapper puts before the fragment text, `None` if unwrapped.
    prefix_lines: Option<usize>,
}

impl Fragment {
    #[must_use]
    pub const fn tree(&self) -> &SourceTree {
        &self.tree
    }

    /// `true` if the fragment was wrapped in a synthetic class.
    #[must_use]
    pub const fn is_wrapped(&self) -> bool {
        self.prefix_lines.is_some()
    }

    /// The lines of the tree's source that came from the fragment text, i.e.
    /// everything except the synthetic wrapper's header and closing line.
    #[must_use]
    pub fn content(&self) -> Location {
        match self.prefix_lines {
            Some(prefix) => Location::lines(prefix..self.tree.line_count().saturating_sub(1).max(prefix)),
            None => self.tree.whole(),
        }
    }
}

/// Parse `text` as a fragment for merging into `existing`.
///
/// # Errors
/// - [`MergeError::Anchor`] if the fragment needs wrapping and `existing`
///   declares no named class.
/// - [`MergeError::Parse`] (without a path) if the fragment does not parse
///   either on its own or wrapped.
pub fn prepare_fragment<P>(parser: &P, text: &str, existing: &SourceTree) -> Result<Fragment, MergeError>
where
    P: SourceParser + ?Sized,
{
    if let Ok(tree) = parser.parse(text)
        && is_compilation_unit(tree.nodes())
    {
        return Ok(Fragment {
            tree,
            prefix_lines: None,
        });
    }

    let (class, name) = existing
        .primary_class()
        .and_then(|class| Some((class, class.name()?)))
        .ok_or_else(|| {
            MergeError::anchor(None, "target declares no class to wrap a member fragment in")
        })?;
    let body = text.trim_end_matches(['\r', '\n']);

    // A header the members do not parse under falls back to a plain class.
    if let Some(header) = class.header_text()
        && let Ok(fragment) = wrap(parser, header, body)
    {
        tracing::debug!(class = name, "wrapping member fragment in target header");
        return Ok(fragment);
    }
    tracing::debug!(class = name, "wrapping member fragment");
    wrap(parser, &format!("class {name} "), body)
}

fn wrap<P>(parser: &P, header: &str, body: &str) -> Result<Fragment, MergeError>
where
    P: SourceParser + ?Sized,
{
    let tree = parser.parse(&format!("{header}{{\n{body}\n}}\n"))?;
    Ok(Fragment {
        tree,
        prefix_lines: Some(header.matches('\n').count() + 1),
    })
}

/// A fragment stands on its own when it declares a class, or holds nothing
/// but package/import declarations and comments.
fn is_compilation_unit(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| node.kind().is_class_like())
        || nodes.iter().all(|node| {
            matches!(
                node.kind(),
                NodeKind::PackageDecl
                    | NodeKind::ImportDecl
                    | NodeKind::LineComment
                    | NodeKind::Other("block_comment")
            )
        })
}

#[cfg(test)]
#[allow(clippy::all, clippy::pedantic, clippy::nursery)]
mod tests {
    use super::*;
    use crate::parse::JavaParser;

    fn existing() -> SourceTree {
        JavaParser::new()
            .parse("package p;\n\npublic class Target {\n    int s;\n}\n")
            .unwrap()
    }

    #[test]
    fn whole_class_is_used_as_is() {
        let text = "public class Target {\n    int t;\n}\n";
        let fragment = prepare_fragment(&JavaParser::new(), text, &existing()).unwrap();
        assert!(!fragment.is_wrapped());
        assert_eq!(fragment.tree().source(), text);
        assert_eq!(fragment.content().line_span(), 0..3);
    }

    #[test]
    fn imports_only_are_used_as_is() {
        let fragment =
            prepare_fragment(&JavaParser::new(), "import java.util.List;\n", &existing()).unwrap();
        assert!(!fragment.is_wrapped());
        assert_eq!(fragment.tree().nodes()[0].kind(), NodeKind::ImportDecl);
    }

    #[test]
    fn bare_members_are_wrapped_in_target_class() {
        let text = "    private int t;\n\n    public void bar() {\n    }\n";
        let fragment = prepare_fragment(&JavaParser::new(), text, &existing()).unwrap();
        assert!(fragment.is_wrapped());

        let class = fragment.tree().primary_class().unwrap();
        assert_eq!(class.name(), Some("Target"));
        let kinds: Vec<_> = class.members().map(Node::kind).collect();
        assert_eq!(kinds, vec![NodeKind::FieldDecl, NodeKind::MethodDecl]);

        // Members keep their lines, shifted by the wrapper's opening line.
        assert_eq!(class.members().next().unwrap().location().line_span(), 1..2);
        assert_eq!(fragment.content().line_span(), 1..5);
    }

    #[test]
    fn wrapper_copies_target_header() {
        let existing = JavaParser::new()
            .parse("@Entity\npublic class Target extends Base {\n    int s;\n}\n")
            .unwrap();
        let fragment = prepare_fragment(&JavaParser::new(), "    int t;\n", &existing).unwrap();

        let class = fragment.tree().primary_class().unwrap();
        assert_eq!(
            class.header_text(),
            existing.primary_class().unwrap().header_text()
        );
        assert_eq!(fragment.content().line_span(), 2..3);
    }

    #[test]
    fn wrapping_needs_a_named_target_class() {
        let empty = JavaParser::new().parse("package p;\n").unwrap();
        let err = prepare_fragment(&JavaParser::new(), "int t;\n", &empty).unwrap_err();
        assert!(matches!(err, MergeError::Anchor { .. }));
    }

    #[test]
    fn broken_fragment_is_a_parse_error_without_path() {
        let err =
            prepare_fragment(&JavaParser::new(), "void bar( {\n", &existing()).unwrap_err();
        match err {
            MergeError::Parse { path, error } => {
                assert!(path.is_none());
                assert!(error.text.contains("class Target {"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
