//! End-to-end merge scenarios through the public engine API.
//!
//! Each test merges a fragment into a small Java class and checks the
//! resulting text, not just the plan, so the locate and splice stages are
//! covered together.

#![allow(clippy::all, clippy::pedantic, clippy::nursery)]

use codegraft::merge::Locator;
use codegraft::model::SourceTree;
use codegraft::parse::{JavaParser, SourceParser};
use codegraft::{MergeConfig, MergeEngine, MergeLevel};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const TARGET: &str = "\
package p;

import java.util.List;

public class Foo {
    private String s;

    public int foo(int x) {
        return x;
    }
}
";

fn engine() -> MergeEngine {
    MergeEngine::new(MergeConfig::default())
}

fn overriding() -> MergeEngine {
    MergeEngine::new(MergeConfig::default().with_override(true))
}

fn parse(source: &str) -> SourceTree {
    JavaParser::new().parse(source).expect("test source should parse")
}

fn assert_parses(text: &str) {
    if let Err(err) = JavaParser::new().parse(text) {
        panic!("merged text does not parse: {err}\n{text}");
    }
}

fn sorted_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.lines().collect();
    lines.sort_unstable();
    lines
}

// ---------------------------------------------------------------------------
// Basic scenarios
// ---------------------------------------------------------------------------

#[test]
fn new_field_lands_after_existing_field() {
    let out = engine().merge_str(TARGET, "    private String t;\n").unwrap();

    assert_eq!(out.applied, 1);
    assert!(out.skipped.is_empty());
    assert_eq!(
        out.text,
        TARGET.replace(
            "    private String s;\n",
            "    private String s;\n    private String t;\n"
        )
    );
}

#[test]
fn redefined_method_is_replaced_with_override() {
    let fragment = "    public int foo(int x) {\n        return x * 2;\n    }\n";

    let located = overriding().plan(TARGET, fragment).unwrap();
    assert_eq!(located.plan.len(), 1);
    let entry = &located.plan.entries()[0];
    assert!(entry.is_replacement());
    assert_eq!(entry.to.line_span(), 7..10);

    let out = overriding().merge_str(TARGET, fragment).unwrap();
    assert_eq!(out.text, TARGET.replace("return x;", "return x * 2;"));
}

#[test]
fn redefined_method_is_kept_without_override() {
    let fragment = "    public int foo(int x) {\n        return x * 2;\n    }\n";

    // The entry is still planned; the splicer drops it.
    let located = engine().plan(TARGET, fragment).unwrap();
    assert_eq!(located.plan.replacements(), 1);

    let out = engine().merge_str(TARGET, fragment).unwrap();
    assert!(!out.changed);
    assert_eq!(out.text, TARGET);
    assert_eq!(out.applied, 0);
    assert_eq!(out.skipped.len(), 1);
}

#[test]
fn file_level_maps_whole_fragment_to_whole_file() {
    let fragment = "package p;\n\npublic class Foo {\n    public void bar() {\n    }\n}\n";
    let config = MergeConfig::default()
        .with_level(MergeLevel::File)
        .with_override(true);

    let located = MergeEngine::new(config.clone()).plan(TARGET, fragment).unwrap();
    let spans: Vec<_> = located
        .plan
        .iter()
        .map(|e| (e.from.line_span(), e.to.line_span()))
        .collect();
    assert_eq!(spans, vec![(0..6, 0..11)]);

    let out = MergeEngine::new(config).merge_str(TARGET, fragment).unwrap();
    assert_eq!(out.text, fragment);
}

#[test]
fn members_added_to_empty_class_keep_fragment_order() {
    let existing = "public class Foo {\n}\n";
    let fragment = "    int a;\n    int b;\n\n    void m() {\n    }\n";

    let located = engine().plan(existing, fragment).unwrap();
    assert_eq!(located.plan.len(), 3);
    assert!(located.plan.iter().all(|e| e.to.line_span() == (1..1)));

    let out = engine().merge_str(existing, fragment).unwrap();
    assert_eq!(
        out.text,
        "public class Foo {\n    int a;\n    int b;\n    void m() {\n    }\n}\n"
    );
}

#[test]
fn new_import_joins_existing_imports() {
    let fragment = "package p;\n\nimport java.util.Map;\n\npublic class Foo {\n}\n";
    let out = engine().merge_str(TARGET, fragment).unwrap();
    assert_eq!(
        out.text,
        TARGET.replace(
            "import java.util.List;\n",
            "import java.util.List;\nimport java.util.Map;\n"
        )
    );
}

// ---------------------------------------------------------------------------
// Properties on fixed inputs
// ---------------------------------------------------------------------------

#[test]
fn merging_twice_with_override_is_idempotent() {
    let fragments = [
        "    private String t;\n\n    public String getT() {\n        return t;\n    }\n",
        "package p;\n\nimport java.util.Map;\n\npublic class Foo {\n    private Map<String, String> m;\n}\n",
    ];
    for fragment in fragments {
        let once = overriding().merge_str(TARGET, fragment).unwrap();
        assert!(once.changed, "first merge should change the file");
        let twice = overriding().merge_str(&once.text, fragment).unwrap();
        assert_eq!(twice.text, once.text, "fragment:\n{fragment}");
    }
}

#[test]
fn fully_present_fragment_plans_only_replacements() {
    let located = engine().plan(TARGET, TARGET).unwrap();
    assert!(!located.plan.is_empty());
    assert_eq!(located.plan.insertions(), 0);

    let bare = engine()
        .plan(TARGET, "    public int foo(int x) {\n        return 0;\n    }\n")
        .unwrap();
    assert_eq!(bare.plan.insertions(), 0);
    assert_eq!(bare.plan.replacements(), 1);
}

#[test]
fn merge_without_override_only_adds_lines() {
    let fragment = "\
package p;

import java.util.Map;

public class Foo {
    private String s;
    private int n;

    public Foo() {
    }

    public int foo(int x) {
        return -x;
    }

    public int bar() {
        return n;
    }
}
";
    let out = engine().merge_str(TARGET, fragment).unwrap();

    let mut remaining = sorted_lines(&out.text);
    for line in TARGET.lines() {
        let pos = remaining
            .iter()
            .position(|l| *l == line)
            .unwrap_or_else(|| panic!("line {line:?} was removed"));
        remaining.remove(pos);
    }
    // import + field + 2-line ctor + 3-line method
    assert_eq!(remaining.len(), 7, "unexpected extra lines: {remaining:?}");
    assert!(out.text.contains("return x;"));
    assert!(!out.text.contains("return -x;"));
}

#[test]
fn plans_are_sorted_by_target() {
    let fragment = "public class Foo {\n    public int bar() {\n        return 1;\n    }\n    int z;\n}\n";
    let plan = Locator::new(MergeConfig::default())
        .locate(&parse(TARGET), &parse(fragment))
        .unwrap();
    assert_eq!(plan.len(), 2);
    assert!(plan.is_sorted_by_target());
}

// ---------------------------------------------------------------------------
// Statement levels
// ---------------------------------------------------------------------------

#[test]
fn line_level_inserts_statement_into_existing_method() {
    let fragment = "    public int foo(int x) {\n        log(x);\n        return x;\n    }\n";
    let config = MergeConfig::default().with_level(MergeLevel::Line);

    let out = MergeEngine::new(config).merge_str(TARGET, fragment).unwrap();
    assert_eq!(
        out.text,
        TARGET.replace("        return x;\n", "        log(x);\n        return x;\n")
    );
    // The matched `return x;` is a replacement, skipped without override.
    assert_eq!(out.skipped.len(), 1);
}

#[test]
fn subline_level_replaces_changed_return() {
    let fragment = "    public int foo(int x) {\n        return x + 1;\n    }\n";

    let line = MergeEngine::new(
        MergeConfig::default()
            .with_level(MergeLevel::Line)
            .with_override(true),
    )
    .merge_str(TARGET, fragment)
    .unwrap();
    // Unmatched at LINE: goes in front of the first existing statement.
    assert!(line.text.contains("        return x + 1;\n        return x;\n"));

    let subline = MergeEngine::new(
        MergeConfig::default()
            .with_level(MergeLevel::Subline)
            .with_override(true),
    )
    .merge_str(TARGET, fragment)
    .unwrap();
    assert_eq!(subline.text, TARGET.replace("return x;", "return x + 1;"));
}

// ---------------------------------------------------------------------------
// Shared lines
// ---------------------------------------------------------------------------

#[test]
fn member_for_one_line_class_replaces_the_class() {
    let existing = "public class Foo { void m() {} }\n";

    let out = engine().merge_str(existing, "    int t;\n").unwrap();
    assert_eq!(out.text, existing);
    assert_eq!(out.skipped.len(), 1);

    let out = overriding().merge_str(existing, "    int t;\n").unwrap();
    assert_eq!(out.text, "public class Foo {\n    int t;\n}\n");
    assert_parses(&out.text);
}

#[test]
fn line_level_one_line_method_is_replaced_whole() {
    let existing = "public class Foo {\n    void run() { a(); }\n}\n";
    let fragment = "    void run() {\n        a();\n        b();\n    }\n";
    let config = MergeConfig::default().with_level(MergeLevel::Line);

    let out = MergeEngine::new(config.clone()).merge_str(existing, fragment).unwrap();
    assert_eq!(out.text, existing);

    let out = MergeEngine::new(config.with_override(true))
        .merge_str(existing, fragment)
        .unwrap();
    assert_eq!(
        out.text,
        "public class Foo {\n    void run() {\n        a();\n        b();\n    }\n}\n"
    );
    assert_parses(&out.text);
}

#[test]
fn line_level_statement_stays_inside_one_line_if() {
    let existing = "public class Foo {\n    void run() {\n        if (x) { go(); }\n        done();\n    }\n}\n";
    let fragment = "    void run() {\n        if (x) {\n            go();\n            log();\n        }\n    }\n";
    let config = MergeConfig::default()
        .with_level(MergeLevel::Line)
        .with_override(true);

    let out = MergeEngine::new(config).merge_str(existing, fragment).unwrap();
    assert_eq!(
        out.text,
        "public class Foo {\n    void run() {\n        if (x) {\n            go();\n            log();\n        }\n        done();\n    }\n}\n"
    );
    assert_parses(&out.text);
}

#[test]
fn fields_sharing_a_line_both_survive_override() {
    let existing = "public class Foo {\n    int a; int b;\n}\n";
    let out = overriding()
        .merge_str(existing, "    int a = 1;\n    int b = 2;\n")
        .unwrap();
    assert_eq!(out.text, "public class Foo {\n    int a = 1;\n    int b = 2;\n}\n");
    assert_parses(&out.text);
}

#[test]
fn trailing_comment_does_not_block_line_merges() {
    let existing = "public class Foo {\n    int a; // first\n}\n";
    let out = engine().merge_str(existing, "    int b;\n").unwrap();
    assert_eq!(out.text, "public class Foo {\n    int a; // first\n    int b;\n}\n");
}

// ---------------------------------------------------------------------------
// Text handling
// ---------------------------------------------------------------------------

#[test]
fn crlf_files_stay_crlf() {
    let existing = TARGET.replace('\n', "\r\n");
    let out = engine().merge_str(&existing, "    private String t;\n").unwrap();

    let expected = TARGET
        .replace(
            "    private String s;\n",
            "    private String s;\n    private String t;\n",
        )
        .replace('\n', "\r\n");
    assert_eq!(out.text, expected);
}

#[test]
fn missing_trailing_newline_is_preserved() {
    let existing = TARGET.trim_end();
    let out = engine().merge_str(existing, "    private String t;\n").unwrap();
    assert!(out.changed);
    assert!(out.text.ends_with('}'));
}

#[test]
fn unsupported_fragment_members_are_reported_not_merged() {
    let fragment = "    enum Mode { ON, OFF }\n\n    private int n;\n";
    let out = engine().merge_str(TARGET, fragment).unwrap();
    assert_eq!(out.unsupported.len(), 1);
    assert_eq!(out.applied, 1);
    assert!(out.text.contains("private int n;"));
    assert!(!out.text.contains("enum Mode"));
}

// ---------------------------------------------------------------------------
// Files and threads
// ---------------------------------------------------------------------------

#[test]
fn independent_files_merge_in_parallel() {
    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<_> = (0..8)
        .map(|i| {
            let path = dir.path().join(format!("Foo{i}.java"));
            std::fs::write(&path, TARGET).unwrap();
            path
        })
        .collect();
    let engine = engine();

    std::thread::scope(|scope| {
        for (i, path) in paths.iter().enumerate() {
            let engine = &engine;
            scope.spawn(move || {
                let fragment = format!("    private int field{i};\n");
                let out = engine.merge_file(path, &fragment).unwrap();
                assert!(out.changed);
            });
        }
    });

    for (i, path) in paths.iter().enumerate() {
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains(&format!("    private int field{i};\n")));
        assert_eq!(text.matches("private int field").count(), 1);
    }
}

#[test]
fn failed_merge_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Foo.java");
    std::fs::write(&path, TARGET).unwrap();

    let err = engine().merge_file(&path, "    void broken( {\n").unwrap_err();
    assert!(err.to_string().contains("does not parse"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), TARGET);
}
