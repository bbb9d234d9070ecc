//! Locate and merge benchmarks.
//!
//! Measures how planning and full merges scale with the size of the
//! existing class.
//!
//! # Running
//!
//! ```bash
//! cargo bench --bench locate
//! # With a custom filter:
//! cargo bench --bench locate -- merge
//! ```
//!
//! # Report
//!
//! HTML report is generated in `target/criterion/` by criterion when
//! `--features html_reports` is active (enabled by default via Cargo.toml).

use std::fmt::Write as _;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use codegraft::merge::Locator;
use codegraft::parse::{JavaParser, SourceParser};
use codegraft::{MergeConfig, MergeEngine, MergeLevel};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A class with `n` fields followed by `n` three-statement methods.
fn make_class(n: usize) -> String {
    let mut text = String::from("package bench;\n\nimport java.util.List;\n\npublic class Big {\n");
    for i in 0..n {
        let _ = writeln!(text, "    private int field{i};");
    }
    for i in 0..n {
        let _ = write!(
            text,
            "\n    public int method{i}(int x) {{\n        int y = x + {i};\n        log(y);\n        return y;\n    }}\n"
        );
    }
    text.push_str("}\n");
    text
}

/// A fragment touching the middle and the end of a class of size `n`.
fn make_fragment(n: usize) -> String {
    let mid = n / 2;
    format!(
        "    private int extra;\n\n    public int method{mid}(int x) {{\n        int y = x + {mid};\n        check(y);\n        log(y);\n        return y;\n    }}\n\n    public int added() {{\n        return 0;\n    }}\n"
    )
}

const SIZES: &[usize] = &[10, 100, 500];

// ---------------------------------------------------------------------------
// Benchmark: locate
// ---------------------------------------------------------------------------

fn bench_locate(c: &mut Criterion) {
    let parser = JavaParser::new();

    for level in [MergeLevel::Method, MergeLevel::Line] {
        let mut group = c.benchmark_group(format!("locate/{level}"));
        let locator = Locator::new(MergeConfig::default().with_level(level));

        for &n in SIZES {
            let existing = parser.parse(&make_class(n)).expect("bench class parses");
            let fragment = parser
                .parse(&format!("public class Big {{\n{}}}\n", make_fragment(n)))
                .expect("bench fragment parses");

            group.throughput(Throughput::Elements(n as u64));
            group.bench_with_input(BenchmarkId::new("members", n), &n, |b, _| {
                b.iter(|| locator.locate(&existing, &fragment));
            });
        }

        group.finish();
    }
}

// ---------------------------------------------------------------------------
// Benchmark: parse + locate + splice
// ---------------------------------------------------------------------------

fn bench_merge_str(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_str");
    let engine = MergeEngine::new(MergeConfig::default().with_override(true));

    for &n in SIZES {
        let existing = make_class(n);
        let fragment = make_fragment(n);

        group.throughput(Throughput::Bytes(existing.len() as u64));
        group.bench_with_input(BenchmarkId::new("members", n), &n, |b, _| {
            b.iter(|| engine.merge_str(&existing, &fragment));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

criterion_group!(benches, bench_locate, bench_merge_str);
criterion_main!(benches);
