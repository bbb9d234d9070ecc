//! Shared helpers for running the `codegraft` binary in tests.

#![allow(dead_code)]

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

pub const FOO: &str = "\
package p;

public class Foo {
    private String s;

    public int foo(int x) {
        return x;
    }
}
";

/// A scratch directory holding Java files.
pub fn sandbox() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// Write `contents` to `dir/name` and return the path.
pub fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap_or_else(|e| panic!("failed to write {name}: {e}"));
    path
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
}

/// Run codegraft with the given args in the given directory.
pub fn codegraft_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_codegraft"))
        .args(args)
        .current_dir(dir)
        .env_remove("CODEGRAFT_CONFIG")
        .env_remove("CODEGRAFT_LOG")
        .output()
        .expect("failed to execute codegraft")
}

/// Run codegraft with `stdin` piped in.
pub fn codegraft_stdin(dir: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_codegraft"))
        .args(args)
        .current_dir(dir)
        .env_remove("CODEGRAFT_CONFIG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn codegraft");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("failed to write stdin");
    child.wait_with_output().expect("failed to wait for codegraft")
}

/// Run codegraft and assert it succeeds. Returns stdout as string.
pub fn codegraft_ok(dir: &Path, args: &[&str]) -> String {
    let out = codegraft_in(dir, args);
    let stderr = String::from_utf8_lossy(&out.stderr);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        out.status.success(),
        "codegraft {} failed:\nstdout: {stdout}\nstderr: {stderr}",
        args.join(" "),
    );
    stdout.to_string()
}

/// Run codegraft and assert it fails. Returns stderr as string.
pub fn codegraft_fails(dir: &Path, args: &[&str]) -> String {
    let out = codegraft_in(dir, args);
    assert!(
        !out.status.success(),
        "Expected codegraft {} to fail, but it succeeded.\nstdout: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout),
    );
    String::from_utf8_lossy(&out.stderr).to_string()
}
