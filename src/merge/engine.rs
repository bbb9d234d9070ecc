//! Per-file merge pipeline: parse → locate → splice → write.

use std::path::Path;

use serde::Serialize;

use crate::config::MergeConfig;
use crate::error::MergeError;
use crate::model::{InsertionEntry, Location, SourceTree};
use crate::parse::{Fragment, JavaParser, SourceParser, prepare_fragment};

use super::locate::{Located, Locator};
use super::splice::{self, SourceLines};
use super::write::write_transactionally;

/// What a merge did to one target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    /// The merged text.
    #[serde(skip)]
    pub text: String,
    /// Plan entries applied.
    pub applied: usize,
    /// Replacements skipped because overriding was off.
    pub skipped: Vec<InsertionEntry>,
    /// Fragment nodes skipped as unsupported.
    pub unsupported: Vec<Location>,
    /// `true` if `text` differs from the original.
    pub changed: bool,
}

/// Merges fragments into existing sources under one configuration.
///
/// Holds no state between calls; one engine can serve any number of files,
/// from any number of threads.
#[derive(Clone, Debug)]
pub struct MergeEngine<P = JavaParser> {
    parser: P,
    config: MergeConfig,
}

impl MergeEngine<JavaParser> {
    #[must_use]
    pub const fn new(config: MergeConfig) -> Self {
        Self::with_parser(JavaParser::new(), config)
    }
}

impl<P: SourceParser> MergeEngine<P> {
    #[must_use]
    pub const fn with_parser(parser: P, config: MergeConfig) -> Self {
        Self { parser, config }
    }

    #[must_use]
    pub const fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Compute the insertion plan for merging `fragment` into `existing`.
    ///
    /// # Errors
    /// [`MergeError::Parse`] or [`MergeError::Anchor`].
    pub fn plan(&self, existing: &str, fragment: &str) -> Result<Located, MergeError> {
        let (tree, fragment) = self.parse(existing, fragment, None)?;
        Locator::new(self.config.clone()).locate_fragment(&tree, &fragment)
    }

    /// Merge `fragment` into the text `existing`.
    ///
    /// # Errors
    /// [`MergeError::Parse`] or [`MergeError::Anchor`].
    pub fn merge_str(&self, existing: &str, fragment: &str) -> Result<MergeOutcome, MergeError> {
        self.merge_text(existing, fragment, None)
    }

    /// Plan the merge of `fragment` into the file at `path`.
    ///
    /// # Errors
    /// As [`plan`](Self::plan), plus [`MergeError::Io`] if the file cannot be
    /// read. Errors about the target name `path`.
    pub fn plan_file(&self, path: &Path, fragment: &str) -> Result<Located, MergeError> {
        let existing = read(path)?;
        let (tree, fragment) = self.parse(&existing, fragment, Some(path))?;
        Locator::new(self.config.clone())
            .locate_fragment(&tree, &fragment)
            .map_err(|e| e.with_path(path))
    }

    /// Merge `fragment` into the file at `path` without writing it.
    ///
    /// # Errors
    /// See [`merge_file`](Self::merge_file).
    pub fn preview_file(&self, path: &Path, fragment: &str) -> Result<MergeOutcome, MergeError> {
        let existing = read(path)?;
        self.merge_text(&existing, fragment, Some(path))
    }

    /// Merge `fragment` into the file at `path` and write the result back
    /// transactionally. An unchanged result is not written.
    ///
    /// # Errors
    /// [`MergeError::Parse`], [`MergeError::Anchor`] or [`MergeError::Io`];
    /// the file is untouched in every case.
    pub fn merge_file(&self, path: &Path, fragment: &str) -> Result<MergeOutcome, MergeError> {
        let outcome = self.preview_file(path, fragment)?;
        if outcome.changed {
            write_transactionally(path, &outcome.text)?;
        }
        tracing::info!(
            path = %path.display(),
            applied = outcome.applied,
            skipped = outcome.skipped.len(),
            unsupported = outcome.unsupported.len(),
            changed = outcome.changed,
            "merged file"
        );
        Ok(outcome)
    }

    fn merge_text(&self, existing: &str, fragment: &str, path: Option<&Path>) -> Result<MergeOutcome, MergeError> {
        let (tree, fragment) = self.parse(existing, fragment, path)?;
        let located = Locator::new(self.config.clone())
            .locate_fragment(&tree, &fragment)
            .map_err(|e| attach(e, path))?;

        let existing_lines = SourceLines::parse(existing);
        let fragment_lines = SourceLines::parse(fragment.tree().source());
        let spliced = splice::apply(
            &self.config,
            existing_lines.lines(),
            fragment_lines.lines(),
            &located.plan,
        );

        let text = existing_lines.with_lines(spliced.lines).render();
        Ok(MergeOutcome {
            changed: text != existing,
            text,
            applied: spliced.applied,
            skipped: spliced.skipped,
            unsupported: located.unsupported,
        })
    }

    /// Parse the target and prepare the fragment. Errors about the target
    /// carry `path`; fragment parse errors never do.
    fn parse(&self, existing: &str, fragment: &str, path: Option<&Path>) -> Result<(SourceTree, Fragment), MergeError> {
        let tree = self
            .parser
            .parse(existing)
            .map_err(|e| attach(MergeError::from(e), path))?;
        let fragment = prepare_fragment(&self.parser, fragment, &tree).map_err(|e| match e {
            MergeError::Parse { .. } => e,
            other => attach(other, path),
        })?;
        Ok((tree, fragment))
    }
}

fn attach(err: MergeError, path: Option<&Path>) -> MergeError {
    match path {
        Some(path) => err.with_path(path),
        None => err,
    }
}

fn read(path: &Path) -> Result<String, MergeError> {
    std::fs::read_to_string(path).map_err(|e| MergeError::io(path, e))
}
