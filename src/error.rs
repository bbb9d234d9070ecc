//! Merge error types.
//!
//! Defines [`MergeError`], the error type for everything that can stop a
//! merge of one target file. Each variant names the file when it is known
//! and carries enough detail (the offending text, the class, the I/O cause)
//! to answer "why didn't my code get merged here" without a debugger.
//!
//! Unsupported fragment nodes and undetermined equality are deliberately not
//! errors: the first is logged and reported in the merge outcome, the second
//! is simply "no match".

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::ConfigError;
use crate::parse::ParseError;

// ---------------------------------------------------------------------------
// MergeError
// ---------------------------------------------------------------------------

/// Fatal error for the merge of one target file.
///
/// The target is never modified when a merge returns an error.
#[derive(Debug)]
pub enum MergeError {
    /// The fragment or the existing file is not syntactically valid.
    Parse {
        /// The file that failed to parse; `None` for the fragment.
        path: Option<PathBuf>,
        /// Parser diagnostics including the offending text.
        error: ParseError,
    },

    /// A class-like node offers nothing to anchor an insertion on.
    Anchor {
        /// The target file, when known.
        path: Option<PathBuf>,
        /// Name of the class, if it has one.
        class: Option<String>,
        /// What was missing.
        detail: String,
    },

    /// Reading or writing the target failed.
    Io {
        /// The file being read or written.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The configuration file could not be loaded.
    Config(ConfigError),
}

impl MergeError {
    /// An anchor error for `class`.
    #[must_use]
    pub fn anchor(class: Option<&str>, detail: impl Into<String>) -> Self {
        Self::Anchor {
            path: None,
            class: class.map(str::to_owned),
            detail: detail.into(),
        }
    }

    /// An I/O error on `path`.
    #[must_use]
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_owned(),
            source,
        }
    }

    /// Attach the target path to an error that does not name a file yet.
    ///
    /// Parse errors for the fragment keep `path: None`; callers attach the
    /// target path only to errors raised while handling the target.
    #[must_use]
    pub fn with_path(self, target: &Path) -> Self {
        match self {
            Self::Parse { path: None, error } => Self::Parse {
                path: Some(target.to_owned()),
                error,
            },
            Self::Anchor {
                path: None,
                class,
                detail,
            } => Self::Anchor {
                path: Some(target.to_owned()),
                class,
                detail,
            },
            other => other,
        }
    }

    /// The file this error is about, when known.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Parse { path, .. } | Self::Anchor { path, .. } => path.as_deref(),
            Self::Io { path, .. } => Some(path),
            Self::Config(err) => err.path.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { path, error } => {
                match path {
                    Some(path) => write!(f, "{} does not parse: ", path.display())?,
                    None => write!(f, "fragment does not parse: ")?,
                }
                write!(f, "{error}")
            }
            Self::Anchor {
                path,
                class,
                detail,
            } => {
                if let Some(path) = path {
                    write!(f, "{}: ", path.display())?;
                }
                match class {
                    Some(class) => write!(f, "cannot anchor insertion in class '{class}': {detail}")?,
                    None => write!(f, "cannot anchor insertion: {detail}")?,
                }
                write!(
                    f,
                    "\n  To fix: make sure the target declares a named class or interface."
                )
            }
            Self::Io { path, source } => {
                write!(
                    f,
                    "I/O error on {}: {source}\n  The original file content was kept.",
                    path.display()
                )
            }
            Self::Config(err) => {
                write!(
                    f,
                    "configuration error: {err}\n  To fix: edit the config file and correct the issue."
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// std::error::Error
// ---------------------------------------------------------------------------

impl std::error::Error for MergeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse { error, .. } => Some(error),
            Self::Io { source, .. } => Some(source),
            Self::Config(err) => Some(err),
            Self::Anchor { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// From impls
// ---------------------------------------------------------------------------

impl From<ParseError> for MergeError {
    fn from(error: ParseError) -> Self {
        Self::Parse { path: None, error }
    }
}

impl From<ConfigError> for MergeError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
