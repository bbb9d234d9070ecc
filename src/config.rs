//! Merge configuration (`codegraft.toml`).
//!
//! Defines the typed configuration for a merge run: how deep the locator
//! recurses ([`MergeLevel`]), whether existing text may be replaced, and the
//! equality policies. Every field has a default; a missing file means all
//! defaults.
//!
//! ```toml
//! [merge]
//! level = "method"
//! override = false
//! ignore_class_declaration_header = true
//! ignore_inner_code_blocks = true
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraftConfig {
    /// Merge settings.
    #[serde(default)]
    pub merge: MergeConfig,
}

// ---------------------------------------------------------------------------
// MergeLevel
// ---------------------------------------------------------------------------

/// How fine-grained a merge is.
///
/// Levels are ordered `File < Method < Line < Subline`; "at least as fine as
/// `Line`" is `level >= MergeLevel::Line`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MergeLevel {
    /// Whole-file replace or insert; never recurses.
    File,
    /// Recurse into class members; method bodies are opaque.
    #[default]
    Method,
    /// Also recurse into the statements of matched method bodies.
    Line,
    /// Also reconcile a changed return statement in place.
    Subline,
}

impl fmt::Display for MergeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Method => write!(f, "method"),
            Self::Line => write!(f, "line"),
            Self::Subline => write!(f, "subline"),
        }
    }
}

impl FromStr for MergeLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "method" => Ok(Self::Method),
            "line" => Ok(Self::Line),
            "subline" => Ok(Self::Subline),
            other => Err(format!(
                "unknown merge level '{other}' (expected file, method, line or subline)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// MergeConfig
// ---------------------------------------------------------------------------

/// Settings for one merge.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    /// Recursion depth of the locator.
    #[serde(default)]
    pub level: MergeLevel,

    /// Allow replacing existing text. When `false`, only pure insertions are
    /// applied and no existing line is ever removed.
    #[serde(rename = "override", default)]
    pub override_existing: bool,

    /// Match classes by name only and leave the existing declaration header
    /// (modifiers, `extends`, `implements`) alone. When `false`, a differing
    /// fragment header replaces the existing one.
    #[serde(default = "default_true")]
    pub ignore_class_declaration_header: bool,

    /// Treat nested blocks as equal when comparing statements, so that two
    /// `if (x) { ... }` with different bodies are still the same anchor.
    #[serde(default = "default_true")]
    pub ignore_inner_code_blocks: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            level: MergeLevel::default(),
            override_existing: false,
            ignore_class_declaration_header: default_true(),
            ignore_inner_code_blocks: default_true(),
        }
    }
}

impl MergeConfig {
    /// Builder-style level override.
    #[must_use]
    pub const fn with_level(mut self, level: MergeLevel) -> Self {
        self.level = level;
        self
    }

    /// Builder-style override flag.
    #[must_use]
    pub const fn with_override(mut self, override_existing: bool) -> Self {
        self.override_existing = override_existing;
        self
    }

    /// `true` if the locator recurses into method bodies.
    #[must_use]
    pub fn merges_lines(&self) -> bool {
        self.level >= MergeLevel::Line
    }
}

const fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// A configuration file that could not be read or does not describe a
/// valid [`GraftConfig`].
#[derive(Debug)]
pub struct ConfigError {
    /// The file being loaded; `None` for [`GraftConfig::parse`].
    pub path: Option<PathBuf>,
    /// 1-based line of the offending TOML, when known.
    pub line: Option<usize>,
    pub message: String,
}

impl ConfigError {
    fn at(line: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            path: None,
            line,
            message: message.into(),
        }
    }

    #[must_use]
    fn in_file(mut self, path: &Path) -> Self {
        self.path = Some(path.to_owned());
        self
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.path, self.line) {
            (Some(path), Some(line)) => write!(f, "{}, line {line}: {}", path.display(), self.message),
            (Some(path), None) => write!(f, "{}: {}", path.display(), self.message),
            (None, Some(line)) => write!(f, "line {line}: {}", self.message),
            (None, None) => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl GraftConfig {
    /// Default file name looked up in the working directory.
    pub const FILE_NAME: &'static str = "codegraft.toml";

    /// Load configuration from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    /// [`ConfigError`] if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).map_err(|e| e.in_file(path)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::at(None, format!("cannot read: {e}")).in_file(path)),
        }
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    /// [`ConfigError`] on invalid TOML, unknown keys or bad values.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| {
            let line = e
                .span()
                .and_then(|span| text.get(..span.start))
                .map(|before| before.matches('\n').count() + 1);
            ConfigError::at(line, e.message())
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
