//! Logging initialization.
//!
//! Controlled by two environment variables:
//! - `CODEGRAFT_LOG` → an [`EnvFilter`] directive (default `warn`), e.g.
//!   `CODEGRAFT_LOG=codegraft=debug` to see every located entry.
//! - `CODEGRAFT_LOG_FORMAT` → `json` for JSON events, anything else (or
//!   unset) for human-readable lines.
//!
//! Events always go to stderr; stdout is reserved for command output.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive.
pub const FILTER_ENV: &str = "CODEGRAFT_LOG";
/// Environment variable selecting the output format.
pub const FORMAT_ENV: &str = "CODEGRAFT_LOG_FORMAT";

const DEFAULT_FILTER: &str = "warn";

/// Output format for log events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}

impl LogFormat {
    /// Parse the value of [`FORMAT_ENV`].
    #[must_use]
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Human,
        }
    }
}

/// Install the global subscriber. Calling it twice is harmless; the second
/// call leaves the first subscriber in place.
pub fn init() {
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let filter = filter(std::env::var(FILTER_ENV).ok().as_deref());
    let format = LogFormat::from_env_value(std::env::var(FORMAT_ENV).ok().as_deref());

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Human => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "subscriber already installed");
    }
}

/// Build the filter from a directive, falling back to the default when the
/// directive is missing or invalid.
fn filter(directive: Option<&str>) -> EnvFilter {
    match directive {
        Some(d) if !d.trim().is_empty() => EnvFilter::try_new(d).unwrap_or_else(|e| {
            eprintln!("warning: ignoring invalid {FILTER_ENV} ({e}), using '{DEFAULT_FILTER}'");
            EnvFilter::new(DEFAULT_FILTER)
        }),
        _ => EnvFilter::new(DEFAULT_FILTER),
    }
}
