//! codegraft library crate.
//!
//! Merges generated code fragments into existing Java sources without
//! disturbing unrelated code. The `codegraft` binary is a thin CLI over
//! [`merge::MergeEngine`]; the modules are public so integration tests and
//! other drivers can use the engine directly.

pub mod config;
pub mod error;
pub mod merge;
pub mod model;
pub mod parse;
pub mod telemetry;

pub use config::{GraftConfig, MergeConfig, MergeLevel};
pub use error::MergeError;
pub use merge::{MergeEngine, MergeOutcome};
