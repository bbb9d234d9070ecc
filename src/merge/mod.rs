//! Structural merge engine.
//!
//! Implements the locate → splice pipeline. Each stage is a separate module:
//!
//! - **equality**: [`NodeEquality`], "same program element" with a
//!   three-valued [`Equality`].
//! - **order**: [`NodeOrder`], kind buckets for placing new nodes.
//! - **locate**: [`Locator`], fragment + existing tree → [`InsertionPlan`].
//! - **splice**: [`apply`], plan + line arrays → merged lines.
//! - **write**: transactional write-back of a merged file.
//! - **engine**: [`MergeEngine`], the per-file pipeline over a parser.
//!
//! # Determinism
//!
//! The same fragment merged into the same text under the same config
//! always yields the same plan and the same output. Equality is pure, the
//! order table is constant, and plans are sorted stably.
//!
//! [`InsertionPlan`]: crate::model::InsertionPlan

pub mod engine;
pub mod equality;
pub mod locate;
pub mod order;
pub mod splice;
pub mod write;

pub use engine::{MergeEngine, MergeOutcome};
pub use equality::{Equality, NodeEquality};
pub use locate::{Located, Locator};
pub use order::{DECLARATION_ORDER, NodeOrder};
pub use splice::{SourceLines, SpliceOutcome, apply};
pub use write::write_transactionally;
