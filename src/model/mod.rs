//! Data model shared by the parser adapter, the locator and the splicer.

pub mod location;
pub mod node;
pub mod plan;

pub use location::{Location, Origin, Point};
pub use node::{Node, NodeKind, SourceTree};
pub use plan::{InsertionEntry, InsertionPlan};
