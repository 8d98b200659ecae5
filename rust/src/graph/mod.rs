//! Dependency graph builder.
//!
//! Turns a flat task and dependency list into an indexed arena with
//! predecessor/successor adjacency, after enforcing the structural
//! invariants every later pass relies on.

mod builder;
mod hierarchy;
mod index;

pub use builder::{DependencyGraph, Edge};
pub use index::{TaskIdx, TaskIndex};
