//! Critical path analysis.
//!
//! Derives total, free and independent float from the forward and backward
//! passes and partitions tasks into critical (zero total float) and
//! non-critical sets.

mod analysis;
mod chains;
mod types;

pub use analysis::analyze_float;
pub use chains::critical_chains;
pub use types::{CriticalPathAnalysis, FloatRecord};
