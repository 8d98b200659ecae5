//! Resource allocation and leveling.
//!
//! Builds a per-resource, per-day allocation timeline from task spans and
//! resolves overloads by deferring lower-priority tasks. Leveling moves task
//! dates only; it never re-runs the scheduling passes.

mod allocation;
mod strategy;
mod types;

pub use allocation::{index_assignments, task_spans, AllocationTimeline, DayLoad};
pub use strategy::{GreedyPriorityLeveling, LevelingStrategy};
pub use types::{
    AllocationDay, LevelingResult, OverloadEvent, ResourceUtilization, TaskAdjustment, TaskSpan,
};
