//! Leveling strategies.
//!
//! [`GreedyPriorityLeveling`] is a single-pass heuristic, not an optimal
//! resource-constrained scheduler. Other algorithms plug in through
//! [`LevelingStrategy`] without touching the scheduling passes.

use std::cmp::Ordering;

use chrono::NaiveDate;
use rustc_hash::FxHashSet;

use crate::config::LevelingConfig;
use crate::models::ResourceAssignment;
use crate::schedule::shift;
use crate::{log_changes, log_checks};

use super::allocation::AllocationTimeline;
use super::types::{LevelingResult, OverloadEvent, TaskAdjustment, TaskSpan};

/// Resolves resource overloads by moving task spans.
///
/// Implementations receive validated spans and assignments (`span_of[i]` is
/// the span of `assignments[i]`), may only move spans forward, and must
/// terminate.
pub trait LevelingStrategy {
    fn level(
        &self,
        spans: &mut [TaskSpan],
        assignments: &[ResourceAssignment],
        span_of: &[usize],
        config: &LevelingConfig,
    ) -> LevelingResult;
}

/// Defer lower-ranked tasks off each overloaded day, earliest day first.
///
/// Ranking is descending priority, then ascending start, then task id. The
/// top task keeps its dates; every lower-ranked movable task is pushed by
/// `ceil(excess / percent_per_delay_day)` days.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyPriorityLeveling;

/// Ranking order for tasks sharing an overloaded day (best first).
fn rank(a: &TaskSpan, b: &TaskSpan) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then(a.start.cmp(&b.start))
        .then_with(|| a.task_id.cmp(&b.task_id))
}

/// What leveling found on the earliest overloaded day.
struct Overload {
    resource_id: String,
    date: NaiveDate,
    total: f64,
    /// Span positions, best ranked first.
    ranked: Vec<usize>,
}

impl Overload {
    fn event(&self, spans: &[TaskSpan]) -> OverloadEvent {
        OverloadEvent {
            resource_id: self.resource_id.clone(),
            date: self.date,
            total_allocation: self.total,
            task_ids: self.ranked.iter().map(|&s| spans[s].task_id.clone()).collect(),
        }
    }
}

fn next_overload(
    spans: &[TaskSpan],
    assignments: &[ResourceAssignment],
    span_of: &[usize],
    capacity: f64,
    skip: &FxHashSet<(String, NaiveDate)>,
) -> Option<Overload> {
    let timeline = AllocationTimeline::build(spans, assignments, span_of);
    let (resource_id, date, load) = timeline.first_overload(capacity, skip)?;
    let mut ranked = load.spans();
    ranked.sort_by(|&a, &b| rank(&spans[a], &spans[b]));
    Some(Overload {
        resource_id: resource_id.to_string(),
        date,
        total: load.total_percent,
        ranked,
    })
}

impl LevelingStrategy for GreedyPriorityLeveling {
    fn level(
        &self,
        spans: &mut [TaskSpan],
        assignments: &[ResourceAssignment],
        span_of: &[usize],
        config: &LevelingConfig,
    ) -> LevelingResult {
        let verbosity = config.verbosity;
        let capacity = config.capacity_percent;
        let mut result = LevelingResult::default();
        let mut skip: FxHashSet<(String, NaiveDate)> = FxHashSet::default();

        while let Some(overload) = next_overload(spans, assignments, span_of, capacity, &skip) {
            let event = overload.event(spans);
            log_checks!(
                verbosity,
                "Overload: {} at {:.1}% on {} ({:?})",
                overload.resource_id,
                overload.total,
                overload.date,
                event.task_ids
            );

            let deferred: Vec<usize> = overload.ranked[1..]
                .iter()
                .copied()
                .filter(|&s| spans[s].movable)
                .collect();
            if deferred.is_empty() {
                log_changes!(
                    verbosity,
                    "Cannot resolve overload of {} on {}: nothing movable below {}",
                    overload.resource_id,
                    overload.date,
                    event.task_ids[0]
                );
                skip.insert((overload.resource_id.clone(), overload.date));
                result.unresolved_overloads.push(event);
                continue;
            }

            let remaining = config.max_adjustments.saturating_sub(result.adjustments.len());
            if remaining < deferred.len() {
                log_changes!(
                    verbosity,
                    "Adjustment limit {} reached; stopping",
                    config.max_adjustments
                );
                break;
            }

            let excess = overload.total - capacity;
            let delay = config.delay_for_excess(excess);
            let reason = format!(
                "{} allocated {:.1}% on {} (capacity {:.1}%)",
                overload.resource_id, overload.total, overload.date, capacity
            );
            for s in deferred {
                let span = &mut spans[s];
                let adjustment = TaskAdjustment {
                    task_id: span.task_id.clone(),
                    original_start: span.start,
                    adjusted_start: shift(span.start, delay),
                    original_end: span.end,
                    adjusted_end: shift(span.end, delay),
                    delay_days: delay,
                    resource_id: overload.resource_id.clone(),
                    trigger_date: overload.date,
                    reason: reason.clone(),
                };
                log_changes!(
                    verbosity,
                    "Deferring {} by {} day(s): {} -> {}",
                    adjustment.task_id,
                    delay,
                    adjustment.original_start,
                    adjustment.adjusted_start
                );
                span.start = adjustment.adjusted_start;
                span.end = adjustment.adjusted_end;
                result.adjustments.push(adjustment);
            }
            result.resolved_overloads.push(event);
        }

        // Anything still overloaded (limit hit) is reported, minus what is already listed
        let timeline = AllocationTimeline::build(spans, assignments, span_of);
        for event in timeline.overloads(spans, capacity) {
            if !skip.contains(&(event.resource_id.clone(), event.date)) {
                result.unresolved_overloads.push(event);
            }
        }

        result
    }
}
