//! Backward pass: latest start and finish for every scheduled task.

use crate::config::SchedulingConfig;
use crate::graph::DependencyGraph;
use crate::{log_changes, log_checks};

use super::constraint::{latest_finish_bound, Span};
use super::forward::ForwardPass;

/// Late dates for every task, indexed by arena position.
#[derive(Clone, Debug)]
pub struct BackwardPass {
    /// (LS, LF) per task; `None` where the forward pass left the task unscheduled.
    pub late: Vec<Option<Span>>,
}

/// Compute LS/LF in reverse topological order against the forward pass's
/// project end.
///
/// LF = min(project end, every successor edge bound); LS = LF - duration.
/// Unscheduled successors impose no bound.
pub fn backward_pass(
    graph: &DependencyGraph<'_>,
    forward: &ForwardPass,
    config: &SchedulingConfig,
) -> BackwardPass {
    let verbosity = config.verbosity;
    let mode = config.finish_constraints;
    let mut late: Vec<Option<Span>> = vec![None; graph.len()];

    for &idx in graph.topological_order().iter().rev() {
        if forward.early[idx as usize].is_none() {
            continue;
        }
        let task = graph.task(idx);
        let duration = task.duration_days.map(i64::from).unwrap_or(0);

        let mut finish = forward.project_end;
        for edge in graph.successors(idx) {
            let Some(succ) = late[edge.task as usize] else {
                continue;
            };
            let bound =
                latest_finish_bound(edge.dependency_type, edge.lag_days, &succ, duration, mode);
            log_checks!(
                verbosity,
                "  {} -> {} ({:?}, lag {}): finish <= {}",
                task.id,
                graph.id(edge.task),
                edge.dependency_type,
                edge.lag_days,
                bound
            );
            finish = finish.min(bound);
        }

        let span = Span::from_finish(finish, duration);
        log_changes!(
            verbosity,
            "Task {}: LS={} LF={}",
            task.id,
            span.start,
            span.finish
        );
        late[idx as usize] = Some(span);
    }

    BackwardPass { late }
}
