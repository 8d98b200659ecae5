//! Forward pass: earliest start and finish for every task.

use chrono::NaiveDate;

use crate::config::SchedulingConfig;
use crate::error::UnscheduledTaskWarning;
use crate::graph::DependencyGraph;
use crate::{log_changes, log_checks};

use super::constraint::{earliest_start_bound, Span};

/// Early dates for every task, indexed by arena position.
#[derive(Clone, Debug)]
pub struct ForwardPass {
    pub project_start: NaiveDate,
    /// Max EF over scheduled tasks; the project start if nothing was scheduled.
    pub project_end: NaiveDate,
    /// (ES, EF) per task; `None` for unscheduled tasks.
    pub early: Vec<Option<Span>>,
    pub unscheduled: Vec<UnscheduledTaskWarning>,
}

impl ForwardPass {
    pub fn total_duration_days(&self) -> i64 {
        (self.project_end - self.project_start).num_days()
    }
}

/// Compute ES/EF in topological order.
///
/// ES = max(explicit start, every predecessor edge bound, project start);
/// a task without predecessors takes its explicit start or the project start.
/// EF = ES + duration. A task without a duration, or behind an unscheduled
/// predecessor, is left unscheduled and reported.
pub fn forward_pass(
    graph: &DependencyGraph<'_>,
    project_start: NaiveDate,
    config: &SchedulingConfig,
) -> ForwardPass {
    let verbosity = config.verbosity;
    let mode = config.finish_constraints;
    let mut early: Vec<Option<Span>> = vec![None; graph.len()];
    let mut unscheduled = Vec::new();

    for &idx in graph.topological_order() {
        let task = graph.task(idx);
        let Some(duration) = task.duration_days.map(i64::from) else {
            log_changes!(verbosity, "Task {} has no duration; unscheduled", task.id);
            unscheduled.push(UnscheduledTaskWarning::missing_duration(&task.id));
            continue;
        };

        let predecessors = graph.predecessors(idx);
        if let Some(blocked) = predecessors
            .iter()
            .find(|edge| early[edge.task as usize].is_none())
        {
            let blocker = graph.id(blocked.task);
            log_changes!(verbosity, "Task {} blocked by unscheduled {}", task.id, blocker);
            unscheduled.push(UnscheduledTaskWarning::blocked(&task.id, blocker));
            continue;
        }

        let mut start = task.start_date.unwrap_or(project_start);
        if !predecessors.is_empty() {
            start = start.max(project_start);
        }
        for edge in predecessors {
            let Some(pred) = early[edge.task as usize] else {
                continue;
            };
            let bound =
                earliest_start_bound(edge.dependency_type, edge.lag_days, &pred, duration, mode);
            log_checks!(
                verbosity,
                "  {} -> {} ({:?}, lag {}): start >= {}",
                graph.id(edge.task),
                task.id,
                edge.dependency_type,
                edge.lag_days,
                bound
            );
            start = start.max(bound);
        }

        let span = Span::from_start(start, duration);
        log_changes!(
            verbosity,
            "Task {}: ES={} EF={}",
            task.id,
            span.start,
            span.finish
        );
        early[idx as usize] = Some(span);
    }

    let project_end = early
        .iter()
        .flatten()
        .map(|span| span.finish)
        .max()
        .unwrap_or(project_start);

    ForwardPass {
        project_start,
        project_end,
        early,
        unscheduled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FinishConstraintMode;
    use crate::models::{Dependency, DependencyType, Task};
    use crate::schedule::constraint::shift;

    fn day(n: i64) -> NaiveDate {
        shift(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(), n)
    }

    fn run(tasks: &[Task], deps: &[Dependency], config: &SchedulingConfig) -> ForwardPass {
        let graph = DependencyGraph::build(tasks, deps, config).unwrap();
        forward_pass(&graph, day(0), config)
    }

    fn early(pass: &ForwardPass, idx: usize) -> (NaiveDate, NaiveDate) {
        let span = pass.early[idx].unwrap();
        (span.start, span.finish)
    }

    #[test]
    fn test_finish_to_start_with_lag() {
        let tasks = vec![Task::new("a", "p", 3), Task::new("b", "p", 5)];
        let deps = vec![Dependency::new("a", "b", DependencyType::FinishToStart, 2)];
        let pass = run(&tasks, &deps, &SchedulingConfig::default());

        assert_eq!(early(&pass, 0), (day(0), day(3)));
        assert_eq!(early(&pass, 1), (day(5), day(10)));
        assert_eq!(pass.project_end, day(10));
        assert_eq!(pass.total_duration_days(), 10);
    }

    #[test]
    fn test_explicit_start_is_respected() {
        let tasks = vec![
            Task::new("a", "p", 2),
            Task::new("b", "p", 1).with_start(day(7)),
            Task::new("c", "p", 1).with_start(day(4)),
        ];
        let deps = vec![Dependency::finish_to_start("a", "b")];
        let pass = run(&tasks, &deps, &SchedulingConfig::default());

        // Explicit start later than the predecessor bound wins
        assert_eq!(early(&pass, 1), (day(7), day(8)));
        // Unconstrained task takes its explicit start
        assert_eq!(early(&pass, 2), (day(4), day(5)));
    }

    #[test]
    fn test_lead_time_never_precedes_project_start() {
        let tasks = vec![Task::new("a", "p", 2), Task::new("b", "p", 1)];
        let deps = vec![Dependency::new("a", "b", DependencyType::StartToStart, -5)];
        let pass = run(&tasks, &deps, &SchedulingConfig::default());
        assert_eq!(early(&pass, 1), (day(0), day(1)));
    }

    #[test]
    fn test_finish_to_finish_modes() {
        let tasks = vec![Task::new("a", "p", 5), Task::new("b", "p", 2)];
        let deps = vec![Dependency::new("a", "b", DependencyType::FinishToFinish, 0)];

        let corrected = run(&tasks, &deps, &SchedulingConfig::default());
        assert_eq!(early(&corrected, 1), (day(3), day(5)));

        let legacy_config = SchedulingConfig {
            finish_constraints: FinishConstraintMode::Legacy,
            ..Default::default()
        };
        let legacy = run(&tasks, &deps, &legacy_config);
        assert_eq!(early(&legacy, 1), (day(5), day(7)));
    }

    #[test]
    fn test_start_to_finish_modes() {
        let tasks = vec![Task::new("a", "p", 4), Task::new("b", "p", 3)];
        let deps = vec![Dependency::new("a", "b", DependencyType::StartToFinish, 5)];

        let corrected = run(&tasks, &deps, &SchedulingConfig::default());
        assert_eq!(early(&corrected, 1), (day(2), day(5)));

        let legacy_config = SchedulingConfig {
            finish_constraints: FinishConstraintMode::Legacy,
            ..Default::default()
        };
        let legacy = run(&tasks, &deps, &legacy_config);
        assert_eq!(early(&legacy, 1), (day(5), day(8)));
    }

    #[test]
    fn test_missing_duration_blocks_successors() {
        let mut unknown = Task::new("a", "p", 0);
        unknown.duration_days = None;
        let tasks = vec![unknown, Task::new("b", "p", 2), Task::new("c", "p", 1)];
        let deps = vec![Dependency::finish_to_start("a", "b")];
        let pass = run(&tasks, &deps, &SchedulingConfig::default());

        assert!(pass.early[0].is_none());
        assert!(pass.early[1].is_none());
        assert_eq!(early(&pass, 2), (day(0), day(1)));
        assert_eq!(pass.unscheduled.len(), 2);
        assert_eq!(pass.unscheduled[0].task_id, "a");
        assert_eq!(pass.unscheduled[1].blocked_by.as_deref(), Some("a"));
        assert_eq!(pass.project_end, day(1));
    }

    #[test]
    fn test_zero_duration_milestone() {
        let tasks = vec![Task::new("build", "p", 4), Task::new("release", "p", 0)];
        let deps = vec![Dependency::finish_to_start("build", "release")];
        let pass = run(&tasks, &deps, &SchedulingConfig::default());
        assert_eq!(early(&pass, 1), (day(4), day(4)));
    }
}
