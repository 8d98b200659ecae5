//! Float calculation from forward and backward pass results.

use crate::config::SchedulingConfig;
use crate::graph::{DependencyGraph, Edge, TaskIdx};
use crate::log_checks;
use crate::schedule::{days_between, earliest_start_bound, BackwardPass, ForwardPass, Span};

use super::types::FloatRecord;

/// Days between the bound an edge imposes (computed from `from`) and the
/// successor's actual ES. Zero means the edge is driving.
pub(crate) fn edge_slack(
    graph: &DependencyGraph<'_>,
    edge: &Edge,
    from: &Span,
    successor_early: &Span,
    config: &SchedulingConfig,
) -> i64 {
    let succ_duration = graph
        .task(edge.task)
        .duration_days
        .map(i64::from)
        .unwrap_or(0);
    let bound = earliest_start_bound(
        edge.dependency_type,
        edge.lag_days,
        from,
        succ_duration,
        config.finish_constraints,
    );
    days_between(bound, successor_early.start)
}

/// Smallest edge slack over scheduled successors, 0 with none.
fn min_successor_slack(
    graph: &DependencyGraph<'_>,
    idx: TaskIdx,
    from: &Span,
    forward: &ForwardPass,
    config: &SchedulingConfig,
) -> i64 {
    graph
        .successors(idx)
        .iter()
        .filter_map(|edge| {
            forward.early[edge.task as usize]
                .map(|succ| edge_slack(graph, edge, from, &succ, config))
        })
        .min()
        .unwrap_or(0)
        .max(0)
}

/// Compute float for every task scheduled in both passes.
///
/// * total = LS - ES
/// * free = min successor ES minus the bound this task's early dates impose
///   (with a plain FinishToStart edge: successor ES - EF)
/// * independent = the same against this task's late dates, floored at 0
pub fn analyze_float(
    graph: &DependencyGraph<'_>,
    forward: &ForwardPass,
    backward: &BackwardPass,
    config: &SchedulingConfig,
) -> Vec<Option<FloatRecord>> {
    graph
        .indices()
        .map(|idx| {
            let early = forward.early[idx as usize]?;
            let late = backward.late[idx as usize]?;

            let total_float = days_between(early.start, late.start);
            let free_float = min_successor_slack(graph, idx, &early, forward, config);
            let independent_float = min_successor_slack(graph, idx, &late, forward, config);
            log_checks!(
                config.verbosity,
                "Task {}: total={} free={} independent={}",
                graph.id(idx),
                total_float,
                free_float,
                independent_float
            );

            Some(FloatRecord {
                task_id: graph.id(idx).to_string(),
                earliest_start: early.start,
                earliest_finish: early.finish,
                latest_start: late.start,
                latest_finish: late.finish,
                total_float,
                free_float,
                independent_float,
                is_critical: FloatRecord::has_zero_float(total_float),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dependency, DependencyType, Task};
    use crate::schedule::{backward_pass, forward_pass, shift};
    use chrono::NaiveDate;

    fn day(n: i64) -> NaiveDate {
        shift(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(), n)
    }

    fn floats(tasks: &[Task], deps: &[Dependency]) -> Vec<Option<FloatRecord>> {
        let config = SchedulingConfig::default();
        let graph = DependencyGraph::build(tasks, deps, &config).unwrap();
        let forward = forward_pass(&graph, day(0), &config);
        let backward = backward_pass(&graph, &forward, &config);
        analyze_float(&graph, &forward, &backward, &config)
    }

    fn totals(records: &[Option<FloatRecord>]) -> Vec<(i64, i64, i64)> {
        records
            .iter()
            .map(|r| {
                let r = r.as_ref().unwrap();
                (r.total_float, r.free_float, r.independent_float)
            })
            .collect()
    }

    #[test]
    fn test_series_with_parallel_task() {
        // a -> b -> c (2d each) and d (1d) on its own
        let tasks = vec![
            Task::new("a", "p", 2),
            Task::new("b", "p", 2),
            Task::new("c", "p", 2),
            Task::new("d", "p", 1),
        ];
        let deps = vec![
            Dependency::finish_to_start("a", "b"),
            Dependency::finish_to_start("b", "c"),
        ];
        let records = floats(&tasks, &deps);

        assert_eq!(totals(&records), vec![(0, 0, 0), (0, 0, 0), (0, 0, 0), (5, 0, 0)]);
        assert!(records[..3].iter().all(|r| r.as_ref().unwrap().is_critical));
        assert!(!records[3].as_ref().unwrap().is_critical);
    }

    #[test]
    fn test_free_and_independent_float() {
        // a (1d) -> c (1d); b (4d) -> c. a has 3 days of slack before c.
        let tasks = vec![Task::new("a", "p", 1), Task::new("b", "p", 4), Task::new("c", "p", 1)];
        let deps = vec![
            Dependency::finish_to_start("a", "c"),
            Dependency::finish_to_start("b", "c"),
        ];
        let records = floats(&tasks, &deps);
        let a = records[0].as_ref().unwrap();
        assert_eq!(a.total_float, 3);
        assert_eq!(a.free_float, 3);
        // LF of a is day 4, c starts day 4
        assert_eq!(a.independent_float, 0);
    }

    #[test]
    fn test_lag_is_not_counted_as_free_float() {
        let tasks = vec![Task::new("a", "p", 3), Task::new("b", "p", 5)];
        let deps = vec![Dependency::new("a", "b", DependencyType::FinishToStart, 2)];
        let records = floats(&tasks, &deps);
        assert_eq!(totals(&records), vec![(0, 0, 0), (0, 0, 0)]);
    }

    #[test]
    fn test_independent_float_measured_from_late_finish() {
        // x (1d) -> y (1d) -> z (1d); w (6d) -> z. y finishing at its LF lands on z.ES
        let tasks = vec![
            Task::new("x", "p", 1),
            Task::new("y", "p", 1),
            Task::new("w", "p", 6),
            Task::new("z", "p", 1),
        ];
        let deps = vec![
            Dependency::finish_to_start("x", "y"),
            Dependency::finish_to_start("y", "z"),
            Dependency::finish_to_start("w", "z"),
        ];
        let records = floats(&tasks, &deps);
        let y = records[1].as_ref().unwrap();
        assert_eq!(y.total_float, 4);
        assert_eq!(y.free_float, 4);
        assert_eq!(y.independent_float, 0);
        let x = records[0].as_ref().unwrap();
        assert_eq!(x.free_float, 0);
    }
}
