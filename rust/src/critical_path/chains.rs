//! Enumeration of zero-float chains.
//!
//! When the graph branches and rejoins at equal lengths there is more than
//! one critical path; every chain is reported, up to a configured limit.

use crate::config::SchedulingConfig;
use crate::graph::{DependencyGraph, TaskIdx};
use crate::log_debug;
use crate::schedule::ForwardPass;

use super::analysis::edge_slack;
use super::types::FloatRecord;

/// Driving successors of each critical task: critical tasks reached through
/// an edge with zero slack. Parallel edges to the same successor collapse.
fn driving_successors(
    graph: &DependencyGraph<'_>,
    forward: &ForwardPass,
    critical: &[bool],
    config: &SchedulingConfig,
) -> Vec<Vec<TaskIdx>> {
    graph
        .indices()
        .map(|idx| {
            if !critical[idx as usize] {
                return Vec::new();
            }
            let Some(early) = forward.early[idx as usize] else {
                return Vec::new();
            };
            let mut next: Vec<TaskIdx> = Vec::new();
            for edge in graph.successors(idx) {
                if !critical[edge.task as usize] || next.contains(&edge.task) {
                    continue;
                }
                let Some(succ) = forward.early[edge.task as usize] else {
                    continue;
                };
                if edge_slack(graph, edge, &early, &succ, config) == 0 {
                    next.push(edge.task);
                }
            }
            next
        })
        .collect()
}

/// Every maximal chain of critical tasks linked by driving edges, in
/// topological order of their first task.
pub fn critical_chains(
    graph: &DependencyGraph<'_>,
    forward: &ForwardPass,
    floats: &[Option<FloatRecord>],
    config: &SchedulingConfig,
) -> Vec<Vec<String>> {
    let critical: Vec<bool> = floats
        .iter()
        .map(|r| r.as_ref().is_some_and(|r| r.is_critical))
        .collect();
    let next = driving_successors(graph, forward, &critical, config);

    let mut has_driver = vec![false; graph.len()];
    for succs in &next {
        for &s in succs {
            has_driver[s as usize] = true;
        }
    }

    let limit = config.max_critical_chains;
    let mut chains: Vec<Vec<String>> = Vec::new();
    // (task, position of the next driving successor to follow)
    let mut stack: Vec<(TaskIdx, usize)> = Vec::new();

    for &start in graph.topological_order() {
        if !critical[start as usize] || has_driver[start as usize] {
            continue;
        }
        stack.push((start, 0));

        while let Some(top) = stack.last_mut() {
            if chains.len() >= limit {
                log_debug!(config.verbosity, "Critical chain limit {} reached", limit);
                return chains;
            }
            let (node, pos) = *top;
            let succs = &next[node as usize];
            if succs.is_empty() {
                chains.push(stack.iter().map(|&(t, _)| graph.id(t).to_string()).collect());
                stack.pop();
            } else if let Some(&succ) = succs.get(pos) {
                top.1 += 1;
                stack.push((succ, 0));
            } else {
                stack.pop();
            }
        }
    }

    chains
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::critical_path::analysis::analyze_float;
    use crate::models::{Dependency, Task};
    use crate::schedule::{backward_pass, forward_pass};
    use chrono::NaiveDate;

    fn chains_for(
        tasks: &[Task],
        deps: &[Dependency],
        config: &SchedulingConfig,
    ) -> Vec<Vec<String>> {
        let graph = DependencyGraph::build(tasks, deps, config).unwrap();
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let forward = forward_pass(&graph, start, config);
        let backward = backward_pass(&graph, &forward, config);
        let floats = analyze_float(&graph, &forward, &backward, config);
        critical_chains(&graph, &forward, &floats, config)
    }

    fn diamond() -> (Vec<Task>, Vec<Dependency>) {
        let tasks = vec![
            Task::new("a", "p", 1),
            Task::new("b", "p", 3),
            Task::new("c", "p", 3),
            Task::new("d", "p", 1),
            Task::new("side", "p", 1),
        ];
        let deps = vec![
            Dependency::finish_to_start("a", "b"),
            Dependency::finish_to_start("a", "c"),
            Dependency::finish_to_start("b", "d"),
            Dependency::finish_to_start("c", "d"),
        ];
        (tasks, deps)
    }

    #[test]
    fn test_branch_and_rejoin_reports_both_chains() {
        let (tasks, deps) = diamond();
        let chains = chains_for(&tasks, &deps, &SchedulingConfig::default());
        assert_eq!(chains, vec![vec!["a", "b", "d"], vec!["a", "c", "d"]]);
    }

    #[test]
    fn test_chain_limit() {
        let (tasks, deps) = diamond();
        let config = SchedulingConfig {
            max_critical_chains: 1,
            ..Default::default()
        };
        assert_eq!(chains_for(&tasks, &deps, &config).len(), 1);
    }

    #[test]
    fn test_independent_critical_tasks_form_own_chains() {
        let tasks = vec![Task::new("x", "p", 2), Task::new("y", "p", 2)];
        let chains = chains_for(&tasks, &[], &SchedulingConfig::default());
        assert_eq!(chains, vec![vec!["x"], vec!["y"]]);
    }
}
