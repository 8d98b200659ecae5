//! Dependency graph construction and structural validation.

use std::collections::VecDeque;

use crate::config::{DanglingPolicy, SchedulingConfig};
use crate::error::{EntityKind, ScheduleError, ValidationError};
use crate::models::{Dependency, DependencyType, Task};
use crate::{log_changes, log_debug};

use super::hierarchy::compute_levels;
use super::index::{TaskIdx, TaskIndex};

/// One side of a dependency, stored on the task at the other side.
///
/// In `predecessors[i]`, `task` is the predecessor of `i`; in `successors[i]`
/// it is the successor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub task: TaskIdx,
    pub dependency_type: DependencyType,
    pub lag_days: i64,
}

/// Validated, indexed view of one project's tasks and dependencies.
///
/// Construction guarantees: unique ids, no self or cross-project edges, no
/// dependency cycle, no parent cycle, and a complete topological order.
#[derive(Debug, Clone)]
pub struct DependencyGraph<'a> {
    tasks: Vec<&'a Task>,
    index: TaskIndex,
    predecessors: Vec<Vec<Edge>>,
    successors: Vec<Vec<Edge>>,
    levels: Vec<u32>,
    topo_order: Vec<TaskIdx>,
}

impl<'a> DependencyGraph<'a> {
    /// Build and validate the graph.
    ///
    /// # Errors
    /// * `Validation` for duplicate ids, bad percent-complete, self or
    ///   cross-project dependencies, or a task that is its own ancestor
    /// * `NotFound` for a dangling endpoint or parent under `DanglingPolicy::Reject`
    /// * `CircularDependency` if the dependency edges form a cycle
    pub fn build(
        tasks: &'a [Task],
        dependencies: &[Dependency],
        config: &SchedulingConfig,
    ) -> Result<Self, ScheduleError> {
        let verbosity = config.verbosity;
        let mut index = TaskIndex::with_capacity(tasks.len());
        for task in tasks {
            if task.percent_complete > 100 {
                return Err(ValidationError::PercentComplete {
                    task_id: task.id.clone(),
                    value: task.percent_complete,
                }
                .into());
            }
            if index.insert(&task.id).is_none() {
                return Err(ValidationError::DuplicateTask(task.id.clone()).into());
            }
        }

        let n = tasks.len();
        let mut predecessors: Vec<Vec<Edge>> = vec![Vec::new(); n];
        let mut successors: Vec<Vec<Edge>> = vec![Vec::new(); n];

        for dep in dependencies {
            if dep.predecessor_id == dep.successor_id {
                return Err(ValidationError::SelfDependency(dep.successor_id.clone()).into());
            }

            let (Some(pred), Some(succ)) = (
                resolve_endpoint(&index, &dep.predecessor_id, config.dangling_references)?,
                resolve_endpoint(&index, &dep.successor_id, config.dangling_references)?,
            ) else {
                log_changes!(
                    verbosity,
                    "Ignoring dependency {} -> {}: endpoint not in snapshot",
                    dep.predecessor_id,
                    dep.successor_id
                );
                continue;
            };

            let pred_task = &tasks[pred as usize];
            let succ_task = &tasks[succ as usize];
            if pred_task.project_id != succ_task.project_id {
                return Err(ValidationError::CrossProject {
                    predecessor: dep.predecessor_id.clone(),
                    successor: dep.successor_id.clone(),
                    predecessor_project: pred_task.project_id.clone(),
                    successor_project: succ_task.project_id.clone(),
                }
                .into());
            }

            let lag_days = i64::from(dep.lag_days);
            predecessors[succ as usize].push(Edge {
                task: pred,
                dependency_type: dep.dependency_type,
                lag_days,
            });
            successors[pred as usize].push(Edge {
                task: succ,
                dependency_type: dep.dependency_type,
                lag_days,
            });
        }

        let tasks: Vec<&'a Task> = tasks.iter().collect();
        let levels = compute_levels(&tasks, &index, config)?;

        detect_cycle(&successors, &index)?;
        let topo_order = topological_order(&predecessors, &successors, &index)?;

        log_debug!(
            verbosity,
            "Built dependency graph: {} tasks, {} edges",
            n,
            predecessors.iter().map(Vec::len).sum::<usize>()
        );

        Ok(Self {
            tasks,
            index,
            predecessors,
            successors,
            levels,
            topo_order,
        })
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[inline]
    pub fn task(&self, idx: TaskIdx) -> &'a Task {
        self.tasks[idx as usize]
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<TaskIdx> {
        self.index.get(id)
    }

    #[inline]
    pub fn id(&self, idx: TaskIdx) -> &str {
        self.index.id(idx)
    }

    #[inline]
    pub fn predecessors(&self, idx: TaskIdx) -> &[Edge] {
        &self.predecessors[idx as usize]
    }

    #[inline]
    pub fn successors(&self, idx: TaskIdx) -> &[Edge] {
        &self.successors[idx as usize]
    }

    /// Distance from the task's root ancestor (roots are level 0).
    #[inline]
    pub fn level(&self, idx: TaskIdx) -> u32 {
        self.levels[idx as usize]
    }

    /// Every task, predecessors before successors.
    pub fn topological_order(&self) -> &[TaskIdx] {
        &self.topo_order
    }

    /// All arena positions in input order.
    pub fn indices(&self) -> impl Iterator<Item = TaskIdx> {
        0..self.tasks.len() as TaskIdx
    }
}

fn resolve_endpoint(
    index: &TaskIndex,
    id: &str,
    policy: DanglingPolicy,
) -> Result<Option<TaskIdx>, ScheduleError> {
    match (index.get(id), policy) {
        (Some(idx), _) => Ok(Some(idx)),
        (None, DanglingPolicy::Ignore) => Ok(None),
        (None, DanglingPolicy::Reject) => {
            Err(ScheduleError::not_found(EntityKind::DependencyEndpoint, id))
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Depth-first search from every task over the successor lists.
///
/// Fails on the first back edge, naming it and the cycle it closes.
fn detect_cycle(successors: &[Vec<Edge>], index: &TaskIndex) -> Result<(), ScheduleError> {
    let n = successors.len();
    let mut marks = vec![Mark::Unvisited; n];
    // (task, position of the next successor to visit)
    let mut stack: Vec<(TaskIdx, usize)> = Vec::new();

    for root in 0..n as TaskIdx {
        if marks[root as usize] != Mark::Unvisited {
            continue;
        }
        marks[root as usize] = Mark::OnStack;
        stack.push((root, 0));

        while let Some(top) = stack.last_mut() {
            let (node, next) = *top;
            let Some(edge) = successors[node as usize].get(next) else {
                marks[node as usize] = Mark::Done;
                stack.pop();
                continue;
            };
            top.1 += 1;

            match marks[edge.task as usize] {
                Mark::Unvisited => {
                    marks[edge.task as usize] = Mark::OnStack;
                    stack.push((edge.task, 0));
                }
                Mark::OnStack => {
                    let start = stack
                        .iter()
                        .position(|&(t, _)| t == edge.task)
                        .unwrap_or(0);
                    let cycle = stack[start..]
                        .iter()
                        .map(|&(t, _)| index.id(t).to_string())
                        .collect();
                    return Err(ScheduleError::CircularDependency {
                        predecessor: index.id(node).to_string(),
                        successor: index.id(edge.task).to_string(),
                        cycle,
                    });
                }
                Mark::Done => {}
            }
        }
    }

    Ok(())
}

/// Kahn's algorithm over indegree counters, seeded in input order.
///
/// Reports a cycle on its own if it cannot order every task, so callers never
/// depend on [`detect_cycle`] having run first.
fn topological_order(
    predecessors: &[Vec<Edge>],
    successors: &[Vec<Edge>],
    index: &TaskIndex,
) -> Result<Vec<TaskIdx>, ScheduleError> {
    let n = predecessors.len();
    let mut in_degree: Vec<usize> = predecessors.iter().map(Vec::len).collect();

    let mut queue: VecDeque<TaskIdx> = (0..n as TaskIdx)
        .filter(|&t| in_degree[t as usize] == 0)
        .collect();
    let mut order: Vec<TaskIdx> = Vec::with_capacity(n);

    while let Some(task) = queue.pop_front() {
        order.push(task);
        for edge in &successors[task as usize] {
            let degree = &mut in_degree[edge.task as usize];
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(edge.task);
            }
        }
    }

    if order.len() != n {
        // Any task left with a nonzero indegree sits on or behind a cycle;
        // one of its remaining predecessors gives a blocking edge to report.
        let stuck = (0..n).find(|&t| in_degree[t] > 0).unwrap_or(0);
        let blocker = predecessors[stuck]
            .iter()
            .find(|e| in_degree[e.task as usize] > 0)
            .map(|e| e.task)
            .unwrap_or(stuck as TaskIdx);
        return Err(ScheduleError::CircularDependency {
            predecessor: index.id(blocker).to_string(),
            successor: index.id(stuck as TaskIdx).to_string(),
            cycle: (0..n)
                .filter(|&t| in_degree[t] > 0)
                .map(|t| index.id(t as TaskIdx).to_string())
                .collect(),
        });
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str) -> Task {
        Task::new(id, "p1", 1)
    }

    fn fs(pred: &str, succ: &str) -> Dependency {
        Dependency::finish_to_start(pred, succ)
    }

    fn build<'a>(
        tasks: &'a [Task],
        deps: &[Dependency],
    ) -> Result<DependencyGraph<'a>, ScheduleError> {
        DependencyGraph::build(tasks, deps, &SchedulingConfig::default())
    }

    #[test]
    fn test_predecessors_carry_edge_metadata() {
        let tasks = vec![task("a"), task("b")];
        let deps = vec![Dependency::new("a", "b", DependencyType::StartToStart, -2)];
        let graph = build(&tasks, &deps).unwrap();

        let b = graph.get("b").unwrap();
        let edges = graph.predecessors(b);
        assert_eq!(edges.len(), 1);
        assert_eq!(graph.id(edges[0].task), "a");
        assert_eq!(edges[0].dependency_type, DependencyType::StartToStart);
        assert_eq!(edges[0].lag_days, -2);
        assert_eq!(graph.successors(graph.get("a").unwrap())[0].task, b);
    }

    #[test]
    fn test_self_dependency_rejected() {
        let tasks = vec![task("a")];
        let err = build(&tasks, &[fs("a", "a")]).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::Validation(ValidationError::SelfDependency("a".to_string()))
        );
    }

    #[test]
    fn test_cross_project_rejected() {
        let tasks = vec![task("a"), Task::new("b", "p2", 1)];
        let err = build(&tasks, &[fs("a", "b")]).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::Validation(ValidationError::CrossProject { .. })
        ));
    }

    #[test]
    fn test_duplicate_task_rejected() {
        let tasks = vec![task("a"), task("a")];
        let err = build(&tasks, &[]).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::Validation(ValidationError::DuplicateTask("a".to_string()))
        );
    }

    #[test]
    fn test_percent_complete_out_of_range() {
        let mut t = task("a");
        t.percent_complete = 101;
        let tasks = vec![t];
        assert!(matches!(
            build(&tasks, &[]),
            Err(ScheduleError::Validation(ValidationError::PercentComplete { .. }))
        ));
    }

    #[test]
    fn test_two_task_cycle_rejected() {
        let tasks = vec![task("a"), task("b")];
        let err = build(&tasks, &[fs("a", "b"), fs("b", "a")]).unwrap_err();
        match err {
            ScheduleError::CircularDependency {
                predecessor,
                successor,
                cycle,
            } => {
                assert_eq!(predecessor, "b");
                assert_eq!(successor, "a");
                assert_eq!(cycle, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_long_cycle_behind_acyclic_prefix() {
        let tasks = vec![task("start"), task("x"), task("y"), task("z")];
        let deps = vec![fs("start", "x"), fs("x", "y"), fs("y", "z"), fs("z", "x")];
        let err = build(&tasks, &deps).unwrap_err();
        match err {
            ScheduleError::CircularDependency { cycle, .. } => {
                assert_eq!(cycle, vec!["x", "y", "z"]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_kahn_detects_cycle_independently() {
        let index = {
            let mut index = TaskIndex::default();
            index.insert("a");
            index.insert("b");
            index
        };
        let edge = |t| Edge {
            task: t,
            dependency_type: DependencyType::FinishToStart,
            lag_days: 0,
        };
        let predecessors = vec![vec![edge(1)], vec![edge(0)]];
        let successors = vec![vec![edge(1)], vec![edge(0)]];
        assert!(matches!(
            topological_order(&predecessors, &successors, &index),
            Err(ScheduleError::CircularDependency { .. })
        ));
    }

    #[test]
    fn test_topological_order_respects_edges() {
        let tasks = vec![task("d"), task("c"), task("b"), task("a")];
        let deps = vec![fs("a", "b"), fs("b", "c"), fs("a", "d"), fs("c", "d")];
        let graph = build(&tasks, &deps).unwrap();
        let order: Vec<&str> = graph
            .topological_order()
            .iter()
            .map(|&t| graph.id(t))
            .collect();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_dangling_endpoint_rejected_by_default() {
        let tasks = vec![task("a")];
        let err = build(&tasks, &[fs("ghost", "a")]).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::NotFound {
                kind: EntityKind::DependencyEndpoint,
                id: "ghost".to_string()
            }
        );
    }

    #[test]
    fn test_dangling_endpoint_ignored_when_configured() {
        let tasks = vec![task("a")];
        let config = SchedulingConfig {
            dangling_references: DanglingPolicy::Ignore,
            ..Default::default()
        };
        let graph = DependencyGraph::build(&tasks, &[fs("ghost", "a")], &config).unwrap();
        assert!(graph.predecessors(0).is_empty());
    }
}
