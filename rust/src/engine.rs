//! Public operations over a project snapshot.
//!
//! Each call builds its own graph from the inputs and keeps no state between
//! calls, so independent projects can be processed in parallel.

use chrono::NaiveDate;

use crate::config::{LevelingConfig, SchedulingConfig};
use crate::critical_path::{analyze_float, critical_chains, CriticalPathAnalysis, FloatRecord};
use crate::error::{ScheduleError, ValidationError};
use crate::graph::DependencyGraph;
use crate::leveling::{
    index_assignments, task_spans, AllocationTimeline, GreedyPriorityLeveling, LevelingResult,
    LevelingStrategy, ResourceUtilization,
};
use crate::log_changes;
use crate::models::{Dependency, Project, ResourceAssignment, Task};
use crate::schedule::{backward_pass, forward_pass, ForwardPass, ScheduleResult, TaskSchedule};

/// Every task must belong to `project`.
fn check_membership(project: &Project, tasks: &[Task]) -> Result<(), ValidationError> {
    match tasks.iter().find(|t| t.project_id != project.id) {
        Some(task) => Err(ValidationError::ForeignTask {
            task_id: task.id.clone(),
            task_project: task.project_id.clone(),
            project: project.id.clone(),
        }),
        None => Ok(()),
    }
}

/// Graph, passes and floats for one snapshot.
struct Analysis<'a> {
    graph: DependencyGraph<'a>,
    forward: ForwardPass,
    floats: Vec<Option<FloatRecord>>,
}

fn analyze<'a>(
    project: &Project,
    tasks: &'a [Task],
    dependencies: &[Dependency],
    config: &SchedulingConfig,
) -> Result<Analysis<'a>, ScheduleError> {
    check_membership(project, tasks)?;
    let graph = DependencyGraph::build(tasks, dependencies, config)?;
    let project_start = project.start_date.unwrap_or_else(|| config.today());
    let forward = forward_pass(&graph, project_start, config);
    let backward = backward_pass(&graph, &forward, config);
    let floats = analyze_float(&graph, &forward, &backward, config);
    Ok(Analysis {
        graph,
        forward,
        floats,
    })
}

/// Compute earliest dates for every task.
///
/// Critical flags come from the same float analysis as `analyze_critical_path`.
///
/// # Errors
/// `Validation(ForeignTask)` for a task of another project, and any
/// structural problem found while building the graph (see
/// [`DependencyGraph::build`]). Tasks that cannot be placed are reported in
/// `ScheduleResult::unscheduled` instead.
pub fn compute_schedule(
    project: &Project,
    tasks: &[Task],
    dependencies: &[Dependency],
    config: &SchedulingConfig,
) -> Result<ScheduleResult, ScheduleError> {
    let Analysis {
        graph,
        forward,
        floats,
    } = analyze(project, tasks, dependencies, config)?;

    let scheduled: Vec<TaskSchedule> = graph
        .indices()
        .filter_map(|idx| {
            let early = forward.early[idx as usize]?;
            let task = graph.task(idx);
            Some(TaskSchedule {
                task_id: task.id.clone(),
                name: task.name.clone(),
                parent_id: task.parent_id.clone(),
                level: graph.level(idx),
                start_date: early.start,
                end_date: early.finish,
                duration_days: task.duration_days.unwrap_or(0),
                is_critical: floats[idx as usize]
                    .as_ref()
                    .is_some_and(|r| r.is_critical),
                percent_complete: task.percent_complete,
                status: task.status,
            })
        })
        .collect();

    log_changes!(
        config.verbosity,
        "Scheduled project {}: {} task(s), {} -> {} ({} unscheduled)",
        project.id,
        scheduled.len(),
        forward.project_start,
        forward.project_end,
        forward.unscheduled.len()
    );

    Ok(ScheduleResult {
        project_id: project.id.clone(),
        project_start: forward.project_start,
        project_end: forward.project_end,
        total_duration_days: forward.total_duration_days(),
        tasks: scheduled,
        unscheduled: forward.unscheduled,
    })
}

/// Float for every scheduled task and the critical/non-critical partition.
///
/// # Errors
/// Same as [`compute_schedule`].
pub fn analyze_critical_path(
    project: &Project,
    tasks: &[Task],
    dependencies: &[Dependency],
    config: &SchedulingConfig,
) -> Result<CriticalPathAnalysis, ScheduleError> {
    let Analysis {
        graph,
        forward,
        floats,
    } = analyze(project, tasks, dependencies, config)?;

    let mut critical_path_tasks = Vec::new();
    let mut non_critical_tasks = Vec::new();
    for &idx in graph.topological_order() {
        if let Some(record) = &floats[idx as usize] {
            let id = record.task_id.clone();
            if record.is_critical {
                critical_path_tasks.push(id);
            } else {
                non_critical_tasks.push(id);
            }
        }
    }
    let critical_chains = critical_chains(&graph, &forward, &floats, config);

    log_changes!(
        config.verbosity,
        "Critical path for {}: {} critical, {} non-critical, {} chain(s)",
        project.id,
        critical_path_tasks.len(),
        non_critical_tasks.len(),
        critical_chains.len()
    );

    Ok(CriticalPathAnalysis {
        project_id: project.id.clone(),
        project_start: forward.project_start,
        project_end: forward.project_end,
        critical_path_tasks,
        non_critical_tasks,
        float_analysis: floats.into_iter().flatten().collect(),
        critical_chains,
        unscheduled: forward.unscheduled,
    })
}

/// Copy computed dates onto the tasks as explicit start and end dates, so
/// leveling works from the schedule rather than the project start.
///
/// Tasks missing from the schedule are left as they are.
pub fn apply_schedule(tasks: &mut [Task], schedule: &ScheduleResult) {
    for task in tasks.iter_mut() {
        if let Some(computed) = schedule.task(&task.id) {
            task.start_date = Some(computed.start_date);
            task.end_date = Some(computed.end_date);
        }
    }
}

fn project_start(project: &Project, config: &LevelingConfig) -> NaiveDate {
    project.start_date.unwrap_or_else(|| config.today())
}

/// Level resources with [`GreedyPriorityLeveling`].
///
/// Deferred tasks get their new start and end written back; nothing else in
/// `tasks` changes. Re-run [`compute_schedule`] to see the effect on the
/// critical path.
///
/// # Errors
/// `Validation` for an out-of-range config, a task of another project,
/// duplicate task ids, an explicit end before the start or a negative
/// allocation; `NotFound` for an assignment to a task not in `tasks`.
pub fn level_resources(
    project: &Project,
    tasks: &mut [Task],
    assignments: &[ResourceAssignment],
    config: &LevelingConfig,
) -> Result<LevelingResult, ScheduleError> {
    level_resources_with(&GreedyPriorityLeveling, project, tasks, assignments, config)
}

/// Level resources with a caller-supplied strategy.
///
/// # Errors
/// Same as [`level_resources`].
pub fn level_resources_with<S: LevelingStrategy + ?Sized>(
    strategy: &S,
    project: &Project,
    tasks: &mut [Task],
    assignments: &[ResourceAssignment],
    config: &LevelingConfig,
) -> Result<LevelingResult, ScheduleError> {
    config.validate()?;
    check_membership(project, tasks)?;
    let mut spans = task_spans(tasks, project_start(project, config))?;
    let span_of = index_assignments(&spans, assignments)?;
    let before: Vec<(NaiveDate, NaiveDate)> = spans.iter().map(|s| (s.start, s.end)).collect();

    let result = strategy.level(&mut spans, assignments, &span_of, config);

    for ((task, span), original) in tasks.iter_mut().zip(&spans).zip(before) {
        if (span.start, span.end) != original {
            task.start_date = Some(span.start);
            task.end_date = Some(span.end);
        }
    }

    log_changes!(
        config.verbosity,
        "Leveled project {}: {} adjustment(s), {} resolved, {} unresolved",
        project.id,
        result.adjustments.len(),
        result.resolved_overloads.len(),
        result.unresolved_overloads.len()
    );
    Ok(result)
}

/// The allocation timeline per resource, with hours and cost rolled up.
///
/// # Errors
/// Same as [`level_resources`].
pub fn resource_utilization(
    project: &Project,
    tasks: &[Task],
    assignments: &[ResourceAssignment],
    config: &LevelingConfig,
) -> Result<Vec<ResourceUtilization>, ScheduleError> {
    config.validate()?;
    check_membership(project, tasks)?;
    let spans = task_spans(tasks, project_start(project, config))?;
    let span_of = index_assignments(&spans, assignments)?;
    let timeline = AllocationTimeline::build(&spans, assignments, &span_of);
    Ok(timeline.utilization(&spans, assignments, &span_of, config.capacity_percent))
}
