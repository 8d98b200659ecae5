//! Per-resource, per-day allocation timeline.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{EntityKind, ScheduleError, ValidationError};
use crate::models::{ResourceAssignment, Task};
use crate::schedule::shift;

use super::types::{AllocationDay, OverloadEvent, ResourceUtilization, TaskSpan};

/// Capacity comparisons tolerate float noise from summing percentages.
const EPSILON: f64 = 1e-9;

/// Summed allocation on one resource for one day.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DayLoad {
    pub total_percent: f64,
    /// (span position, percent) for every contributing assignment.
    pub entries: Vec<(usize, f64)>,
}

impl DayLoad {
    /// Distinct span positions contributing to this day, in insertion order.
    pub fn spans(&self) -> Vec<usize> {
        let mut seen = FxHashSet::default();
        self.entries
            .iter()
            .map(|&(span, _)| span)
            .filter(|span| seen.insert(*span))
            .collect()
    }
}

/// Resource id -> date -> load. Ordered maps keep iteration deterministic.
#[derive(Clone, Debug, Default)]
pub struct AllocationTimeline {
    resources: BTreeMap<String, BTreeMap<NaiveDate, DayLoad>>,
}

/// Build spans from task dates.
///
/// Start is the explicit start or `project_start`; end is the explicit end or
/// start + duration (a task without a duration occupies no days).
pub fn task_spans(
    tasks: &[Task],
    project_start: NaiveDate,
) -> Result<Vec<TaskSpan>, ScheduleError> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    tasks
        .iter()
        .map(|task| {
            if !seen.insert(task.id.as_str()) {
                return Err(ScheduleError::from(ValidationError::DuplicateTask(
                    task.id.clone(),
                )));
            }
            let start = task.start_date.unwrap_or(project_start);
            let end = task.end_date.unwrap_or_else(|| {
                shift(start, task.duration_days.map(i64::from).unwrap_or(0))
            });
            if end < start {
                return Err(ScheduleError::from(ValidationError::InvalidSpan(
                    task.id.clone(),
                )));
            }
            Ok(TaskSpan {
                task_id: task.id.clone(),
                start,
                end,
                priority: task.priority,
                movable: task.status.is_movable(),
                occupies: task.status.occupies_resources(),
            })
        })
        .collect()
}

/// Map task ids to span positions, rejecting assignments to unknown tasks
/// and allocations that are negative or not finite.
pub fn index_assignments(
    spans: &[TaskSpan],
    assignments: &[ResourceAssignment],
) -> Result<Vec<usize>, ScheduleError> {
    let by_id: FxHashMap<&str, usize> = spans
        .iter()
        .enumerate()
        .map(|(i, s)| (s.task_id.as_str(), i))
        .collect();
    assignments
        .iter()
        .map(|a| {
            let span = by_id
                .get(a.task_id.as_str())
                .copied()
                .ok_or_else(|| ScheduleError::not_found(EntityKind::Task, &a.task_id))?;
            if !a.allocation_percent.is_finite() || a.allocation_percent < 0.0 {
                return Err(ScheduleError::from(ValidationError::InvalidAllocation {
                    task_id: a.task_id.clone(),
                    resource_id: a.resource_id.clone(),
                    value: a.allocation_percent,
                }));
            }
            Ok(span)
        })
        .collect()
}

impl AllocationTimeline {
    /// Sum every assignment over every day its task occupies.
    ///
    /// `span_of[i]` is the span position of `assignments[i]`
    /// (see [`index_assignments`]).
    pub fn build(
        spans: &[TaskSpan],
        assignments: &[ResourceAssignment],
        span_of: &[usize],
    ) -> Self {
        let mut resources: BTreeMap<String, BTreeMap<NaiveDate, DayLoad>> = BTreeMap::new();
        for (assignment, &span_idx) in assignments.iter().zip(span_of) {
            let span = &spans[span_idx];
            if !span.occupies {
                continue;
            }
            let days = resources.entry(assignment.resource_id.clone()).or_default();
            for date in span.days() {
                let load = days.entry(date).or_default();
                load.total_percent += assignment.allocation_percent;
                load.entries.push((span_idx, assignment.allocation_percent));
            }
        }
        Self { resources }
    }

    /// Summed allocation for a resource on a date (0 when idle).
    pub fn allocation(&self, resource_id: &str, date: NaiveDate) -> f64 {
        self.resources
            .get(resource_id)
            .and_then(|days| days.get(&date))
            .map_or(0.0, |load| load.total_percent)
    }

    pub fn load(&self, resource_id: &str, date: NaiveDate) -> Option<&DayLoad> {
        self.resources.get(resource_id)?.get(&date)
    }

    /// Earliest overloaded (resource, date), ties broken by resource id,
    /// ignoring the pairs in `skip`.
    pub fn first_overload(
        &self,
        capacity: f64,
        skip: &FxHashSet<(String, NaiveDate)>,
    ) -> Option<(&str, NaiveDate, &DayLoad)> {
        self.resources
            .iter()
            .filter_map(|(resource, days)| {
                days.iter()
                    .find(|(date, load)| {
                        load.total_percent > capacity + EPSILON
                            && !skip.contains(&(resource.clone(), **date))
                    })
                    .map(|(date, load)| (resource.as_str(), *date, load))
            })
            .min_by_key(|(resource, date, _)| (*date, *resource))
    }

    /// Every overloaded resource/day, in resource then date order.
    pub fn overloads(&self, spans: &[TaskSpan], capacity: f64) -> Vec<OverloadEvent> {
        self.resources
            .iter()
            .flat_map(|(resource, days)| {
                days.iter()
                    .filter(|(_, load)| load.total_percent > capacity + EPSILON)
                    .map(move |(date, load)| OverloadEvent {
                        resource_id: resource.clone(),
                        date: *date,
                        total_allocation: load.total_percent,
                        task_ids: load
                            .spans()
                            .into_iter()
                            .map(|s| spans[s].task_id.clone())
                            .collect(),
                    })
            })
            .collect()
    }

    /// Per-resource view with hours and cost rolled up from the assignments.
    pub fn utilization(
        &self,
        spans: &[TaskSpan],
        assignments: &[ResourceAssignment],
        span_of: &[usize],
        capacity: f64,
    ) -> Vec<ResourceUtilization> {
        let mut effort: FxHashMap<&str, (f64, f64)> = FxHashMap::default();
        for (assignment, &span_idx) in assignments.iter().zip(span_of) {
            if !spans[span_idx].occupies {
                continue;
            }
            let hours = assignment.estimated_hours.unwrap_or(0.0);
            let entry = effort.entry(assignment.resource_id.as_str()).or_default();
            entry.0 += hours;
            entry.1 += hours * assignment.hourly_rate;
        }

        self.resources
            .iter()
            .map(|(resource, days)| {
                let (estimated_hours, estimated_cost) =
                    effort.get(resource.as_str()).copied().unwrap_or_default();
                let days: Vec<AllocationDay> = days
                    .iter()
                    .map(|(date, load)| AllocationDay {
                        date: *date,
                        total_percent: load.total_percent,
                        task_ids: load
                            .spans()
                            .into_iter()
                            .map(|s| spans[s].task_id.clone())
                            .collect(),
                    })
                    .collect();
                ResourceUtilization {
                    resource_id: resource.clone(),
                    peak_percent: days.iter().map(|d| d.total_percent).fold(0.0, f64::max),
                    overloaded_days: days
                        .iter()
                        .filter(|d| d.total_percent > capacity + EPSILON)
                        .count(),
                    days,
                    estimated_hours,
                    estimated_cost,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;

    fn day(n: i64) -> NaiveDate {
        shift(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(), n)
    }

    fn timeline(
        tasks: &[Task],
        assignments: &[ResourceAssignment],
    ) -> (Vec<TaskSpan>, Vec<usize>, AllocationTimeline) {
        let spans = task_spans(tasks, day(0)).unwrap();
        let span_of = index_assignments(&spans, assignments).unwrap();
        let timeline = AllocationTimeline::build(&spans, assignments, &span_of);
        (spans, span_of, timeline)
    }

    #[test]
    fn test_allocation_is_summed() {
        let tasks = vec![
            Task::new("a", "p", 3),
            Task::new("b", "p", 2).with_start(day(1)),
            Task::new("c", "p", 1).with_start(day(1)),
        ];
        let assignments = vec![
            ResourceAssignment::new("a", "ana", 50.0),
            ResourceAssignment::new("b", "ana", 30.0),
            ResourceAssignment::new("c", "ana", 40.0),
        ];
        let (spans, _, timeline) = timeline(&tasks, &assignments);

        assert!((timeline.allocation("ana", day(0)) - 50.0).abs() < 1e-9);
        assert!((timeline.allocation("ana", day(1)) - 120.0).abs() < 1e-9);
        assert!((timeline.allocation("ana", day(2)) - 80.0).abs() < 1e-9);
        assert_eq!(timeline.allocation("ana", day(3)), 0.0);
        assert_eq!(timeline.allocation("bob", day(1)), 0.0);

        let overloads = timeline.overloads(&spans, 100.0);
        assert_eq!(overloads.len(), 1);
        assert_eq!(overloads[0].date, day(1));
        assert_eq!(overloads[0].task_ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_cancelled_tasks_do_not_load_resources() {
        let tasks = vec![
            Task::new("a", "p", 1),
            Task::new("b", "p", 1).with_status(TaskStatus::Cancelled),
        ];
        let assignments = vec![
            ResourceAssignment::new("a", "ana", 80.0),
            ResourceAssignment::new("b", "ana", 80.0),
        ];
        let (_, _, timeline) = timeline(&tasks, &assignments);
        assert!((timeline.allocation("ana", day(0)) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_assignment_task() {
        let tasks = vec![Task::new("a", "p", 1)];
        let spans = task_spans(&tasks, day(0)).unwrap();
        let err = index_assignments(&spans, &[ResourceAssignment::new("zz", "ana", 10.0)])
            .unwrap_err();
        assert_eq!(err, ScheduleError::not_found(EntityKind::Task, "zz"));
    }

    #[test]
    fn test_negative_or_nan_allocation_rejected() {
        let tasks = vec![Task::new("a", "p", 1)];
        let spans = task_spans(&tasks, day(0)).unwrap();
        for value in [-20.0, f64::NAN] {
            let err = index_assignments(&spans, &[ResourceAssignment::new("a", "ana", value)])
                .unwrap_err();
            assert!(matches!(
                err,
                ScheduleError::Validation(ValidationError::InvalidAllocation { .. })
            ));
        }
        assert!(index_assignments(&spans, &[ResourceAssignment::new("a", "ana", 0.0)]).is_ok());
    }

    #[test]
    fn test_explicit_end_before_start_rejected() {
        let mut task = Task::new("a", "p", 1).with_start(day(3));
        task.end_date = Some(day(1));
        assert_eq!(
            task_spans(&[task], day(0)).unwrap_err(),
            ScheduleError::Validation(ValidationError::InvalidSpan("a".to_string()))
        );
    }

    #[test]
    fn test_first_overload_orders_by_date_then_resource() {
        let tasks = vec![
            Task::new("a", "p", 2),
            Task::new("b", "p", 2),
            Task::new("c", "p", 1).with_start(day(1)),
            Task::new("d", "p", 1).with_start(day(1)),
        ];
        let assignments = vec![
            ResourceAssignment::new("a", "zed", 60.0),
            ResourceAssignment::new("b", "zed", 60.0),
            ResourceAssignment::new("c", "amy", 60.0),
            ResourceAssignment::new("d", "amy", 60.0),
        ];
        let (_, _, timeline) = timeline(&tasks, &assignments);
        let mut skip = FxHashSet::default();

        let (resource, date, _) = timeline.first_overload(100.0, &skip).unwrap();
        assert_eq!((resource, date), ("zed", day(0)));

        skip.insert(("zed".to_string(), day(0)));
        let (resource, date, _) = timeline.first_overload(100.0, &skip).unwrap();
        assert_eq!((resource, date), ("amy", day(1)));
    }

    #[test]
    fn test_utilization_rolls_up_cost() {
        let tasks = vec![Task::new("a", "p", 2), Task::new("b", "p", 1)];
        let mut first = ResourceAssignment::new("a", "ana", 100.0);
        first.estimated_hours = Some(16.0);
        first.hourly_rate = 50.0;
        let mut second = ResourceAssignment::new("b", "ana", 50.0);
        second.estimated_hours = Some(4.0);
        second.hourly_rate = 40.0;
        let assignments = vec![first, second];

        let (spans, span_of, timeline) = timeline(&tasks, &assignments);
        let report = timeline.utilization(&spans, &assignments, &span_of, 100.0);

        assert_eq!(report.len(), 1);
        let ana = &report[0];
        assert_eq!(ana.days.len(), 2);
        assert!((ana.peak_percent - 150.0).abs() < 1e-9);
        assert_eq!(ana.overloaded_days, 1);
        assert!((ana.estimated_hours - 20.0).abs() < 1e-9);
        assert!((ana.estimated_cost - 960.0).abs() < 1e-9);
    }
}
