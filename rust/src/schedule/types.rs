//! Result types produced by the forward scheduler.

use chrono::NaiveDate;
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::UnscheduledTaskWarning;
use crate::models::TaskStatus;

/// Computed dates for one task.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSchedule {
    #[pyo3(get)]
    pub task_id: String,
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub parent_id: Option<String>,
    /// Distance from the root of the task tree.
    #[pyo3(get)]
    pub level: u32,
    /// Earliest start.
    #[pyo3(get)]
    pub start_date: NaiveDate,
    /// Earliest finish (exclusive).
    #[pyo3(get)]
    pub end_date: NaiveDate,
    #[pyo3(get)]
    pub duration_days: u32,
    #[pyo3(get)]
    pub is_critical: bool,
    #[pyo3(get)]
    pub percent_complete: u8,
    #[pyo3(get)]
    pub status: TaskStatus,
}

#[pymethods]
impl TaskSchedule {
    fn __repr__(&self) -> String {
        format!(
            "TaskSchedule(task_id={:?}, start={}, end={}, critical={})",
            self.task_id, self.start_date, self.end_date, self.is_critical
        )
    }
}

/// Output of `compute_schedule`.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResult {
    #[pyo3(get)]
    pub project_id: String,
    #[pyo3(get)]
    pub project_start: NaiveDate,
    /// Latest earliest-finish over all scheduled tasks.
    #[pyo3(get)]
    pub project_end: NaiveDate,
    #[pyo3(get)]
    pub total_duration_days: i64,
    /// Scheduled tasks in input order.
    #[pyo3(get)]
    pub tasks: Vec<TaskSchedule>,
    #[pyo3(get)]
    pub unscheduled: Vec<UnscheduledTaskWarning>,
}

impl ScheduleResult {
    pub fn task(&self, task_id: &str) -> Option<&TaskSchedule> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }

    pub fn critical_task_ids(&self) -> impl Iterator<Item = &str> {
        self.tasks
            .iter()
            .filter(|t| t.is_critical)
            .map(|t| t.task_id.as_str())
    }
}

#[pymethods]
impl ScheduleResult {
    #[pyo3(name = "task")]
    fn py_task(&self, task_id: &str) -> Option<TaskSchedule> {
        self.task(task_id).cloned()
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleResult(project_id={:?}, start={}, end={}, tasks={}, unscheduled={})",
            self.project_id,
            self.project_start,
            self.project_end,
            self.tasks.len(),
            self.unscheduled.len()
        )
    }
}
