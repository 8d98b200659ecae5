//! Types for resource allocation and leveling.

use chrono::NaiveDate;
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::Priority;

/// The dated footprint of one task on the resource timeline.
///
/// `end` is exclusive: the task occupies every day in `start..end`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskSpan {
    pub task_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub priority: Priority,
    /// Whether leveling may defer this task.
    pub movable: bool,
    /// Whether this task loads its resources at all.
    pub occupies: bool,
}

impl TaskSpan {
    #[inline]
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Iterate the days this span occupies.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d < self.end)
    }
}

/// One task deferral applied by leveling.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAdjustment {
    #[pyo3(get)]
    pub task_id: String,
    #[pyo3(get)]
    pub original_start: NaiveDate,
    #[pyo3(get)]
    pub adjusted_start: NaiveDate,
    #[pyo3(get)]
    pub original_end: NaiveDate,
    #[pyo3(get)]
    pub adjusted_end: NaiveDate,
    #[pyo3(get)]
    pub delay_days: i64,
    /// Resource whose overload triggered the deferral.
    #[pyo3(get)]
    pub resource_id: String,
    /// Day the overload was detected on.
    #[pyo3(get)]
    pub trigger_date: NaiveDate,
    #[pyo3(get)]
    pub reason: String,
}

#[pymethods]
impl TaskAdjustment {
    fn __repr__(&self) -> String {
        format!(
            "TaskAdjustment(task_id={:?}, {} -> {}, delay_days={})",
            self.task_id, self.original_start, self.adjusted_start, self.delay_days
        )
    }
}

/// A resource/day whose summed allocation exceeded capacity.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverloadEvent {
    #[pyo3(get)]
    pub resource_id: String,
    #[pyo3(get)]
    pub date: NaiveDate,
    #[pyo3(get)]
    pub total_allocation: f64,
    /// Tasks on the resource that day, highest ranked first.
    #[pyo3(get)]
    pub task_ids: Vec<String>,
}

#[pymethods]
impl OverloadEvent {
    fn __repr__(&self) -> String {
        format!(
            "OverloadEvent(resource_id={:?}, date={}, total_allocation={})",
            self.resource_id, self.date, self.total_allocation
        )
    }
}

/// Output of `level_resources`.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelingResult {
    #[pyo3(get)]
    pub adjustments: Vec<TaskAdjustment>,
    #[pyo3(get)]
    pub resolved_overloads: Vec<OverloadEvent>,
    /// Overloads no deferral could fix (e.g. a single task above capacity).
    #[pyo3(get)]
    pub unresolved_overloads: Vec<OverloadEvent>,
}

impl LevelingResult {
    /// Sum of all deferrals applied to one task.
    pub fn total_delay(&self, task_id: &str) -> i64 {
        self.adjustments
            .iter()
            .filter(|a| a.task_id == task_id)
            .map(|a| a.delay_days)
            .sum()
    }
}

#[pymethods]
impl LevelingResult {
    #[pyo3(name = "total_delay")]
    fn py_total_delay(&self, task_id: &str) -> i64 {
        self.total_delay(task_id)
    }

    fn __repr__(&self) -> String {
        format!(
            "LevelingResult(adjustments={}, resolved={}, unresolved={})",
            self.adjustments.len(),
            self.resolved_overloads.len(),
            self.unresolved_overloads.len()
        )
    }
}

/// Allocation on one resource for one day.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllocationDay {
    #[pyo3(get)]
    pub date: NaiveDate,
    #[pyo3(get)]
    pub total_percent: f64,
    #[pyo3(get)]
    pub task_ids: Vec<String>,
}

/// Read-only view of one resource's timeline with effort and cost rollups.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceUtilization {
    #[pyo3(get)]
    pub resource_id: String,
    #[pyo3(get)]
    pub days: Vec<AllocationDay>,
    #[pyo3(get)]
    pub peak_percent: f64,
    #[pyo3(get)]
    pub overloaded_days: usize,
    /// Sum of estimated hours over the resource's assignments.
    #[pyo3(get)]
    pub estimated_hours: f64,
    /// Sum of estimated hours times hourly rate.
    #[pyo3(get)]
    pub estimated_cost: f64,
}

#[pymethods]
impl ResourceUtilization {
    fn __repr__(&self) -> String {
        format!(
            "ResourceUtilization(resource_id={:?}, peak_percent={}, overloaded_days={})",
            self.resource_id, self.peak_percent, self.overloaded_days
        )
    }
}
