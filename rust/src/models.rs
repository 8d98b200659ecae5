//! Core data types for the scheduling engine.
//!
//! These are the snapshot types a caller hands to the engine. The engine only
//! ever writes back `start_date`/`end_date` on [`Task`] (during leveling).

use chrono::NaiveDate;
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

/// Task priority, ordered `Low < Medium < High < Critical`.
#[pyclass(eq, eq_int)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// Task lifecycle status. Passed through to results untouched.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    OnHold,
    Cancelled,
}

impl TaskStatus {
    /// Whether leveling may defer a task in this state.
    ///
    /// Work that has started or finished is pinned to its dates.
    pub fn is_movable(self) -> bool {
        matches!(self, TaskStatus::NotStarted | TaskStatus::OnHold)
    }

    /// Whether a task in this state occupies its resources.
    pub fn occupies_resources(self) -> bool {
        self != TaskStatus::Cancelled
    }
}

/// The four precedence relations between two tasks.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyType {
    #[default]
    FinishToStart,
    StartToStart,
    FinishToFinish,
    StartToFinish,
}

/// The project owning a task set.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub name: String,
    /// Scheduling floor. `None` means "today".
    #[pyo3(get, set)]
    pub start_date: Option<NaiveDate>,
}

impl Project {
    pub fn new(id: impl Into<String>, start_date: Option<NaiveDate>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            start_date,
        }
    }
}

#[pymethods]
impl Project {
    #[new]
    #[pyo3(signature = (id, name, start_date=None))]
    fn py_new(id: String, name: String, start_date: Option<NaiveDate>) -> Self {
        Self {
            id,
            name,
            start_date,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Project(id={:?}, name={:?}, start_date={:?})",
            self.id, self.name, self.start_date
        )
    }
}

/// A task to be scheduled.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub project_id: String,
    #[pyo3(get, set)]
    pub name: String,
    /// Whole days. `None` leaves the task (and everything after it) unscheduled.
    #[pyo3(get, set)]
    pub duration_days: Option<u32>,
    /// Explicit start; a lower bound the forward pass never moves earlier.
    #[pyo3(get, set)]
    pub start_date: Option<NaiveDate>,
    /// Explicit (exclusive) end, used for resource spans.
    #[pyo3(get, set)]
    pub end_date: Option<NaiveDate>,
    #[pyo3(get, set)]
    pub parent_id: Option<String>,
    #[pyo3(get, set)]
    pub priority: Priority,
    #[pyo3(get, set)]
    pub percent_complete: u8,
    #[pyo3(get, set)]
    pub status: TaskStatus,
}

impl Task {
    /// Create a not-started, medium-priority task with a fixed duration.
    pub fn new(id: impl Into<String>, project_id: impl Into<String>, duration_days: u32) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            project_id: project_id.into(),
            duration_days: Some(duration_days),
            start_date: None,
            end_date: None,
            parent_id: None,
            priority: Priority::default(),
            percent_complete: 0,
            status: TaskStatus::default(),
        }
    }

    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }
}

#[pymethods]
impl Task {
    #[new]
    #[pyo3(signature = (
        id,
        project_id,
        name,
        duration_days=None,
        start_date=None,
        end_date=None,
        parent_id=None,
        priority=Priority::Medium,
        percent_complete=0,
        status=TaskStatus::NotStarted
    ))]
    #[allow(clippy::too_many_arguments)]
    fn py_new(
        id: String,
        project_id: String,
        name: String,
        duration_days: Option<u32>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        parent_id: Option<String>,
        priority: Priority,
        percent_complete: u8,
        status: TaskStatus,
    ) -> Self {
        Self {
            id,
            project_id,
            name,
            duration_days,
            start_date,
            end_date,
            parent_id,
            priority,
            percent_complete,
            status,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(id={:?}, duration_days={:?}, start_date={:?}, priority={:?})",
            self.id, self.duration_days, self.start_date, self.priority
        )
    }
}

/// A precedence edge between two tasks, with optional lag (negative = lead).
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    #[pyo3(get, set)]
    pub predecessor_id: String,
    #[pyo3(get, set)]
    pub successor_id: String,
    #[pyo3(get, set)]
    pub dependency_type: DependencyType,
    #[pyo3(get, set)]
    pub lag_days: i32,
}

impl Dependency {
    pub fn new(
        predecessor_id: impl Into<String>,
        successor_id: impl Into<String>,
        dependency_type: DependencyType,
        lag_days: i32,
    ) -> Self {
        Self {
            predecessor_id: predecessor_id.into(),
            successor_id: successor_id.into(),
            dependency_type,
            lag_days,
        }
    }

    /// Finish-to-start with no lag.
    pub fn finish_to_start(
        predecessor_id: impl Into<String>,
        successor_id: impl Into<String>,
    ) -> Self {
        Self::new(predecessor_id, successor_id, DependencyType::FinishToStart, 0)
    }
}

#[pymethods]
impl Dependency {
    #[new]
    #[pyo3(signature = (
        predecessor_id,
        successor_id,
        dependency_type=DependencyType::FinishToStart,
        lag_days=0
    ))]
    fn py_new(
        predecessor_id: String,
        successor_id: String,
        dependency_type: DependencyType,
        lag_days: i32,
    ) -> Self {
        Self::new(predecessor_id, successor_id, dependency_type, lag_days)
    }

    fn __repr__(&self) -> String {
        format!(
            "Dependency({:?} -> {:?}, type={:?}, lag_days={})",
            self.predecessor_id, self.successor_id, self.dependency_type, self.lag_days
        )
    }
}

/// A resource working on a task at some percentage of its capacity.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceAssignment {
    #[pyo3(get, set)]
    pub task_id: String,
    #[pyo3(get, set)]
    pub resource_id: String,
    /// Percent of the resource's day (100 = full time; may exceed 100).
    #[pyo3(get, set)]
    pub allocation_percent: f64,
    #[pyo3(get, set)]
    pub estimated_hours: Option<f64>,
    #[pyo3(get, set)]
    pub hourly_rate: f64,
}

impl ResourceAssignment {
    pub fn new(
        task_id: impl Into<String>,
        resource_id: impl Into<String>,
        allocation_percent: f64,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            resource_id: resource_id.into(),
            allocation_percent,
            estimated_hours: None,
            hourly_rate: 0.0,
        }
    }
}

#[pymethods]
impl ResourceAssignment {
    #[new]
    #[pyo3(signature = (
        task_id,
        resource_id,
        allocation_percent=100.0,
        estimated_hours=None,
        hourly_rate=0.0
    ))]
    fn py_new(
        task_id: String,
        resource_id: String,
        allocation_percent: f64,
        estimated_hours: Option<f64>,
        hourly_rate: f64,
    ) -> Self {
        Self {
            task_id,
            resource_id,
            allocation_percent,
            estimated_hours,
            hourly_rate,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "ResourceAssignment(task_id={:?}, resource_id={:?}, allocation_percent={})",
            self.task_id, self.resource_id, self.allocation_percent
        )
    }
}
