//! Error types for the scheduling engine.
//!
//! Every failure is local to one project's calculation and aborts it before
//! any date math runs. Unschedulable tasks are not errors: they come back as
//! [`UnscheduledTaskWarning`]s inside the result.

use pyo3::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What kind of entity a [`ScheduleError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Task,
    DependencyEndpoint,
    ParentTask,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Task => write!(f, "Task"),
            EntityKind::DependencyEndpoint => write!(f, "Dependency endpoint task"),
            EntityKind::ParentTask => write!(f, "Parent task"),
        }
    }
}

/// Structural problems in the supplied snapshot.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Task {0} cannot depend on itself")]
    SelfDependency(String),
    #[error("Dependency {predecessor} -> {successor} crosses projects ({predecessor_project} vs {successor_project})")]
    CrossProject {
        predecessor: String,
        successor: String,
        predecessor_project: String,
        successor_project: String,
    },
    #[error("Task {0} is its own ancestor")]
    OwnAncestor(String),
    #[error("Duplicate task id: {0}")]
    DuplicateTask(String),
    #[error("Task {task_id} has percent complete {value}, expected 0-100")]
    PercentComplete { task_id: String, value: u8 },
    #[error("Task {0} ends before it starts")]
    InvalidSpan(String),
    #[error("Task {task_id} belongs to project {task_project}, not {project}")]
    ForeignTask {
        task_id: String,
        task_project: String,
        project: String,
    },
    #[error("Allocation {value} of {resource_id} on {task_id} must be finite and >= 0")]
    InvalidAllocation {
        task_id: String,
        resource_id: String,
        value: f64,
    },
    #[error("Leveling config {field} = {value} is out of range")]
    InvalidConfig { field: &'static str, value: f64 },
}

/// Errors that abort a scheduling calculation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Circular dependency detected: {predecessor} -> {successor} closes cycle {cycle:?}")]
    CircularDependency {
        predecessor: String,
        successor: String,
        cycle: Vec<String>,
    },
}

impl ScheduleError {
    pub(crate) fn not_found(kind: EntityKind, id: &str) -> Self {
        ScheduleError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// A task the forward pass could not place on the timeline.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnscheduledTaskWarning {
    #[pyo3(get)]
    pub task_id: String,
    #[pyo3(get)]
    pub reason: String,
    /// The unscheduled predecessor that blocked this task, if any.
    #[pyo3(get)]
    pub blocked_by: Option<String>,
}

impl UnscheduledTaskWarning {
    pub(crate) fn missing_duration(task_id: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            reason: "task has no duration".to_string(),
            blocked_by: None,
        }
    }

    pub(crate) fn blocked(task_id: &str, predecessor: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            reason: format!("predecessor {} could not be scheduled", predecessor),
            blocked_by: Some(predecessor.to_string()),
        }
    }
}

#[pymethods]
impl UnscheduledTaskWarning {
    fn __repr__(&self) -> String {
        format!(
            "UnscheduledTaskWarning(task_id={:?}, reason={:?})",
            self.task_id, self.reason
        )
    }
}
