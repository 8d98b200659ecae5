//! Project scheduling engine.
//!
//! Builds a dependency graph from a project snapshot, computes earliest and
//! latest dates, derives float and the critical path, and levels resource
//! overloads. The Rust API lives in [`engine`]; the `rust` Python module
//! below wraps it.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::prelude::*;

mod config;
pub mod critical_path;
pub mod engine;
mod error;
pub mod graph;
pub mod leveling;
pub mod logging;
mod models;
pub mod schedule;

pub use config::{DanglingPolicy, FinishConstraintMode, LevelingConfig, SchedulingConfig};
pub use critical_path::{CriticalPathAnalysis, FloatRecord};
pub use engine::{
    analyze_critical_path, apply_schedule, compute_schedule, level_resources,
    level_resources_with, resource_utilization,
};
pub use error::{EntityKind, ScheduleError, UnscheduledTaskWarning, ValidationError};
pub use leveling::{
    AllocationDay, GreedyPriorityLeveling, LevelingResult, LevelingStrategy, OverloadEvent,
    ResourceUtilization, TaskAdjustment, TaskSpan,
};
pub use models::{
    Dependency, DependencyType, Priority, Project, ResourceAssignment, Task, TaskStatus,
};
pub use schedule::{ScheduleResult, TaskSchedule};

/// Python exception classes, all subclasses of `ValueError`.
pub mod exceptions {
    use pyo3::create_exception;
    use pyo3::exceptions::PyValueError;

    create_exception!(rust, NotFoundError, PyValueError, "A referenced task is missing.");
    create_exception!(rust, ValidationError, PyValueError, "The snapshot is structurally invalid.");
    create_exception!(rust, CircularDependencyError, PyValueError, "Dependencies form a cycle.");
}

impl From<ScheduleError> for PyErr {
    fn from(err: ScheduleError) -> Self {
        let message = err.to_string();
        match err {
            ScheduleError::NotFound { .. } => exceptions::NotFoundError::new_err(message),
            ScheduleError::Validation(_) => exceptions::ValidationError::new_err(message),
            ScheduleError::CircularDependency { .. } => {
                exceptions::CircularDependencyError::new_err(message)
            }
        }
    }
}

/// Compute earliest dates and critical flags for every task.
///
/// # Raises
/// * NotFoundError, ValidationError or CircularDependencyError for an invalid snapshot
#[pyfunction]
#[pyo3(name = "compute_schedule", signature = (project, tasks, dependencies, config=None))]
fn py_compute_schedule(
    project: Project,
    tasks: Vec<Task>,
    dependencies: Vec<Dependency>,
    config: Option<SchedulingConfig>,
) -> PyResult<ScheduleResult> {
    let config = config.unwrap_or_default();
    Ok(compute_schedule(&project, &tasks, &dependencies, &config)?)
}

/// Compute float for every task and partition tasks into critical and non-critical.
#[pyfunction]
#[pyo3(name = "analyze_critical_path", signature = (project, tasks, dependencies, config=None))]
fn py_analyze_critical_path(
    project: Project,
    tasks: Vec<Task>,
    dependencies: Vec<Dependency>,
    config: Option<SchedulingConfig>,
) -> PyResult<CriticalPathAnalysis> {
    let config = config.unwrap_or_default();
    Ok(analyze_critical_path(&project, &tasks, &dependencies, &config)?)
}

/// Level resource overloads.
///
/// # Returns
/// * (LevelingResult, tasks) where deferred tasks carry their new dates
#[pyfunction]
#[pyo3(name = "level_resources", signature = (project, tasks, assignments, config=None))]
fn py_level_resources(
    project: Project,
    mut tasks: Vec<Task>,
    assignments: Vec<ResourceAssignment>,
    config: Option<LevelingConfig>,
) -> PyResult<(LevelingResult, Vec<Task>)> {
    let config = config.unwrap_or_default();
    let result = level_resources(&project, &mut tasks, &assignments, &config)?;
    Ok((result, tasks))
}

/// Per-resource allocation timeline with hours and cost rollups.
#[pyfunction]
#[pyo3(name = "resource_utilization", signature = (project, tasks, assignments, config=None))]
fn py_resource_utilization(
    project: Project,
    tasks: Vec<Task>,
    assignments: Vec<ResourceAssignment>,
    config: Option<LevelingConfig>,
) -> PyResult<Vec<ResourceUtilization>> {
    let config = config.unwrap_or_default();
    Ok(resource_utilization(&project, &tasks, &assignments, &config)?)
}

/// Copy computed dates onto tasks so leveling starts from the schedule.
#[pyfunction]
#[pyo3(name = "apply_schedule")]
fn py_apply_schedule(mut tasks: Vec<Task>, schedule: ScheduleResult) -> Vec<Task> {
    apply_schedule(&mut tasks, &schedule);
    tasks
}

/// Send engine log output to stderr. Returns False if logging was already set up.
#[pyfunction]
#[pyo3(signature = (verbosity=1))]
fn enable_logging(verbosity: u8) -> bool {
    logging::init(verbosity)
}

/// The planline.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Model types
    m.add_class::<Project>()?;
    m.add_class::<Task>()?;
    m.add_class::<Dependency>()?;
    m.add_class::<ResourceAssignment>()?;
    m.add_class::<Priority>()?;
    m.add_class::<TaskStatus>()?;
    m.add_class::<DependencyType>()?;

    // Config types
    m.add_class::<SchedulingConfig>()?;
    m.add_class::<LevelingConfig>()?;
    m.add_class::<FinishConstraintMode>()?;
    m.add_class::<DanglingPolicy>()?;

    // Results
    m.add_class::<ScheduleResult>()?;
    m.add_class::<TaskSchedule>()?;
    m.add_class::<UnscheduledTaskWarning>()?;
    m.add_class::<CriticalPathAnalysis>()?;
    m.add_class::<FloatRecord>()?;
    m.add_class::<LevelingResult>()?;
    m.add_class::<TaskAdjustment>()?;
    m.add_class::<OverloadEvent>()?;
    m.add_class::<ResourceUtilization>()?;
    m.add_class::<AllocationDay>()?;

    // Errors
    let py = m.py();
    m.add("NotFoundError", py.get_type_bound::<exceptions::NotFoundError>())?;
    m.add("ValidationError", py.get_type_bound::<exceptions::ValidationError>())?;
    m.add(
        "CircularDependencyError",
        py.get_type_bound::<exceptions::CircularDependencyError>(),
    )?;

    // Operations
    m.add_function(wrap_pyfunction!(py_compute_schedule, m)?)?;
    m.add_function(wrap_pyfunction!(py_analyze_critical_path, m)?)?;
    m.add_function(wrap_pyfunction!(py_level_resources, m)?)?;
    m.add_function(wrap_pyfunction!(py_resource_utilization, m)?)?;
    m.add_function(wrap_pyfunction!(py_apply_schedule, m)?)?;
    m.add_function(wrap_pyfunction!(enable_logging, m)?)?;

    Ok(())
}
