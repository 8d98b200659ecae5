//! Configuration types for the scheduling engine.

use chrono::NaiveDate;
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// How FinishToFinish and StartToFinish edges bound their successor.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishConstraintMode {
    /// The edge bounds the successor's finish: ES >= bound - duration.
    #[default]
    Corrected,
    /// The edge bound is used as a floor on the successor's start, like
    /// FinishToStart. Kept for compatibility with schedules produced that way.
    Legacy,
}

/// What to do with a dependency endpoint or parent id missing from the snapshot.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DanglingPolicy {
    /// Fail with `NotFound`.
    #[default]
    Reject,
    /// Drop the edge (or treat the task as a root) and log it.
    Ignore,
}

/// Configuration for graph building and the forward/backward passes.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
    /// Stand-in for "today" when the project has no start date.
    #[pyo3(get, set)]
    pub today: Option<NaiveDate>,
    #[pyo3(get, set)]
    pub finish_constraints: FinishConstraintMode,
    #[pyo3(get, set)]
    pub dangling_references: DanglingPolicy,
    /// Upper bound on the number of critical chains enumerated.
    #[pyo3(get, set)]
    pub max_critical_chains: usize,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            today: None,
            finish_constraints: FinishConstraintMode::default(),
            dangling_references: DanglingPolicy::default(),
            max_critical_chains: 64,
        }
    }
}

impl SchedulingConfig {
    /// The date used when a project carries no start date.
    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

#[pymethods]
impl SchedulingConfig {
    #[new]
    #[pyo3(signature = (
        verbosity=None,
        today=None,
        finish_constraints=None,
        dangling_references=None,
        max_critical_chains=None
    ))]
    fn new(
        verbosity: Option<u8>,
        today: Option<NaiveDate>,
        finish_constraints: Option<FinishConstraintMode>,
        dangling_references: Option<DanglingPolicy>,
        max_critical_chains: Option<usize>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            verbosity: verbosity.unwrap_or(defaults.verbosity),
            today,
            finish_constraints: finish_constraints.unwrap_or(defaults.finish_constraints),
            dangling_references: dangling_references.unwrap_or(defaults.dangling_references),
            max_critical_chains: max_critical_chains.unwrap_or(defaults.max_critical_chains),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "SchedulingConfig(finish_constraints={:?}, dangling_references={:?}, today={:?})",
            self.finish_constraints, self.dangling_references, self.today
        )
    }
}

/// Configuration for resource allocation and leveling.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelingConfig {
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
    /// Allocation a resource can carry per day before it is overloaded.
    #[pyo3(get, set)]
    pub capacity_percent: f64,
    /// Percentage points of overload that cost one day of delay.
    #[pyo3(get, set)]
    pub percent_per_delay_day: f64,
    /// Hard stop on the number of task deferrals in one run.
    #[pyo3(get, set)]
    pub max_adjustments: usize,
    /// Stand-in for "today" when the project has no start date.
    #[pyo3(get, set)]
    pub today: Option<NaiveDate>,
}

impl Default for LevelingConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            capacity_percent: 100.0,
            percent_per_delay_day: 50.0,
            max_adjustments: 10_000,
            today: None,
        }
    }
}

impl LevelingConfig {
    /// Reject values the leveling arithmetic cannot work with.
    ///
    /// `capacity_percent` must be finite and non-negative;
    /// `percent_per_delay_day` must be finite and positive.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.capacity_percent.is_finite() || self.capacity_percent < 0.0 {
            return Err(ValidationError::InvalidConfig {
                field: "capacity_percent",
                value: self.capacity_percent,
            });
        }
        if !self.percent_per_delay_day.is_finite() || self.percent_per_delay_day <= 0.0 {
            return Err(ValidationError::InvalidConfig {
                field: "percent_per_delay_day",
                value: self.percent_per_delay_day,
            });
        }
        Ok(())
    }

    /// Days of delay for a given overload: `ceil(excess / percent_per_delay_day)`, at least 1.
    pub fn delay_for_excess(&self, excess_percent: f64) -> i64 {
        let days = (excess_percent / self.percent_per_delay_day).ceil() as i64;
        days.max(1)
    }

    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

#[pymethods]
impl LevelingConfig {
    #[new]
    #[pyo3(signature = (
        verbosity=None,
        capacity_percent=None,
        percent_per_delay_day=None,
        max_adjustments=None,
        today=None
    ))]
    fn new(
        verbosity: Option<u8>,
        capacity_percent: Option<f64>,
        percent_per_delay_day: Option<f64>,
        max_adjustments: Option<usize>,
        today: Option<NaiveDate>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            verbosity: verbosity.unwrap_or(defaults.verbosity),
            capacity_percent: capacity_percent.unwrap_or(defaults.capacity_percent),
            percent_per_delay_day: percent_per_delay_day.unwrap_or(defaults.percent_per_delay_day),
            max_adjustments: max_adjustments.unwrap_or(defaults.max_adjustments),
            today,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "LevelingConfig(capacity_percent={}, percent_per_delay_day={}, max_adjustments={})",
            self.capacity_percent, self.percent_per_delay_day, self.max_adjustments
        )
    }
}
