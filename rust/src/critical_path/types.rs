//! Types for critical path analysis.

use chrono::NaiveDate;
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::UnscheduledTaskWarning;

/// Early/late dates and float for one task. All floats are whole days.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatRecord {
    #[pyo3(get)]
    pub task_id: String,
    #[pyo3(get)]
    pub earliest_start: NaiveDate,
    #[pyo3(get)]
    pub earliest_finish: NaiveDate,
    #[pyo3(get)]
    pub latest_start: NaiveDate,
    #[pyo3(get)]
    pub latest_finish: NaiveDate,
    /// LS - ES.
    #[pyo3(get)]
    pub total_float: i64,
    /// Delay absorbable without moving any successor's ES.
    #[pyo3(get)]
    pub free_float: i64,
    /// Delay absorbable even when every predecessor finishes late.
    #[pyo3(get)]
    pub independent_float: i64,
    #[pyo3(get)]
    pub is_critical: bool,
}

impl FloatRecord {
    /// Total float of zero (or below, which a consistent pass never produces).
    pub fn has_zero_float(total_float: i64) -> bool {
        total_float <= 0
    }
}

#[pymethods]
impl FloatRecord {
    fn __repr__(&self) -> String {
        format!(
            "FloatRecord(task_id={:?}, total={}, free={}, independent={})",
            self.task_id, self.total_float, self.free_float, self.independent_float
        )
    }
}

/// Output of `analyze_critical_path`.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalPathAnalysis {
    #[pyo3(get)]
    pub project_id: String,
    #[pyo3(get)]
    pub project_start: NaiveDate,
    #[pyo3(get)]
    pub project_end: NaiveDate,
    /// Tasks with zero total float, in topological order.
    #[pyo3(get)]
    pub critical_path_tasks: Vec<String>,
    /// Tasks with positive total float, in topological order.
    #[pyo3(get)]
    pub non_critical_tasks: Vec<String>,
    /// One record per scheduled task, in input order.
    #[pyo3(get)]
    pub float_analysis: Vec<FloatRecord>,
    /// Every zero-float chain from a chain start to a chain end.
    #[pyo3(get)]
    pub critical_chains: Vec<Vec<String>>,
    #[pyo3(get)]
    pub unscheduled: Vec<UnscheduledTaskWarning>,
}

impl CriticalPathAnalysis {
    pub fn float(&self, task_id: &str) -> Option<&FloatRecord> {
        self.float_analysis.iter().find(|r| r.task_id == task_id)
    }

    pub fn is_critical(&self, task_id: &str) -> bool {
        self.critical_path_tasks.iter().any(|id| id == task_id)
    }
}

#[pymethods]
impl CriticalPathAnalysis {
    #[pyo3(name = "float")]
    fn py_float(&self, task_id: &str) -> Option<FloatRecord> {
        self.float(task_id).cloned()
    }

    fn __repr__(&self) -> String {
        format!(
            "CriticalPathAnalysis(critical={}, non_critical={}, chains={})",
            self.critical_path_tasks.len(),
            self.non_critical_tasks.len(),
            self.critical_chains.len()
        )
    }
}
