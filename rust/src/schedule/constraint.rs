//! Date arithmetic for dependency edges.
//!
//! Each [`DependencyType`] reads one end of the predecessor and bounds one end
//! of the successor. Both passes go through the two functions here so the
//! forward and backward mappings stay mirror images of each other.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::FinishConstraintMode;
use crate::models::DependencyType;

/// Which end of a task an edge reads or bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Finish,
}

/// A start/finish pair: (ES, EF) from the forward pass or (LS, LF) from the backward pass.
///
/// `finish` is exclusive: a task of `d` days spans `start .. start + d`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: NaiveDate,
    pub finish: NaiveDate,
}

impl Span {
    pub fn from_start(start: NaiveDate, duration_days: i64) -> Self {
        Self {
            start,
            finish: shift(start, duration_days),
        }
    }

    pub fn from_finish(finish: NaiveDate, duration_days: i64) -> Self {
        Self {
            start: shift(finish, -duration_days),
            finish,
        }
    }

    #[inline]
    pub fn at(&self, anchor: Anchor) -> NaiveDate {
        match anchor {
            Anchor::Start => self.start,
            Anchor::Finish => self.finish,
        }
    }
}

/// Add a signed number of days, saturating at the calendar limits.
pub fn shift(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days > 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

/// Signed whole days from `from` to `to`.
#[inline]
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

impl DependencyType {
    /// The predecessor end this edge reads.
    pub fn predecessor_anchor(self) -> Anchor {
        match self {
            DependencyType::FinishToStart | DependencyType::FinishToFinish => Anchor::Finish,
            DependencyType::StartToStart | DependencyType::StartToFinish => Anchor::Start,
        }
    }

    /// The successor end this edge bounds.
    pub fn successor_anchor(self, mode: FinishConstraintMode) -> Anchor {
        match (mode, self) {
            (FinishConstraintMode::Legacy, _) => Anchor::Start,
            (_, DependencyType::FinishToStart | DependencyType::StartToStart) => Anchor::Start,
            (_, DependencyType::FinishToFinish | DependencyType::StartToFinish) => Anchor::Finish,
        }
    }
}

/// The date an edge contributes from its predecessor: the anchored
/// predecessor date plus lag.
pub fn contributed_date(
    dependency_type: DependencyType,
    predecessor_es: NaiveDate,
    predecessor_ef: NaiveDate,
    lag_days: i64,
) -> NaiveDate {
    let anchor = Span {
        start: predecessor_es,
        finish: predecessor_ef,
    }
    .at(dependency_type.predecessor_anchor());
    shift(anchor, lag_days)
}

/// Lower bound an edge puts on its successor's start.
pub fn earliest_start_bound(
    dependency_type: DependencyType,
    lag_days: i64,
    predecessor: &Span,
    successor_duration: i64,
    mode: FinishConstraintMode,
) -> NaiveDate {
    let bound = contributed_date(dependency_type, predecessor.start, predecessor.finish, lag_days);
    match dependency_type.successor_anchor(mode) {
        Anchor::Start => bound,
        Anchor::Finish => shift(bound, -successor_duration),
    }
}

/// Upper bound an edge puts on its predecessor's finish, given the
/// successor's late span. Inverse of [`earliest_start_bound`].
pub fn latest_finish_bound(
    dependency_type: DependencyType,
    lag_days: i64,
    successor: &Span,
    predecessor_duration: i64,
    mode: FinishConstraintMode,
) -> NaiveDate {
    let anchor = shift(successor.at(dependency_type.successor_anchor(mode)), -lag_days);
    match dependency_type.predecessor_anchor() {
        Anchor::Finish => anchor,
        Anchor::Start => shift(anchor, predecessor_duration),
    }
}
