//! Forward and backward scheduling passes.

mod backward;
mod constraint;
mod forward;
mod types;

pub use backward::{backward_pass, BackwardPass};
pub use constraint::{
    contributed_date, days_between, earliest_start_bound, latest_finish_bound, shift, Anchor,
    Span,
};
pub use forward::{forward_pass, ForwardPass};
pub use types::{ScheduleResult, TaskSchedule};
