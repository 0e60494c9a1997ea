//! Dashboard analytics
//!
//! Aggregate statistics, per-user team numbers, CSV export and the
//! visibility/pagination rules of the task list. Everything here is a pure
//! function of the task slice it is given.

#![warn(missing_docs)]

pub mod stats;
pub mod team;
pub mod export;
pub mod view;

pub use stats::{DashboardStats, PriorityCounts, StatusCounts};
pub use team::{team_stats, UserStats};
pub use export::{export_csv, export_file_name, CSV_HEADER};
pub use view::{can_manage, paginate, visible_tasks, AssignmentFilter, Page, TaskSummary};

/// Round half up to the nearest integer, for non-negative values.
pub(crate) fn round_half_up(value: f64) -> u32 {
    (value + 0.5).floor() as u32
}
