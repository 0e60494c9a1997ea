//! Aggregate dashboard statistics.

use chrono::Duration;
use serde::Serialize;
use taskdash_core::{Task, TaskPriority, TaskStatus, Time};

use crate::round_half_up;

/// Task counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Pending tasks
    pub pending: usize,
    /// In-progress tasks
    pub in_progress: usize,
    /// Completed tasks
    pub completed: usize,
}

impl StatusCounts {
    /// Count of tasks with `status`.
    pub fn get(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Pending => self.pending,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Completed => self.completed,
        }
    }

    fn bump(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Pending => self.pending += 1,
            TaskStatus::InProgress => self.in_progress += 1,
            TaskStatus::Completed => self.completed += 1,
        }
    }
}

/// Task counts per explicitly set priority.
///
/// Tasks without a priority are not counted anywhere, unlike the display
/// default of medium.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    /// Low-priority tasks
    pub low: usize,
    /// Medium-priority tasks
    pub medium: usize,
    /// High-priority tasks
    pub high: usize,
}

impl PriorityCounts {
    /// Count of tasks with `priority`.
    pub fn get(&self, priority: TaskPriority) -> usize {
        match priority {
            TaskPriority::Low => self.low,
            TaskPriority::Medium => self.medium,
            TaskPriority::High => self.high,
        }
    }
}

/// Metrics shown on the analytics tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Tasks per status
    pub status_counts: StatusCounts,
    /// Tasks per explicit priority
    pub priority_counts: PriorityCounts,
    /// Sum of estimates, absent counted as 0
    pub total_hours: f64,
    /// Sum of estimates over completed tasks
    pub completed_hours: f64,
    /// Mean progress, absent counted as 0, rounded
    pub avg_progress: u32,
    /// Open tasks due strictly before now
    pub overdue_tasks: usize,
    /// Open tasks due within the next seven days, both ends inclusive
    pub due_this_week: usize,
    /// Number of input tasks
    pub total_tasks: usize,
    /// Completed share in percent, rounded
    pub completion_rate: u32,
}

impl DashboardStats {
    /// Compute every metric over `tasks` as of `now`.
    pub fn compute(tasks: &[Task], now: Time) -> Self {
        let week_end = now + Duration::days(7);

        let mut status_counts = StatusCounts::default();
        let mut priority_counts = PriorityCounts::default();
        let mut total_hours = 0.0;
        let mut completed_hours = 0.0;
        let mut progress_sum: u64 = 0;
        let mut overdue_tasks = 0;
        let mut due_this_week = 0;

        for task in tasks {
            status_counts.bump(task.status);

            match task.priority {
                Some(TaskPriority::Low) => priority_counts.low += 1,
                Some(TaskPriority::Medium) => priority_counts.medium += 1,
                Some(TaskPriority::High) => priority_counts.high += 1,
                None => {}
            }

            let hours = task.estimated_hours.unwrap_or(0.0);
            total_hours += hours;
            if task.status == TaskStatus::Completed {
                completed_hours += hours;
            }

            progress_sum += u64::from(task.progress.unwrap_or(0));

            if task.status != TaskStatus::Completed {
                if let Some(due) = task.due_at() {
                    if due < now {
                        overdue_tasks += 1;
                    }
                    if due >= now && due <= week_end {
                        due_this_week += 1;
                    }
                }
            }
        }

        let total_tasks = tasks.len();
        let (avg_progress, completion_rate) = if total_tasks == 0 {
            (0, 0)
        } else {
            let n = total_tasks as f64;
            (
                round_half_up(progress_sum as f64 / n),
                round_half_up(status_counts.completed as f64 / n * 100.0),
            )
        };

        Self {
            status_counts,
            priority_counts,
            total_hours,
            completed_hours,
            avg_progress,
            overdue_tasks,
            due_this_week,
            total_tasks,
            completion_rate,
        }
    }
}
