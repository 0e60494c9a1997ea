//! Per-user numbers for the team view.

use serde::Serialize;
use taskdash_core::{Task, TaskStatus, User, UserDirectory, UserId};

use crate::round_half_up;

/// Task numbers for one team member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    /// The member
    pub user_id: UserId,
    /// Tasks assigned to or created by the member
    pub total: usize,
    /// Tasks assigned to the member
    pub assigned: usize,
    /// Assigned tasks that are completed
    pub completed: usize,
    /// `completed / assigned` in percent, 0 with nothing assigned
    pub completion_rate: u32,
}

impl UserStats {
    /// Compute the numbers for `user_id` over `tasks`.
    pub fn for_user(user_id: &UserId, tasks: &[Task]) -> Self {
        let total = tasks.iter().filter(|t| t.involves(user_id)).count();
        let assigned: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.assigned_to.as_ref() == Some(user_id))
            .collect();
        let completed = assigned
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();

        let completion_rate = if assigned.is_empty() {
            0
        } else {
            round_half_up(completed as f64 / assigned.len() as f64 * 100.0)
        };

        Self {
            user_id: user_id.clone(),
            total,
            assigned: assigned.len(),
            completed,
            completion_rate,
        }
    }
}

/// Numbers for every user in the directory, in directory order.
pub fn team_stats<'a>(users: &'a UserDirectory, tasks: &[Task]) -> Vec<(&'a User, UserStats)> {
    users
        .all()
        .iter()
        .map(|u| (u, UserStats::for_user(&u.id, tasks)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdash_core::{TaskId, UserRole};

    fn create_test_task(id: &str, creator: &str, assignee: Option<&str>, status: TaskStatus) -> Task {
        let mut task = Task::new(
            TaskId::from(id),
            format!("Task {}", id),
            "Test task",
            UserId::from(creator),
            chrono::Utc::now(),
        );
        task.assigned_to = assignee.map(UserId::from);
        task.status = status;
        task
    }

    #[test]
    fn test_user_stats() {
        let tasks = vec![
            create_test_task("1", "1", Some("2"), TaskStatus::InProgress),
            create_test_task("2", "1", Some("2"), TaskStatus::Completed),
            create_test_task("3", "2", None, TaskStatus::Pending),
            create_test_task("4", "1", Some("3"), TaskStatus::Completed),
            create_test_task("5", "1", Some("2"), TaskStatus::Pending),
        ];

        let john = UserStats::for_user(&UserId::from("2"), &tasks);
        assert_eq!(john.total, 4);
        assert_eq!(john.assigned, 3);
        assert_eq!(john.completed, 1);
        assert_eq!(john.completion_rate, 33);

        let admin = UserStats::for_user(&UserId::from("1"), &tasks);
        assert_eq!(admin.total, 4);
        assert_eq!(admin.assigned, 0);
        assert_eq!(admin.completion_rate, 0);
    }

    #[test]
    fn test_team_stats_covers_every_user() {
        let users = UserDirectory::new(vec![
            User::new("1", "admin@example.com", "Admin User", UserRole::Admin),
            User::new("3", "user2@example.com", "Jane Smith", UserRole::User),
        ]);
        let tasks = vec![create_test_task("1", "1", Some("3"), TaskStatus::Completed)];

        let stats = team_stats(&users, &tasks);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[1].0.name, "Jane Smith");
        assert_eq!(stats[1].1.completion_rate, 100);
    }
}
