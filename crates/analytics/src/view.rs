//! Visibility, assignment filtering and pagination for the task list.

use serde::Serialize;
use taskdash_core::{CurrentUser, Task, TaskStatus};

/// Tasks `user` may see: everything for admins, otherwise only tasks they
/// are assigned to or created.
pub fn visible_tasks(tasks: Vec<Task>, user: &CurrentUser) -> Vec<Task> {
    if user.is_admin() {
        return tasks;
    }
    tasks.into_iter().filter(|t| t.involves(&user.id)).collect()
}

/// Whether `user` may edit, delete or change the status of `task`.
pub fn can_manage(task: &Task, user: &CurrentUser) -> bool {
    user.is_admin() || task.involves(&user.id)
}

/// The assignment dropdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssignmentFilter {
    /// No constraint
    #[default]
    All,
    /// Only tasks with an assignee
    Assigned,
    /// Only tasks without an assignee
    Unassigned,
}

impl AssignmentFilter {
    /// Whether `task` passes.
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            AssignmentFilter::All => true,
            AssignmentFilter::Assigned => task.assigned_to.is_some(),
            AssignmentFilter::Unassigned => task.assigned_to.is_none(),
        }
    }

    /// Keep only the tasks that pass, preserving order.
    pub fn apply(&self, tasks: Vec<Task>) -> Vec<Task> {
        tasks.into_iter().filter(|t| self.matches(t)).collect()
    }
}

impl std::str::FromStr for AssignmentFilter {
    type Err = taskdash_core::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(AssignmentFilter::All),
            "assigned" => Ok(AssignmentFilter::Assigned),
            "unassigned" => Ok(AssignmentFilter::Unassigned),
            _ => Err(taskdash_core::ParseError::new("assignment", s)),
        }
    }
}

/// Header counts above the task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    /// Tasks in view
    pub total: usize,
    /// Pending
    pub pending: usize,
    /// In progress
    pub in_progress: usize,
    /// Completed
    pub completed: usize,
}

impl TaskSummary {
    /// Count `tasks`.
    pub fn of(tasks: &[Task]) -> Self {
        let count = |s: TaskStatus| tasks.iter().filter(|t| t.status == s).count();
        Self {
            total: tasks.len(),
            pending: count(TaskStatus::Pending),
            in_progress: count(TaskStatus::InProgress),
            completed: count(TaskStatus::Completed),
        }
    }
}

/// One page of the task list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    /// Tasks on this page
    pub items: &'a [Task],
    /// 1-based page number actually shown
    pub number: usize,
    /// Number of pages, 0 for an empty list
    pub total_pages: usize,
}

/// Slice out page `page` (1-based) of `page_size` tasks.
///
/// The page number is clamped into range; a zero page size is treated as 1.
pub fn paginate(tasks: &[Task], page: usize, page_size: usize) -> Page<'_> {
    let size = page_size.max(1);
    let total_pages = tasks.len().div_ceil(size);
    let number = page.clamp(1, total_pages.max(1));

    let start = ((number - 1) * size).min(tasks.len());
    let end = (start + size).min(tasks.len());

    Page {
        items: &tasks[start..end],
        number,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdash_core::{TaskId, UserId, UserRole};

    fn create_test_task(id: &str, creator: &str, assignee: Option<&str>) -> Task {
        let mut task = Task::new(
            TaskId::from(id),
            format!("Task {}", id),
            "Test task",
            UserId::from(creator),
            chrono::Utc::now(),
        );
        task.assigned_to = assignee.map(UserId::from);
        task
    }

    fn user(id: &str, role: UserRole) -> CurrentUser {
        CurrentUser {
            id: UserId::from(id),
            name: format!("User {}", id),
            role,
        }
    }

    fn tasks() -> Vec<Task> {
        vec![
            create_test_task("1", "1", Some("2")),
            create_test_task("2", "1", Some("3")),
            create_test_task("3", "1", None),
            create_test_task("4", "2", None),
        ]
    }

    #[test]
    fn test_visibility() {
        let all = visible_tasks(tasks(), &user("1", UserRole::Admin));
        assert_eq!(all.len(), 4);

        let john = user("2", UserRole::User);
        let mine: Vec<_> = visible_tasks(tasks(), &john)
            .into_iter()
            .map(|t| t.id.to_string())
            .collect();
        assert_eq!(mine, vec!["1", "4"]);

        let list = tasks();
        assert!(can_manage(&list[0], &john));
        assert!(!can_manage(&list[1], &john));
        assert!(can_manage(&list[1], &user("1", UserRole::Admin)));
    }

    #[test]
    fn test_assignment_filter() {
        assert_eq!(AssignmentFilter::Assigned.apply(tasks()).len(), 2);
        assert_eq!(AssignmentFilter::Unassigned.apply(tasks()).len(), 2);
        assert_eq!(AssignmentFilter::All.apply(tasks()).len(), 4);
        assert_eq!("Unassigned".parse::<AssignmentFilter>().unwrap(), AssignmentFilter::Unassigned);
        assert!("mine".parse::<AssignmentFilter>().is_err());
    }

    #[test]
    fn test_pagination() {
        let list: Vec<Task> = (1..=13)
            .map(|i| create_test_task(&i.to_string(), "1", None))
            .collect();

        let first = paginate(&list, 1, 6);
        assert_eq!(first.items.len(), 6);
        assert_eq!(first.total_pages, 3);

        let last = paginate(&list, 3, 6);
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].id, TaskId::from("13"));

        let clamped = paginate(&list, 99, 6);
        assert_eq!(clamped.number, 3);
        let clamped = paginate(&list, 0, 6);
        assert_eq!(clamped.number, 1);

        let empty = paginate(&[], 2, 6);
        assert!(empty.items.is_empty());
        assert_eq!(empty.number, 1);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_summary() {
        let mut list = tasks();
        list[0].status = TaskStatus::InProgress;
        list[1].status = TaskStatus::Completed;
        let summary = TaskSummary::of(&list);
        assert_eq!(
            summary,
            TaskSummary {
                total: 4,
                pending: 2,
                in_progress: 1,
                completed: 1,
            }
        );
    }
}
