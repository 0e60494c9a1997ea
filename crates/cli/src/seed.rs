//! Demo users and tasks loaded at session start.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use taskdash_core::{Task, TaskId, TaskPriority, TaskStatus, User, UserId, UserRole};

fn date(s: &str) -> Result<NaiveDate> {
    Ok(s.parse()?)
}

fn ts(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

#[allow(clippy::too_many_arguments)]
fn user(
    id: &str,
    email: &str,
    name: &str,
    role: UserRole,
    password: &str,
    avatar: &str,
    department: &str,
    joined: &str,
) -> Result<User> {
    let mut user = User::new(id, email, name, role);
    user.password = Some(password.to_string());
    user.avatar = Some(avatar.to_string());
    user.department = Some(department.to_string());
    user.join_date = Some(date(joined)?);
    Ok(user)
}

/// The built-in user list.
pub fn demo_users() -> Result<Vec<User>> {
    Ok(vec![
        user("1", "admin@example.com", "Admin User", UserRole::Admin, "admin123", "👨‍💼", "Management", "2024-01-01")?,
        user("2", "user@example.com", "John Doe", UserRole::User, "user123", "👨‍💻", "Development", "2024-01-10")?,
        user("3", "user2@example.com", "Jane Smith", UserRole::User, "user123", "👩‍💻", "Design", "2024-01-12")?,
    ])
}

struct Seed<'a> {
    id: &'a str,
    title: &'a str,
    description: &'a str,
    status: TaskStatus,
    priority: TaskPriority,
    assignee: Option<(&'a str, &'a str)>,
    created_at: &'a str,
    updated_at: &'a str,
    due: &'a str,
    categories: &'a [&'a str],
    progress: u8,
    hours: f64,
}

impl Seed<'_> {
    fn build(&self) -> Result<Task> {
        let mut task = Task::new(
            TaskId::from(self.id),
            self.title,
            self.description,
            UserId::from("1"),
            ts(self.created_at)?,
        );
        task.status = self.status;
        task.priority = Some(self.priority);
        if let Some((id, name)) = self.assignee {
            task.assigned_to = Some(UserId::from(id));
            task.assigned_to_name = Some(name.to_string());
        }
        task.updated_at = ts(self.updated_at)?;
        task.due_date = Some(date(self.due)?);
        task.categories = Some(self.categories.iter().map(|c| c.to_string()).collect());
        task.progress = Some(self.progress);
        task.estimated_hours = Some(self.hours);
        Ok(task)
    }
}

/// The built-in task list, all created by the admin.
pub fn demo_tasks() -> Result<Vec<Task>> {
    let seeds = [
        Seed {
            id: "1",
            title: "Design new dashboard",
            description: "Create a modern dashboard UI with charts and analytics",
            status: TaskStatus::InProgress,
            priority: TaskPriority::High,
            assignee: Some(("2", "John Doe")),
            created_at: "2024-01-15T10:00:00Z",
            updated_at: "2024-01-20T14:30:00Z",
            due: "2024-01-25",
            categories: &["UI/UX", "Frontend"],
            progress: 65,
            hours: 40.0,
        },
        Seed {
            id: "2",
            title: "Fix login bug",
            description: "Users cannot login with special characters in password",
            status: TaskStatus::Pending,
            priority: TaskPriority::High,
            assignee: Some(("3", "Jane Smith")),
            created_at: "2024-01-18T09:00:00Z",
            updated_at: "2024-01-18T09:00:00Z",
            due: "2024-01-22",
            categories: &["Backend", "Bug Fix"],
            progress: 0,
            hours: 8.0,
        },
        Seed {
            id: "3",
            title: "Write API documentation",
            description: "Document all REST API endpoints with examples",
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            assignee: None,
            created_at: "2024-01-19T11:00:00Z",
            updated_at: "2024-01-19T11:00:00Z",
            due: "2024-01-28",
            categories: &["Documentation"],
            progress: 0,
            hours: 20.0,
        },
        Seed {
            id: "4",
            title: "Refactor authentication module",
            description: "Improve code quality and add better error handling",
            status: TaskStatus::Completed,
            priority: TaskPriority::Medium,
            assignee: Some(("2", "John Doe")),
            created_at: "2024-01-10T08:00:00Z",
            updated_at: "2024-01-18T16:00:00Z",
            due: "2024-01-20",
            categories: &["Backend", "Refactoring"],
            progress: 100,
            hours: 16.0,
        },
        Seed {
            id: "5",
            title: "Setup CI/CD pipeline",
            description: "Configure GitHub Actions for automated testing and deployment",
            status: TaskStatus::InProgress,
            priority: TaskPriority::High,
            assignee: Some(("2", "John Doe")),
            created_at: "2024-01-16T08:00:00Z",
            updated_at: "2024-01-21T10:00:00Z",
            due: "2024-01-26",
            categories: &["DevOps", "Infrastructure"],
            progress: 45,
            hours: 12.0,
        },
        Seed {
            id: "6",
            title: "Database optimization",
            description: "Add indexes and optimize slow queries",
            status: TaskStatus::Pending,
            priority: TaskPriority::Low,
            assignee: None,
            created_at: "2024-01-17T14:00:00Z",
            updated_at: "2024-01-17T14:00:00Z",
            due: "2024-02-01",
            categories: &["Backend", "Performance"],
            progress: 0,
            hours: 24.0,
        },
    ];

    seeds.iter().map(Seed::build).collect()
}
