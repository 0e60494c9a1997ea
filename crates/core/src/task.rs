//! Task model - the unit of work tracked by the dashboard.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::activity::{Activity, Comment};
use crate::id::{TaskId, UserId};
use crate::Time;

/// A task on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Task title
    pub title: String,

    /// Detailed description
    pub description: String,

    /// Workflow state. Any status may follow any other.
    pub status: TaskStatus,

    /// Priority, absent on tasks that never had one set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,

    /// Assignee
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,

    /// Assignee's display name, captured when the assignment was made
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_name: Option<String>,

    /// Creator, fixed at creation
    pub created_by: UserId,

    /// Creation timestamp
    pub created_at: Time,

    /// Last update timestamp
    pub updated_at: Time,

    /// Due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Free-text tags; the first one is shown as a badge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,

    /// Percentage complete (0-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,

    /// Estimated effort in hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,

    /// Comments, oldest first
    #[serde(default)]
    pub comments: Vec<Comment>,

    /// Audit log, oldest first
    #[serde(default)]
    pub activities: Vec<Activity>,
}

impl Task {
    /// Create a pending task with only the required fields set.
    pub fn new(
        id: TaskId,
        title: impl Into<String>,
        description: impl Into<String>,
        created_by: UserId,
        now: Time,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            status: TaskStatus::Pending,
            priority: None,
            assigned_to: None,
            assigned_to_name: None,
            created_by,
            created_at: now,
            updated_at: now,
            due_date: None,
            categories: None,
            progress: None,
            estimated_hours: None,
            comments: Vec::new(),
            activities: Vec::new(),
        }
    }

    /// Priority as displayed: `Medium` when none was set.
    ///
    /// Aggregation counts the raw `priority` field and does not use this.
    pub fn display_priority(&self) -> TaskPriority {
        self.priority.unwrap_or_default()
    }

    /// First category, if any.
    pub fn primary_category(&self) -> Option<&str> {
        self.categories
            .as_ref()
            .and_then(|c| c.first())
            .map(String::as_str)
    }

    /// The instant the task falls due: midnight UTC of the due date.
    pub fn due_at(&self) -> Option<Time> {
        self.due_date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }

    /// Due strictly before `now` and not completed.
    pub fn is_overdue(&self, now: Time) -> bool {
        if self.status == TaskStatus::Completed {
            return false;
        }
        matches!(self.due_at(), Some(due) if due < now)
    }

    /// Whether `user` is the assignee or the creator.
    pub fn involves(&self, user: &UserId) -> bool {
        self.assigned_to.as_ref() == Some(user) || &self.created_by == user
    }
}

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Pending,
    /// Being worked on
    InProgress,
    /// Done
    Completed,
}

impl TaskStatus {
    /// Every status, in display order.
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Human label.
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(ParseError::new("status", s)),
        }
    }
}

/// Priority of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Low
    Low,
    /// Medium
    #[default]
    Medium,
    /// High
    High,
}

impl TaskPriority {
    /// Every priority, lowest first.
    pub const ALL: [TaskPriority; 3] = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(ParseError::new("priority", s)),
        }
    }
}

/// Error parsing an enum from its wire name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseError {
    kind: &'static str,
    value: String,
}

impl ParseError {
    /// Error for an unrecognised `value` of the given `kind`.
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// A partial update merged into an existing task.
///
/// `None` leaves a field alone. For optional task fields, `Some(None)` clears
/// the value. Identity, creator, creation time and history are not patchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New status
    pub status: Option<TaskStatus>,
    /// New or cleared priority
    pub priority: Option<Option<TaskPriority>>,
    /// New or cleared assignee
    pub assigned_to: Option<Option<UserId>>,
    /// New or cleared assignee name
    pub assigned_to_name: Option<Option<String>>,
    /// New or cleared due date
    pub due_date: Option<Option<NaiveDate>>,
    /// New or cleared categories
    pub categories: Option<Option<Vec<String>>>,
    /// New or cleared progress
    pub progress: Option<Option<u8>>,
    /// New or cleared estimate
    pub estimated_hours: Option<Option<f64>>,
}

impl TaskPatch {
    /// Patch that only changes status.
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Whether the patch sets nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the set fields into `task`. Does not touch `updated_at`.
    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(assigned_to) = self.assigned_to {
            task.assigned_to = assigned_to;
        }
        if let Some(name) = self.assigned_to_name {
            task.assigned_to_name = name;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(categories) = self.categories {
            task.categories = categories;
        }
        if let Some(progress) = self.progress {
            task.progress = progress;
        }
        if let Some(hours) = self.estimated_hours {
            task.estimated_hours = hours;
        }
    }
}

/// Filter for querying tasks. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    /// Exact status
    pub status: Option<TaskStatus>,

    /// Exact assignee; an empty id places no constraint
    pub assigned_to: Option<UserId>,

    /// Exact priority; tasks without a priority never match
    pub priority: Option<TaskPriority>,

    /// Case-insensitive substring of title, description or any category
    pub search_query: Option<String>,

    /// Start of the due-date window; ignored unless `due_date_to` is also set
    pub due_date_from: Option<NaiveDate>,

    /// End of the due-date window; ignored unless `due_date_from` is also set
    pub due_date_to: Option<NaiveDate>,
}

impl TaskFilter {
    /// Whether `task` satisfies every set field.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }

        if let Some(assignee) = self.assigned_to.as_ref().filter(|a| !a.as_str().is_empty()) {
            if task.assigned_to.as_ref() != Some(assignee) {
                return false;
            }
        }

        if let Some(priority) = self.priority {
            if task.priority != Some(priority) {
                return false;
            }
        }

        if let Some(query) = self.search_query.as_deref().filter(|q| !q.is_empty()) {
            let query = query.to_lowercase();
            let hit = task.title.to_lowercase().contains(&query)
                || task.description.to_lowercase().contains(&query)
                || task
                    .categories
                    .iter()
                    .flatten()
                    .any(|c| c.to_lowercase().contains(&query));
            if !hit {
                return false;
            }
        }

        if let (Some(from), Some(to)) = (self.due_date_from, self.due_date_to) {
            match task.due_date {
                Some(due) if due >= from && due <= to => {}
                _ => return false,
            }
        }

        true
    }
}
