//! Form-boundary input and its validation.
//!
//! Validation happens here, before anything reaches the store.

use chrono::NaiveDate;

use crate::id::{TaskId, UserId};
use crate::task::{Task, TaskPatch, TaskPriority, TaskStatus};
use crate::user::{CurrentUser, UserDirectory};
use crate::Time;

/// Error type for rejected form input.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Reasons a task or comment form is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Title is blank
    #[error("Title is required")]
    EmptyTitle,

    /// Description is blank
    #[error("Description is required")]
    EmptyDescription,

    /// Comment body is blank
    #[error("Comment cannot be empty")]
    EmptyComment,

    /// Progress above 100
    #[error("Progress must be between 0 and 100, got {0}")]
    ProgressOutOfRange(u8),

    /// Negative or non-finite estimate
    #[error("Estimated hours must be a non-negative number, got {0}")]
    InvalidHours(f64),
}

/// The fields of the new/edit task form.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Status
    pub status: TaskStatus,
    /// Priority
    pub priority: TaskPriority,
    /// Assignee
    pub assigned_to: Option<UserId>,
    /// Due date
    pub due_date: Option<NaiveDate>,
    /// Selected categories, in the order they were picked
    pub categories: Vec<String>,
    /// Estimate in hours
    pub estimated_hours: Option<f64>,
    /// Progress percentage
    pub progress: Option<u8>,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            assigned_to: None,
            due_date: None,
            categories: Vec::new(),
            estimated_hours: None,
            progress: None,
        }
    }
}

impl TaskDraft {
    /// Draft with a title and description and the form defaults elsewhere.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Check the draft. The first failing rule wins, in form order.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if let Some(p) = self.progress {
            if p > 100 {
                return Err(ValidationError::ProgressOutOfRange(p));
            }
        }
        if let Some(h) = self.estimated_hours {
            if !h.is_finite() || h < 0.0 {
                return Err(ValidationError::InvalidHours(h));
            }
        }
        Ok(())
    }

    /// Validate and build a new task created by `creator`.
    ///
    /// The assignee's name is looked up once and stored on the task.
    pub fn into_task(
        self,
        id: TaskId,
        creator: &CurrentUser,
        users: &UserDirectory,
        now: Time,
    ) -> Result<Task> {
        self.validate()?;
        let assigned_to_name = self
            .assigned_to
            .as_ref()
            .and_then(|id| users.name_of(id))
            .map(str::to_string);

        let mut task = Task::new(id, self.title, self.description, creator.id.clone(), now);
        task.status = self.status;
        task.priority = Some(self.priority);
        task.assigned_to = self.assigned_to;
        task.assigned_to_name = assigned_to_name;
        task.due_date = self.due_date;
        task.categories = non_empty(self.categories);
        task.estimated_hours = self.estimated_hours;
        task.progress = Some(self.progress.unwrap_or(0));
        Ok(task)
    }

    /// Validate and turn an edit into a patch that replaces every form field.
    pub fn into_patch(self, users: &UserDirectory) -> Result<TaskPatch> {
        self.validate()?;
        let assigned_to_name = self
            .assigned_to
            .as_ref()
            .and_then(|id| users.name_of(id))
            .map(str::to_string);

        Ok(TaskPatch {
            title: Some(self.title),
            description: Some(self.description),
            status: Some(self.status),
            priority: Some(Some(self.priority)),
            assigned_to: Some(self.assigned_to),
            assigned_to_name: Some(assigned_to_name),
            due_date: Some(self.due_date),
            categories: Some(non_empty(self.categories)),
            progress: Some(Some(self.progress.unwrap_or(0))),
            estimated_hours: Some(self.estimated_hours),
        })
    }
}

impl From<&Task> for TaskDraft {
    /// Pre-fill the edit form from an existing task.
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.display_priority(),
            assigned_to: task.assigned_to.clone(),
            due_date: task.due_date,
            categories: task.categories.clone().unwrap_or_default(),
            estimated_hours: task.estimated_hours,
            progress: task.progress,
        }
    }
}

/// Reject a blank comment body.
pub fn validate_comment(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyComment);
    }
    Ok(())
}

fn non_empty(categories: Vec<String>) -> Option<Vec<String>> {
    if categories.is_empty() {
        None
    } else {
        Some(categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{User, UserRole};

    fn users() -> UserDirectory {
        UserDirectory::new(vec![
            User::new("1", "admin@example.com", "Admin User", UserRole::Admin),
            User::new("2", "user@example.com", "John Doe", UserRole::User),
        ])
    }

    fn admin() -> CurrentUser {
        CurrentUser {
            id: UserId::from("1"),
            name: "Admin User".to_string(),
            role: UserRole::Admin,
        }
    }

    #[test]
    fn test_blank_fields_rejected_in_form_order() {
        let draft = TaskDraft::new("   ", "");
        assert_eq!(draft.validate(), Err(ValidationError::EmptyTitle));

        let draft = TaskDraft::new("Title", " \n");
        assert_eq!(draft.validate(), Err(ValidationError::EmptyDescription));
        assert_eq!(
            ValidationError::EmptyDescription.to_string(),
            "Description is required"
        );
    }

    #[test]
    fn test_numeric_ranges() {
        let mut draft = TaskDraft::new("T", "D");
        draft.progress = Some(101);
        assert_eq!(draft.validate(), Err(ValidationError::ProgressOutOfRange(101)));

        draft.progress = Some(100);
        draft.estimated_hours = Some(-1.0);
        assert_eq!(draft.validate(), Err(ValidationError::InvalidHours(-1.0)));

        draft.estimated_hours = Some(0.0);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_into_task_stamps_creator_and_assignee_name() {
        let now = chrono::Utc::now();
        let mut draft = TaskDraft::new("Fix login bug", "Special characters");
        draft.assigned_to = Some(UserId::from("2"));
        draft.priority = TaskPriority::High;

        let task = draft
            .into_task(TaskId::from("task-1"), &admin(), &users(), now)
            .unwrap();
        assert_eq!(task.created_by, UserId::from("1"));
        assert_eq!(task.assigned_to_name.as_deref(), Some("John Doe"));
        assert_eq!(task.priority, Some(TaskPriority::High));
        assert_eq!(task.categories, None);
        assert_eq!(task.progress, Some(0));
        assert_eq!(task.created_at, now);
        assert_eq!(task.updated_at, now);
    }

    #[test]
    fn test_into_patch_clears_unset_optional_fields() {
        let patch = TaskDraft::new("T", "D").into_patch(&users()).unwrap();
        assert_eq!(patch.assigned_to, Some(None));
        assert_eq!(patch.assigned_to_name, Some(None));
        assert_eq!(patch.due_date, Some(None));
        assert_eq!(patch.progress, Some(Some(0)));
    }

    #[test]
    fn test_comment_validation() {
        assert_eq!(validate_comment("  "), Err(ValidationError::EmptyComment));
        assert!(validate_comment("Looks good").is_ok());
    }
}
