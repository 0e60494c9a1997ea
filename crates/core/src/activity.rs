//! Comments and activity entries - the append-only history of a task.

use serde::{Deserialize, Serialize};

use crate::id::{ActivityId, CommentId, TaskId, UserId};
use crate::user::CurrentUser;
use crate::Time;

/// A comment left on a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Unique identifier
    pub id: CommentId,

    /// Task this comment refers to
    pub task_id: TaskId,

    /// Author
    pub user_id: UserId,

    /// Author's display name when the comment was written.
    ///
    /// Not kept in sync with the user record; renames leave old comments stale.
    pub user_name: String,

    /// Comment body
    pub content: String,

    /// When it was written
    pub created_at: Time,
}

impl Comment {
    /// Create a comment authored by `author`.
    pub fn new(
        task_id: TaskId,
        author: &CurrentUser,
        content: impl Into<String>,
        now: Time,
    ) -> Self {
        Self {
            id: CommentId::generate(),
            task_id,
            user_id: author.id.clone(),
            user_name: author.name.clone(),
            content: content.into(),
            created_at: now,
        }
    }
}

/// An audit-log entry describing a change to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Unique identifier
    pub id: ActivityId,

    /// Task that changed
    pub task_id: TaskId,

    /// Who made the change
    pub user_id: UserId,

    /// Their display name at the time
    pub user_name: String,

    /// What happened, free text
    pub action: String,

    /// Value before the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,

    /// Value after the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,

    /// When it happened
    pub timestamp: Time,
}

impl Activity {
    /// Create an activity entry for `actor`.
    pub fn new(
        task_id: TaskId,
        actor: &CurrentUser,
        action: impl Into<String>,
        old_value: Option<String>,
        new_value: Option<String>,
        now: Time,
    ) -> Self {
        Self {
            id: ActivityId::generate(),
            task_id,
            user_id: actor.id.clone(),
            user_name: actor.name.clone(),
            action: action.into(),
            old_value,
            new_value,
            timestamp: now,
        }
    }
}
