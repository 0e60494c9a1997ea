//! Taskdash core data models.
//!
//! This crate defines the records the task dashboard works with: tasks,
//! their comments and activity log, users, and the clock used to stamp them.

#![warn(missing_docs)]

// Core identities
mod id;
mod clock;
mod user;

// Tasks and their history
mod task;
mod activity;

// Form boundary
mod validation;

// Re-exports
pub use id::*;
pub use clock::{Clock, FixedClock, SystemClock};
pub use user::{CurrentUser, User, UserDirectory, UserRole};

pub use task::{ParseError, Task, TaskFilter, TaskPatch, TaskPriority, TaskStatus};
pub use activity::{Activity, Comment};

pub use validation::{validate_comment, TaskDraft, ValidationError};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
