//! In-memory task store.
//!
//! Holds the session's tasks in a `Vec` in insertion order. Queries are a
//! linear scan over that `Vec`, O(n) per call, with nothing cached.

use std::sync::Arc;

use taskdash_core::{Activity, Clock, Comment, SystemClock, Task, TaskFilter, TaskId, TaskPatch};
use tracing::{debug, warn};

use crate::TaskStore;

/// Vec-backed task store.
pub struct MemoryTaskStore {
    tasks: Vec<Task>,
    clock: Arc<dyn Clock>,
}

impl MemoryTaskStore {
    /// Create an empty store stamped by the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store stamped by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tasks: Vec::new(),
            clock,
        }
    }

    /// Create a store pre-loaded with `tasks`.
    pub fn with_tasks(tasks: Vec<Task>, clock: Arc<dyn Clock>) -> Self {
        Self { tasks, clock }
    }

    /// The clock used for `updated_at`.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Every task carrying `id`. More than one only after a duplicate `create`.
    fn matching_mut<'a>(&'a mut self, id: &'a TaskId) -> impl Iterator<Item = &'a mut Task> + 'a {
        self.tasks.iter_mut().filter(move |t| &t.id == id)
    }
}

impl Default for MemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryTaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTaskStore")
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

impl TaskStore for MemoryTaskStore {
    fn create(&mut self, task: Task) {
        if self.tasks.iter().any(|t| t.id == task.id) {
            warn!("Creating task with duplicate id {}", task.id);
        }
        debug!("Created task {}", task.id);
        self.tasks.push(task);
    }

    fn update(&mut self, id: &TaskId, patch: TaskPatch) -> bool {
        let now = self.clock.now();
        let mut found = false;
        for task in self.matching_mut(id) {
            patch.clone().apply_to(task);
            // A clock behind the creation time must not break updated_at >= created_at.
            task.updated_at = now.max(task.created_at);
            found = true;
        }

        if found {
            debug!("Updated task {}", id);
        } else {
            debug!("Update ignored: task {} not found", id);
        }
        found
    }

    fn delete(&mut self, id: &TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| &t.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            debug!("Deleted task {}", id);
        } else {
            debug!("Delete ignored: task {} not found", id);
        }
        removed
    }

    fn add_comment(&mut self, task_id: &TaskId, comment: Comment) -> bool {
        let mut found = false;
        for task in self.matching_mut(task_id) {
            task.comments.push(comment.clone());
            found = true;
        }

        if found {
            debug!("Comment {} added to task {}", comment.id, task_id);
        } else {
            debug!("Comment ignored: task {} not found", task_id);
        }
        found
    }

    fn add_activity(&mut self, task_id: &TaskId, activity: Activity) -> bool {
        let mut found = false;
        for task in self.matching_mut(task_id) {
            task.activities.push(activity.clone());
            found = true;
        }

        if found {
            debug!("Activity '{}' recorded on task {}", activity.action, task_id);
        } else {
            debug!("Activity ignored: task {} not found", task_id);
        }
        found
    }

    fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    fn query(&self, filter: &TaskFilter) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    fn all(&self) -> &[Task] {
        &self.tasks
    }
}
