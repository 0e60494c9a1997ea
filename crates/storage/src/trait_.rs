//! Task store trait abstraction.

use taskdash_core::{Activity, Comment, Task, TaskFilter, TaskId, TaskPatch};

/// Owner of the task collection.
///
/// Mutators on a missing id are silent no-ops. The returned `bool` reports
/// whether the target was found; callers are free to ignore it.
///
/// Ids are not checked for uniqueness. When several tasks share an id, every
/// mutator applies to all of them and `get` returns the first.
pub trait TaskStore {
    /// Append a task. The caller supplies a unique id; nothing is validated.
    fn create(&mut self, task: Task);

    /// Merge `patch` into the task and refresh `updated_at`.
    fn update(&mut self, id: &TaskId, patch: TaskPatch) -> bool;

    /// Remove the task.
    fn delete(&mut self, id: &TaskId) -> bool;

    /// Append a comment. Does not refresh `updated_at`.
    fn add_comment(&mut self, task_id: &TaskId, comment: Comment) -> bool;

    /// Append an activity entry. Does not refresh `updated_at`.
    fn add_activity(&mut self, task_id: &TaskId, activity: Activity) -> bool;

    /// Look a task up by id.
    fn get(&self, id: &TaskId) -> Option<&Task>;

    /// Tasks matching every set field of `filter`, in insertion order.
    fn query(&self, filter: &TaskFilter) -> Vec<Task>;

    /// Every task, in insertion order.
    fn all(&self) -> &[Task];

    /// Number of tasks.
    fn len(&self) -> usize {
        self.all().len()
    }

    /// Whether the store holds no tasks.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
