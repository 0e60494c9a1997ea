//! Shared handle over a task store.
//!
//! Writers are serialized behind a single `RwLock`; readers may proceed
//! together but never observe a half-applied write.

use std::sync::Arc;

use taskdash_core::{Activity, Comment, Task, TaskFilter, TaskId, TaskPatch};
use tokio::sync::RwLock;

use crate::{MemoryTaskStore, TaskStore};

/// Cloneable, lock-guarded task store. Clones share the same tasks.
#[derive(Debug, Clone)]
pub struct SharedTaskStore {
    inner: Arc<RwLock<MemoryTaskStore>>,
}

impl SharedTaskStore {
    /// Wrap an existing store.
    pub fn new(store: MemoryTaskStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Append a task.
    pub async fn create(&self, task: Task) {
        self.inner.write().await.create(task);
    }

    /// Merge a patch into a task.
    pub async fn update(&self, id: &TaskId, patch: TaskPatch) -> bool {
        self.inner.write().await.update(id, patch)
    }

    /// Remove a task.
    pub async fn delete(&self, id: &TaskId) -> bool {
        self.inner.write().await.delete(id)
    }

    /// Append a comment.
    pub async fn add_comment(&self, task_id: &TaskId, comment: Comment) -> bool {
        self.inner.write().await.add_comment(task_id, comment)
    }

    /// Append an activity entry.
    pub async fn add_activity(&self, task_id: &TaskId, activity: Activity) -> bool {
        self.inner.write().await.add_activity(task_id, activity)
    }

    /// Copy of a task.
    pub async fn get(&self, id: &TaskId) -> Option<Task> {
        self.inner.read().await.get(id).cloned()
    }

    /// Tasks matching `filter`, in insertion order.
    pub async fn query(&self, filter: &TaskFilter) -> Vec<Task> {
        self.inner.read().await.query(filter)
    }

    /// Number of tasks.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Run `f` against the store under the write lock, as one atomic step.
    pub async fn with_write<R>(&self, f: impl FnOnce(&mut MemoryTaskStore) -> R) -> R {
        let mut guard = self.inner.write().await;
        f(&mut *guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdash_core::{CurrentUser, TaskStatus, UserId, UserRole};

    fn create_test_task(id: &str) -> Task {
        Task::new(
            TaskId::from(id),
            format!("Task {}", id),
            "Test task",
            UserId::from("1"),
            chrono::Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = SharedTaskStore::new(MemoryTaskStore::new());
        let other = store.clone();

        store.create(create_test_task("1")).await;
        assert_eq!(other.len().await, 1);
        assert!(other.update(&TaskId::from("1"), TaskPatch::status(TaskStatus::Completed)).await);
        assert_eq!(
            store.get(&TaskId::from("1")).await.unwrap().status,
            TaskStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_concurrent_comments_are_all_applied() {
        let store = SharedTaskStore::new(MemoryTaskStore::new());
        store.create(create_test_task("1")).await;
        let author = CurrentUser {
            id: UserId::from("2"),
            name: "John Doe".to_string(),
            role: UserRole::User,
        };

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            let author = author.clone();
            handles.push(tokio::spawn(async move {
                let id = TaskId::from("1");
                let comment = Comment::new(id.clone(), &author, format!("c{}", i), chrono::Utc::now());
                store.add_comment(&id, comment).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        assert_eq!(store.get(&TaskId::from("1")).await.unwrap().comments.len(), 20);
    }

    #[tokio::test]
    async fn test_with_write_is_atomic_unit() {
        let store = SharedTaskStore::new(MemoryTaskStore::new());
        let removed = store
            .with_write(|s| {
                s.create(create_test_task("1"));
                s.create(create_test_task("2"));
                s.delete(&TaskId::from("1"))
            })
            .await;
        assert!(removed);
        assert_eq!(store.query(&TaskFilter::default()).await.len(), 1);
        assert!(!store.delete(&TaskId::from("1")).await);
    }
}
