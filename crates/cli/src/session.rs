//! A dashboard session: the signed-in user, the user list and the task store.

use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use taskdash_analytics::{
    can_manage, export_csv, team_stats, visible_tasks, AssignmentFilter, DashboardStats, UserStats,
};
use taskdash_core::{
    validate_comment, Clock, Comment, CurrentUser, Task, TaskDraft, TaskFilter, TaskId, TaskPatch,
    TaskStatus, User, UserDirectory,
};
use taskdash_storage::{diff_activities, MemoryTaskStore, SharedTaskStore, TaskStore};
use tracing::info;

use crate::config::DashboardConfig;
use crate::seed;

/// What the task list shows.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Store-level filter
    pub filter: TaskFilter,
    /// Assignment dropdown
    pub assignment: AssignmentFilter,
}

/// One signed-in user's view of the dashboard.
pub struct Session {
    users: UserDirectory,
    store: SharedTaskStore,
    clock: Arc<dyn Clock>,
    current: CurrentUser,
}

impl Session {
    /// Build the user list and store and sign in as `as_user` (or the configured default).
    pub fn open(config: &DashboardConfig, as_user: Option<&str>, clock: Arc<dyn Clock>) -> Result<Self> {
        let users = UserDirectory::new(seed::demo_users()?);
        let tasks = if config.seed_tasks {
            seed::demo_tasks()?
        } else {
            Vec::new()
        };

        let email = as_user.unwrap_or(config.default_user.as_str());
        let current = users
            .current_user(email)
            .ok_or_else(|| anyhow!("unknown user: {}", email))?;
        info!("Session opened for {} ({})", current.name, current.role.as_str());

        let store = SharedTaskStore::new(MemoryTaskStore::with_tasks(tasks, clock.clone()));
        Ok(Self {
            users,
            store,
            clock,
            current,
        })
    }

    /// The signed-in user.
    pub fn current_user(&self) -> &CurrentUser {
        &self.current
    }

    /// The user list.
    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    /// Current time according to the session clock.
    pub fn now(&self) -> taskdash_core::Time {
        self.clock.now()
    }

    /// Tasks in the list view: store filter, assignment, then visibility.
    pub async fn list(&self, query: &ListQuery) -> Vec<Task> {
        let tasks = self.store.query(&query.filter).await;
        let tasks = query.assignment.apply(tasks);
        visible_tasks(tasks, &self.current)
    }

    /// Every task the user can see, unfiltered.
    pub async fn visible(&self) -> Vec<Task> {
        visible_tasks(self.store.query(&TaskFilter::default()).await, &self.current)
    }

    /// A single visible task.
    pub async fn show(&self, id: &TaskId) -> Result<Task> {
        self.store
            .get(id)
            .await
            .filter(|t| self.current.is_admin() || t.involves(&self.current.id))
            .ok_or_else(|| anyhow!("task not found: {}", id))
    }

    /// Analytics over everything the user can see.
    pub async fn stats(&self) -> DashboardStats {
        DashboardStats::compute(&self.visible().await, self.clock.now())
    }

    /// Per-member numbers. Admins only.
    pub async fn team(&self) -> Result<Vec<(&User, UserStats)>> {
        if !self.current.is_admin() {
            bail!("the team view is only available to admins");
        }
        let tasks = self.store.query(&TaskFilter::default()).await;
        Ok(team_stats(&self.users, &tasks))
    }

    /// CSV of the list view.
    pub async fn export(&self, query: &ListQuery) -> String {
        export_csv(&self.list(query).await)
    }

    /// Validate a draft and create it as a new task.
    pub async fn add(&self, draft: TaskDraft) -> Result<Task> {
        let task = draft.into_task(TaskId::generate(), &self.current, &self.users, self.clock.now())?;
        self.store.create(task.clone()).await;
        info!("{} created task {}", self.current.name, task.id);
        Ok(task)
    }

    /// Change a task's status and log the change.
    pub async fn set_status(&self, id: &TaskId, status: TaskStatus) -> Result<Task> {
        self.edit(id, TaskPatch::status(status)).await
    }

    /// Apply a patch and append an activity per changed field.
    ///
    /// The permission check, the diff and the write share one write lock.
    pub async fn edit(&self, id: &TaskId, patch: TaskPatch) -> Result<Task> {
        self.store
            .with_write(|store| -> Result<Task> {
                let before = managed(store, id, &self.current)?.clone();
                let activities = diff_activities(&before, &patch, &self.current, self.clock.now());

                store.update(id, patch);
                for activity in activities {
                    store.add_activity(id, activity);
                }
                store
                    .get(id)
                    .cloned()
                    .ok_or_else(|| anyhow!("task not found: {}", id))
            })
            .await
    }

    /// Append a comment from the current user.
    pub async fn comment(&self, id: &TaskId, content: &str) -> Result<Task> {
        validate_comment(content)?;
        let comment = Comment::new(id.clone(), &self.current, content, self.clock.now());

        self.store
            .with_write(|store| -> Result<Task> {
                visible(store, id, &self.current)?;
                store.add_comment(id, comment);
                store
                    .get(id)
                    .cloned()
                    .ok_or_else(|| anyhow!("task not found: {}", id))
            })
            .await
    }

    /// Remove a task the user manages.
    pub async fn delete(&self, id: &TaskId) -> Result<()> {
        self.store
            .with_write(|store| -> Result<()> {
                managed(store, id, &self.current)?;
                store.delete(id);
                Ok(())
            })
            .await?;
        info!("{} deleted task {}", self.current.name, id);
        Ok(())
    }
}

/// The task `id` if `user` may see it. Hidden tasks read as missing.
fn visible<'a>(store: &'a MemoryTaskStore, id: &TaskId, user: &CurrentUser) -> Result<&'a Task> {
    store
        .get(id)
        .filter(|t| user.is_admin() || t.involves(&user.id))
        .ok_or_else(|| anyhow!("task not found: {}", id))
}

/// The task `id` if `user` may modify it.
fn managed<'a>(store: &'a MemoryTaskStore, id: &TaskId, user: &CurrentUser) -> Result<&'a Task> {
    let task = visible(store, id, user)?;
    if !can_manage(task, user) {
        bail!("{} may not modify task {}", user.name, id);
    }
    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use taskdash_core::{FixedClock, TaskPriority, UserId};

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::new(
            chrono::Utc.with_ymd_and_hms(2024, 1, 21, 9, 0, 0).unwrap(),
        ))
    }

    fn open(email: &str) -> Session {
        Session::open(&DashboardConfig::default(), Some(email), clock()).unwrap()
    }

    #[test]
    fn test_unknown_user_is_rejected() {
        let err = Session::open(&DashboardConfig::default(), Some("ghost@example.com"), clock())
            .err()
            .unwrap();
        assert!(err.to_string().contains("ghost@example.com"));
    }

    #[tokio::test]
    async fn test_visibility_follows_role() {
        let admin = open("admin@example.com");
        assert_eq!(admin.visible().await.len(), 6);

        let john = open("user@example.com");
        let ids: Vec<_> = john.visible().await.into_iter().map(|t| t.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "4", "5"]);
        assert!(john.show(&TaskId::from("2")).await.is_err());
    }

    #[tokio::test]
    async fn test_search_matches_title_and_category() {
        let admin = open("admin@example.com");
        let query = ListQuery {
            filter: TaskFilter {
                search_query: Some("bug".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let hits = admin.list(&query).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Fix login bug");

        let query = ListQuery {
            assignment: AssignmentFilter::Unassigned,
            ..Default::default()
        };
        assert_eq!(admin.list(&query).await.len(), 2);
    }

    #[tokio::test]
    async fn test_stats_on_demo_data() {
        let admin = open("admin@example.com");
        let stats = admin.stats().await;
        assert_eq!(stats.total_tasks, 6);
        assert_eq!(stats.status_counts.completed, 1);
        assert_eq!(stats.completion_rate, 17);
        assert_eq!(stats.total_hours, 120.0);
        assert_eq!(stats.completed_hours, 16.0);
        // (65 + 0 + 0 + 100 + 45 + 0) / 6 = 35
        assert_eq!(stats.avg_progress, 35);
        // The only task due before now (01-20) is completed.
        assert_eq!(stats.overdue_tasks, 0);
        // 01-22, 01-25, 01-26, 01-28 fall within [now, now + 7d]
        assert_eq!(stats.due_this_week, 4);
    }

    #[tokio::test]
    async fn test_status_change_logs_activity() {
        let john = open("user@example.com");
        let task = john.set_status(&TaskId::from("1"), TaskStatus::Completed).await.unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.activities.len(), 1);
        assert_eq!(task.activities[0].user_name, "John Doe");
        assert_eq!(task.updated_at, john.now());

        // John neither created nor is assigned task 2.
        assert!(john.set_status(&TaskId::from("2"), TaskStatus::Completed).await.is_err());
    }

    #[tokio::test]
    async fn test_edit_records_only_changed_fields() {
        let admin = open("admin@example.com");
        let id = TaskId::from("1");
        let mut draft = TaskDraft::from(&admin.show(&id).await.unwrap());
        draft.priority = TaskPriority::Low;
        draft.progress = Some(80);

        let patch = draft.into_patch(admin.users()).unwrap();
        let task = admin.edit(&id, patch).await.unwrap();
        let actions: Vec<_> = task.activities.iter().map(|a| a.action.as_str()).collect();
        assert_eq!(actions, vec!["Changed priority", "Updated progress"]);
        assert_eq!(task.activities[1].new_value.as_deref(), Some("80%"));
        assert_eq!(task.assigned_to_name.as_deref(), Some("John Doe"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_edits_keep_the_audit_chain_intact() {
        let session = Arc::new(open("admin@example.com"));
        let id = TaskId::from("1");

        let mut handles = Vec::new();
        for i in 0..200 {
            let session = session.clone();
            let id = id.clone();
            let status = TaskStatus::ALL[i % TaskStatus::ALL.len()];
            handles.push(tokio::spawn(async move {
                session.set_status(&id, status).await.map(|_| ())
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let task = session.show(&id).await.unwrap();
        let activities = &task.activities;
        assert!(!activities.is_empty());
        assert_eq!(activities[0].old_value.as_deref(), Some("in_progress"));
        for pair in activities.windows(2) {
            assert_eq!(pair[0].new_value, pair[1].old_value);
        }
        assert_eq!(
            activities.last().unwrap().new_value.as_deref(),
            Some(task.status.as_str())
        );
    }

    #[tokio::test]
    async fn test_add_comment_and_delete() {
        let admin = open("admin@example.com");
        let mut draft = TaskDraft::new("Write release notes", "For v1.0");
        draft.assigned_to = Some(UserId::from("3"));
        draft.priority = TaskPriority::Low;
        let task = admin.add(draft).await.unwrap();
        assert_eq!(task.assigned_to_name.as_deref(), Some("Jane Smith"));
        assert_eq!(admin.visible().await.len(), 7);

        assert!(admin.add(TaskDraft::new("", "x")).await.is_err());

        let commented = admin.comment(&task.id, "Draft is up").await.unwrap();
        assert_eq!(commented.comments.len(), 1);
        assert_eq!(commented.comments[0].user_name, "Admin User");
        assert!(admin.comment(&task.id, "   ").await.is_err());

        admin.delete(&task.id).await.unwrap();
        assert!(admin.show(&task.id).await.is_err());
        assert!(admin.delete(&task.id).await.is_err());
    }

    #[tokio::test]
    async fn test_team_is_admin_only() {
        let admin = open("admin@example.com");
        let team = admin.team().await.unwrap();
        assert_eq!(team.len(), 3);
        let john = &team[1].1;
        assert_eq!(john.assigned, 3);
        assert_eq!(john.completed, 1);

        assert!(open("user@example.com").team().await.is_err());
    }

    #[tokio::test]
    async fn test_export_uses_list_view() {
        let john = open("user@example.com");
        let csv = john.export(&ListQuery::default()).await;
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.contains(r#""Setup CI/CD pipeline","in_progress","high","John Doe""#));
    }
}
