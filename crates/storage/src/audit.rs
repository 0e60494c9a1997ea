//! Activity entries derived from an edit.

use taskdash_core::{Activity, CurrentUser, Task, TaskPatch, Time};

/// One activity per tracked field that `patch` would actually change on `before`.
///
/// Tracked fields are title, status, priority, assignee, due date and progress.
/// The store never records these on its own; callers append them explicitly.
pub fn diff_activities(
    before: &Task,
    patch: &TaskPatch,
    actor: &CurrentUser,
    now: Time,
) -> Vec<Activity> {
    let mut changes: Vec<(&str, Option<String>, Option<String>)> = Vec::new();

    if let Some(title) = &patch.title {
        if title != &before.title {
            changes.push(("Changed title", Some(before.title.clone()), Some(title.clone())));
        }
    }

    if let Some(status) = patch.status {
        if status != before.status {
            changes.push((
                "Changed status",
                Some(before.status.to_string()),
                Some(status.to_string()),
            ));
        }
    }

    if let Some(priority) = patch.priority {
        if priority != before.priority {
            changes.push((
                "Changed priority",
                before.priority.map(|p| p.to_string()),
                priority.map(|p| p.to_string()),
            ));
        }
    }

    if let Some(assignee) = &patch.assigned_to {
        if assignee != &before.assigned_to {
            let new_name = match &patch.assigned_to_name {
                Some(name) => name.clone(),
                None => assignee.as_ref().map(|id| id.to_string()),
            };
            let old_name = before
                .assigned_to_name
                .clone()
                .or_else(|| before.assigned_to.as_ref().map(|id| id.to_string()));
            changes.push(("Reassigned", old_name, new_name));
        }
    }

    if let Some(due) = patch.due_date {
        if due != before.due_date {
            changes.push((
                "Changed due date",
                before.due_date.map(|d| d.to_string()),
                due.map(|d| d.to_string()),
            ));
        }
    }

    if let Some(progress) = patch.progress {
        if progress != before.progress {
            changes.push((
                "Updated progress",
                before.progress.map(|p| format!("{}%", p)),
                progress.map(|p| format!("{}%", p)),
            ));
        }
    }

    changes
        .into_iter()
        .map(|(action, old, new)| Activity::new(before.id.clone(), actor, action, old, new, now))
        .collect()
}
