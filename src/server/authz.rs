//! Ownership-based authorization.
//!
//! Every task has exactly one owner, and only the owner may act on it. The
//! check is identical for all actions today, but each call site names its
//! action so the policy has one place to grow (and so audit logs can say
//! what was attempted). Centralizing the check here keeps the service
//! operations from each carrying their own copy.

use crate::types::Task;

/// Action a user is attempting on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    /// Read the task.
    View,
    /// Modify fields or status.
    Update,
    /// Remove the task.
    Delete,
}

/// Decide whether `acting_user_id` may perform `action` on `task`.
///
/// Pure function: true iff the acting user owns the task. There is no role
/// hierarchy and no delegation.
pub fn permit(acting_user_id: &str, task: &Task, action: TaskAction) -> bool {
    let _ = action;
    task.owner_id == acting_user_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TaskId, TaskStatus};
    use chrono::Utc;

    fn task_owned_by(owner: &str) -> Task {
        Task {
            id: TaskId::new(),
            title: "t".to_string(),
            description: None,
            status: TaskStatus::Pending,
            due_date: None,
            owner_id: owner.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn owner_is_permitted_every_action() {
        let task = task_owned_by("alice");
        for action in [TaskAction::View, TaskAction::Update, TaskAction::Delete] {
            assert!(permit("alice", &task, action));
        }
    }

    #[test]
    fn non_owner_is_denied_every_action() {
        let task = task_owned_by("alice");
        for action in [TaskAction::View, TaskAction::Update, TaskAction::Delete] {
            assert!(!permit("bob", &task, action));
        }
    }
}
