//! Task service: validation, authorization, persistence, change events.
//!
//! Every operation follows the same shape: validate input, load the row,
//! ask the guard, mutate the store, then emit a change event to the owner's
//! channel. Events are fire-and-forget; only validation, authorization, and
//! store failures can fail an operation.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::server::authz::{permit, TaskAction};
use crate::server::events::EventBroadcaster;
use crate::server::store::{InMemoryTaskStore, TaskStore};
use crate::types::{
    parse_due_date, CreateTaskParams, Task, TaskEvent, TaskEventKind, TaskId, TaskStatus,
    UpdateTaskParams, MAX_TITLE_LEN,
};

/// Owner-scoped task CRUD.
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    events: Arc<EventBroadcaster>,
}

impl TaskService {
    /// Create a service over the given store and event broadcaster.
    pub fn new(store: Arc<dyn TaskStore>, events: Arc<EventBroadcaster>) -> Self {
        Self { store, events }
    }

    /// Create a service over a fresh in-memory store. Handy for tests and
    /// single-process deployments.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryTaskStore::new()),
            Arc::new(EventBroadcaster::default()),
        )
    }

    /// The broadcaster carrying this service's change events.
    pub fn events(&self) -> &Arc<EventBroadcaster> {
        &self.events
    }

    /// Create a task owned by `owner_id`.
    ///
    /// Status defaults to `pending`. Fails with a validation error if the
    /// title is missing, empty, or over 255 characters, if the status is
    /// outside the enumerated set, or if the due date does not parse.
    pub async fn create(&self, owner_id: &str, params: CreateTaskParams) -> Result<Task> {
        let title = validate_title(params.title.as_deref())?;
        let status = match params.status.as_deref() {
            Some(raw) => parse_status_field(raw)?,
            None => TaskStatus::default(),
        };
        let due_date = match params.due_date.as_deref() {
            Some(raw) => Some(parse_due_date_field(raw)?),
            None => None,
        };

        let task = Task {
            id: TaskId::new(),
            title,
            description: params.description,
            status,
            due_date,
            owner_id: owner_id.to_string(),
            created_at: Utc::now(),
        };
        self.store.upsert(task.clone()).await?;
        tracing::info!(task_id = %task.id, owner_id, "task created");

        self.events
            .publish(owner_id, TaskEvent::new(TaskEventKind::Created, &task));
        Ok(task)
    }

    /// All tasks owned by `owner_id`, optionally restricted to one status.
    pub async fn list(&self, owner_id: &str, status_filter: Option<&str>) -> Result<Vec<Task>> {
        let filter = match status_filter {
            Some(raw) => Some(parse_status_field(raw)?),
            None => None,
        };
        let mut tasks = self.store.list_by_owner(owner_id).await?;
        if let Some(status) = filter {
            tasks.retain(|task| task.status == status);
        }
        Ok(tasks)
    }

    /// Fetch a single task on behalf of `acting_user_id`.
    pub async fn get(&self, acting_user_id: &str, id: TaskId) -> Result<Task> {
        let task = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| Error::not_found(id))?;
        if !permit(acting_user_id, &task, TaskAction::View) {
            return Err(Error::Forbidden);
        }
        Ok(task)
    }

    /// Apply a partial update to a task.
    ///
    /// Absent fields are untouched. An explicit `null` (or empty-string)
    /// due date clears it. Changed fields are re-validated; `id`,
    /// `owner_id`, and `created_at` never change.
    pub async fn update(
        &self,
        acting_user_id: &str,
        id: TaskId,
        params: UpdateTaskParams,
    ) -> Result<Task> {
        let mut task = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| Error::not_found(id))?;
        if !permit(acting_user_id, &task, TaskAction::Update) {
            return Err(Error::Forbidden);
        }

        if params.title.is_some() {
            task.title = validate_title(params.title.as_deref())?;
        }
        if let Some(description) = params.description {
            task.description = Some(description);
        }
        if let Some(raw) = params.status.as_deref() {
            task.status = parse_status_field(raw)?;
        }
        match params.due_date {
            None => {},
            Some(None) => task.due_date = None,
            Some(Some(raw)) if raw.is_empty() => task.due_date = None,
            Some(Some(raw)) => task.due_date = Some(parse_due_date_field(&raw)?),
        }

        self.store.upsert(task.clone()).await?;
        tracing::info!(task_id = %task.id, owner_id = %task.owner_id, "task updated");

        self.events.publish(
            &task.owner_id,
            TaskEvent::new(TaskEventKind::Updated, &task),
        );
        Ok(task)
    }

    /// Overwrite a task's status.
    ///
    /// Any status may follow any other; the only rejection is a value
    /// outside the enumerated set, which leaves the stored status
    /// unchanged.
    pub async fn update_status(
        &self,
        acting_user_id: &str,
        id: TaskId,
        status: &str,
    ) -> Result<Task> {
        let mut task = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| Error::not_found(id))?;
        if !permit(acting_user_id, &task, TaskAction::Update) {
            return Err(Error::Forbidden);
        }

        task.status = parse_status_field(status)?;
        self.store.upsert(task.clone()).await?;
        tracing::info!(task_id = %task.id, status = %task.status, "task status updated");

        self.events.publish(
            &task.owner_id,
            TaskEvent::new(TaskEventKind::StatusChanged, &task),
        );
        Ok(task)
    }

    /// Permanently delete a task.
    ///
    /// A second delete of the same id fails with not-found.
    pub async fn delete(&self, acting_user_id: &str, id: TaskId) -> Result<()> {
        let task = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| Error::not_found(id))?;
        if !permit(acting_user_id, &task, TaskAction::Delete) {
            return Err(Error::Forbidden);
        }

        // The row may have vanished between the ownership check and the
        // removal; that still reads as not-found to the caller.
        let removed = self
            .store
            .remove(id)
            .await?
            .ok_or_else(|| Error::not_found(id))?;
        tracing::info!(task_id = %id, owner_id = %removed.owner_id, "task deleted");

        self.events.publish(
            &removed.owner_id,
            TaskEvent::new(TaskEventKind::Deleted, &removed),
        );
        Ok(())
    }
}

fn validate_title(title: Option<&str>) -> Result<String> {
    let title = title.ok_or_else(|| Error::validation("title", "The title field is required."))?;
    if title.trim().is_empty() {
        return Err(Error::validation("title", "The title field is required."));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(Error::validation(
            "title",
            "The title may not be greater than 255 characters.",
        ));
    }
    Ok(title.to_string())
}

fn parse_status_field(raw: &str) -> Result<TaskStatus> {
    TaskStatus::parse(raw)
        .ok_or_else(|| Error::validation("status", "The selected status is invalid."))
}

fn parse_due_date_field(raw: &str) -> Result<DateTime<Utc>> {
    parse_due_date(raw)
        .ok_or_else(|| Error::validation("due_date", "The due date is not a valid date."))
}
