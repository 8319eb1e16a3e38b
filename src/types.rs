//! Task domain types.
//!
//! This module contains the task record itself, the request parameter types
//! consumed by the service layer, and the change-event payloads broadcast to
//! owners after successful mutations.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum accepted title length, in characters.
pub const MAX_TITLE_LEN: usize = 255;

/// Unique task identifier.
///
/// Server-assigned at creation and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Task lifecycle status.
///
/// Any status is reachable from any other; there is no ordering constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not yet started. The default for new tasks.
    Pending,
    /// Currently being worked on.
    InProgress,
    /// Done.
    Completed,
}

impl TaskStatus {
    /// All valid statuses, in display order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    /// Parse a wire-format status string.
    ///
    /// Returns `None` for anything outside the enumerated set; callers turn
    /// that into a validation error so no other value is ever persisted.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// The wire-format name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, immutable after creation.
    pub id: TaskId,
    /// Short human-readable title. Never empty, at most 255 characters.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Current lifecycle status.
    pub status: TaskStatus,
    /// Optional deadline. The server enforces no relative-time constraint.
    pub due_date: Option<DateTime<Utc>>,
    /// Identifier of the creating user, immutable. Only the owner may
    /// view, update, or delete the task.
    pub owner_id: String,
    /// Creation timestamp, immutable.
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating a task.
///
/// `status` and `due_date` arrive as raw strings so the service layer owns
/// validation and can report field-level errors instead of opaque
/// deserialization failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTaskParams {
    /// Required title. Modeled as `Option` so a missing field reaches the
    /// validator rather than failing body deserialization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional status; defaults to `pending` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Optional due date in any accepted format (see [`parse_due_date`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl CreateTaskParams {
    /// Convenience constructor for the common title-only case.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

/// Fields accepted when updating a task.
///
/// Absent fields are left untouched. `due_date` uses a double `Option` to
/// distinguish "absent" (`None`) from an explicit `null` (`Some(None)`),
/// which clears the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskParams {
    /// New title, if changing. Re-validated like on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New status, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// New due date. `Some(None)` (JSON `null`) clears it; an absent field
    /// is skipped on serialization so the distinction survives the wire.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_explicit_null"
    )]
    pub due_date: Option<Option<String>>,
}

/// Deserialize a field so that a present `null` becomes `Some(None)` while
/// an absent field stays `None` (via `#[serde(default)]`).
fn deserialize_explicit_null<'de, D, T>(
    deserializer: D,
) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Parse a due-date string in any of the accepted formats.
///
/// Accepts RFC 3339, `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, and
/// `YYYY-MM-DDTHH:MM:SS`; naive forms are interpreted as UTC. Returns `None`
/// when nothing matches.
pub fn parse_due_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }
    None
}

/// Public task fields carried in change events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSummary {
    /// Task id.
    pub id: TaskId,
    /// Title at the time of the event.
    pub title: String,
    /// Description at the time of the event.
    pub description: Option<String>,
    /// Status at the time of the event.
    pub status: TaskStatus,
    /// Due date at the time of the event.
    pub due_date: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Task> for TaskSummary {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            due_date: task.due_date,
            created_at: task.created_at,
        }
    }
}

/// Kind of change a [`TaskEvent`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskEventKind {
    /// A task was created.
    Created,
    /// A task's fields were edited.
    Updated,
    /// A task's status changed.
    StatusChanged,
    /// A task was deleted.
    Deleted,
}

/// Change event delivered on the owner's private channel after a
/// successful mutation.
///
/// Delivery is fire-and-forget: losing an event never fails the mutation
/// that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEvent {
    /// What happened.
    pub kind: TaskEventKind,
    /// Public fields of the affected task.
    pub task: TaskSummary,
    /// Human-readable summary of the change.
    pub message: String,
    /// When the event was emitted.
    pub timestamp: DateTime<Utc>,
}

impl TaskEvent {
    /// Build an event for a task, with the message chosen by kind.
    pub fn new(kind: TaskEventKind, task: &Task) -> Self {
        let message = match kind {
            TaskEventKind::Created => format!("New task created: \"{}\"", task.title),
            TaskEventKind::Updated => format!("Task updated: \"{}\"", task.title),
            TaskEventKind::StatusChanged if task.status == TaskStatus::Completed => {
                format!("Task completed: \"{}\"", task.title)
            },
            TaskEventKind::StatusChanged => format!(
                "Task \"{}\" moved to {}",
                task.title,
                task.status.as_str()
            ),
            TaskEventKind::Deleted => format!("Task deleted: \"{}\"", task.title),
        };
        Self {
            kind,
            task: TaskSummary::from(task),
            message,
            timestamp: Utc::now(),
        }
    }
}
