//! Derived notification feed.
//!
//! There is no server-side notification store. The feed is a pure
//! derivation over the task cache, regenerated on a timer and after local
//! mutations. Read and dismissed markers are local-only state keyed by
//! deterministic notification ids, so they survive regeneration but are
//! gone on reload.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::client::cache::TaskCache;
use crate::types::{Task, TaskId, TaskStatus};

/// How far ahead a due date counts as "due soon".
pub const DUE_SOON_WINDOW_HOURS: i64 = 24;

/// Maximum number of notifications derived per cycle.
pub const MAX_FEED_LEN: usize = 10;

/// Default interval between feed refreshes.
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(30);

/// Kind of a derived notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A recently created task.
    Created,
    /// A task marked completed.
    Completed,
    /// A task due within the next 24 hours.
    DueSoon,
    /// A task past its due date.
    Overdue,
}

impl NotificationKind {
    /// Wire-format name, also used in notification ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Completed => "completed",
            Self::DueSoon => "due_soon",
            Self::Overdue => "overdue",
        }
    }
}

/// A derived, ephemeral notification record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Deterministic id (`{kind}-{task_id}`), stable across regeneration.
    pub id: String,
    /// What the notification is about.
    pub kind: NotificationKind,
    /// Human-readable message.
    pub message: String,
    /// The task this notification refers to.
    pub task_id: TaskId,
    /// Local-only read marker.
    pub read: bool,
    /// When the underlying task was created.
    pub created_at: DateTime<Utc>,
}

/// Classify one task at a point in time.
fn classify(task: &Task, now: DateTime<Utc>) -> NotificationKind {
    if task.status == TaskStatus::Completed {
        return NotificationKind::Completed;
    }
    if let Some(due) = task.due_date {
        if due < now {
            return NotificationKind::Overdue;
        }
        if due <= now + chrono::Duration::hours(DUE_SOON_WINDOW_HOURS) {
            return NotificationKind::DueSoon;
        }
    }
    NotificationKind::Created
}

/// Derive notifications from a task list.
///
/// Pure function of its inputs: the ten most recently created tasks, newest
/// first, each classified by status and due date. All notifications come
/// out unread; the feed layers local read state on top.
pub fn derive_notifications(tasks: &[Task], now: DateTime<Utc>) -> Vec<Notification> {
    let mut recent: Vec<&Task> = tasks.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent
        .into_iter()
        .take(MAX_FEED_LEN)
        .map(|task| {
            let kind = classify(task, now);
            let message = match kind {
                NotificationKind::Created => format!("New task created: \"{}\"", task.title),
                NotificationKind::Completed => format!("Task completed: \"{}\"", task.title),
                NotificationKind::DueSoon => format!("Task due soon: \"{}\"", task.title),
                NotificationKind::Overdue => format!("Task overdue: \"{}\"", task.title),
            };
            Notification {
                id: format!("{}-{}", kind.as_str(), task.id),
                kind,
                message,
                task_id: task.id,
                read: false,
                created_at: task.created_at,
            }
        })
        .collect()
}

/// Filter applied when listing notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedFilter {
    /// Everything.
    #[default]
    All,
    /// Only unread notifications.
    Unread,
    /// Only read notifications.
    Read,
}

/// The notification feed: derived records plus local read/dismiss state.
///
/// Marking read, marking all read, dismissing, and clearing are pure local
/// transforms with no server round-trip.
#[derive(Debug, Default)]
pub struct NotificationFeed {
    notifications: Vec<Notification>,
    read_ids: HashSet<String>,
    dismissed_ids: HashSet<String>,
}

impl NotificationFeed {
    /// Create an empty feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Regenerate the feed from a task snapshot.
    ///
    /// Dismissed notifications stay gone; read markers are re-applied by
    /// id.
    pub fn refresh(&mut self, tasks: &[Task], now: DateTime<Utc>) {
        let mut derived = derive_notifications(tasks, now);
        derived.retain(|n| !self.dismissed_ids.contains(&n.id));
        for notification in &mut derived {
            notification.read = self.read_ids.contains(&notification.id);
        }
        self.notifications = derived;
    }

    /// Current notifications, newest first.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Notifications matching a read-state filter.
    pub fn filtered(&self, filter: FeedFilter) -> Vec<&Notification> {
        self.notifications
            .iter()
            .filter(|n| match filter {
                FeedFilter::All => true,
                FeedFilter::Unread => !n.read,
                FeedFilter::Read => n.read,
            })
            .collect()
    }

    /// Number of unread notifications.
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    /// Mark one notification as read.
    pub fn mark_read(&mut self, id: &str) {
        if let Some(notification) = self.notifications.iter_mut().find(|n| n.id == id) {
            notification.read = true;
            self.read_ids.insert(id.to_string());
        }
    }

    /// Mark every current notification as read.
    pub fn mark_all_read(&mut self) {
        for notification in &mut self.notifications {
            notification.read = true;
            self.read_ids.insert(notification.id.clone());
        }
    }

    /// Remove one notification; it will not reappear on refresh.
    pub fn dismiss(&mut self, id: &str) {
        self.dismissed_ids.insert(id.to_string());
        self.notifications.retain(|n| n.id != id);
    }

    /// Remove every current notification.
    pub fn clear(&mut self) {
        for notification in &self.notifications {
            self.dismissed_ids.insert(notification.id.clone());
        }
        self.notifications.clear();
    }
}

/// Periodic feed refresh driven by a background task.
///
/// The timer is cancellable and does not outlive the refresher: dropping it
/// (or calling [`cancel`](Self::cancel)) aborts the task, so no further
/// refreshes run after teardown.
#[derive(Debug)]
pub struct FeedRefresher {
    handle: JoinHandle<()>,
}

impl FeedRefresher {
    /// Start refreshing `feed` from `cache` every `period`.
    ///
    /// The first refresh runs immediately.
    pub fn spawn(cache: Arc<TaskCache>, feed: Arc<Mutex<NotificationFeed>>, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let tasks = cache.snapshot();
                feed.lock().refresh(&tasks, Utc::now());
            }
        });
        Self { handle }
    }

    /// Stop future refreshes.
    pub fn cancel(self) {
        // Drop does the abort.
    }
}

impl Drop for FeedRefresher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
