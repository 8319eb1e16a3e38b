//! Notification feed tests: derivation over the cache, local read/dismiss
//! state across regeneration, and the cancellable refresh timer.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use taskhub::client::{
    derive_notifications, FeedFilter, FeedRefresher, NotificationFeed, NotificationKind, TaskCache,
};
use taskhub::types::{Task, TaskId, TaskStatus};

fn task_at(title: &str, created_at: DateTime<Utc>) -> Task {
    Task {
        id: TaskId::new(),
        title: title.to_string(),
        description: None,
        status: TaskStatus::Pending,
        due_date: None,
        owner_id: "alice".to_string(),
        created_at,
    }
}

#[test]
fn derivation_classifies_by_status_and_due_date() {
    let now = Utc::now();
    let mut tasks = vec![
        task_at("plain", now),
        task_at("finished", now - chrono::Duration::minutes(1)),
        task_at("urgent", now - chrono::Duration::minutes(2)),
        task_at("late", now - chrono::Duration::minutes(3)),
    ];
    tasks[1].status = TaskStatus::Completed;
    tasks[2].due_date = Some(now + chrono::Duration::hours(3));
    tasks[3].due_date = Some(now - chrono::Duration::hours(3));

    let notifications = derive_notifications(&tasks, now);
    let kinds: Vec<NotificationKind> = notifications.iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        [
            NotificationKind::Created,
            NotificationKind::Completed,
            NotificationKind::DueSoon,
            NotificationKind::Overdue,
        ]
    );
    assert_eq!(notifications[3].message, "Task overdue: \"late\"");
    assert!(notifications.iter().all(|n| !n.read));
}

#[test]
fn read_state_survives_regeneration() {
    let now = Utc::now();
    let tasks = vec![task_at("one", now), task_at("two", now - chrono::Duration::minutes(1))];

    let mut feed = NotificationFeed::new();
    feed.refresh(&tasks, now);
    assert_eq!(feed.unread_count(), 2);

    let first_id = feed.notifications()[0].id.clone();
    feed.mark_read(&first_id);
    assert_eq!(feed.unread_count(), 1);

    // A later polling cycle re-derives everything; the marker sticks.
    feed.refresh(&tasks, now + chrono::Duration::seconds(30));
    assert_eq!(feed.unread_count(), 1);
    assert!(feed.notifications()[0].read);

    assert_eq!(feed.filtered(FeedFilter::Read).len(), 1);
    assert_eq!(feed.filtered(FeedFilter::Unread).len(), 1);
    assert_eq!(feed.filtered(FeedFilter::All).len(), 2);
}

#[test]
fn dismissed_notifications_do_not_reappear() {
    let now = Utc::now();
    let tasks = vec![task_at("one", now), task_at("two", now - chrono::Duration::minutes(1))];

    let mut feed = NotificationFeed::new();
    feed.refresh(&tasks, now);
    let dismissed_id = feed.notifications()[0].id.clone();

    feed.dismiss(&dismissed_id);
    assert_eq!(feed.notifications().len(), 1);

    feed.refresh(&tasks, now + chrono::Duration::seconds(30));
    assert_eq!(feed.notifications().len(), 1);
    assert!(feed.notifications().iter().all(|n| n.id != dismissed_id));
}

#[test]
fn mark_all_and_clear_are_local_transforms() {
    let now = Utc::now();
    let tasks = vec![task_at("one", now), task_at("two", now - chrono::Duration::minutes(1))];

    let mut feed = NotificationFeed::new();
    feed.refresh(&tasks, now);

    feed.mark_all_read();
    assert_eq!(feed.unread_count(), 0);

    feed.clear();
    assert!(feed.notifications().is_empty());

    // Cleared notifications stay gone after the next cycle too.
    feed.refresh(&tasks, now + chrono::Duration::seconds(30));
    assert!(feed.notifications().is_empty());
}

#[test]
fn read_state_tracks_kind_changes() {
    let now = Utc::now();
    let mut task = task_at("mutating", now);
    let mut feed = NotificationFeed::new();

    feed.refresh(std::slice::from_ref(&task), now);
    let id = feed.notifications()[0].id.clone();
    feed.mark_read(&id);
    assert_eq!(feed.unread_count(), 0);

    // Completing the task produces a different notification id, which is
    // unread again: the feed reflects the new event, not the old marker.
    task.status = TaskStatus::Completed;
    feed.refresh(std::slice::from_ref(&task), now);
    assert_eq!(feed.notifications()[0].kind, NotificationKind::Completed);
    assert_eq!(feed.unread_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn refresher_polls_the_cache_and_stops_when_cancelled() {
    let cache = Arc::new(TaskCache::new());
    cache.insert(task_at("first", Utc::now()));
    let feed = Arc::new(Mutex::new(NotificationFeed::new()));

    let refresher = FeedRefresher::spawn(cache.clone(), feed.clone(), Duration::from_secs(30));

    // First refresh runs immediately.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(feed.lock().notifications().len(), 1);

    cache.insert(task_at("second", Utc::now()));
    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(feed.lock().notifications().len(), 2);

    refresher.cancel();
    cache.insert(task_at("third", Utc::now()));
    tokio::time::sleep(Duration::from_secs(120)).await;
    // No refresh after cancellation: the timer is gone.
    assert_eq!(feed.lock().notifications().len(), 2);
}
