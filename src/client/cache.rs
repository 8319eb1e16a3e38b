//! Local mirror of the server's task list.
//!
//! The cache is updated optimistically: each successful server response is
//! applied as a single local mutation instead of re-fetching the whole
//! list. A failed request must leave the cache exactly as it was.

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::types::{Task, TaskId};

/// Thread-safe task-id-to-task mirror, in insertion order.
#[derive(Debug, Default)]
pub struct TaskCache {
    tasks: RwLock<IndexMap<TaskId, Task>>,
}

impl TaskCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a task, replacing any existing entry with the same id.
    pub fn insert(&self, task: Task) {
        self.tasks.write().insert(task.id, task);
    }

    /// Remove a task, returning it if present.
    pub fn remove(&self, id: TaskId) -> Option<Task> {
        self.tasks.write().shift_remove(&id)
    }

    /// Look up a task by id.
    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.tasks.read().get(&id).cloned()
    }

    /// Replace the whole mirror with a freshly fetched list.
    pub fn replace_all(&self, tasks: Vec<Task>) {
        let mut map = self.tasks.write();
        map.clear();
        for task in tasks {
            map.insert(task.id, task);
        }
    }

    /// Snapshot of all cached tasks, in insertion order.
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.read().values().cloned().collect()
    }

    /// Number of cached tasks.
    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }
}
