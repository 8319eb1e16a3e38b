//! Task persistence.
//!
//! [`TaskStore`] is the seam between the service and whatever holds the
//! rows. The in-memory implementation keeps tasks in insertion order under a
//! single lock, so each operation is atomic and concurrent edits resolve to
//! last-write-wins.

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::Result;
use crate::types::{Task, TaskId};

/// Storage backend for task records.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a new task or replace an existing one with the same id.
    async fn upsert(&self, task: Task) -> Result<()>;

    /// Fetch a task by id.
    async fn get(&self, id: TaskId) -> Result<Option<Task>>;

    /// All tasks owned by `owner_id`, in insertion order.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Task>>;

    /// Remove a task, returning it if it existed.
    async fn remove(&self, id: TaskId) -> Result<Option<Task>>;
}

/// In-memory [`TaskStore`] backed by an insertion-ordered map.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<IndexMap<TaskId, Task>>,
}

impl InMemoryTaskStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tasks across all owners.
    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    /// Whether the store holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn upsert(&self, task: Task) -> Result<()> {
        self.tasks.write().insert(task.id, task);
        Ok(())
    }

    async fn get(&self, id: TaskId) -> Result<Option<Task>> {
        Ok(self.tasks.read().get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .read()
            .values()
            .filter(|task| task.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn remove(&self, id: TaskId) -> Result<Option<Task>> {
        // shift_remove keeps the remaining entries in insertion order.
        Ok(self.tasks.write().shift_remove(&id))
    }
}
