//! In-memory task store (non-persistent).
//!
//! Mirrors the SQLite backend's observable semantics, including the
//! `CURRENT_TIMESTAMP`-style timestamp format, so API tests can run
//! against it directly.

use super::{now_string, StoreError, TaskStore};
use crate::task::{Task, TaskDraft, TaskStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryTaskStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    tasks: HashMap<i64, Task>,
    // Monotonic, never reused even after deletes.
    next_id: i64,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn list(&self) -> Result<Vec<Task>, StoreError> {
        let inner = self.inner.read().await;
        let mut tasks: Vec<Task> = inner.tasks.values().cloned().collect();
        tasks.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(tasks)
    }

    async fn get(&self, id: i64) -> Result<Option<Task>, StoreError> {
        Ok(self.inner.read().await.tasks.get(&id).cloned())
    }

    async fn insert(&self, draft: &TaskDraft) -> Result<Task, StoreError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let now = now_string();
        let task = Task {
            id: inner.next_id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            status: draft.status,
            priority: draft.priority,
            created_at: now.clone(),
            updated_at: now,
        };
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update(&self, id: i64, draft: &TaskDraft) -> Result<usize, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.tasks.get_mut(&id) {
            Some(task) => {
                task.title = draft.title.clone();
                task.description = draft.description.clone();
                task.status = draft.status;
                task.priority = draft.priority;
                task.updated_at = now_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i64) -> Result<usize, StoreError> {
        let removed = self.inner.write().await.tasks.remove(&id);
        Ok(if removed.is_some() { 1 } else { 0 })
    }

    async fn count_by_status(&self) -> Result<HashMap<TaskStatus, i64>, StoreError> {
        let inner = self.inner.read().await;
        let mut counts = HashMap::new();
        for task in inner.tasks.values() {
            *counts.entry(task.status).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
