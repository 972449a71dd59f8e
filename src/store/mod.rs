//! Task storage with pluggable backends.
//!
//! - `sqlite`: the production backend, one SQLite table
//! - `memory`: in-memory backend (non-persistent, for tests)

mod memory;
mod sqlite;

pub use memory::InMemoryTaskStore;
pub use sqlite::SqliteTaskStore;

use crate::task::{Task, TaskDraft, TaskStatus};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// A shareable store handle, injected into the API layer at startup.
pub type SharedTaskStore = Arc<dyn TaskStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Durable persistence of task rows behind a minimal query interface.
///
/// Each operation is a single atomic statement; the store performs no
/// retries and never swallows an engine fault.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All rows, newest first (`created_at` descending, id as tie-break).
    async fn list(&self) -> Result<Vec<Task>, StoreError>;

    /// The matching row, or `None` for a missing id.
    async fn get(&self, id: i64) -> Result<Option<Task>, StoreError>;

    /// Assign a fresh id and both timestamps, persist, and return the
    /// stored row as the engine recorded it.
    async fn insert(&self, draft: &TaskDraft) -> Result<Task, StoreError>;

    /// Overwrite all four mutable fields and refresh `updated_at`.
    /// Returns the changed-row count: 0 if no row matched, 1 otherwise.
    async fn update(&self, id: i64, draft: &TaskDraft) -> Result<usize, StoreError>;

    /// Hard delete. Returns the changed-row count (0 or 1).
    async fn delete(&self, id: i64) -> Result<usize, StoreError>;

    /// One entry per distinct status value present in the table.
    async fn count_by_status(&self) -> Result<HashMap<TaskStatus, i64>, StoreError>;
}

/// Timestamp in the same format SQLite's `CURRENT_TIMESTAMP` produces,
/// so both backends are interchangeable in tests.
pub(crate) fn now_string() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
