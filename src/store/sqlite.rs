//! SQLite-backed task store.

use super::{StoreError, TaskStore};
use crate::task::{Task, TaskDraft, TaskStatus};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'pending',
    priority TEXT NOT NULL DEFAULT 'medium',
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
"#;

const TASK_COLUMNS: &str = "id, title, description, status, priority, created_at, updated_at";

pub struct SqliteTaskStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTaskStore {
    /// Open (or create) the database file and apply the schema.
    pub async fn new(db_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            conn.execute_batch(SCHEMA)?;
            Ok::<_, rusqlite::Error>(conn)
        })
        .await??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// In-memory database, used by tests that want real SQL semantics
    /// without a file on disk.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let conn = tokio::task::spawn_blocking(|| {
            let conn = Connection::open_in_memory()?;
            conn.execute_batch(SCHEMA)?;
            Ok::<_, rusqlite::Error>(conn)
        })
        .await??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn parse_row(row: &rusqlite::Row<'_>) -> Result<Task, rusqlite::Error> {
    let status_str: String = row.get(3)?;
    let priority_str: String = row.get(4)?;

    // Stored values are re-validated on the way out; a row holding an
    // unknown status or priority is a storage fault, not a default.
    let status = status_str.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let priority = priority_str.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status,
        priority,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Task>, rusqlite::Error> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
        params![id],
        parse_row,
    )
    .optional()
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn list(&self) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at DESC, id DESC"
            ))?;
            let tasks = stmt
                .query_map([], parse_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(tasks)
        })
        .await?
    }

    async fn get(&self, id: i64) -> Result<Option<Task>, StoreError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            Ok(get_by_id(&conn, id)?)
        })
        .await?
    }

    async fn insert(&self, draft: &TaskDraft) -> Result<Task, StoreError> {
        let conn = self.conn.clone();
        let draft = draft.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT INTO tasks (title, description, status, priority) VALUES (?1, ?2, ?3, ?4)",
                params![
                    draft.title,
                    draft.description,
                    draft.status.as_str(),
                    draft.priority.as_str()
                ],
            )?;
            let id = conn.last_insert_rowid();
            // Re-read so the caller sees the engine-assigned timestamps.
            let task = get_by_id(&conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            Ok(task)
        })
        .await?
    }

    async fn update(&self, id: i64, draft: &TaskDraft) -> Result<usize, StoreError> {
        let conn = self.conn.clone();
        let draft = draft.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let changed = conn.execute(
                "UPDATE tasks SET title = ?1, description = ?2, status = ?3, priority = ?4,
                        updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?5",
                params![
                    draft.title,
                    draft.description,
                    draft.status.as_str(),
                    draft.priority.as_str(),
                    id
                ],
            )?;
            Ok(changed)
        })
        .await?
    }

    async fn delete(&self, id: i64) -> Result<usize, StoreError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
            Ok(changed)
        })
        .await?
    }

    async fn count_by_status(&self) -> Result<HashMap<TaskStatus, i64>, StoreError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt =
                conn.prepare("SELECT status, COUNT(*) FROM tasks GROUP BY status")?;
            let rows = stmt.query_map([], |row| {
                let status_str: String = row.get(0)?;
                let status: TaskStatus = status_str.parse().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
                Ok((status, row.get::<_, i64>(1)?))
            })?;
            let counts = rows.collect::<Result<HashMap<_, _>, _>>()?;
            Ok(counts)
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskPriority;
    use tempfile::tempdir;

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: String::new(),
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_equal_timestamps() {
        let store = SqliteTaskStore::open_in_memory().await.unwrap();
        let task = store.insert(&draft("first")).await.unwrap();
        assert!(task.id >= 1);
        assert_eq!(task.created_at, task.updated_at);

        let second = store.insert(&draft("second")).await.unwrap();
        assert!(second.id > task.id);
    }

    #[tokio::test]
    async fn round_trip_preserves_fields_and_defaults() {
        let store = SqliteTaskStore::open_in_memory().await.unwrap();
        let created = store
            .insert(&TaskDraft {
                title: "T".to_string(),
                description: String::new(),
                status: TaskStatus::Pending,
                priority: TaskPriority::High,
            })
            .await
            .unwrap();

        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "T");
        assert_eq!(fetched.priority, TaskPriority::High);
        assert_eq!(fetched.status, TaskStatus::Pending);
        assert_eq!(fetched.description, "");
    }

    #[tokio::test]
    async fn get_missing_id_is_none_not_error() {
        let store = SqliteTaskStore::open_in_memory().await.unwrap();
        assert!(store.get(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_overwrites_all_mutable_fields() {
        let store = SqliteTaskStore::open_in_memory().await.unwrap();
        let task = store.insert(&draft("before")).await.unwrap();

        let changed = store
            .update(
                task.id,
                &TaskDraft {
                    title: "after".to_string(),
                    description: "details".to_string(),
                    status: TaskStatus::Completed,
                    priority: TaskPriority::Low,
                },
            )
            .await
            .unwrap();
        assert_eq!(changed, 1);

        let updated = store.get(task.id).await.unwrap().unwrap();
        assert_eq!(updated.title, "after");
        assert_eq!(updated.description, "details");
        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(updated.priority, TaskPriority::Low);
        assert_eq!(updated.created_at, task.created_at);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn update_missing_id_changes_nothing() {
        let store = SqliteTaskStore::open_in_memory().await.unwrap();
        let changed = store.update(42, &draft("ghost")).await.unwrap();
        assert_eq!(changed, 0);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_twice_reports_zero_second_time() {
        let store = SqliteTaskStore::open_in_memory().await.unwrap();
        let task = store.insert(&draft("doomed")).await.unwrap();
        assert_eq!(store.delete(task.id).await.unwrap(), 1);
        assert_eq!(store.delete(task.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = SqliteTaskStore::open_in_memory().await.unwrap();
        store.insert(&draft("a")).await.unwrap();
        store.insert(&draft("b")).await.unwrap();
        store.insert(&draft("c")).await.unwrap();

        let titles: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn count_by_status_sums_to_total() {
        let store = SqliteTaskStore::open_in_memory().await.unwrap();
        assert!(store.count_by_status().await.unwrap().is_empty());

        for status in [TaskStatus::Pending, TaskStatus::Pending, TaskStatus::Completed] {
            let mut d = draft("x");
            d.status = status;
            store.insert(&d).await.unwrap();
        }

        let counts = store.count_by_status().await.unwrap();
        assert_eq!(counts.get(&TaskStatus::Pending), Some(&2));
        assert_eq!(counts.get(&TaskStatus::Completed), Some(&1));
        assert_eq!(counts.get(&TaskStatus::InProgress), None);
        assert_eq!(counts.values().sum::<i64>(), 3);
    }

    #[tokio::test]
    async fn reopening_file_keeps_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.db");

        {
            let store = SqliteTaskStore::new(&path).await.unwrap();
            store.insert(&draft("durable")).await.unwrap();
        }

        let store = SqliteTaskStore::new(&path).await.unwrap();
        let tasks = store.list().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "durable");
    }
}
