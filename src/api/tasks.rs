//! Task route handlers.
//!
//! Each handler validates input shape first, makes at most one store call
//! (plus a re-read after a successful write), and maps the result onto the
//! response envelopes in [`super::types`]. Validation failures never touch
//! the store.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use super::routes::AppState;
use super::types::{DataResponse, ErrorResponse, MessageResponse, StatsSummary, ValidationErrors};
use crate::store::StoreError;
use crate::task::{FieldError, Task, TaskPayload, TaskStatus};

/// Failure taxonomy for the task routes. Owns the status-code and envelope
/// mapping so handlers stay focused on the happy path.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or missing input; surfaced with field-level detail.
    Validation(Vec<FieldError>),
    /// The targeted id does not exist.
    NotFound,
    /// Anything the persistence engine rejected. Logged with full detail,
    /// surfaced with a generic per-operation message.
    Storage {
        context: &'static str,
        source: StoreError,
    },
}

impl ApiError {
    fn storage(context: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |source| ApiError::Storage { context, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrors { errors }),
            )
                .into_response(),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    success: false,
                    error: "Task not found".to_string(),
                }),
            )
                .into_response(),
            ApiError::Storage { context, source } => {
                tracing::error!("{}: {}", context, source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        success: false,
                        error: context.to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

/// Path ids are extracted as raw strings so a non-integer id produces the
/// same 400 validation envelope as any other bad input.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(ApiError::Validation(vec![FieldError::new(
            "id",
            "Invalid task ID",
        )])),
    }
}

/// GET /api/tasks
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse<Vec<Task>>>, ApiError> {
    let tasks = state
        .store
        .list()
        .await
        .map_err(ApiError::storage("Failed to fetch tasks"))?;
    Ok(Json(DataResponse::new(tasks)))
}

/// GET /api/tasks/:id
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Task>>, ApiError> {
    let id = parse_id(&id)?;
    let task = state
        .store
        .get(id)
        .await
        .map_err(ApiError::storage("Failed to fetch task"))?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(DataResponse::new(task)))
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TaskPayload>,
) -> Result<(StatusCode, Json<DataResponse<Task>>), ApiError> {
    let draft = payload.validate().map_err(ApiError::Validation)?;
    let task = state
        .store
        .insert(&draft)
        .await
        .map_err(ApiError::storage("Failed to create task"))?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(task))))
}

/// PUT /api/tasks/:id
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<TaskPayload>,
) -> Result<Json<DataResponse<Task>>, ApiError> {
    let id = parse_id(&id)?;
    let draft = payload.validate().map_err(ApiError::Validation)?;

    let changed = state
        .store
        .update(id, &draft)
        .await
        .map_err(ApiError::storage("Failed to update task"))?;
    if changed == 0 {
        return Err(ApiError::NotFound);
    }

    let task = state
        .store
        .get(id)
        .await
        .map_err(ApiError::storage("Failed to update task"))?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(DataResponse::new(task)))
}

/// DELETE /api/tasks/:id
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;
    let changed = state
        .store
        .delete(id)
        .await
        .map_err(ApiError::storage("Failed to delete task"))?;
    if changed == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(Json(MessageResponse {
        success: true,
        message: "Task deleted successfully".to_string(),
    }))
}

/// GET /api/tasks/stats/summary
pub async fn stats_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse<StatsSummary>>, ApiError> {
    let counts = state
        .store
        .count_by_status()
        .await
        .map_err(ApiError::storage("Failed to fetch statistics"))?;

    let pending = counts.get(&TaskStatus::Pending).copied().unwrap_or(0);
    let in_progress = counts.get(&TaskStatus::InProgress).copied().unwrap_or(0);
    let completed = counts.get(&TaskStatus::Completed).copied().unwrap_or(0);

    Ok(Json(DataResponse::new(StatsSummary {
        total: pending + in_progress + completed,
        pending,
        in_progress,
        completed,
    })))
}

#[cfg(test)]
mod tests {
    use crate::api::{router, AppState};
    use crate::store::{InMemoryTaskStore, SharedTaskStore, StoreError, TaskStore};
    use crate::task::{TaskDraft, TaskStatus};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn make_app() -> (Router, SharedTaskStore) {
        let store: SharedTaskStore = Arc::new(InMemoryTaskStore::new());
        let app = router(Arc::new(AppState {
            store: Arc::clone(&store),
        }));
        (app, store)
    }

    fn request(method: Method, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn list_starts_empty() {
        let (app, _) = make_app();
        let resp = app
            .oneshot(request(Method::GET, "/api/tasks", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn create_then_get_round_trip() {
        let (app, _) = make_app();

        let resp = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/tasks",
                Some(serde_json::json!({"title": "T", "priority": "high"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = body_json(resp).await;
        assert_eq!(created["success"], true);
        let id = created["data"]["id"].as_i64().unwrap();
        assert!(id >= 1);
        assert_eq!(created["data"]["created_at"], created["data"]["updated_at"]);

        let resp = app
            .oneshot(request(Method::GET, &format!("/api/tasks/{}", id), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["data"]["title"], "T");
        assert_eq!(json["data"]["priority"], "high");
        assert_eq!(json["data"]["status"], "pending");
        assert_eq!(json["data"]["description"], "");
    }

    #[tokio::test]
    async fn create_with_blank_title_persists_nothing() {
        let (app, store) = make_app();

        let resp = app
            .oneshot(request(
                Method::POST,
                "/api/tasks",
                Some(serde_json::json!({"title": "   "})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        // Validation envelope has no `success` key, only `errors`.
        assert!(json.get("success").is_none());
        assert_eq!(json["errors"][0]["field"], "title");
        assert_eq!(json["errors"][0]["message"], "Title is required");

        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_unknown_enum_values() {
        let (app, _) = make_app();
        let resp = app
            .oneshot(request(
                Method::POST,
                "/api/tasks",
                Some(serde_json::json!({"title": "T", "status": "done"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["errors"][0]["message"], "Invalid status");
    }

    #[tokio::test]
    async fn get_with_bad_id_is_400_not_404() {
        let (app, _) = make_app();
        for uri in ["/api/tasks/abc", "/api/tasks/0", "/api/tasks/-3"] {
            let resp = app
                .clone()
                .oneshot(request(Method::GET, uri, None))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "uri: {uri}");
            let json = body_json(resp).await;
            assert_eq!(json["errors"][0]["message"], "Invalid task ID");
        }
    }

    #[tokio::test]
    async fn get_missing_id_is_404() {
        let (app, _) = make_app();
        let resp = app
            .oneshot(request(Method::GET, "/api/tasks/99", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Task not found");
    }

    #[tokio::test]
    async fn update_overwrites_all_fields() {
        let (app, store) = make_app();
        let task = store
            .insert(&TaskDraft {
                title: "before".to_string(),
                description: String::new(),
                status: TaskStatus::Pending,
                priority: crate::task::TaskPriority::Medium,
            })
            .await
            .unwrap();

        let resp = app
            .oneshot(request(
                Method::PUT,
                &format!("/api/tasks/{}", task.id),
                Some(serde_json::json!({
                    "title": "after",
                    "description": "d",
                    "status": "completed",
                    "priority": "low"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["data"]["title"], "after");
        assert_eq!(json["data"]["status"], "completed");
        assert_eq!(json["data"]["priority"], "low");
    }

    #[tokio::test]
    async fn update_missing_id_is_404_and_store_unchanged() {
        let (app, store) = make_app();
        let resp = app
            .oneshot(request(
                Method::PUT,
                "/api/tasks/42",
                Some(serde_json::json!({"title": "ghost"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn full_lifecycle_scenario() {
        let (app, _) = make_app();

        let resp = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/tasks",
                Some(serde_json::json!({
                    "title": "Test Task",
                    "description": "d",
                    "status": "pending",
                    "priority": "high"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = body_json(resp).await;
        assert_eq!(created["data"]["title"], "Test Task");
        assert_eq!(created["data"]["description"], "d");
        assert_eq!(created["data"]["priority"], "high");
        let id = created["data"]["id"].as_i64().unwrap();

        let resp = app
            .clone()
            .oneshot(request(Method::GET, "/api/tasks", None))
            .await
            .unwrap();
        let listed = body_json(resp).await;
        assert!(listed["data"]
            .as_array()
            .unwrap()
            .iter()
            .any(|t| t["id"] == id));

        let resp = app
            .clone()
            .oneshot(request(Method::DELETE, &format!("/api/tasks/{}", id), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let deleted = body_json(resp).await;
        assert_eq!(deleted["success"], true);
        assert_eq!(deleted["message"], "Task deleted successfully");

        // Second delete and subsequent get both see nothing.
        let resp = app
            .clone()
            .oneshot(request(Method::DELETE, &format!("/api/tasks/{}", id), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = app
            .oneshot(request(Method::GET, &format!("/api/tasks/{}", id), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stats_has_all_keys_even_when_empty() {
        let (app, _) = make_app();
        let resp = app
            .oneshot(request(Method::GET, "/api/tasks/stats/summary", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(
            json["data"],
            serde_json::json!({"total": 0, "pending": 0, "in-progress": 0, "completed": 0})
        );
    }

    #[tokio::test]
    async fn stats_counts_sum_to_total() {
        let (app, store) = make_app();
        for (title, status) in [
            ("a", TaskStatus::Pending),
            ("b", TaskStatus::InProgress),
            ("c", TaskStatus::InProgress),
            ("d", TaskStatus::Completed),
        ] {
            store
                .insert(&TaskDraft {
                    title: title.to_string(),
                    description: String::new(),
                    status,
                    priority: crate::task::TaskPriority::Medium,
                })
                .await
                .unwrap();
        }

        let resp = app
            .oneshot(request(Method::GET, "/api/tasks/stats/summary", None))
            .await
            .unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["data"]["total"], 4);
        assert_eq!(json["data"]["pending"], 1);
        assert_eq!(json["data"]["in-progress"], 2);
        assert_eq!(json["data"]["completed"], 1);
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let (app, _) = make_app();
        let resp = app
            .oneshot(request(Method::GET, "/api/health", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["status"], "healthy");
        assert!(json["timestamp"].is_string());
    }

    // Store whose every operation fails, for the 500 path.
    struct BrokenStore;

    #[async_trait]
    impl TaskStore for BrokenStore {
        async fn list(&self) -> Result<Vec<crate::task::Task>, StoreError> {
            Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
        }
        async fn get(&self, _id: i64) -> Result<Option<crate::task::Task>, StoreError> {
            Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
        }
        async fn insert(&self, _draft: &TaskDraft) -> Result<crate::task::Task, StoreError> {
            Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
        }
        async fn update(&self, _id: i64, _draft: &TaskDraft) -> Result<usize, StoreError> {
            Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
        }
        async fn delete(&self, _id: i64) -> Result<usize, StoreError> {
            Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
        }
        async fn count_by_status(&self) -> Result<HashMap<TaskStatus, i64>, StoreError> {
            Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
        }
    }

    #[tokio::test]
    async fn storage_fault_surfaces_as_generic_500() {
        let app = router(Arc::new(AppState {
            store: Arc::new(BrokenStore),
        }));

        let resp = app
            .oneshot(request(Method::GET, "/api/tasks", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Failed to fetch tasks");
    }
}
