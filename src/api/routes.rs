//! Router assembly and server lifecycle.

use std::sync::Arc;

use axum::{
    extract::State,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::tasks;
use super::types::HealthResponse;
use crate::config::Config;
use crate::store::{SharedTaskStore, SqliteTaskStore};

/// Shared application state. The store is constructed once at startup and
/// injected here; handlers never reach for a global handle.
pub struct AppState {
    pub store: SharedTaskStore,
}

/// Build the router. Separate from [`serve`] so tests can drive it with an
/// in-memory store.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/tasks", get(tasks::list_tasks))
        .route("/api/tasks", post(tasks::create_task))
        // Registered before the :id routes only for readability; axum gives
        // the static segment precedence either way.
        .route("/api/tasks/stats/summary", get(tasks::stats_summary))
        .route("/api/tasks/:id", get(tasks::get_task))
        .route("/api/tasks/:id", put(tasks::update_task))
        .route("/api/tasks/:id", delete(tasks::delete_task))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server and block until shutdown.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = SqliteTaskStore::new(config.database_path.clone()).await?;
    tracing::info!("Opened task database at {}", config.database_path.display());

    let state = Arc::new(AppState {
        store: Arc::new(store),
    });
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health(State(_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
