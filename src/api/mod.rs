//! HTTP API for the task tracker.
//!
//! ## Endpoints
//!
//! - `GET /api/tasks` - List all tasks, newest first
//! - `GET /api/tasks/:id` - Get a single task
//! - `POST /api/tasks` - Create a task
//! - `PUT /api/tasks/:id` - Overwrite a task's mutable fields
//! - `DELETE /api/tasks/:id` - Delete a task
//! - `GET /api/tasks/stats/summary` - Aggregate counts by status
//! - `GET /api/health` - Health check

mod routes;
pub mod tasks;
pub mod types;

pub use routes::{router, serve, AppState};
