//! Client-side mirror of the task API.
//!
//! - `http`: the reqwest-backed API client with logging hooks
//! - `controller`: the state controller that keeps a local view (task list,
//!   stats, forms) consistent with server state across user actions

pub mod controller;
pub mod http;

pub use controller::{TaskBoard, TaskForm};
pub use http::{ClientError, HttpTasksApi, TasksApi};
