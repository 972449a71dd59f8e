//! # Taskboard
//!
//! A minimal task tracker: a REST API over a single SQLite table, plus a
//! client-side state controller used by the terminal client.
//!
//! ## Modules
//! - `task`: the `Task` entity, its closed status/priority enums, and
//!   request-body validation
//! - `store`: the `TaskStore` trait with SQLite and in-memory backends
//! - `api`: axum routes, response envelopes, and the HTTP server
//! - `client`: the reqwest API client and the state controller that mirrors
//!   server state across user actions
//! - `config`: environment-driven configuration for both binaries

pub mod api;
pub mod client;
pub mod config;
pub mod store;
pub mod task;
