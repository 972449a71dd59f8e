//! Configuration management.
//!
//! Server configuration comes from environment variables:
//! - `DATABASE_PATH` - Optional. SQLite database file. Defaults to `taskboard.sqlite`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//!
//! The client binary reads:
//! - `TASKBOARD_API_URL` - Optional. API base URL. Defaults to `http://localhost:3000/api`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file location
    pub database_path: PathBuf,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_path = std::env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("taskboard.sqlite"));

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        Ok(Self {
            database_path,
            host,
            port,
        })
    }
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the task API, including the `/api` prefix
    pub api_base_url: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let api_base_url = std::env::var("TASKBOARD_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000/api".to_string());
        Self { api_base_url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_config_default_base_url() {
        std::env::remove_var("TASKBOARD_API_URL");
        let config = ClientConfig::from_env();
        assert_eq!(config.api_base_url, "http://localhost:3000/api");
    }
}
