//! Thin HTTP wrapper over the task API.
//!
//! Adds request/response logging only: no retry, no backoff. Errors are
//! passed through unchanged to the caller.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::types::{DataResponse, MessageResponse, StatsSummary};
use crate::task::{Task, TaskPayload};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },
}

/// The five task calls plus the stats summary, abstracted so the state
/// controller can be driven by a test double.
#[async_trait]
pub trait TasksApi: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError>;
    async fn get_task(&self, id: i64) -> Result<Task, ClientError>;
    async fn create_task(&self, payload: &TaskPayload) -> Result<Task, ClientError>;
    async fn update_task(&self, id: i64, payload: &TaskPayload) -> Result<Task, ClientError>;
    async fn delete_task(&self, id: i64) -> Result<String, ClientError>;
    async fn stats(&self) -> Result<StatsSummary, ClientError>;
}

pub struct HttpTasksApi {
    client: Client,
    base_url: String,
}

impl HttpTasksApi {
    /// `base_url` includes the `/api` prefix, e.g. `http://localhost:3000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("API request: {} {}", method, url);
        self.client.request(method, url)
    }

    /// Send, surface non-2xx as `ClientError::Api` with the server's error
    /// string, and unwrap the `{success, data}` envelope.
    async fn send_for_data<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!("API error: {}", e);
            ClientError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = extract_error_message(response).await;
            tracing::error!("API error ({}): {}", status, message);
            return Err(ClientError::Api { status, message });
        }

        let envelope: DataResponse<T> = response.json().await?;
        Ok(envelope.data)
    }
}

/// Pull a human-readable message out of a failure body, whichever of the
/// two failure envelopes it uses.
async fn extract_error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body: serde_json::Value = match response.json().await {
        Ok(v) => v,
        Err(_) => return format!("HTTP {}", status),
    };

    if let Some(error) = body.get("error").and_then(|e| e.as_str()) {
        return error.to_string();
    }
    if let Some(errors) = body.get("errors").and_then(|e| e.as_array()) {
        let messages: Vec<&str> = errors
            .iter()
            .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
            .collect();
        if !messages.is_empty() {
            return messages.join("; ");
        }
    }
    format!("HTTP {}", status)
}

#[async_trait]
impl TasksApi for HttpTasksApi {
    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        self.send_for_data(self.request(Method::GET, "/tasks")).await
    }

    async fn get_task(&self, id: i64) -> Result<Task, ClientError> {
        self.send_for_data(self.request(Method::GET, &format!("/tasks/{}", id)))
            .await
    }

    async fn create_task(&self, payload: &TaskPayload) -> Result<Task, ClientError> {
        self.send_for_data(self.request(Method::POST, "/tasks").json(payload))
            .await
    }

    async fn update_task(&self, id: i64, payload: &TaskPayload) -> Result<Task, ClientError> {
        self.send_for_data(
            self.request(Method::PUT, &format!("/tasks/{}", id))
                .json(payload),
        )
        .await
    }

    async fn delete_task(&self, id: i64) -> Result<String, ClientError> {
        let builder = self.request(Method::DELETE, &format!("/tasks/{}", id));
        let response = builder.send().await.map_err(|e| {
            tracing::error!("API error: {}", e);
            ClientError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = extract_error_message(response).await;
            tracing::error!("API error ({}): {}", status, message);
            return Err(ClientError::Api { status, message });
        }

        // Delete is the one call whose envelope carries `message`, not `data`.
        let envelope: MessageResponse = response.json().await?;
        Ok(envelope.message)
    }

    async fn stats(&self) -> Result<StatsSummary, ClientError> {
        self.send_for_data(self.request(Method::GET, "/tasks/stats/summary"))
            .await
    }
}
