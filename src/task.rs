//! Task entity and request-body validation.
//!
//! Status and priority are closed enums: anything coming over the wire or
//! out of storage must parse into one of the listed values. Defaulting of
//! omitted fields (empty description, pending status, medium priority)
//! happens in exactly one place, [`TaskPayload::validate`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The sole persisted entity: a titled work item with status and priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Set once by the storage engine at row creation
    pub created_at: String,
    /// Refreshed by the store on every update
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in-progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(ParseEnumError {
                field: "status",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(ParseEnumError {
                field: "priority",
                value: s.to_string(),
            }),
        }
    }
}

/// A string that is not one of the enumerated values for its field.
#[derive(Debug, Clone, Error)]
#[error("invalid {field} value: {value:?}")]
pub struct ParseEnumError {
    pub field: &'static str,
    pub value: String,
}

/// One field-level validation failure, as surfaced in 400 responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Request body for create and update. All fields optional at the wire
/// level so validation can report missing ones itself instead of failing
/// deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

/// A validated, fully-defaulted task body ready for the store.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
}

impl TaskPayload {
    /// Validate and apply defaults. Collects every field failure rather
    /// than stopping at the first one.
    pub fn validate(&self) -> Result<TaskDraft, Vec<FieldError>> {
        let mut errors = Vec::new();

        let title = self.title.as_deref().unwrap_or("").trim().to_string();
        if title.is_empty() {
            errors.push(FieldError::new("title", "Title is required"));
        }

        let description = self
            .description
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_string();

        let status = match self.status.as_deref() {
            None => TaskStatus::Pending,
            Some(s) => s.parse().unwrap_or_else(|_| {
                errors.push(FieldError::new("status", "Invalid status"));
                TaskStatus::Pending
            }),
        };

        let priority = match self.priority.as_deref() {
            None => TaskPriority::Medium,
            Some(s) => s.parse().unwrap_or_else(|_| {
                errors.push(FieldError::new("priority", "Invalid priority"));
                TaskPriority::Medium
            }),
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(TaskDraft {
            title,
            description,
            status,
            priority,
        })
    }
}
