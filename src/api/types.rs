//! Response envelope types shared by the server and the API client.
//!
//! Every success body is `{success: true, data: ...}` (or `message` for
//! delete); generic failures are `{success: false, error: ...}`; validation
//! failures are a bare `{errors: [...]}`. Clients depend on exactly this
//! shape, asymmetry included.

use crate::task::FieldError;
use serde::{Deserialize, Serialize};

/// `{success: true, data: ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// `{success: true, message: ...}` - used by delete only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// `{success: false, error: ...}` - not-found and storage faults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// `{errors: [{field, message}, ...]}` - validation failures only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

/// Aggregate counts of tasks per status, plus a grand total. Every key is
/// present even when zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total: i64,
    pub pending: i64,
    #[serde(rename = "in-progress")]
    pub in_progress: i64,
    pub completed: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}
