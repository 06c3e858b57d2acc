//! Structured error body returned by servers on failure.

use serde::{Deserialize, Serialize};

/// The JSON body servers send with most non-2xx responses.
///
/// ```json
/// { "error": "Record not found" }
/// ```
///
/// OAuth failures add a `error_description`. Forks that return HTML or an
/// empty body on error simply fail to decode into this type, and the client
/// falls back to the plain HTTP error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    /// Human-readable description of the problem.
    pub error: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl ApiErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_description: None,
        }
    }
}
