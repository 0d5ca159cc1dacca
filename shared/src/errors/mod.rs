//! Shared error response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standard error response structure handed to the transport layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for client identification
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Whether the caller may retry the same request
    #[serde(default)]
    pub retryable: bool,

    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            retryable: false,
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Mark the response as retryable
    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Add a detail field to the error response
    pub fn add_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let details = self.details.get_or_insert_with(HashMap::new);
        if let Ok(json_value) = serde_json::to_value(value) {
            details.insert(key.into(), json_value);
        }
        self
    }
}

/// Error codes shared with the transport layer
pub mod error_codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const CONFLICT: &str = "CONFLICT";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const SERVICE_UNAVAILABLE: &str = "SERVICE_UNAVAILABLE";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Trait for converting errors to ErrorResponse
pub trait IntoErrorResponse {
    fn to_error_response(&self) -> ErrorResponse;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_details() {
        let response = ErrorResponse::new(error_codes::CONFLICT, "duplicate")
            .add_detail("field", "email");
        assert_eq!(response.error, "CONFLICT");
        assert!(!response.retryable);
        assert_eq!(response.details.unwrap()["field"], "email");
    }

    #[test]
    fn test_retryable_flag_serializes() {
        let response = ErrorResponse::new(error_codes::SERVICE_UNAVAILABLE, "ledger down")
            .retryable(true);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["retryable"], true);
        assert!(json.get("details").is_none());
    }
}
