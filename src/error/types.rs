//! Core error types for the client runtime.
//!
//! Every failure a caller can observe is a [`ClientError`]. Backend failures
//! are normalized into the `Api` variant's `{status, detail}` shape: the
//! status falls back to [`FALLBACK_STATUS`] when the transport supplies none,
//! and the detail falls back to [`FALLBACK_DETAIL`] when the backend body
//! carries no usable message.

use serde_json::Value;

/// Sentinel status used when the transport layer supplies no HTTP status.
pub const FALLBACK_STATUS: u16 = 500;

/// Generic detail message used when the backend supplies none.
pub const FALLBACK_DETAIL: &str = "Something went wrong";

/// Unified error type for all client operations.
///
/// `Clone` is required so the cache can hand one failed result to every
/// caller that joined an in-flight fetch.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// A non-2xx backend response, normalized to `{status, detail}`.
    ///
    /// `body` carries the backend's raw error payload where the call kind
    /// passes it through (reads and binary writes); JSON writes normalize to
    /// the mapping alone and leave it `None`.
    #[error("API error {status}: {detail}")]
    Api {
        status: u16,
        detail: String,
        body: Option<Value>,
    },

    /// Transport-level failure: network unreachable, timeout, TLS, etc.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body did not decode as the expected shape.
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The caller cancelled the request before it completed.
    #[error("request cancelled")]
    Cancelled,
}

impl ClientError {
    /// Create an API error with a status and detail message.
    pub fn api(status: u16, detail: impl Into<String>) -> Self {
        Self::Api {
            status,
            detail: detail.into(),
            body: None,
        }
    }

    /// Create an API error that retains the backend's raw payload.
    pub fn api_with_body(status: u16, detail: impl Into<String>, body: Value) -> Self {
        Self::Api {
            status,
            detail: detail.into(),
            body: Some(body),
        }
    }

    /// HTTP status of the failure, if the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Normalize a failed read. Prefers the backend's structured payload:
    /// a string `detail` field becomes the message and the full payload is
    /// retained, otherwise the generic fallback applies.
    pub(crate) fn read_failure(status: u16, body_text: &str) -> Self {
        match serde_json::from_str::<Value>(body_text) {
            Ok(payload) => Self::Api {
                status,
                detail: detail_of(&payload).unwrap_or_else(|| FALLBACK_DETAIL.to_string()),
                body: Some(payload),
            },
            Err(_) => Self::api(status, FALLBACK_DETAIL),
        }
    }

    /// Normalize a failed JSON write to the strict `{status, detail}`
    /// mapping. The raw payload is intentionally not retained.
    pub(crate) fn write_failure(status: u16, body_text: &str) -> Self {
        let detail = serde_json::from_str::<Value>(body_text)
            .ok()
            .and_then(|payload| detail_of(&payload))
            .unwrap_or_else(|| FALLBACK_DETAIL.to_string());
        Self::api(status, detail)
    }

    /// Normalize a failed binary write: the backend's error payload passes
    /// through as-is, with a best-effort detail extracted from it.
    pub(crate) fn payload_failure(status: u16, body_text: &str) -> Self {
        let payload = serde_json::from_str::<Value>(body_text)
            .unwrap_or_else(|_| Value::String(body_text.to_string()));
        let detail = detail_of(&payload).unwrap_or_else(|| FALLBACK_DETAIL.to_string());
        Self::api_with_body(status, detail, payload)
    }
}

fn detail_of(payload: &Value) -> Option<String> {
    payload
        .get("detail")
        .and_then(Value::as_str)
        .map(str::to_string)
}
