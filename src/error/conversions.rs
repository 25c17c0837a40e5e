//! Type Conversions for ClientError
//!
//! From trait implementations for converting common error types into
//! ClientError.

use super::types::ClientError;

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
