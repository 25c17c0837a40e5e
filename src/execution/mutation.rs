//! Write path.
//!
//! Builds and issues POST/PUT/PATCH/DELETE requests against a selected
//! origin. JSON and binary bodies normalize failures differently and both
//! shapes are observable contract (see `ClientError::write_failure` vs
//! `ClientError::payload_failure`).

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

use crate::error::{ClientError, FALLBACK_DETAIL, FALLBACK_STATUS};
use crate::execution::run_cancellable;
use crate::registry::{ClientRegistry, Origin};
use crate::utils::cancel::CancelHandle;

/// Body of one outbound write.
#[derive(Debug, Clone)]
pub enum MutationBody {
    /// JSON-serializable payload.
    Json(serde_json::Value),
    /// Raw binary/file payload. Declared `application/json` on the wire for
    /// compatibility with the existing backend contract.
    Binary(Bytes),
}

impl From<serde_json::Value> for MutationBody {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<Bytes> for MutationBody {
    fn from(bytes: Bytes) -> Self {
        Self::Binary(bytes)
    }
}

/// One outbound write: target path, HTTP method, body, origin.
#[derive(Debug, Clone)]
pub struct MutationRequest {
    pub url: String,
    pub method: Method,
    pub body: MutationBody,
    pub origin: Origin,
    pub cancel: Option<CancelHandle>,
}

impl MutationRequest {
    /// Create a write request. `method` is one of POST/PUT/PATCH/DELETE.
    pub fn new(method: Method, url: impl Into<String>, body: impl Into<MutationBody>) -> Self {
        Self {
            url: url.into(),
            method,
            body: body.into(),
            origin: Origin::default(),
            cancel: None,
        }
    }

    /// Shorthand for the dominant verb.
    pub fn post(url: impl Into<String>, body: impl Into<MutationBody>) -> Self {
        Self::new(Method::POST, url, body)
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

impl ClientRegistry {
    /// Issue a write against the selected origin and decode the 2xx body as
    /// `T`.
    ///
    /// Failure normalization diverges by body kind:
    /// - JSON bodies always fail with the strict `{status, detail}` mapping
    ///   (status 500 and the generic detail when the transport supplies
    ///   nothing better).
    /// - Binary bodies pass the backend's raw error payload through.
    pub async fn mutate<T: DeserializeOwned>(
        &self,
        request: MutationRequest,
    ) -> Result<T, ClientError> {
        let transport = self.transport(request.origin);
        let url = transport.endpoint(&request.url);
        let request_id = uuid::Uuid::new_v4();
        tracing::debug!(
            %request_id,
            origin = %transport.origin(),
            method = %request.method,
            url = %url,
            "mutation"
        );

        let headers = transport.default_headers();
        let builder = transport
            .http()
            .request(request.method.clone(), &url)
            .headers(headers)
            .header(CONTENT_TYPE, "application/json");
        let builder = match &request.body {
            MutationBody::Json(value) => builder.json(value),
            MutationBody::Binary(bytes) => builder.body(bytes.clone()),
        };

        let operation = async {
            let response = builder.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(%request_id, status = status.as_u16(), "write failed");
                return Err(match &request.body {
                    MutationBody::Json(_) => ClientError::write_failure(status.as_u16(), &body),
                    MutationBody::Binary(_) => ClientError::payload_failure(status.as_u16(), &body),
                });
            }
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        };

        let result = run_cancellable(operation, request.cancel.as_ref()).await;
        match result {
            // JSON writes normalize transport failures to the sentinel
            // mapping; binary writes surface them as-is.
            Err(ClientError::Http(message)) if matches!(request.body, MutationBody::Json(_)) => {
                tracing::warn!(%request_id, error = %message, "transport failure during JSON mutation");
                Err(ClientError::api(FALLBACK_STATUS, FALLBACK_DETAIL))
            }
            other => other,
        }
    }
}
