//! Read path.
//!
//! Two entry points share one request core: [`ClientRegistry::query`] for
//! interactive callers (ambient credential, failures returned as errors) and
//! [`ClientRegistry::query_server`] for request-scoped callers (explicit
//! per-call credential, failures reified into a [`ServerResponse`] so the
//! surrounding control flow never breaks).

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::execution::encoding::QueryParams;
use crate::execution::run_cancellable;
use crate::registry::{ClientRegistry, Origin, Transport};
use crate::utils::cancel::CancelHandle;

/// One outbound read: target path, optional structured parameters, origin.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub url: String,
    pub params: Option<QueryParams>,
    pub origin: Origin,
    pub cancel: Option<CancelHandle>,
}

impl QueryRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Path with the encoded query string appended only when non-empty.
    fn target(&self) -> String {
        match &self.params {
            Some(params) if !params.is_empty() => {
                format!("{}?{}", self.url, params.encode())
            }
            _ => self.url.clone(),
        }
    }
}

/// Non-failing result envelope for request-scoped reads.
///
/// Exactly one of `data` / `error` is present: success is
/// `{data: Some, is_error: false, error: None}`, failure is
/// `{data: None, is_error: true, error: Some}`.
#[derive(Debug)]
pub struct ServerResponse<T> {
    pub data: Option<T>,
    pub is_error: bool,
    pub error: Option<ClientError>,
}

impl<T> ServerResponse<T> {
    fn success(data: T) -> Self {
        Self {
            data: Some(data),
            is_error: false,
            error: None,
        }
    }

    fn failure(error: ClientError) -> Self {
        Self {
            data: None,
            is_error: true,
            error: Some(error),
        }
    }
}

impl ClientRegistry {
    /// Issue a GET against the selected origin with its ambient default
    /// headers and decode the 2xx body as `T`.
    ///
    /// Non-2xx responses normalize through the backend's structured error
    /// payload when present; transport failures surface as
    /// [`ClientError::Http`].
    pub async fn query<T: DeserializeOwned>(
        &self,
        request: QueryRequest,
    ) -> Result<T, ClientError> {
        let transport = self.transport(request.origin);
        let headers = transport.default_headers();
        execute_get(transport, &request, headers).await
    }

    /// Request-scoped variant of [`query`](Self::query): the bearer
    /// credential is supplied per call instead of read from ambient
    /// transport state, and the result is always a [`ServerResponse`].
    ///
    /// This is the entry point for execution contexts where no prior
    /// [`set_credential`](Self::set_credential) call has occurred, e.g. a
    /// token extracted from an inbound request's session cookie.
    pub async fn query_server<T: DeserializeOwned>(
        &self,
        request: QueryRequest,
        token: Option<&str>,
    ) -> ServerResponse<T> {
        let transport = self.transport(request.origin);
        let mut headers = transport.default_headers();
        if let Some(token) = token
            && !token.is_empty()
            && let Ok(mut value) = HeaderValue::from_str(&format!("Bearer {token}"))
        {
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        match execute_get(transport, &request, headers).await {
            Ok(data) => ServerResponse::success(data),
            Err(error) => {
                tracing::warn!(url = %request.url, error = %error, "server-context query failed");
                ServerResponse::failure(error)
            }
        }
    }
}

async fn execute_get<T: DeserializeOwned>(
    transport: &Transport,
    request: &QueryRequest,
    headers: HeaderMap,
) -> Result<T, ClientError> {
    let url = transport.endpoint(&request.target());
    let request_id = uuid::Uuid::new_v4();
    tracing::debug!(%request_id, origin = %transport.origin(), url = %url, "GET");

    let operation = async {
        let response = transport.http().get(&url).headers(headers).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%request_id, status = status.as_u16(), "read failed");
            return Err(ClientError::read_failure(status.as_u16(), &body));
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    };

    run_cancellable(operation, request.cancel.as_ref()).await
}
