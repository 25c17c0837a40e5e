//! Transport registry.
//!
//! One configured HTTP transport per backend origin, plus the single entry
//! point that keeps bearer-token authentication in sync across all of them.
//!
//! The registry is an explicit object owned by the application root and
//! passed by reference to everything that issues calls. Tests construct
//! fixture registries directly from a [`RegistryConfig`].

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use std::sync::RwLock;

use crate::config::RegistryConfig;
use crate::error::ClientError;

/// Symbolic name of a backend origin.
///
/// The set is closed; anything outside it resolves to [`Origin::Main`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Origin {
    /// Primary application backend.
    #[default]
    Main,
    /// Webhook-ingestion backend.
    Webhook,
    /// Public (unauthenticated surface) backend.
    Public,
}

impl Origin {
    /// Resolve an origin from its symbolic name. Unrecognized names resolve
    /// to `Main`; resolution is total over the input domain.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "webhook" => Self::Webhook,
            "public" => Self::Public,
            _ => Self::Main,
        }
    }

    /// Canonical name of this origin.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Webhook => "webhook",
            Self::Public => "public",
        }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical backend origin: a base address, an HTTP client, and the
/// mutable default-header set holding at most the Authorization header.
///
/// Created once at registry construction and never destroyed; headers are
/// mutated only through [`ClientRegistry::set_credential`].
pub struct Transport {
    origin: Origin,
    base_url: String,
    http: reqwest::Client,
    default_headers: RwLock<HeaderMap>,
}

impl Transport {
    fn new(origin: Origin, base_url: String, http: reqwest::Client) -> Self {
        Self {
            origin,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            default_headers: RwLock::new(HeaderMap::new()),
        }
    }

    /// The origin this transport is bound to.
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// The configured base address, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Full URL for a request path (which may already carry a query string).
    pub(crate) fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Snapshot of the current default headers. A poisoned store degrades
    /// to an empty set rather than failing the call.
    pub(crate) fn default_headers(&self) -> HeaderMap {
        match self.default_headers.read() {
            Ok(headers) => headers.clone(),
            Err(_) => HeaderMap::new(),
        }
    }

    /// Set or clear the Authorization header. A poisoned store degrades to
    /// a no-op for this transport.
    fn set_authorization(&self, value: Option<HeaderValue>) {
        let Ok(mut headers) = self.default_headers.write() else {
            return;
        };
        match value {
            Some(value) => {
                headers.insert(AUTHORIZATION, value);
            }
            None => {
                headers.remove(AUTHORIZATION);
            }
        }
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("origin", &self.origin)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Registry of the three per-origin transports.
#[derive(Debug)]
pub struct ClientRegistry {
    main: Transport,
    webhook: Transport,
    public: Transport,
}

impl ClientRegistry {
    /// Build the registry from explicit configuration.
    pub fn new(config: RegistryConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        tracing::info!(
            main = %config.main_url,
            webhook = %config.webhook_url,
            public = %config.public_url,
            "configured API origins"
        );

        Ok(Self {
            main: Transport::new(Origin::Main, config.main_url, http.clone()),
            webhook: Transport::new(Origin::Webhook, config.webhook_url, http.clone()),
            public: Transport::new(Origin::Public, config.public_url, http),
        })
    }

    /// Build the registry from the process environment.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(RegistryConfig::from_env()?)
    }

    /// Look up the transport for an origin. Resolution is total: every
    /// origin has exactly one transport.
    pub fn transport(&self, origin: Origin) -> &Transport {
        match origin {
            Origin::Main => &self.main,
            Origin::Webhook => &self.webhook,
            Origin::Public => &self.public,
        }
    }

    pub(crate) fn transports(&self) -> [&Transport; 3] {
        [&self.main, &self.webhook, &self.public]
    }

    /// Set or clear the bearer credential on every transport.
    ///
    /// With a non-empty token, every transport carries
    /// `Authorization: Bearer <token>` when this returns; with `None` or an
    /// empty token, none does. The sweep contains no await point, so callers
    /// that serialize through this entry point never observe partial
    /// application.
    pub fn set_credential(&self, token: Option<SecretString>) {
        let value = token.as_ref().and_then(|token| {
            let token = token.expose_secret();
            if token.is_empty() {
                return None;
            }
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    Some(value)
                }
                Err(_) => {
                    tracing::warn!("credential contains invalid header characters; clearing");
                    None
                }
            }
        });

        for transport in self.transports() {
            transport.set_authorization(value.clone());
        }
    }
}
