//! Origin configuration.
//!
//! The registry is built from three backend base addresses, one per
//! [`Origin`](crate::registry::Origin). They can be supplied explicitly or
//! read from the process environment at startup.

use std::time::Duration;

use crate::error::ClientError;

/// Environment variable holding the main origin's base URL.
pub const ENV_BASE_MAIN: &str = "POSTDESK_API_BASE_MAIN";
/// Environment variable holding the webhook origin's base URL.
pub const ENV_BASE_WEBHOOK: &str = "POSTDESK_API_BASE_WEBHOOK";
/// Environment variable holding the public origin's base URL.
pub const ENV_BASE_PUBLIC: &str = "POSTDESK_API_BASE_PUBLIC";

/// Configuration for a [`ClientRegistry`](crate::registry::ClientRegistry).
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Base URL of the main backend origin.
    pub main_url: String,
    /// Base URL of the webhook backend origin.
    pub webhook_url: String,
    /// Base URL of the public backend origin.
    pub public_url: String,
    /// Optional request timeout applied to every transport. A timed-out
    /// call surfaces as a transport failure like any other.
    pub timeout: Option<Duration>,
}

impl RegistryConfig {
    /// Create a configuration from three explicit base URLs.
    pub fn new(
        main_url: impl Into<String>,
        webhook_url: impl Into<String>,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            main_url: main_url.into(),
            webhook_url: webhook_url.into(),
            public_url: public_url.into(),
            timeout: None,
        }
    }

    /// Set the per-request timeout for all transports.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read the three base URLs from the process environment.
    pub fn from_env() -> Result<Self, ClientError> {
        Ok(Self::new(
            require_env(ENV_BASE_MAIN)?,
            require_env(ENV_BASE_WEBHOOK)?,
            require_env(ENV_BASE_PUBLIC)?,
        ))
    }
}

fn require_env(key: &str) -> Result<String, ClientError> {
    if let Ok(value) = std::env::var(key)
        && !value.trim().is_empty()
    {
        return Ok(value);
    }
    Err(ClientError::Config(format!(
        "origin base URL is required (missing {key})"
    )))
}
