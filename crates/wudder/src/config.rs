//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::EndpointUrl;

/// Default interval between proactive token refreshes.
pub const DEFAULT_REFRESH_INTERVAL_SECONDS: u64 = 900;

/// Default timeout for a single request attempt.
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Configuration for a [`Client`](crate::Client).
///
/// Every field has a default, so partial documents deserialize.
///
/// ```
/// use wudder::ClientConfig;
///
/// let config: ClientConfig = serde_json::from_str(r#"{"refresh_interval_seconds": 60}"#).unwrap();
/// assert_eq!(config.refresh_interval().as_secs(), 60);
/// assert_eq!(config.retry.max_attempts, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// GraphQL endpoint.
    pub endpoint: EndpointUrl,
    /// Seconds between background token refreshes.
    pub refresh_interval_seconds: u64,
    /// Seconds before a single request attempt is abandoned.
    pub request_timeout_seconds: u64,
    /// Retry behavior for every remote call.
    pub retry: RetrySettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointUrl::default(),
            refresh_interval_seconds: DEFAULT_REFRESH_INTERVAL_SECONDS,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            retry: RetrySettings::default(),
        }
    }
}

impl ClientConfig {
    /// Default configuration pointed at another endpoint.
    pub fn with_endpoint(endpoint: EndpointUrl) -> Self {
        Self {
            endpoint,
            ..Self::default()
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        // A zero interval would spin the refresh loop
        Duration::from_secs(self.refresh_interval_seconds.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.max(1))
    }
}

/// Serializable retry settings. See [`RetryPolicy`](crate::RetryPolicy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub multiplier: u32,
    pub max_elapsed_seconds: Option<u64>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 500,
            max_backoff_ms: 30_000,
            multiplier: 2,
            max_elapsed_seconds: Some(120),
        }
    }
}
