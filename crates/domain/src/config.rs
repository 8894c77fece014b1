//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_MAX_CONNECTIONS, DEFAULT_MAX_CONNECTIONS_PER_ROUTE,
    DEFAULT_READ_TIMEOUT_MS,
};
use crate::errors::{OsiamError, Result};

/// Connector configuration
///
/// Every field is optional. Endpoints are checked lazily when a client is
/// first used, never while loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    #[serde(flatten)]
    pub endpoints: EndpointConfig,
    pub client_id: Option<String>,
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,
    pub client_redirect_uri: Option<String>,
    pub transport: TransportSettings,
}

/// Endpoint configuration: one generic base URL, or explicit overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Generic base URL; auth and resource URLs are derived from it
    pub endpoint: Option<String>,
    pub auth_endpoint: Option<String>,
    pub resource_endpoint: Option<String>,
}

impl EndpointConfig {
    pub fn generic(endpoint: impl Into<String>) -> Self {
        Self { endpoint: Some(endpoint.into()), ..Default::default() }
    }

    pub fn split(auth_endpoint: impl Into<String>, resource_endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: None,
            auth_endpoint: Some(auth_endpoint.into()),
            resource_endpoint: Some(resource_endpoint.into()),
        }
    }

    /// True when no endpoint of any kind is set
    pub fn is_empty(&self) -> bool {
        [&self.endpoint, &self.auth_endpoint, &self.resource_endpoint]
            .iter()
            .all(|value| value.as_deref().map_or(true, str::is_empty))
    }
}

/// Process-wide HTTP transport tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub max_connections: usize,
    pub max_connections_per_route: usize,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            max_connections_per_route: DEFAULT_MAX_CONNECTIONS_PER_ROUTE,
        }
    }
}

impl TransportSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Reject zero timeouts and pool sizes
    ///
    /// # Errors
    /// Returns `OsiamError::InvalidArgument` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("connect_timeout_ms", self.connect_timeout_ms == 0),
            ("read_timeout_ms", self.read_timeout_ms == 0),
            ("max_connections", self.max_connections == 0),
            ("max_connections_per_route", self.max_connections_per_route == 0),
        ];
        match checks.iter().find(|(_, is_zero)| *is_zero) {
            Some((field, _)) => {
                Err(OsiamError::InvalidArgument(format!("{field} must be greater than zero")))
            }
            None => Ok(()),
        }
    }
}
