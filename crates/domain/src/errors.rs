//! Error types used throughout the connector

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a failed connector call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Local precondition failure, nothing was sent
    InvalidArgument,
    /// Server unreachable or transport misconfigured
    ConnectionSetup,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 400 and 409
    Conflict,
    /// Any other non-2xx status
    GenericRequest,
    /// 2xx body did not match the expected shape
    Deserialization,
    /// Endpoint or credentials missing
    Configuration,
}

impl ErrorKind {
    /// Whether the error was raised without the server answering a request
    pub fn is_local(&self) -> bool {
        matches!(self, Self::InvalidArgument | Self::Configuration | Self::Deserialization)
    }

    /// Stable label for logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::ConnectionSetup => "connection_setup",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::GenericRequest => "generic_request",
            Self::Deserialization => "deserialization",
            Self::Configuration => "configuration",
        }
    }
}

/// Main error type for the connector
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OsiamError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cannot connect to server: {0}")]
    ConnectionSetup(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Request failed with HTTP status {status}: {message}")]
    Request { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl OsiamError {
    /// Get the classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::ConnectionSetup(_) => ErrorKind::ConnectionSetup,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Request { .. } => ErrorKind::GenericRequest,
            Self::Deserialization(_) => ErrorKind::Deserialization,
            Self::Config(_) => ErrorKind::Configuration,
        }
    }

    /// The human-readable message, without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(message)
            | Self::ConnectionSetup(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::Deserialization(message)
            | Self::Config(message) => message,
            Self::Request { message, .. } => message,
        }
    }

    /// HTTP status carried by the error, when it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Request { status, .. } => Some(*status),
            // Conflict covers both 400 and 409
            _ => None,
        }
    }
}

/// Result type alias for connector operations
pub type Result<T> = std::result::Result<T, OsiamError>;
