//! # OSIAM Infrastructure
//!
//! Blocking HTTP client for OSIAM auth and resource servers.
//!
//! This crate contains:
//! - The connector facade and its lazily built sub-clients
//! - A generic SCIM resource client (users, groups, OAuth clients)
//! - The OAuth2 session client (grants, validation, revocation)
//! - Mapping of error responses onto domain errors
//! - The pooled, process-wide HTTP transport
//! - Configuration loading
//!
//! ## Architecture
//! - Domain types and errors live in `osiam-domain`
//! - Everything here performs I/O

pub mod auth;
pub mod config;
pub mod connector;
pub mod endpoint;
pub mod errors;
pub mod http;
pub mod resource;

// Re-export commonly used items
pub use auth::{AuthService, ClientCredentials};
pub use connector::{OsiamConnector, OsiamConnectorBuilder};
pub use endpoint::EndpointResolver;
pub use errors::{InfraError, ResponseErrorMapper};
pub use http::{
    set_connect_timeout, set_max_connections, set_max_connections_per_route, set_read_timeout,
    HttpTransport, RawResponse,
};
pub use resource::ResourceClient;
