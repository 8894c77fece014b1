//! Connector constants
//!
//! Centralized location for the wire-level and tuning constants shared by the
//! domain and infrastructure crates.

// Endpoint derivation
pub const AUTH_SERVER_SUFFIX: &str = "osiam-auth-server/";
pub const RESOURCE_SERVER_SUFFIX: &str = "osiam-resource-server";
pub const NO_ENDPOINT_MESSAGE: &str = "No endpoint to the OSIAM server has been set";

// Transport defaults (process-wide)
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2500;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_MAX_CONNECTIONS: usize = 40;
pub const DEFAULT_MAX_CONNECTIONS_PER_ROUTE: usize = 20;

// Query defaults
pub const DEFAULT_START_INDEX: u64 = 1;
pub const DEFAULT_COUNT: u64 = 100;
pub const FETCH_ALL_COUNT: u64 = i32::MAX as u64;

// OAuth client defaults
pub const GRANT_AUTHORIZATION_CODE: &str = "authorization_code";
pub const GRANT_REFRESH_TOKEN: &str = "refresh-token";

// Wire
pub const BEARER_PREFIX: &str = "Bearer ";
pub const CURRENT_USER_PATH: &str = "Me";
pub const BASIC_USER_PATH: &str = "me";
