//! # OSIAM Domain
//!
//! Data types for the OSIAM connector.
//!
//! This crate contains:
//! - Resource types (User, Group, OauthClient) and the search envelope
//! - Access tokens, scopes and search queries
//! - Error types and Result definitions
//! - Configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other connector crates
//! - No I/O; everything that talks to a server lives in `osiam-infra`

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
