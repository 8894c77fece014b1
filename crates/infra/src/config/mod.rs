//! Configuration loading
//!
//! Reads [`osiam_domain::ConnectorConfig`] from environment variables or
//! files and applies its transport section to the shared transport.

pub mod loader;

pub use loader::{
    apply_transport_settings, load, load_from_env, load_from_file, parse_config,
    find_config_file,
};
