//! Configuration loader
//!
//! Loads connector configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Environment variables, when at least one endpoint variable is set
//! 2. Otherwise a config file, searched for in the standard locations
//! 3. JSON and TOML are both accepted (detected by extension)
//!
//! ## Environment Variables
//! - `OSIAM_ENDPOINT`: Generic base URL of the OSIAM installation
//! - `OSIAM_AUTH_ENDPOINT`: Explicit auth server URL
//! - `OSIAM_RESOURCE_ENDPOINT`: Explicit resource server URL
//! - `OSIAM_CLIENT_ID`: OAuth client id
//! - `OSIAM_CLIENT_SECRET`: OAuth client secret
//! - `OSIAM_REDIRECT_URI`: Redirect URI for the authorization-code grant
//! - `OSIAM_CONNECT_TIMEOUT_MS`: Connect timeout in milliseconds
//! - `OSIAM_READ_TIMEOUT_MS`: Read timeout in milliseconds
//! - `OSIAM_MAX_CONNECTIONS`: Maximum requests in flight
//! - `OSIAM_MAX_CONNECTIONS_PER_ROUTE`: Maximum idle connections per host
//!
//! ## File Locations
//! The loader checks the following paths (in order):
//! 1. `./osiam.toml`, `./osiam.json`, `./config.toml`, `./config.json`
//! 2. The same names one and two directories up
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use osiam_domain::{ConnectorConfig, EndpointConfig, OsiamError, Result, TransportSettings};

use crate::http::HttpTransport;

const CONFIG_FILE_NAMES: &[&str] = &["osiam.toml", "osiam.json", "config.toml", "config.json"];
const SEARCH_PREFIXES: &[&str] = &["", "..", "../.."];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `OsiamError::Config` if neither source yields a configuration,
/// a file cannot be parsed, or an environment value is malformed.
pub fn load() -> Result<ConnectorConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// At least one of `OSIAM_ENDPOINT`, `OSIAM_AUTH_ENDPOINT` and
/// `OSIAM_RESOURCE_ENDPOINT` must be set. Unset transport variables keep
/// their defaults.
///
/// # Errors
/// Returns `OsiamError::Config` if no endpoint variable is set or a numeric
/// variable does not parse.
pub fn load_from_env() -> Result<ConnectorConfig> {
    let endpoints = EndpointConfig {
        endpoint: env_opt("OSIAM_ENDPOINT"),
        auth_endpoint: env_opt("OSIAM_AUTH_ENDPOINT"),
        resource_endpoint: env_opt("OSIAM_RESOURCE_ENDPOINT"),
    };
    if endpoints.is_empty() {
        return Err(OsiamError::Config(
            "Missing required environment variable: OSIAM_ENDPOINT".to_string(),
        ));
    }

    let defaults = TransportSettings::default();
    let transport = TransportSettings {
        connect_timeout_ms: env_number("OSIAM_CONNECT_TIMEOUT_MS", defaults.connect_timeout_ms)?,
        read_timeout_ms: env_number("OSIAM_READ_TIMEOUT_MS", defaults.read_timeout_ms)?,
        max_connections: env_number("OSIAM_MAX_CONNECTIONS", defaults.max_connections)?,
        max_connections_per_route: env_number(
            "OSIAM_MAX_CONNECTIONS_PER_ROUTE",
            defaults.max_connections_per_route,
        )?,
    };

    Ok(ConnectorConfig {
        endpoints,
        client_id: env_opt("OSIAM_CLIENT_ID"),
        client_secret: env_opt("OSIAM_CLIENT_SECRET"),
        client_redirect_uri: env_opt("OSIAM_REDIRECT_URI"),
        transport,
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations via
/// [`find_config_file`].
///
/// # Errors
/// Returns `OsiamError::Config` if the file is missing, unreadable, or not
/// valid JSON/TOML.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ConnectorConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(OsiamError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            OsiamError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| OsiamError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content; format follows the extension
///
/// # Errors
/// Returns `OsiamError::Config` if the format is unsupported or parsing fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<ConnectorConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| OsiamError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| OsiamError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(OsiamError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// First existing config file among the standard locations
pub fn find_config_file() -> Option<PathBuf> {
    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        roots.push(exe_dir);
    }

    roots
        .iter()
        .flat_map(|root| {
            SEARCH_PREFIXES.iter().flat_map(move |prefix| {
                CONFIG_FILE_NAMES.iter().map(move |name| root.join(prefix).join(name))
            })
        })
        .find(|path| path.exists())
}

/// Push the transport section into the process-wide transport
///
/// Affects every connector in the process that does not carry its own
/// transport.
///
/// # Errors
/// Returns `OsiamError::InvalidArgument` for zero values; the shared
/// transport keeps its previous settings in that case.
pub fn apply_transport_settings(config: &ConnectorConfig) -> Result<()> {
    HttpTransport::shared()?.apply_settings(config.transport)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn env_number<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| OsiamError::Config(format!("Invalid value for {}: {}", key, e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: &[&str] = &[
        "OSIAM_ENDPOINT",
        "OSIAM_AUTH_ENDPOINT",
        "OSIAM_RESOURCE_ENDPOINT",
        "OSIAM_CLIENT_ID",
        "OSIAM_CLIENT_SECRET",
        "OSIAM_REDIRECT_URI",
        "OSIAM_CONNECT_TIMEOUT_MS",
        "OSIAM_READ_TIMEOUT_MS",
        "OSIAM_MAX_CONNECTIONS",
        "OSIAM_MAX_CONNECTIONS_PER_ROUTE",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("OSIAM_ENDPOINT", "http://localhost:8080");
        std::env::set_var("OSIAM_CLIENT_ID", "example-client");
        std::env::set_var("OSIAM_CLIENT_SECRET", "secret");
        std::env::set_var("OSIAM_REDIRECT_URI", "http://localhost:5000/oauth2");
        std::env::set_var("OSIAM_CONNECT_TIMEOUT_MS", "1000");
        std::env::set_var("OSIAM_READ_TIMEOUT_MS", "3000");
        std::env::set_var("OSIAM_MAX_CONNECTIONS", "8");
        std::env::set_var("OSIAM_MAX_CONNECTIONS_PER_ROUTE", "4");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.endpoints.endpoint.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.client_id.as_deref(), Some("example-client"));
        assert_eq!(config.client_secret.as_deref(), Some("secret"));
        assert_eq!(config.transport.connect_timeout_ms, 1000);
        assert_eq!(config.transport.read_timeout_ms, 3000);
        assert_eq!(config.transport.max_connections, 8);
        assert_eq!(config.transport.max_connections_per_route, 4);
    }

    #[test]
    fn test_load_from_env_requires_endpoint() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("OSIAM_CLIENT_ID", "example-client");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(OsiamError::Config(_))));
    }

    #[test]
    fn test_load_from_env_defaults_transport() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("OSIAM_RESOURCE_ENDPOINT", "http://resources:8080/");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.endpoints.endpoint, None);
        assert_eq!(config.transport, TransportSettings::default());
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("OSIAM_ENDPOINT", "http://localhost:8080");
        std::env::set_var("OSIAM_READ_TIMEOUT_MS", "soon");

        let result = load_from_env();
        clear_env();

        let err = result.unwrap_err();
        assert!(matches!(err, OsiamError::Config(_)));
        assert!(err.to_string().contains("OSIAM_READ_TIMEOUT_MS"));
    }

    #[test]
    fn test_load_from_file_toml() {
        let toml_content = r#"
endpoint = "http://localhost:8080"
client_id = "example-client"

[transport]
read_timeout_ms = 9000
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("toml");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let config = load_from_file(Some(path.clone())).expect("config from TOML");
        assert_eq!(config.endpoints.endpoint.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.transport.read_timeout_ms, 9000);
        assert_eq!(config.transport.connect_timeout_ms, 2500);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/osiam.json")));
        assert!(matches!(result, Err(OsiamError::Config(_))));
    }

    #[test]
    fn test_parse_config_json() {
        let json_content = r#"{
            "auth_endpoint": "http://auth:8080/",
            "resource_endpoint": "http://resources:8080/",
            "client_secret": "secret"
        }"#;

        let config = parse_config(json_content, Path::new("osiam.json")).expect("valid JSON");
        assert_eq!(config.endpoints.auth_endpoint.as_deref(), Some("http://auth:8080/"));
        assert_eq!(config.client_secret.as_deref(), Some("secret"));
    }

    #[test]
    fn test_parse_config_invalid_json() {
        let result = parse_config(r#"{ "endpoint": "#, Path::new("osiam.json"));
        assert!(matches!(result, Err(OsiamError::Config(_))));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("endpoint: x", Path::new("osiam.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }
}
