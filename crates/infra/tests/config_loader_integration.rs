//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files and
//! turning it into a working connector.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Write;

use osiam_domain::{OsiamError, TransportSettings};
use osiam_infra::{config, OsiamConnector};
use tempfile::NamedTempFile;

fn write_config(contents: &str, extension: &str) -> std::path::PathBuf {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    path
}

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "endpoint": "http://localhost:8080",
        "client_id": "example-client",
        "client_secret": "secret",
        "client_redirect_uri": "http://localhost:5000/oauth2",
        "transport": {
            "connect_timeout_ms": 1000,
            "read_timeout_ms": 4000,
            "max_connections": 10,
            "max_connections_per_route": 5
        }
    }"#;
    let path = write_config(json_content, "json");

    let config = config::load_from_file(Some(path.clone())).expect("config from JSON file");

    assert_eq!(config.endpoints.endpoint.as_deref(), Some("http://localhost:8080"));
    assert_eq!(config.client_id.as_deref(), Some("example-client"));
    assert_eq!(config.client_secret.as_deref(), Some("secret"));
    assert_eq!(
        config.transport,
        TransportSettings {
            connect_timeout_ms: 1000,
            read_timeout_ms: 4000,
            max_connections: 10,
            max_connections_per_route: 5,
        }
    );

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
auth_endpoint = "http://auth:8080/osiam-auth-server/"
resource_endpoint = "http://resources:8080/osiam-resource-server"
client_id = "example-client"
client_secret = "secret"
client_redirect_uri = "http://localhost:5000/oauth2"
"#;
    let path = write_config(toml_content, "toml");

    let config = config::load_from_file(Some(path.clone())).expect("config from TOML file");
    assert_eq!(config.endpoints.endpoint, None);
    assert_eq!(config.transport, TransportSettings::default());

    // Endpoints flow through to the connector without any request being made
    let connector = OsiamConnector::from_config(&config);
    let uri = connector.authorization_uri(&[]).expect("authorization uri");
    assert_eq!(uri.host_str(), Some("auth"));
    assert_eq!(uri.path(), "/osiam-auth-server/oauth/authorize");

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_with_no_fields() {
    let path = write_config("{}", "json");

    let config = config::load_from_file(Some(path.clone())).expect("empty config is valid");
    assert!(config.endpoints.is_empty());

    // Loading succeeds; the connector reports the missing endpoint on use
    let err = OsiamConnector::from_config(&config).authorization_uri(&[]).unwrap_err();
    assert!(matches!(err, OsiamError::Config(_)));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_nonexistent_file() {
    let result = config::load_from_file(Some("/nonexistent/path/osiam.json".into()));

    match result {
        Err(OsiamError::Config(msg)) => {
            assert!(msg.contains("not found"), "Error message should mention 'not found'");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}

#[test]
fn test_load_config_with_invalid_format() {
    let path = write_config(r#"{ "endpoint": "#, "json");

    match config::load_from_file(Some(path.clone())) {
        Err(OsiamError::Config(msg)) => {
            assert!(msg.contains("Invalid JSON"), "Error message should mention invalid JSON");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }

    std::fs::remove_file(path).ok();
}

#[test]
fn test_zero_transport_values_are_rejected() {
    let toml_content = r#"
endpoint = "http://localhost:8080"

[transport]
max_connections = 0
"#;
    let path = write_config(toml_content, "toml");
    let config = config::load_from_file(Some(path.clone())).expect("config from TOML file");

    let err = config::apply_transport_settings(&config).unwrap_err();
    assert!(matches!(err, OsiamError::InvalidArgument(_)));

    std::fs::remove_file(path).ok();
}
