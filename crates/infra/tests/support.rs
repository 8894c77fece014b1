//! Shared helpers for the infra integration tests.
//!
//! The connector API is blocking, while wiremock runs on tokio. Tests start
//! the mock server on the runtime and run every connector call (including
//! construction and drop of the blocking client) inside [`blocking`].

use std::sync::Arc;

use osiam_domain::{AccessToken, TransportSettings};
use osiam_infra::{HttpTransport, OsiamConnector};

pub const ACCESS_TOKEN: &str = "c0b6ce45-6a1e-4b0b-8a21-3f1a5fb7e7b2";
pub const CLIENT_ID: &str = "example-client";
pub const CLIENT_SECRET: &str = "secret";
pub const REDIRECT_URI: &str = "http://localhost:5000/oauth2";

/// Run blocking connector code off the async runtime.
pub async fn blocking<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.expect("blocking task panicked")
}

/// Install a test-writer subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().with_env_filter("osiam_infra=debug").try_init();
}

/// Private transport with short timeouts, so tests never share pool state.
pub fn transport() -> Arc<HttpTransport> {
    let settings = TransportSettings {
        connect_timeout_ms: 500,
        read_timeout_ms: 2_000,
        ..TransportSettings::default()
    };
    Arc::new(HttpTransport::new(settings).expect("transport should build"))
}

/// Connector deriving both server URLs from the mock server's base URL.
pub fn connector_for(base_url: &str) -> OsiamConnector {
    OsiamConnector::builder()
        .endpoint(base_url)
        .client_id(CLIENT_ID)
        .client_secret(CLIENT_SECRET)
        .client_redirect_uri(REDIRECT_URI)
        .transport(transport())
        .build()
}

/// Token carrying the given scopes.
pub fn token_with_scopes(scopes: &[&str]) -> AccessToken {
    AccessToken::builder(ACCESS_TOKEN)
        .scopes(scopes.iter().copied())
        .client_id(CLIENT_ID)
        .user_name("marissa")
        .user_id("cef9452e-00a9-4cec-a086-d171374ffbef")
        .build()
}

pub fn admin_token() -> AccessToken {
    token_with_scopes(&["ADMIN"])
}
