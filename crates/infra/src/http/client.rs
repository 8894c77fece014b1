use std::sync::Arc;

use once_cell::sync::OnceCell;
use osiam_domain::constants::BEARER_PREFIX;
use osiam_domain::{AccessToken, OsiamError, Result, TransportSettings};
use parking_lot::RwLock;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{IntoUrl, Method, StatusCode};
use tracing::{debug, info};

use super::gate::ConnectionGate;
use crate::errors::{InfraError, ResponseErrorMapper};

static SHARED: OnceCell<Arc<HttpTransport>> = OnceCell::new();

/// Status and raw body of a completed exchange
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

struct TransportState {
    client: Client,
    settings: TransportSettings,
}

/// Pooled blocking HTTP transport.
///
/// One instance is normally shared by the whole process (see
/// [`HttpTransport::shared`]). Changing its settings affects every connector
/// using it: requests already in flight finish on the client they started
/// with, every later request uses the new settings.
pub struct HttpTransport {
    state: RwLock<TransportState>,
    gate: Arc<ConnectionGate>,
}

impl HttpTransport {
    /// Build a transport with its own connection pool.
    pub fn new(settings: TransportSettings) -> Result<Self> {
        settings.validate()?;
        let client = build_client(&settings)?;

        Ok(Self {
            gate: Arc::new(ConnectionGate::new(settings.max_connections)),
            state: RwLock::new(TransportState { client, settings }),
        })
    }

    /// Process-wide transport, created with default settings on first use.
    pub fn shared() -> Result<Arc<Self>> {
        SHARED.get_or_try_init(|| Self::new(TransportSettings::default()).map(Arc::new)).cloned()
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> TransportSettings {
        self.state.read().settings
    }

    /// Set the connect timeout, in milliseconds.
    pub fn set_connect_timeout(&self, timeout_ms: u64) -> Result<()> {
        self.update(|settings| settings.connect_timeout_ms = timeout_ms)
    }

    /// Set the read timeout, in milliseconds.
    pub fn set_read_timeout(&self, timeout_ms: u64) -> Result<()> {
        self.update(|settings| settings.read_timeout_ms = timeout_ms)
    }

    /// Set the maximum number of requests in flight.
    pub fn set_max_connections(&self, max_connections: usize) -> Result<()> {
        self.update(|settings| settings.max_connections = max_connections)
    }

    /// Set the maximum number of pooled connections per host.
    pub fn set_max_connections_per_route(&self, max_per_route: usize) -> Result<()> {
        self.update(|settings| settings.max_connections_per_route = max_per_route)
    }

    /// Replace all settings at once.
    pub fn apply_settings(&self, settings: TransportSettings) -> Result<()> {
        self.update(|current| *current = settings)
    }

    fn update(&self, change: impl FnOnce(&mut TransportSettings)) -> Result<()> {
        let mut state = self.state.write();
        let mut settings = state.settings;
        change(&mut settings);
        settings.validate()?;

        let client = build_client(&settings)?;
        self.gate.set_limit(settings.max_connections);
        state.client = client;
        state.settings = settings;

        info!(
            connect_timeout_ms = settings.connect_timeout_ms,
            read_timeout_ms = settings.read_timeout_ms,
            max_connections = settings.max_connections,
            max_connections_per_route = settings.max_connections_per_route,
            "HTTP transport settings changed"
        );
        Ok(())
    }

    fn client(&self) -> Client {
        self.state.read().client.clone()
    }

    /// Create a request builder using the current pooled client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: IntoUrl,
    {
        self.client().request(method, url)
    }

    /// Send the request and read the whole body.
    ///
    /// Blocks while the connection limit is reached. Transport failures
    /// (DNS, refused connection, timeouts) become
    /// [`OsiamError::ConnectionSetup`]; HTTP error statuses are returned as
    /// regular responses.
    pub fn send(&self, builder: RequestBuilder) -> Result<RawResponse> {
        let request = builder.build().map_err(|err| OsiamError::from(InfraError::from(err)))?;
        let method = request.method().clone();
        let url = request.url().clone();

        let _permit = self.gate.acquire();
        debug!(%method, %url, "sending HTTP request");

        let response = self.client().execute(request).map_err(|err| {
            debug!(%method, %url, error = %err, "HTTP request failed");
            OsiamError::from(InfraError::from(err))
        })?;

        let status = response.status();
        debug!(%method, %url, %status, "received HTTP response");

        let body = response.text().map_err(|err| OsiamError::from(InfraError::from(err)))?;
        Ok(RawResponse { status, body })
    }

    /// Send the request and turn every non-2xx response into an error.
    ///
    /// With a token, the request carries it as a bearer credential and a 403
    /// is reported with the token's scopes.
    pub fn exchange(
        &self,
        builder: RequestBuilder,
        token: Option<&AccessToken>,
    ) -> Result<RawResponse> {
        let builder = match token {
            Some(token) => {
                builder.header(AUTHORIZATION, format!("{BEARER_PREFIX}{}", token.token()))
            }
            None => builder,
        };
        let response = self.send(builder)?;

        if !response.is_success() {
            return Err(ResponseErrorMapper::classify(response.status, &response.body, token));
        }
        debug!(status = %response.status, "request succeeded");
        Ok(response)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("settings", &self.settings())
            .field("in_flight", &self.gate.in_flight())
            .finish()
    }
}

fn build_client(settings: &TransportSettings) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .connect_timeout(settings.connect_timeout())
        .timeout(settings.read_timeout())
        .pool_max_idle_per_host(settings.max_connections_per_route)
        .default_headers(headers)
        .user_agent(concat!("osiam-connector/", env!("CARGO_PKG_VERSION")))
        .no_proxy()
        .build()
        .map_err(|err| OsiamError::ConnectionSetup(format!("failed to build HTTP client ({err})")))
}

/// Change the connect timeout of the process-wide transport.
///
/// Global side effect: every connector using the shared transport is affected.
pub fn set_connect_timeout(timeout_ms: u64) -> Result<()> {
    HttpTransport::shared()?.set_connect_timeout(timeout_ms)
}

/// Change the read timeout of the process-wide transport.
///
/// Global side effect: every connector using the shared transport is affected.
pub fn set_read_timeout(timeout_ms: u64) -> Result<()> {
    HttpTransport::shared()?.set_read_timeout(timeout_ms)
}

/// Change the total connection limit of the process-wide transport.
///
/// Global side effect: every connector using the shared transport is affected.
pub fn set_max_connections(max_connections: usize) -> Result<()> {
    HttpTransport::shared()?.set_max_connections(max_connections)
}

/// Change the per-host pool size of the process-wide transport.
///
/// Global side effect: every connector using the shared transport is affected.
pub fn set_max_connections_per_route(max_per_route: usize) -> Result<()> {
    HttpTransport::shared()?.set_max_connections_per_route(max_per_route)
}
