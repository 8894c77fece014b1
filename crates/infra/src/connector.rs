//! Connector facade
//!
//! [`OsiamConnector`] is the entry point of the library. It holds the endpoint
//! configuration and client credentials and builds its sub-clients (one per
//! resource type plus the auth session) on first use. Construction never
//! touches the network and never resolves endpoints, so a misconfigured
//! endpoint only surfaces once a capability that needs it is called.
//!
//! Sub-clients are memoised in [`OnceCell`]s: concurrent first calls build a
//! client exactly once, and a failed build is not cached.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use osiam_domain::{
    AccessToken, BasicUser, ConnectorConfig, EndpointConfig, Group, OauthClient, Query, QueryBuilder,
    Resource, ResourceType, Result, Scope, SearchResult, User,
};
use tracing::debug;
use url::Url;

use crate::auth::{AuthService, ClientCredentials};
use crate::endpoint::EndpointResolver;
use crate::http::HttpTransport;
use crate::resource::ResourceClient;

/// Facade over the auth and resource servers of one OSIAM installation
pub struct OsiamConnector {
    resolver: EndpointResolver,
    credentials: ClientCredentials,
    transport: Option<Arc<HttpTransport>>,
    auth_service: OnceCell<AuthService>,
    user_client: OnceCell<ResourceClient<User>>,
    group_client: OnceCell<ResourceClient<Group>>,
    client_client: OnceCell<ResourceClient<OauthClient>>,
}

impl OsiamConnector {
    pub fn builder() -> OsiamConnectorBuilder {
        OsiamConnectorBuilder::default()
    }

    /// Build a connector from loaded configuration
    ///
    /// The transport section is not applied here; see
    /// [`crate::config::apply_transport_settings`].
    pub fn from_config(config: &ConnectorConfig) -> Self {
        let mut builder = Self::builder().endpoints(config.endpoints.clone());
        if let Some(client_id) = &config.client_id {
            builder = builder.client_id(client_id);
        }
        if let Some(client_secret) = &config.client_secret {
            builder = builder.client_secret(client_secret);
        }
        if let Some(redirect_uri) = &config.client_redirect_uri {
            builder = builder.client_redirect_uri(redirect_uri);
        }
        builder.build()
    }

    fn transport(&self) -> Result<Arc<HttpTransport>> {
        match &self.transport {
            Some(transport) => Ok(Arc::clone(transport)),
            None => HttpTransport::shared(),
        }
    }

    fn auth(&self) -> Result<&AuthService> {
        self.auth_service.get_or_try_init(|| {
            let endpoint = self.resolver.auth_endpoint()?;
            debug!(%endpoint, "resolved auth endpoint");
            let service = AuthService::new(self.transport()?, &endpoint, self.credentials.clone())?;
            debug!("initialised auth service");
            Ok(service)
        })
    }

    fn users(&self) -> Result<&ResourceClient<User>> {
        self.user_client.get_or_try_init(|| self.resource_client(ResourceType::USER))
    }

    fn groups(&self) -> Result<&ResourceClient<Group>> {
        self.group_client.get_or_try_init(|| self.resource_client(ResourceType::GROUP))
    }

    fn clients(&self) -> Result<&ResourceClient<OauthClient>> {
        self.client_client.get_or_try_init(|| self.resource_client(ResourceType::CLIENT))
    }

    fn resource_client<T: Resource>(&self, resource_type: ResourceType) -> Result<ResourceClient<T>> {
        let endpoint = self.resolver.resource_endpoint()?;
        debug!(%endpoint, "resolved resource endpoint");
        let client = ResourceClient::new(self.transport()?, &endpoint, resource_type)?;
        debug!(resource = resource_type.name, "initialised resource client");
        Ok(client)
    }

    // ── Users ─────────────────────────────────────────────────────────

    pub fn get_user(&self, id: &str, token: &AccessToken) -> Result<User> {
        self.users()?.get(id, token)
    }

    pub fn get_all_users(&self, token: &AccessToken) -> Result<Vec<User>> {
        self.users()?.get_all(token)
    }

    pub fn search_users(&self, query: &Query, token: &AccessToken) -> Result<SearchResult<User>> {
        self.users()?.search(query, token)
    }

    /// The user the token was issued to
    pub fn get_current_user(&self, token: &AccessToken) -> Result<User> {
        self.users()?.get_current(token)
    }

    /// Basic profile (user name, name parts, primary email) of the token's owner
    pub fn get_current_user_basic(&self, token: &AccessToken) -> Result<BasicUser> {
        self.users()?.get_current_basic(token)
    }

    pub fn create_user(&self, user: &User, token: &AccessToken) -> Result<User> {
        self.users()?.create(user, token)
    }

    pub fn update_user(&self, id: &str, user: &User, token: &AccessToken) -> Result<User> {
        self.users()?.update(id, user, token)
    }

    pub fn replace_user(&self, id: &str, user: &User, token: &AccessToken) -> Result<User> {
        self.users()?.replace(id, user, token)
    }

    pub fn delete_user(&self, id: &str, token: &AccessToken) -> Result<()> {
        self.users()?.delete(id, token)
    }

    // ── Groups ────────────────────────────────────────────────────────

    pub fn get_group(&self, id: &str, token: &AccessToken) -> Result<Group> {
        self.groups()?.get(id, token)
    }

    pub fn get_all_groups(&self, token: &AccessToken) -> Result<Vec<Group>> {
        self.groups()?.get_all(token)
    }

    pub fn search_groups(&self, query: &Query, token: &AccessToken) -> Result<SearchResult<Group>> {
        self.groups()?.search(query, token)
    }

    pub fn create_group(&self, group: &Group, token: &AccessToken) -> Result<Group> {
        self.groups()?.create(group, token)
    }

    pub fn update_group(&self, id: &str, group: &Group, token: &AccessToken) -> Result<Group> {
        self.groups()?.update(id, group, token)
    }

    pub fn replace_group(&self, id: &str, group: &Group, token: &AccessToken) -> Result<Group> {
        self.groups()?.replace(id, group, token)
    }

    pub fn delete_group(&self, id: &str, token: &AccessToken) -> Result<()> {
        self.groups()?.delete(id, token)
    }

    // ── OAuth clients ─────────────────────────────────────────────────

    pub fn get_client(&self, id: &str, token: &AccessToken) -> Result<OauthClient> {
        self.clients()?.get(id, token)
    }

    pub fn get_all_clients(&self, token: &AccessToken) -> Result<Vec<OauthClient>> {
        self.clients()?.get_all(token)
    }

    pub fn create_client(&self, client: &OauthClient, token: &AccessToken) -> Result<OauthClient> {
        self.clients()?.create(client, token)
    }

    pub fn update_client(
        &self,
        id: &str,
        client: &OauthClient,
        token: &AccessToken,
    ) -> Result<OauthClient> {
        self.clients()?.update(id, client, token)
    }

    pub fn replace_client(
        &self,
        id: &str,
        client: &OauthClient,
        token: &AccessToken,
    ) -> Result<OauthClient> {
        self.clients()?.replace(id, client, token)
    }

    pub fn delete_client(&self, id: &str, token: &AccessToken) -> Result<()> {
        self.clients()?.delete(id, token)
    }

    // ── Auth ──────────────────────────────────────────────────────────

    /// Client-credentials grant
    pub fn retrieve_access_token(&self, scopes: &[Scope]) -> Result<AccessToken> {
        self.auth()?.retrieve_access_token(scopes)
    }

    /// Resource-owner password grant
    pub fn retrieve_access_token_with_password(
        &self,
        user_name: &str,
        password: &str,
        scopes: &[Scope],
    ) -> Result<AccessToken> {
        self.auth()?.retrieve_access_token_with_password(user_name, password, scopes)
    }

    /// Authorization-code grant
    pub fn retrieve_access_token_with_code(&self, code: &str) -> Result<AccessToken> {
        self.auth()?.retrieve_access_token_with_code(code)
    }

    pub fn authorization_uri(&self, scopes: &[Scope]) -> Result<Url> {
        self.auth()?.authorization_uri(scopes)
    }

    pub fn refresh_access_token(&self, token: &AccessToken, scopes: &[Scope]) -> Result<AccessToken> {
        self.auth()?.refresh_access_token(token, scopes)
    }

    pub fn validate_access_token(&self, token: &AccessToken) -> Result<AccessToken> {
        self.auth()?.validate_access_token(token)
    }

    pub fn revoke_access_token(&self, token: &AccessToken) -> Result<()> {
        self.auth()?.revoke_access_token(token)
    }

    pub fn revoke_all_access_tokens(&self, user_id: &str, token: &AccessToken) -> Result<()> {
        self.auth()?.revoke_all_access_tokens(user_id, token)
    }

    // ── Queries ───────────────────────────────────────────────────────

    pub fn create_query_builder(&self) -> QueryBuilder {
        QueryBuilder::new()
    }

    pub fn create_query_builder_from(&self, original: &Query) -> QueryBuilder {
        QueryBuilder::from(original)
    }
}

impl std::fmt::Debug for OsiamConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsiamConnector")
            .field("endpoints", self.resolver.config())
            .field("client_id", &self.credentials.client_id)
            .finish_non_exhaustive()
    }
}

/// Builder for [`OsiamConnector`]
#[derive(Default)]
pub struct OsiamConnectorBuilder {
    endpoints: EndpointConfig,
    credentials: ClientCredentials,
    transport: Option<Arc<HttpTransport>>,
}

impl OsiamConnectorBuilder {
    /// Generic endpoint; auth and resource URLs are derived from it
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoints.endpoint = Some(endpoint.into());
        self
    }

    pub fn auth_server_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoints.auth_endpoint = Some(endpoint.into());
        self
    }

    pub fn resource_server_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoints.resource_endpoint = Some(endpoint.into());
        self
    }

    pub fn endpoints(mut self, endpoints: EndpointConfig) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.credentials.client_id = Some(client_id.into());
        self
    }

    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.credentials.client_secret = Some(client_secret.into());
        self
    }

    pub fn client_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.credentials.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Use a private transport instead of the process-wide one
    pub fn transport(mut self, transport: Arc<HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> OsiamConnector {
        OsiamConnector {
            resolver: EndpointResolver::new(self.endpoints),
            credentials: self.credentials,
            transport: self.transport,
            auth_service: OnceCell::new(),
            user_client: OnceCell::new(),
            group_client: OnceCell::new(),
            client_client: OnceCell::new(),
        }
    }
}
