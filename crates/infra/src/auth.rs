//! Auth server session
//!
//! Token grants (client credentials, password, authorization code, refresh)
//! against `{auth}/oauth/token`, plus token validation and revocation. Grant
//! requests authenticate with HTTP basic auth using the client id and secret
//! and send a form-encoded body.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use osiam_domain::types::time::parse_timestamp;
use osiam_domain::{AccessToken, OsiamError, Result, Scope};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};
use url::Url;

use crate::endpoint::{join_segments, parse_endpoint};
use crate::http::{HttpTransport, RawResponse};

const TOKEN_PATH: &[&str] = &["oauth", "token"];
const AUTHORIZE_PATH: &[&str] = &["oauth", "authorize"];
const VALIDATION_PATH: &[&str] = &["token", "validation"];
const REVOCATION_PATH: &[&str] = &["token", "revocation"];

/// Client registration used against the auth server
#[derive(Debug, Clone, Default)]
pub struct ClientCredentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
}

/// Token payload returned by the token, validation and refresh endpoints
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<Value>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    refresh_token_expires_at: Option<Value>,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

impl TokenResponse {
    fn into_access_token(self, received_at: DateTime<Utc>) -> AccessToken {
        let expires_at = self
            .expires_at
            .as_ref()
            .and_then(parse_timestamp)
            .or_else(|| self.expires_in.map(|seconds| received_at + Duration::seconds(seconds)));

        let mut builder = AccessToken::builder(self.access_token)
            .scopes(self.scope.as_deref().unwrap_or_default().split_whitespace());
        if let Some(expires_at) = expires_at {
            builder = builder.expires_at(expires_at);
        }
        if let Some(refresh_token) = self.refresh_token {
            builder = builder.refresh_token(refresh_token);
        }
        if let Some(expires_at) = self.refresh_token_expires_at.as_ref().and_then(parse_timestamp) {
            builder = builder.refresh_token_expires_at(expires_at);
        }
        if let Some(client_id) = self.client_id {
            builder = builder.client_id(client_id);
        }
        if let Some(user_name) = self.user_name {
            builder = builder.user_name(user_name);
        }
        if let Some(user_id) = self.user_id {
            builder = builder.user_id(user_id);
        }
        builder.build()
    }
}

/// Session with the auth server
pub struct AuthService {
    transport: Arc<HttpTransport>,
    endpoint: Url,
    credentials: ClientCredentials,
}

impl AuthService {
    /// # Errors
    /// `OsiamError::Config` if `endpoint` is not an absolute http(s) URL.
    pub fn new(
        transport: Arc<HttpTransport>,
        endpoint: &str,
        credentials: ClientCredentials,
    ) -> Result<Self> {
        let endpoint = parse_endpoint(endpoint)?;
        Ok(Self { transport, endpoint, credentials })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Client-credentials grant
    #[instrument(skip(self))]
    pub fn retrieve_access_token(&self, scopes: &[Scope]) -> Result<AccessToken> {
        let mut form = vec![("grant_type", "client_credentials".to_string())];
        push_scope(&mut form, scopes);
        self.request_token(form)
    }

    /// Resource-owner password grant
    #[instrument(skip(self, password))]
    pub fn retrieve_access_token_with_password(
        &self,
        user_name: &str,
        password: &str,
        scopes: &[Scope],
    ) -> Result<AccessToken> {
        if user_name.is_empty() {
            return Err(OsiamError::InvalidArgument("The user name must not be empty.".into()));
        }

        let mut form = vec![
            ("grant_type", "password".to_string()),
            ("username", user_name.to_string()),
            ("password", password.to_string()),
        ];
        push_scope(&mut form, scopes);
        self.request_token(form)
    }

    /// Authorization-code grant; needs a configured redirect URI
    #[instrument(skip(self, code))]
    pub fn retrieve_access_token_with_code(&self, code: &str) -> Result<AccessToken> {
        if code.is_empty() {
            return Err(OsiamError::InvalidArgument("The authorization code must not be empty.".into()));
        }

        let form = vec![
            ("grant_type", "authorization_code".to_string()),
            ("code", code.to_string()),
            ("redirect_uri", self.redirect_uri()?.to_string()),
        ];
        self.request_token(form)
    }

    /// Exchange the token's refresh token for a new access token
    #[instrument(skip(self, token))]
    pub fn refresh_access_token(&self, token: &AccessToken, scopes: &[Scope]) -> Result<AccessToken> {
        let refresh_token = token.refresh_token().ok_or_else(|| {
            OsiamError::InvalidArgument("The given access token has no refresh token.".into())
        })?;

        let mut form = vec![
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", refresh_token.to_string()),
        ];
        push_scope(&mut form, scopes);
        self.request_token(form)
    }

    /// URI the user agent is sent to for the authorization-code flow
    pub fn authorization_uri(&self, scopes: &[Scope]) -> Result<Url> {
        let client_id = self.client_id()?;
        let redirect_uri = self.redirect_uri()?;

        let mut url = join_segments(&self.endpoint, AUTHORIZE_PATH)?;
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", &Scope::join(scopes));
        Ok(url)
    }

    /// Ask the auth server whether the token is still valid
    #[instrument(skip(self, token))]
    pub fn validate_access_token(&self, token: &AccessToken) -> Result<AccessToken> {
        let url = join_segments(&self.endpoint, VALIDATION_PATH)?;
        let response = self.bearer_exchange(Method::POST, url, token)?;
        decode_token(&response)
    }

    /// Revoke the given token
    #[instrument(skip(self, token))]
    pub fn revoke_access_token(&self, token: &AccessToken) -> Result<()> {
        let url = join_segments(&self.endpoint, REVOCATION_PATH)?;
        self.bearer_exchange(Method::POST, url, token)?;
        info!("access token revoked");
        Ok(())
    }

    /// Revoke every token issued to the user `user_id`
    #[instrument(skip(self, token))]
    pub fn revoke_all_access_tokens(&self, user_id: &str, token: &AccessToken) -> Result<()> {
        if user_id.is_empty() {
            return Err(OsiamError::InvalidArgument("The given id must not be empty.".into()));
        }

        let url = join_segments(&self.endpoint, &[REVOCATION_PATH[0], REVOCATION_PATH[1], user_id])?;
        self.bearer_exchange(Method::POST, url, token)?;
        info!(user_id, "all access tokens of user revoked");
        Ok(())
    }

    fn request_token(&self, form: Vec<(&'static str, String)>) -> Result<AccessToken> {
        let (client_id, client_secret) = self.client_credentials()?;
        let url = join_segments(&self.endpoint, TOKEN_PATH)?;

        let builder = self
            .transport
            .request(Method::POST, url)
            .basic_auth(client_id, Some(client_secret))
            .form(&form);
        let response = self.transport.exchange(builder, None)?;
        decode_token(&response)
    }

    fn bearer_exchange(&self, method: Method, url: Url, token: &AccessToken) -> Result<RawResponse> {
        self.transport.exchange(self.transport.request(method, url), Some(token))
    }

    fn client_credentials(&self) -> Result<(&str, &str)> {
        let client_secret = self
            .credentials
            .client_secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| OsiamError::Config("No client secret has been set".into()))?;
        Ok((self.client_id()?, client_secret))
    }

    fn client_id(&self) -> Result<&str> {
        self.credentials
            .client_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| OsiamError::Config("No client id has been set".into()))
    }

    fn redirect_uri(&self) -> Result<&str> {
        self.credentials
            .redirect_uri
            .as_deref()
            .filter(|uri| !uri.is_empty())
            .ok_or_else(|| OsiamError::Config("No client redirect URI has been set".into()))
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("endpoint", &self.endpoint.as_str())
            .field("client_id", &self.credentials.client_id)
            .finish_non_exhaustive()
    }
}

fn push_scope(form: &mut Vec<(&'static str, String)>, scopes: &[Scope]) {
    if !scopes.is_empty() {
        form.push(("scope", Scope::join(scopes)));
    }
}

fn decode_token(response: &RawResponse) -> Result<AccessToken> {
    let received_at = Utc::now();
    serde_json::from_str::<TokenResponse>(&response.body)
        .map(|token| token.into_access_token(received_at))
        .map_err(|_| {
            OsiamError::Deserialization(format!("Unable to parse AccessToken: {}", response.body))
        })
}
