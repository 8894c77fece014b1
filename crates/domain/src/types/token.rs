//! Access token and scope types
//!
//! Tokens are produced by the auth server and handed back by the caller on
//! every resource call. The connector never persists them.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named permission grant attached to an access token
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(String);

impl Scope {
    /// Full administrative access to all resources
    pub const ADMIN: &'static str = "ADMIN";
    /// Access to the authenticated user's own resource only
    pub const ME: &'static str = "ME";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn admin() -> Self {
        Self::new(Self::ADMIN)
    }

    pub fn me() -> Self {
        Self::new(Self::ME)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join scopes into the space-separated form used on the wire
    pub fn join(scopes: &[Scope]) -> String {
        scopes.iter().map(Scope::as_str).collect::<Vec<_>>().join(" ")
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Scope {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// OAuth2 bearer token with expiry and granted scopes
///
/// Immutable once built. Construct with [`AccessToken::builder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    scopes: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token_expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
}

impl AccessToken {
    pub fn builder(token: impl Into<String>) -> AccessTokenBuilder {
        AccessTokenBuilder::new(token)
    }

    /// The opaque bearer value
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn scopes(&self) -> &BTreeSet<String> {
        &self.scopes
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn refresh_token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.refresh_token_expires_at
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Tokens without a user belong to a client-credentials grant
    pub fn is_client_only(&self) -> bool {
        self.user_id.is_none()
    }

    /// `true` once the expiry has passed; tokens without expiry never expire
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expires_at| Utc::now() >= expires_at)
    }

    /// Space-separated scope list, sorted
    pub fn scope_string(&self) -> String {
        self.scopes.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
    }
}

/// Builder for [`AccessToken`]
#[derive(Debug, Clone)]
pub struct AccessTokenBuilder {
    inner: AccessToken,
}

impl AccessTokenBuilder {
    fn new(token: impl Into<String>) -> Self {
        Self {
            inner: AccessToken {
                token: token.into(),
                expires_at: None,
                scopes: BTreeSet::new(),
                refresh_token: None,
                refresh_token_expires_at: None,
                client_id: None,
                user_name: None,
                user_id: None,
            },
        }
    }

    pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.inner.expires_at = Some(expires_at);
        self
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.inner.scopes.insert(scope.into());
        self
    }

    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.scopes.extend(scopes.into_iter().map(Into::into));
        self
    }

    pub fn refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.inner.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn refresh_token_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.inner.refresh_token_expires_at = Some(expires_at);
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.inner.client_id = Some(client_id.into());
        self
    }

    pub fn user_name(mut self, user_name: impl Into<String>) -> Self {
        self.inner.user_name = Some(user_name.into());
        self
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.inner.user_id = Some(user_id.into());
        self
    }

    pub fn build(self) -> AccessToken {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_builder_collects_scopes() {
        let token = AccessToken::builder("abc")
            .scope("GET")
            .scopes(["POST", "GET"])
            .build();

        assert_eq!(token.token(), "abc");
        assert_eq!(token.scopes().len(), 2);
        assert_eq!(token.scope_string(), "GET POST");
    }

    #[test]
    fn test_expiry() {
        let past = AccessToken::builder("t").expires_at(Utc::now() - Duration::seconds(5)).build();
        let future = AccessToken::builder("t").expires_at(Utc::now() + Duration::hours(1)).build();
        let open = AccessToken::builder("t").build();

        assert!(past.is_expired());
        assert!(!future.is_expired());
        assert!(!open.is_expired());
    }

    #[test]
    fn test_scope_join() {
        let scopes = [Scope::admin(), Scope::me()];
        assert_eq!(Scope::join(&scopes), "ADMIN ME");
        assert_eq!(Scope::join(&[]), "");
    }

    #[test]
    fn test_client_only_token() {
        let client_token = AccessToken::builder("t").client_id("example-client").build();
        let user_token = AccessToken::builder("t").user_id("u-1").user_name("marissa").build();

        assert!(client_token.is_client_only());
        assert!(!user_token.is_client_only());
        assert_eq!(user_token.user_name(), Some("marissa"));
    }
}
