//! OAuth client registration resource
//!
//! A client always carries a secret and at least one grant: both are filled in
//! with a generated secret and the default grants whenever the caller (or the
//! server payload) leaves them out or empty. Attributes this type does not
//! model are kept in `extensions` and written back untouched.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::resource::{Meta, Resource};
use super::time;
use crate::constants::{GRANT_AUTHORIZATION_CODE, GRANT_REFRESH_TOKEN};

fn generate_secret() -> String {
    Uuid::new_v4().to_string()
}

/// Grants assigned when none are given
pub fn default_grants() -> BTreeSet<String> {
    [GRANT_AUTHORIZATION_CODE, GRANT_REFRESH_TOKEN].into_iter().map(String::from).collect()
}

/// OAuth client as stored by the auth server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawOauthClient")]
pub struct OauthClient {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Meta>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    schemas: Vec<String>,
    access_token_validity_seconds: i32,
    refresh_token_validity_seconds: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_uri: Option<String>,
    #[serde(rename = "client_secret")]
    client_secret: String,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    scope: BTreeSet<String>,
    grants: BTreeSet<String>,
    implicit: bool,
    validity_in_seconds: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiry: Option<DateTime<Utc>>,
    #[serde(flatten)]
    extensions: Map<String, Value>,
}

/// Wire shape before the secret/grant defaults are applied
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOauthClient {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    external_id: Option<String>,
    #[serde(default)]
    meta: Option<Meta>,
    #[serde(default)]
    schemas: Vec<String>,
    #[serde(default)]
    access_token_validity_seconds: i32,
    #[serde(default)]
    refresh_token_validity_seconds: i32,
    #[serde(default)]
    redirect_uri: Option<String>,
    #[serde(rename = "client_secret", default)]
    client_secret: Option<String>,
    #[serde(default)]
    scope: Option<BTreeSet<String>>,
    #[serde(default)]
    grants: Option<BTreeSet<String>>,
    #[serde(default)]
    implicit: bool,
    #[serde(default)]
    validity_in_seconds: i64,
    #[serde(default, deserialize_with = "time::deserialize_optional")]
    expiry: Option<DateTime<Utc>>,
    #[serde(flatten)]
    extensions: Map<String, Value>,
}

impl From<RawOauthClient> for OauthClient {
    fn from(raw: RawOauthClient) -> Self {
        let mut builder = OauthClientBuilder::default();
        builder.id = raw.id;
        builder.external_id = raw.external_id;
        builder.meta = raw.meta;
        builder.schemas = raw.schemas;
        builder.access_token_validity_seconds = raw.access_token_validity_seconds;
        builder.refresh_token_validity_seconds = raw.refresh_token_validity_seconds;
        builder.redirect_uri = raw.redirect_uri;
        builder.client_secret = raw.client_secret;
        builder.scope = raw.scope.unwrap_or_default();
        builder.grants = raw.grants;
        builder.implicit = raw.implicit;
        builder.validity_in_seconds = raw.validity_in_seconds;
        builder.expiry = raw.expiry;
        builder.extensions = raw.extensions;
        builder.build()
    }
}

impl OauthClient {
    pub fn builder() -> OauthClientBuilder {
        OauthClientBuilder::default()
    }

    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    pub fn schemas(&self) -> &[String] {
        &self.schemas
    }

    /// Attributes the server sent that have no typed field
    pub fn extensions(&self) -> &Map<String, Value> {
        &self.extensions
    }

    pub fn access_token_validity_seconds(&self) -> i32 {
        self.access_token_validity_seconds
    }

    pub fn refresh_token_validity_seconds(&self) -> i32 {
        self.refresh_token_validity_seconds
    }

    pub fn redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref()
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn scope(&self) -> &BTreeSet<String> {
        &self.scope
    }

    pub fn grants(&self) -> &BTreeSet<String> {
        &self.grants
    }

    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    pub fn validity_in_seconds(&self) -> i64 {
        self.validity_in_seconds
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expiry
    }

    /// Replace the secret; an empty value falls back to a generated one
    pub fn set_client_secret(&mut self, secret: impl Into<String>) {
        let secret = secret.into();
        self.client_secret = if secret.is_empty() { generate_secret() } else { secret };
    }

    /// Replace the grants; an empty set falls back to the defaults
    pub fn set_grants<I, S>(&mut self, grants: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let grants: BTreeSet<String> = grants.into_iter().map(Into::into).collect();
        self.grants = if grants.is_empty() { default_grants() } else { grants };
    }

    pub fn set_redirect_uri(&mut self, redirect_uri: impl Into<String>) {
        self.redirect_uri = Some(redirect_uri.into());
    }

    pub fn set_scope<I, S>(&mut self, scope: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = scope.into_iter().map(Into::into).collect();
    }
}

impl Resource for OauthClient {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }
}

/// Builder for [`OauthClient`]
#[derive(Debug, Clone, Default)]
pub struct OauthClientBuilder {
    id: Option<String>,
    external_id: Option<String>,
    meta: Option<Meta>,
    schemas: Vec<String>,
    access_token_validity_seconds: i32,
    refresh_token_validity_seconds: i32,
    redirect_uri: Option<String>,
    client_secret: Option<String>,
    scope: BTreeSet<String>,
    grants: Option<BTreeSet<String>>,
    implicit: bool,
    validity_in_seconds: i64,
    expiry: Option<DateTime<Utc>>,
    extensions: Map<String, Value>,
}

impl OauthClientBuilder {
    /// Client id (the auth server uses it as the resource id)
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn schemas<I, S>(mut self, schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schemas = schemas.into_iter().map(Into::into).collect();
        self
    }

    pub fn access_token_validity_seconds(mut self, seconds: i32) -> Self {
        self.access_token_validity_seconds = seconds;
        self
    }

    pub fn refresh_token_validity_seconds(mut self, seconds: i32) -> Self {
        self.refresh_token_validity_seconds = seconds;
        self
    }

    pub fn redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    pub fn scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = scope.into_iter().map(Into::into).collect();
        self
    }

    pub fn grants<I, S>(mut self, grants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.grants = Some(grants.into_iter().map(Into::into).collect());
        self
    }

    pub fn implicit(mut self, implicit: bool) -> Self {
        self.implicit = implicit;
        self
    }

    pub fn validity_in_seconds(mut self, seconds: i64) -> Self {
        self.validity_in_seconds = seconds;
        self
    }

    pub fn expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn build(self) -> OauthClient {
        let client_secret =
            self.client_secret.filter(|secret| !secret.is_empty()).unwrap_or_else(generate_secret);
        let grants =
            self.grants.filter(|grants| !grants.is_empty()).unwrap_or_else(default_grants);

        OauthClient {
            id: self.id,
            external_id: self.external_id,
            meta: self.meta,
            schemas: self.schemas,
            access_token_validity_seconds: self.access_token_validity_seconds,
            refresh_token_validity_seconds: self.refresh_token_validity_seconds,
            redirect_uri: self.redirect_uri,
            client_secret,
            scope: self.scope,
            grants,
            implicit: self.implicit,
            validity_in_seconds: self.validity_in_seconds,
            expiry: self.expiry,
            extensions: self.extensions,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_defaults_when_nothing_supplied() {
        let client = OauthClient::builder().id("example-client").build();

        assert!(!client.client_secret().is_empty());
        assert!(Uuid::parse_str(client.client_secret()).is_ok());
        assert_eq!(client.grants(), &default_grants());
        assert!(client.grants().contains("authorization_code"));
        assert!(client.grants().contains("refresh-token"));
    }

    #[test]
    fn test_generated_secrets_differ() {
        let a = OauthClient::builder().build();
        let b = OauthClient::builder().build();
        assert_ne!(a.client_secret(), b.client_secret());
    }

    #[test]
    fn test_explicit_values_are_kept() {
        let client = OauthClient::builder()
            .id("example-client")
            .client_secret("secret")
            .grants(["client_credentials"])
            .scope(["ADMIN"])
            .redirect_uri("http://localhost:5000/oauth2")
            .access_token_validity_seconds(2342)
            .build();

        assert_eq!(client.client_secret(), "secret");
        assert_eq!(client.grants().len(), 1);
        assert!(client.grants().contains("client_credentials"));
        assert_eq!(client.redirect_uri(), Some("http://localhost:5000/oauth2"));
        assert_eq!(client.access_token_validity_seconds(), 2342);
    }

    #[test]
    fn test_empty_values_fall_back() {
        let mut client = OauthClient::builder().client_secret("").grants(Vec::<String>::new()).build();
        assert!(!client.client_secret().is_empty());
        assert_eq!(client.grants(), &default_grants());

        client.set_client_secret("");
        client.set_grants(Vec::<String>::new());
        assert!(!client.client_secret().is_empty());
        assert_eq!(client.grants(), &default_grants());
    }

    #[test]
    fn test_wire_format() {
        let client = OauthClient::builder().id("c1").client_secret("s3cr3t").build();
        let written = serde_json::to_value(&client).unwrap();

        assert_eq!(written["id"], "c1");
        assert_eq!(written["client_secret"], "s3cr3t");
        assert!(written.get("clientSecret").is_none());
        assert!(written["grants"].as_array().is_some());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let client: OauthClient = serde_json::from_value(json!({
            "id": "c1",
            "accessTokenValiditySeconds": 300,
            "implicit": true
        }))
        .unwrap();

        assert_eq!(client.id(), Some("c1"));
        assert!(client.is_implicit());
        assert!(!client.client_secret().is_empty());
        assert_eq!(client.grants(), &default_grants());
    }

    #[test]
    fn test_epoch_millis_expiry() {
        let client: OauthClient = serde_json::from_value(json!({
            "id": "c1",
            "client_secret": "s",
            "grants": ["password"],
            "expiry": 1440000000000_i64
        }))
        .unwrap();

        assert_eq!(client.expiry().map(|at| at.timestamp_millis()), Some(1440000000000));
        assert_eq!(client.client_secret(), "s");

        let client: OauthClient =
            serde_json::from_value(json!({ "id": "c1", "expiry": "2015-08-19T16:00:00Z" })).unwrap();
        assert_eq!(client.expiry().map(|at| at.timestamp_millis()), Some(1440000000000));
    }

    #[test]
    fn test_unmodelled_attributes_round_trip() {
        let body = json!({
            "id": "c1",
            "client_secret": "s",
            "meta": { "version": "3" },
            "schemas": ["x"],
            "externalId": "ext-1",
            "vendorFlag": { "enabled": true }
        });
        let client: OauthClient = serde_json::from_value(body).unwrap();

        assert_eq!(client.meta().and_then(|meta| meta.version.as_deref()), Some("3"));
        assert_eq!(client.schemas(), ["x".to_string()]);
        assert_eq!(client.external_id(), Some("ext-1"));
        assert!(client.extensions().contains_key("vendorFlag"));
        assert!(!client.extensions().contains_key("client_secret"));

        let written = serde_json::to_value(&client).unwrap();
        assert_eq!(written["meta"], json!({ "version": "3" }));
        assert_eq!(written["schemas"], json!(["x"]));
        assert_eq!(written["externalId"], "ext-1");
        assert_eq!(written["vendorFlag"], json!({ "enabled": true }));
        assert_eq!(written["client_secret"], "s");
    }
}
