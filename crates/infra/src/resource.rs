//! Generic resource client
//!
//! One [`ResourceClient`] serves one resource type on the resource server.
//! The type is fixed at construction through a [`ResourceType`] descriptor,
//! which supplies the path segment (`Users`, `Groups`, `Client`) and the name
//! used in messages.
//!
//! Every operation follows the same skeleton: build the request, attach the
//! bearer token, send, read status and raw body, classify non-2xx responses
//! with [`crate::ResponseErrorMapper`], decode 2xx bodies into the target type.

use std::marker::PhantomData;
use std::sync::Arc;

use osiam_domain::constants::{BASIC_USER_PATH, CURRENT_USER_PATH};
use osiam_domain::{
    AccessToken, BasicUser, OsiamError, Query, Resource, ResourceType, Result, SearchResult, User,
};
use reqwest::blocking::RequestBuilder;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::endpoint::{join_segments, parse_endpoint};
use crate::http::{HttpTransport, RawResponse};

/// CRUD and search operations for resources of type `T`
pub struct ResourceClient<T> {
    transport: Arc<HttpTransport>,
    endpoint: Url,
    resource_type: ResourceType,
    _resource: PhantomData<fn() -> T>,
}

impl<T: Resource> ResourceClient<T> {
    /// Create a client for `resource_type` below `endpoint`
    ///
    /// # Errors
    /// `OsiamError::Config` if `endpoint` is not an absolute http(s) URL.
    pub fn new(
        transport: Arc<HttpTransport>,
        endpoint: &str,
        resource_type: ResourceType,
    ) -> Result<Self> {
        let endpoint = parse_endpoint(endpoint)?;
        Ok(Self { transport, endpoint, resource_type, _resource: PhantomData })
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Retrieve a single resource by id
    #[instrument(skip(self, token), fields(resource = self.resource_type.name))]
    pub fn get(&self, id: &str, token: &AccessToken) -> Result<T> {
        ensure_id(id)?;
        let url = self.url(&[self.resource_type.path, id])?;
        let response = self.exchange(self.transport.request(Method::GET, url), token)?;
        self.decode(&response)
    }

    /// Retrieve every resource of this type in one count-capped page
    #[instrument(skip(self, token), fields(resource = self.resource_type.name))]
    pub fn get_all(&self, token: &AccessToken) -> Result<Vec<T>> {
        self.search(&Query::fetch_all(), token).map(SearchResult::into_resources)
    }

    /// Search resources
    ///
    /// `startIndex` and `count` are left off the request when they hold
    /// their default values.
    #[instrument(skip(self, token), fields(resource = self.resource_type.name))]
    pub fn search(&self, query: &Query, token: &AccessToken) -> Result<SearchResult<T>> {
        if query.count() == 0 {
            return Err(OsiamError::InvalidArgument("The count must be greater than zero.".into()));
        }
        if query.start_index() == 0 {
            return Err(OsiamError::InvalidArgument(
                "The start index must be greater than zero.".into(),
            ));
        }

        let url = self.url(&[self.resource_type.path])?;
        let builder = self.transport.request(Method::GET, url).query(&query.to_query_pairs());
        let response = self.exchange(builder, token)?;

        serde_json::from_str(&response.body).map_err(|_| {
            OsiamError::Deserialization(format!(
                "Unable to deserialize search result: {}",
                response.body
            ))
        })
    }

    /// Retrieve the resource belonging to the token's owner (`GET {base}/Me`)
    #[instrument(skip(self, token), fields(resource = self.resource_type.name))]
    pub fn get_current(&self, token: &AccessToken) -> Result<T> {
        let url = self.url(&[CURRENT_USER_PATH])?;
        let response = self.exchange(self.transport.request(Method::GET, url), token)?;
        self.decode(&response)
    }

    /// Create a resource; the server's answer is returned, id and meta included
    #[instrument(skip(self, resource, token), fields(resource = self.resource_type.name))]
    pub fn create(&self, resource: &T, token: &AccessToken) -> Result<T> {
        let body = self.encode(resource)?;
        let url = self.url(&[self.resource_type.path])?;
        let response = self.exchange(with_json(self.transport.request(Method::POST, url), body), token)?;
        self.decode(&response)
    }

    /// Partial update (`PATCH`): only the attributes set on `resource` change
    #[instrument(skip(self, resource, token), fields(resource = self.resource_type.name))]
    pub fn update(&self, id: &str, resource: &T, token: &AccessToken) -> Result<T> {
        self.modify(Method::PATCH, id, resource, token)
    }

    /// Full replacement (`PUT`)
    #[instrument(skip(self, resource, token), fields(resource = self.resource_type.name))]
    pub fn replace(&self, id: &str, resource: &T, token: &AccessToken) -> Result<T> {
        self.modify(Method::PUT, id, resource, token)
    }

    /// Delete a resource by id
    #[instrument(skip(self, token), fields(resource = self.resource_type.name))]
    pub fn delete(&self, id: &str, token: &AccessToken) -> Result<()> {
        ensure_id(id)?;
        let url = self.url(&[self.resource_type.path, id])?;
        self.exchange(self.transport.request(Method::DELETE, url), token)?;
        Ok(())
    }

    fn modify(&self, method: Method, id: &str, resource: &T, token: &AccessToken) -> Result<T> {
        ensure_id(id)?;
        let body = self.encode(resource)?;
        let url = self.url(&[self.resource_type.path, id])?;
        let response = self.exchange(with_json(self.transport.request(method, url), body), token)?;
        self.decode(&response)
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        join_segments(&self.endpoint, segments)
    }

    fn exchange(&self, builder: RequestBuilder, token: &AccessToken) -> Result<RawResponse> {
        self.transport.exchange(builder, Some(token))
    }

    fn encode(&self, resource: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(resource).map_err(|e| {
            OsiamError::InvalidArgument(format!(
                "Unable to serialize {}: {e}",
                self.resource_type.name
            ))
        })
    }

    fn decode<R: DeserializeOwned>(&self, response: &RawResponse) -> Result<R> {
        serde_json::from_str(&response.body).map_err(|_| {
            OsiamError::Deserialization(format!(
                "Unable to parse {}: {}",
                self.resource_type.name, response.body
            ))
        })
    }
}

impl ResourceClient<User> {
    /// Basic profile of the token's owner (`GET {base}/me`)
    ///
    /// Cheaper than [`ResourceClient::get_current`] when only the user name,
    /// name parts and primary email are needed.
    #[instrument(skip(self, token))]
    pub fn get_current_basic(&self, token: &AccessToken) -> Result<BasicUser> {
        let url = self.url(&[BASIC_USER_PATH])?;
        let response = self.exchange(self.transport.request(Method::GET, url), token)?;
        self.decode(&response)
    }
}

impl<T> std::fmt::Debug for ResourceClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("resource_type", &self.resource_type)
            .finish()
    }
}

fn ensure_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(OsiamError::InvalidArgument("The given id must not be empty.".into()));
    }
    Ok(())
}

fn with_json(builder: RequestBuilder, body: Vec<u8>) -> RequestBuilder {
    builder.header(CONTENT_TYPE, "application/json").body(body)
}

#[cfg(test)]
mod tests {
    use osiam_domain::{ErrorKind, TransportSettings, User};

    use super::*;

    fn client(endpoint: &str) -> Result<ResourceClient<User>> {
        let transport = Arc::new(HttpTransport::new(TransportSettings::default())?);
        ResourceClient::new(transport, endpoint, ResourceType::USER)
    }

    #[test]
    fn test_url_composition() {
        let users = client("http://localhost:8080/osiam-resource-server").unwrap();
        let url = users.url(&["Users", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/osiam-resource-server/Users/a%20b%2Fc");
    }

    #[test]
    fn test_trailing_slash_is_tolerated() {
        let users = client("http://localhost:8080/osiam-resource-server/").unwrap();
        let url = users.url(&["Users"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/osiam-resource-server/Users");
    }

    #[test]
    fn test_malformed_endpoint_is_config_error() {
        let err = client("not a url").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = client("mailto:admin@example.com").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_empty_id_fails_locally() {
        // Nothing listens on port 9; a request would surface as ConnectionSetup
        let users = client("http://127.0.0.1:9/").unwrap();
        let token = AccessToken::builder("token").build();

        assert_eq!(users.get("", &token).unwrap_err().kind(), ErrorKind::InvalidArgument);
        assert_eq!(users.delete("", &token).unwrap_err().kind(), ErrorKind::InvalidArgument);
        let user = User::new("marissa");
        assert_eq!(users.update("", &user, &token).unwrap_err().kind(), ErrorKind::InvalidArgument);
        assert_eq!(users.replace("", &user, &token).unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_zero_count_fails_locally() {
        let users = client("http://127.0.0.1:9/").unwrap();
        let token = AccessToken::builder("token").build();
        let query = Query::builder().count(0).build();

        assert_eq!(users.search(&query, &token).unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_zero_start_index_fails_locally() {
        let users = client("http://127.0.0.1:9/").unwrap();
        let token = AccessToken::builder("token").build();
        let query = Query::builder().start_index(0).build();

        let err = users.search(&query, &token).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.message(), "The start index must be greater than zero.");
    }
}
