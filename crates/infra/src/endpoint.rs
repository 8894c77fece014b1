//! Endpoint resolution
//!
//! An explicit auth or resource endpoint is used verbatim. Otherwise it is
//! derived from the generic endpoint by appending `/` (when missing) and the
//! server suffix. Nothing is checked until a URL is actually requested.

use osiam_domain::constants::{AUTH_SERVER_SUFFIX, NO_ENDPOINT_MESSAGE, RESOURCE_SERVER_SUFFIX};
use osiam_domain::{EndpointConfig, OsiamError, Result};
use url::Url;

/// Derives the auth and resource base URLs from an [`EndpointConfig`]
#[derive(Debug, Clone, Default)]
pub struct EndpointResolver {
    config: EndpointConfig,
}

impl EndpointResolver {
    pub fn new(config: EndpointConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Base URL of the auth server
    ///
    /// # Errors
    /// `OsiamError::Config` when neither the auth nor the generic endpoint is set.
    pub fn auth_endpoint(&self) -> Result<String> {
        self.resolve(self.config.auth_endpoint.as_deref(), AUTH_SERVER_SUFFIX)
    }

    /// Base URL of the resource server
    ///
    /// # Errors
    /// `OsiamError::Config` when neither the resource nor the generic endpoint is set.
    pub fn resource_endpoint(&self) -> Result<String> {
        self.resolve(self.config.resource_endpoint.as_deref(), RESOURCE_SERVER_SUFFIX)
    }

    fn resolve(&self, specific: Option<&str>, suffix: &str) -> Result<String> {
        if let Some(endpoint) = non_empty(specific) {
            return Ok(endpoint.to_string());
        }

        match non_empty(self.config.endpoint.as_deref()) {
            Some(generic) => {
                let mut endpoint = String::with_capacity(generic.len() + suffix.len() + 1);
                endpoint.push_str(generic);
                if !generic.ends_with('/') {
                    endpoint.push('/');
                }
                endpoint.push_str(suffix);
                Ok(endpoint)
            }
            None => Err(OsiamError::Config(NO_ENDPOINT_MESSAGE.to_string())),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Parse a resolved endpoint into a base URL
///
/// # Errors
/// `OsiamError::Config` unless `endpoint` is an absolute http(s) URL.
pub fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint)
        .map_err(|e| OsiamError::Config(format!("Invalid endpoint '{endpoint}': {e}")))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(OsiamError::Config(format!("Invalid endpoint '{endpoint}': not an http(s) URL")));
    }
    Ok(url)
}

/// Append percent-encoded path segments to `base`; a trailing slash is dropped
pub fn join_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| OsiamError::Config(format!("Invalid endpoint '{base}'")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
