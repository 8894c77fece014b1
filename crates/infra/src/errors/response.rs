//! Classification of non-2xx responses
//!
//! Maps an HTTP status and raw response body to an [`OsiamError`]. Message
//! extraction runs an ordered list of body parsers (SCIM error payload, then
//! OAuth error payload); the first one that yields a description wins. When
//! none does, the message is synthesized from the reason phrase and the raw
//! body. Extraction never fails.

use osiam_domain::{AccessToken, OsiamError};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::warn;

/// SCIM error payload (`description`, or `detail` in SCIM 2 servers)
#[derive(Debug, Deserialize)]
struct ScimErrorBody {
    #[serde(alias = "detail")]
    description: String,
}

/// OAuth2 error payload
#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    #[allow(dead_code)]
    error: String,
    error_description: String,
}

type MessageParser = fn(&str) -> Option<String>;

const MESSAGE_PARSERS: &[MessageParser] = &[scim_message, oauth_message];

fn scim_message(body: &str) -> Option<String> {
    serde_json::from_str::<ScimErrorBody>(body).ok().map(|error| error.description)
}

fn oauth_message(body: &str) -> Option<String> {
    serde_json::from_str::<OAuthErrorBody>(body).ok().map(|error| error.error_description)
}

/// Turns failed responses into domain errors
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseErrorMapper;

impl ResponseErrorMapper {
    /// Classify a non-2xx response
    ///
    /// A 403 reports the scopes of `token` and ignores the body. Without a
    /// token (token endpoint calls) the body is used like for any other status.
    pub fn classify(status: StatusCode, body: &str, token: Option<&AccessToken>) -> OsiamError {
        let error = match status {
            StatusCode::UNAUTHORIZED => OsiamError::Unauthorized(Self::extract_message(status, body)),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT => {
                OsiamError::Conflict(Self::extract_message(status, body))
            }
            StatusCode::NOT_FOUND => OsiamError::NotFound(Self::extract_message(status, body)),
            StatusCode::FORBIDDEN => OsiamError::Forbidden(match token {
                Some(token) => Self::insufficient_scopes(token),
                None => Self::extract_message(status, body),
            }),
            _ => OsiamError::Request {
                status: status.as_u16(),
                message: Self::extract_message(status, body),
            },
        };

        warn!(status = status.as_u16(), kind = error.kind().label(), "request rejected by server");
        error
    }

    /// Best-effort human readable message for a failed response
    pub fn extract_message(status: StatusCode, body: &str) -> String {
        MESSAGE_PARSERS
            .iter()
            .find_map(|parse| parse(body))
            .unwrap_or_else(|| Self::fallback_message(status, body))
    }

    fn insufficient_scopes(token: &AccessToken) -> String {
        format!("Insufficient scopes: {}", token.scope_string())
    }

    fn fallback_message(status: StatusCode, body: &str) -> String {
        let reason = status.canonical_reason().unwrap_or_else(|| status.as_str());
        let mut message =
            format!("Could not deserialize the error response for the HTTP status '{reason}'.");
        if !body.is_empty() {
            message.push_str(&format!(" Original response: {body}"));
        }
        message
    }
}
