//! Conversions from external infrastructure errors into domain errors.

use osiam_domain::OsiamError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side; it is
/// always converted back into the domain error before leaving the crate.
#[derive(Debug)]
pub struct InfraError(pub OsiamError);

impl From<InfraError> for OsiamError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

trait IntoOsiamError {
    fn into_osiam(self) -> OsiamError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → OsiamError */
/* -------------------------------------------------------------------------- */

// Every transport-level failure is a connection-setup error. HTTP statuses are
// classified separately by the response mapper, never here.
impl IntoOsiamError for HttpError {
    fn into_osiam(self) -> OsiamError {
        let detail = if self.is_timeout() {
            "request timed out"
        } else if self.is_connect() {
            "connection failed"
        } else if self.is_builder() {
            "invalid request"
        } else if self.is_body() || self.is_decode() {
            "failed to read response body"
        } else {
            "transport error"
        };

        OsiamError::ConnectionSetup(format!("{detail} ({self})"))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_osiam())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use osiam_domain::ErrorKind;

    use super::*;

    #[test]
    fn connection_refused_maps_to_connection_setup() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = reqwest::blocking::Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}")).send().unwrap_err();

        let mapped: OsiamError = InfraError::from(error).into();
        assert_eq!(mapped.kind(), ErrorKind::ConnectionSetup);
        assert!(mapped.message().starts_with("connection failed"));
        assert!(mapped.to_string().starts_with("Cannot connect to server"));
    }
}
