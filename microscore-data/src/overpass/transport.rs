//! Single-request transport to an Overpass interpreter.

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use super::OverpassResponse;

/// Failure of one request against one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The endpoint answered with a non-success status.
    #[error("{url} answered with status {status}")]
    Http {
        /// Endpoint URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The request could not be completed.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Endpoint URL.
        url: String,
        /// Transport message.
        message: String,
    },
    /// The body was not a usable JSON response.
    #[error("malformed response from {url}: {message}")]
    Decode {
        /// Endpoint URL.
        url: String,
        /// Decoder message.
        message: String,
    },
}

impl TransportError {
    /// Whether the endpoint refused the request because of load or policy.
    ///
    /// Refusals (403, 429, 502) are routine on public mirrors.
    #[must_use]
    pub const fn is_refusal(&self) -> bool {
        matches!(self, Self::Http { status: 403 | 429 | 502, .. })
    }
}

/// Send one query to one endpoint.
///
/// Implementations issue exactly one request per call. Failover, pacing and
/// caching belong to [`OverpassClient`](super::OverpassClient).
#[async_trait]
pub trait OverpassTransport: Send + Sync {
    /// Execute `query` against `endpoint`.
    async fn execute(&self, endpoint: &str, query: &str)
    -> Result<OverpassResponse, TransportError>;
}

/// [`OverpassTransport`] posting the raw query text over HTTP.
#[derive(Debug, Clone)]
pub struct HttpOverpassTransport {
    client: Client,
}

impl HttpOverpassTransport {
    /// Create a transport using `client`.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OverpassTransport for HttpOverpassTransport {
    async fn execute(
        &self,
        endpoint: &str,
        query: &str,
    ) -> Result<OverpassResponse, TransportError> {
        let network = |err: reqwest::Error| TransportError::Network {
            url: endpoint.to_owned(),
            message: err.to_string(),
        };
        let response = self
            .client
            .post(endpoint)
            .body(query.to_owned())
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Http {
                url: endpoint.to_owned(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(network)?;
        serde_json::from_slice(&body).map_err(|err| TransportError::Decode {
            url: endpoint.to_owned(),
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn http(status: u16) -> TransportError {
        TransportError::Http {
            url: "https://overpass.example/api/interpreter".to_owned(),
            status,
        }
    }

    #[rstest]
    #[case(403, true)]
    #[case(429, true)]
    #[case(502, true)]
    #[case(500, false)]
    #[case(504, false)]
    fn classifies_refusals(#[case] status: u16, #[case] expected: bool) {
        assert_eq!(http(status).is_refusal(), expected);
    }

    #[rstest]
    fn network_errors_are_not_refusals() {
        let err = TransportError::Network {
            url: "https://overpass.example".to_owned(),
            message: "connection reset".to_owned(),
        };
        assert!(!err.is_refusal());
        assert_eq!(
            err.to_string(),
            "network error contacting https://overpass.example: connection reset"
        );
    }
}
