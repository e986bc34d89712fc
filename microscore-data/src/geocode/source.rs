//! Geocoding source trait, match type and errors.

use async_trait::async_trait;
use microscore_core::Coordinate;
use thiserror::Error;

/// One candidate returned by a geocoding service.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeMatch {
    /// Position of the candidate.
    pub coordinate: Coordinate,
    /// Human-readable label supplied by the service, if any.
    pub display_name: Option<String>,
}

/// Errors from a single geocoding request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The request URL could not be built from the configured base URL.
    #[error("invalid geocoder URL {url}: {message}")]
    InvalidUrl {
        /// Offending base URL.
        url: String,
        /// Parser message.
        message: String,
    },
    /// The service answered with a non-success status.
    #[error("request to {url} failed with status {status}")]
    Http {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The request could not be completed.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Request URL.
        url: String,
        /// Transport message.
        message: String,
    },
    /// The payload could not be interpreted.
    #[error("unusable geocoder response: {message}")]
    Parse {
        /// Description of the problem.
        message: String,
    },
}

/// Perform one address search.
///
/// Implementations issue exactly one request per call and return the
/// candidates in the service's ranking order. Pacing and caching are the
/// caller's concern.
#[async_trait]
pub trait GeocodeSource: Send + Sync {
    /// Search for `query`.
    async fn search(&self, query: &str) -> Result<Vec<GeocodeMatch>, GeocodeError>;
}
