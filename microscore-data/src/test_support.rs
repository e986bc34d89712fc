//! In-memory providers for exercising the engine without a network.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use microscore_core::Coordinate;

use crate::geocode::{GeocodeError, GeocodeMatch, GeocodeSource};
use crate::overpass::{OverpassResponse, OverpassTransport, TransportError};

/// Geocoder answering from a fixed table.
///
/// Queries absent from the table yield an empty candidate list.
#[derive(Debug, Default)]
pub struct StubGeocodeSource {
    answers: HashMap<String, Result<Vec<GeocodeMatch>, GeocodeError>>,
    calls: Mutex<Vec<String>>,
}

impl StubGeocodeSource {
    /// Empty stub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with a single match at `coordinate`.
    #[must_use]
    pub fn with_match(mut self, query: &str, coordinate: Coordinate) -> Self {
        self.answers.insert(
            query.to_owned(),
            Ok(vec![GeocodeMatch {
                coordinate,
                display_name: Some(query.to_owned()),
            }]),
        );
        self
    }

    /// Fail `query` with `error`.
    #[must_use]
    pub fn with_error(mut self, query: &str, error: GeocodeError) -> Self {
        self.answers.insert(query.to_owned(), Err(error));
        self
    }

    /// Queries received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl GeocodeSource for StubGeocodeSource {
    async fn search(&self, query: &str) -> Result<Vec<GeocodeMatch>, GeocodeError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.to_owned());
        self.answers.get(query).cloned().unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Canned reply of [`StubOverpassTransport`].
#[derive(Debug, Clone)]
pub enum Reply {
    /// Decoded payload.
    Elements(OverpassResponse),
    /// Non-success HTTP status.
    Status(u16),
    /// Undecodable body.
    Malformed,
}

#[derive(Debug)]
enum Matcher {
    Endpoint(String),
    QueryContains(String),
}

/// Spatial-query transport answering from ordered rules.
///
/// The first rule matching the endpoint or query text wins; unmatched
/// requests receive an empty element list.
#[derive(Debug, Default)]
pub struct StubOverpassTransport {
    rules: Vec<(Matcher, Reply)>,
    calls: Mutex<Vec<(String, String)>>,
}

impl StubOverpassTransport {
    /// Stub without rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to every request sent to `endpoint`.
    #[must_use]
    pub fn on_endpoint(mut self, endpoint: &str, reply: Reply) -> Self {
        self.rules.push((Matcher::Endpoint(endpoint.to_owned()), reply));
        self
    }

    /// Reply to every query containing `needle`.
    #[must_use]
    pub fn on_query(mut self, needle: &str, reply: Reply) -> Self {
        self.rules
            .push((Matcher::QueryContains(needle.to_owned()), reply));
        self
    }

    /// Endpoints contacted so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|(endpoint, _)| endpoint)
            .collect()
    }

    /// Endpoint and query text of every request so far.
    #[must_use]
    pub fn requests(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn reply_for(&self, endpoint: &str, query: &str) -> Option<&Reply> {
        self.rules.iter().find_map(|(matcher, reply)| {
            let hit = match matcher {
                Matcher::Endpoint(wanted) => wanted == endpoint,
                Matcher::QueryContains(needle) => query.contains(needle.as_str()),
            };
            hit.then_some(reply)
        })
    }
}

#[async_trait]
impl OverpassTransport for StubOverpassTransport {
    async fn execute(
        &self,
        endpoint: &str,
        query: &str,
    ) -> Result<OverpassResponse, TransportError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((endpoint.to_owned(), query.to_owned()));
        match self.reply_for(endpoint, query) {
            None => Ok(OverpassResponse::default()),
            Some(Reply::Elements(response)) => Ok(response.clone()),
            Some(Reply::Status(status)) => Err(TransportError::Http {
                url: endpoint.to_owned(),
                status: *status,
            }),
            Some(Reply::Malformed) => Err(TransportError::Decode {
                url: endpoint.to_owned(),
                message: "expected value at line 1 column 1".to_owned(),
            }),
        }
    }
}
