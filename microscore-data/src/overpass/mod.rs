//! Nearby-feature lookups against Overpass interpreters.
//!
//! The module is layered:
//! - [`OverpassQuery`] renders the query text for one category and radius.
//! - [`OverpassTransport`] performs one request against one endpoint.
//! - [`OverpassClient`] adds the shared rate gate, endpoint failover, retry
//!   rounds and the run-lifetime cache.
//! - [`PoiDistanceResolver`] turns feature lists into per-category
//!   distances, escalating the search radius where configured.

mod client;
mod query;
mod resolver;
mod transport;
mod wire;

pub use client::{ExhaustionNotice, OverpassClient, PROCESS_EXHAUSTION_NOTICE};
pub use query::{CACHE_KEY_CHARS, OverpassQuery};
pub use resolver::PoiDistanceResolver;
pub use transport::{HttpOverpassTransport, OverpassTransport, TransportError};
pub use wire::{ElementKind, LatLon, OverpassElement, OverpassResponse};
