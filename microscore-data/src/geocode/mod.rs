//! Resolve addresses to coordinates.
//!
//! [`GeocodeSource`] abstracts a single lookup against a geocoding service;
//! [`NominatimSource`] implements it over HTTP. [`Geocoder`] layers query
//! variants, a run-lifetime cache and request spacing on top of any source.

mod nominatim;
mod resolver;
mod source;

pub use nominatim::NominatimSource;
pub use resolver::Geocoder;
pub use source::{GeocodeError, GeocodeMatch, GeocodeSource};
