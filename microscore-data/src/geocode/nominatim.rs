//! Nominatim search over HTTP.
//!
//! See: <https://nominatim.org/release-docs/latest/api/Search/>

use async_trait::async_trait;
use microscore_core::Coordinate;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::{GeocodeError, GeocodeMatch, GeocodeSource};

/// One element of a `format=jsonv2` search response.
///
/// Coordinates arrive as decimal-degree strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl NominatimPlace {
    fn into_match(self) -> Result<GeocodeMatch, GeocodeError> {
        let latitude = parse_degrees(&self.lat, "lat")?;
        let longitude = parse_degrees(&self.lon, "lon")?;
        let coordinate =
            Coordinate::try_new(latitude, longitude).map_err(|err| GeocodeError::Parse {
                message: err.to_string(),
            })?;
        Ok(GeocodeMatch {
            coordinate,
            display_name: self.display_name,
        })
    }
}

fn parse_degrees(raw: &str, field: &str) -> Result<f64, GeocodeError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|err| GeocodeError::Parse {
            message: format!("{field} {raw:?}: {err}"),
        })
}

/// [`GeocodeSource`] backed by a Nominatim instance.
///
/// Only the first candidate is requested (`limit=1`).
#[derive(Debug, Clone)]
pub struct NominatimSource {
    client: Client,
    base_url: String,
}

impl NominatimSource {
    /// Create a source using `client` against `base_url`.
    ///
    /// The client should carry a descriptive user agent; the public
    /// Nominatim service rejects anonymous clients.
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Build the search URL for `query`.
    fn search_url(&self, query: &str) -> Result<Url, GeocodeError> {
        let endpoint = format!("{}/search", self.base_url.trim_end_matches('/'));
        Url::parse_with_params(
            &endpoint,
            [("format", "jsonv2"), ("limit", "1"), ("q", query)],
        )
        .map_err(|err| GeocodeError::InvalidUrl {
            url: self.base_url.clone(),
            message: err.to_string(),
        })
    }
}

#[async_trait]
impl GeocodeSource for NominatimSource {
    async fn search(&self, query: &str) -> Result<Vec<GeocodeMatch>, GeocodeError> {
        let url = self.search_url(query)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| GeocodeError::Network {
                url: url.to_string(),
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let places: Vec<NominatimPlace> =
            response.json().await.map_err(|err| GeocodeError::Parse {
                message: err.to_string(),
            })?;
        places.into_iter().map(NominatimPlace::into_match).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn source() -> NominatimSource {
        NominatimSource::new(Client::new(), "https://nominatim.example.org/")
    }

    #[rstest]
    fn search_url_encodes_the_query(source: NominatimSource) {
        let url = source
            .search_url("Gorriti 450, Palermo, CABA, Argentina")
            .expect("url should build");

        assert_eq!(url.path(), "/search");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("format".to_owned(), "jsonv2".to_owned()),
                ("limit".to_owned(), "1".to_owned()),
                (
                    "q".to_owned(),
                    "Gorriti 450, Palermo, CABA, Argentina".to_owned()
                ),
            ]
        );
    }

    #[rstest]
    fn invalid_base_url_is_reported() {
        let source = NominatimSource::new(Client::new(), "not a url");
        let err = source.search_url("x").expect_err("should fail");
        assert!(matches!(err, GeocodeError::InvalidUrl { .. }));
    }

    #[rstest]
    fn place_parses_string_coordinates() {
        let places: Vec<NominatimPlace> = serde_json::from_str(
            r#"[{"lat": "-34.5889", "lon": "-58.4301", "display_name": "Gorriti 450"}]"#,
        )
        .expect("should deserialise");

        let matched = places
            .into_iter()
            .next()
            .expect("one place")
            .into_match()
            .expect("should convert");

        assert_eq!(matched.coordinate, Coordinate::new(-34.5889, -58.4301));
        assert_eq!(matched.display_name.as_deref(), Some("Gorriti 450"));
    }

    #[rstest]
    #[case("abc", "-58.4")]
    #[case("-34.6", "")]
    #[case("95.0", "-58.4")]
    fn place_rejects_unusable_coordinates(#[case] lat: &str, #[case] lon: &str) {
        let place = NominatimPlace {
            lat: lat.to_owned(),
            lon: lon.to_owned(),
            display_name: None,
        };
        assert!(matches!(
            place.into_match(),
            Err(GeocodeError::Parse { .. })
        ));
    }
}
