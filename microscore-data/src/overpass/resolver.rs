//! Per-category nearest distances.

use log::debug;
use microscore_core::{Coordinate, DistanceSet, PoiCategory, nearest_distance};

use super::{OverpassClient, OverpassQuery, OverpassTransport};
use crate::config::SearchRadii;

/// Measures the distance from a point to the nearest feature per category.
#[derive(Debug)]
pub struct PoiDistanceResolver<T> {
    client: OverpassClient<T>,
    radii: SearchRadii,
}

impl<T: OverpassTransport> PoiDistanceResolver<T> {
    /// Create a resolver issuing queries through `client`.
    #[must_use]
    pub const fn new(client: OverpassClient<T>, radii: SearchRadii) -> Self {
        Self { client, radii }
    }

    /// Underlying client.
    #[must_use]
    pub const fn client(&self) -> &OverpassClient<T> {
        &self.client
    }

    /// Distance in metres to the nearest `category` feature around `at`.
    ///
    /// Radii are tried in configured order and the first one yielding a
    /// measurable feature wins. Returns `None` when none does.
    pub async fn distance(&self, at: Coordinate, category: PoiCategory) -> Option<f64> {
        for &radius in self.radii.for_category(category) {
            let query = OverpassQuery::for_category(category, radius, at);
            let features = self.client.elements(&query).await;
            if let Some(distance) = nearest_distance(at, &features) {
                return Some(distance);
            }
            debug!("no {category} within {radius} m");
        }
        None
    }

    /// Distances for every category, looked up concurrently.
    ///
    /// Requests still pass the client's gate one at a time.
    pub async fn distances(&self, at: Coordinate) -> DistanceSet {
        let (subway, park, major_road, railway) = tokio::join!(
            self.distance(at, PoiCategory::Subway),
            self.distance(at, PoiCategory::Park),
            self.distance(at, PoiCategory::MajorRoad),
            self.distance(at, PoiCategory::Railway),
        );
        let mut set = DistanceSet::default();
        set.set(PoiCategory::Subway, subway);
        set.set(PoiCategory::Park, park);
        set.set(PoiCategory::MajorRoad, major_road);
        set.set(PoiCategory::Railway, railway);
        set
    }
}
