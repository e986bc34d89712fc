//! Point-of-interest categories and the per-category distance record.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kinds of nearby features that influence the micro-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PoiCategory {
    /// Subway entrances and stations.
    Subway,
    /// Parks, gardens and recreation grounds.
    Park,
    /// Motorways, trunk roads and primary roads.
    MajorRoad,
    /// Heavy-rail lines.
    Railway,
}

impl PoiCategory {
    /// Every category, in the order results are reported.
    pub const ALL: [Self; 4] = [Self::Subway, Self::Park, Self::MajorRoad, Self::Railway];

    /// Stable snake-case label used in logs and serialised records.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Subway => "subway",
            Self::Park => "park",
            Self::MajorRoad => "major_road",
            Self::Railway => "railway",
        }
    }
}

impl fmt::Display for PoiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Minimum distance in metres from an address to each category.
///
/// `None` means the distance could not be resolved; it never stands for zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DistanceSet {
    /// Distance to the nearest subway entrance or station.
    #[cfg_attr(feature = "serde", serde(rename = "d_subway"))]
    pub subway: Option<f64>,
    /// Distance to the nearest park or garden.
    #[cfg_attr(feature = "serde", serde(rename = "d_park"))]
    pub park: Option<f64>,
    /// Distance to the nearest major road.
    #[cfg_attr(feature = "serde", serde(rename = "d_major_road"))]
    pub major_road: Option<f64>,
    /// Distance to the nearest rail line.
    #[cfg_attr(feature = "serde", serde(rename = "d_railway"))]
    pub railway: Option<f64>,
}

impl DistanceSet {
    /// Distance recorded for `category`.
    #[must_use]
    pub const fn get(&self, category: PoiCategory) -> Option<f64> {
        match category {
            PoiCategory::Subway => self.subway,
            PoiCategory::Park => self.park,
            PoiCategory::MajorRoad => self.major_road,
            PoiCategory::Railway => self.railway,
        }
    }

    /// Record `distance` for `category`.
    ///
    /// Negative or non-finite distances are stored as unresolved.
    pub fn set(&mut self, category: PoiCategory, distance: Option<f64>) {
        let sanitised = distance.filter(|d| d.is_finite() && *d >= 0.0);
        let slot = match category {
            PoiCategory::Subway => &mut self.subway,
            PoiCategory::Park => &mut self.park,
            PoiCategory::MajorRoad => &mut self.major_road,
            PoiCategory::Railway => &mut self.railway,
        };
        *slot = sanitised;
    }

    /// Categories whose distance is unresolved.
    pub fn unresolved(&self) -> impl Iterator<Item = PoiCategory> + '_ {
        PoiCategory::ALL
            .into_iter()
            .filter(|category| self.get(*category).is_none())
    }

    /// Report whether every category has a distance.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn set_then_get_round_trips_each_category() {
        let mut set = DistanceSet::default();
        let values = [0.0, 10.0, 20.0, 30.0];
        for (category, value) in PoiCategory::ALL.into_iter().zip(values) {
            set.set(category, Some(value));
        }
        assert_eq!(set.get(PoiCategory::Subway), Some(0.0));
        assert_eq!(set.get(PoiCategory::Railway), Some(30.0));
        assert!(set.is_complete());
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn set_rejects_invalid_distances(#[case] distance: f64) {
        let mut set = DistanceSet::default();
        set.set(PoiCategory::Park, Some(distance));
        assert_eq!(set.park, None);
    }

    #[rstest]
    fn unresolved_lists_missing_categories_in_order() {
        let set = DistanceSet {
            park: Some(120.0),
            ..DistanceSet::default()
        };
        let missing: Vec<_> = set.unresolved().collect();
        assert_eq!(
            missing,
            vec![PoiCategory::Subway, PoiCategory::MajorRoad, PoiCategory::Railway]
        );
    }

    #[rstest]
    fn labels_are_snake_case() {
        assert_eq!(PoiCategory::MajorRoad.to_string(), "major_road");
    }
}
