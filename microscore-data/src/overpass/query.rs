//! Overpass QL rendering for each feature category.

use std::fmt::Write as _;

use microscore_core::{Coordinate, PoiCategory};

/// Number of leading characters of a query used as its cache key.
pub const CACHE_KEY_CHARS: usize = 500;

const NODE: &[&str] = &["node"];
const WAY: &[&str] = &["way"];
const WAY_RELATION: &[&str] = &["way", "relation"];
const ANY: &[&str] = &["node", "way", "relation"];

/// Element types paired with the tag filter applied to each.
type Selector = (&'static [&'static str], &'static str);

const SUBWAY: &[Selector] = &[
    (NODE, r#"["railway"="subway_entrance"]"#),
    (NODE, r#"["station"="subway"]"#),
    (NODE, r#"["railway"="station"]["station"="subway"]"#),
    (NODE, r#"["railway"="stop"]["subway"="yes"]"#),
    (NODE, r#"["public_transport"="station"]["subway"="yes"]"#),
    (WAY_RELATION, r#"["railway"="station"]["station"="subway"]"#),
    (WAY_RELATION, r#"["railway"="subway"]"#),
    (ANY, r#"["railway"="station"]["network"~"Subte|Buenos Aires|SBASE",i]"#),
];

const PARK: &[Selector] = &[
    (WAY_RELATION, r#"["leisure"~"park|garden"]"#),
    (WAY, r#"["landuse"="recreation_ground"]"#),
];

const MAJOR_ROAD: &[Selector] = &[(WAY, r#"["highway"~"motorway|trunk|primary"]"#)];

const RAILWAY: &[Selector] = &[(WAY, r#"["railway"="rail"]"#)];

const fn selectors(category: PoiCategory) -> &'static [Selector] {
    match category {
        PoiCategory::Subway => SUBWAY,
        PoiCategory::Park => PARK,
        PoiCategory::MajorRoad => MAJOR_ROAD,
        PoiCategory::Railway => RAILWAY,
    }
}

/// A rendered Overpass QL query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverpassQuery {
    text: String,
}

impl OverpassQuery {
    /// Wrap pre-rendered query text.
    #[must_use]
    pub fn raw(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Query for features of `category` within `radius_m` metres of `at`.
    ///
    /// Ways and relations are returned with their centre so every element
    /// carries a point.
    #[must_use]
    pub fn for_category(category: PoiCategory, radius_m: u32, at: Coordinate) -> Self {
        let around = format!(
            "(around:{radius_m},{},{})",
            at.latitude, at.longitude
        );
        let mut text = String::from("[out:json][timeout:25];\n(\n");
        for (elements, tags) in selectors(category) {
            for element in *elements {
                // Writing to a String cannot fail.
                let _ = writeln!(text, "  {element}{around}{tags};");
            }
        }
        text.push_str(");\nout center;");
        Self { text }
    }

    /// Query text to send.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cache key: the first [`CACHE_KEY_CHARS`] characters of the text.
    #[must_use]
    pub fn cache_key(&self) -> String {
        self.text.chars().take(CACHE_KEY_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn palermo() -> Coordinate {
        Coordinate::new(-34.5889, -58.4301)
    }

    #[rstest]
    fn wraps_statements_in_json_header_and_center_output(palermo: Coordinate) {
        let query = OverpassQuery::for_category(PoiCategory::Railway, 1500, palermo);
        assert_eq!(
            query.text(),
            "[out:json][timeout:25];\n(\n  way(around:1500,-34.5889,-58.4301)[\"railway\"=\"rail\"];\n);\nout center;"
        );
    }

    #[rstest]
    #[case(PoiCategory::Subway, 12)]
    #[case(PoiCategory::Park, 3)]
    #[case(PoiCategory::MajorRoad, 1)]
    #[case(PoiCategory::Railway, 1)]
    fn renders_one_statement_per_element_and_selector(
        palermo: Coordinate,
        #[case] category: PoiCategory,
        #[case] statements: usize,
    ) {
        let query = OverpassQuery::for_category(category, 1500, palermo);
        assert_eq!(query.text().matches("(around:").count(), statements);
    }

    #[rstest]
    fn subway_query_covers_network_names(palermo: Coordinate) {
        let query = OverpassQuery::for_category(PoiCategory::Subway, 2500, palermo);
        assert!(query.text().contains("(around:2500,"));
        assert!(query.text().contains(r#"["network"~"Subte|Buenos Aires|SBASE",i]"#));
        assert!(query.text().contains(r#"relation(around:2500,-34.5889,-58.4301)["railway"="subway"]"#));
    }

    #[rstest]
    fn radius_changes_the_cache_key(palermo: Coordinate) {
        let near = OverpassQuery::for_category(PoiCategory::Park, 1500, palermo);
        let far = OverpassQuery::for_category(PoiCategory::Park, 2500, palermo);
        assert_ne!(near.cache_key(), far.cache_key());
    }

    #[rstest]
    fn cache_key_is_truncated_by_characters() {
        let query = OverpassQuery::raw("ñ".repeat(CACHE_KEY_CHARS + 20));
        let key = query.cache_key();
        assert_eq!(key.chars().count(), CACHE_KEY_CHARS);
        assert!(query.text().starts_with(&key));
    }
}
