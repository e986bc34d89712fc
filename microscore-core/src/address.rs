//! Clean free-text addresses and expand them into geocoder query variants.
//!
//! Listing sites publish addresses in inconsistent shapes: postal codes glued
//! to neighbourhood names, long official names for the federal capital,
//! repeated segments and trailing country names. [`AddressNormalizer`] turns
//! such text into a canonical comma-separated form and then into an ordered
//! list of queries, most specific first, so a geocoder tries the locality it
//! is most likely to belong to before falling back to broader ones.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[expect(
    clippy::expect_used,
    reason = "patterns are literals covered by unit tests"
)]
fn literal(pattern: &str) -> Regex {
    Regex::new(pattern).expect("address pattern literal must compile")
}

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| literal(r"\s+"));
static COMMA: LazyLock<Regex> = LazyLock::new(|| literal(r"\s*,\s*"));
static POSTAL_CODE: LazyLock<Regex> = LazyLock::new(|| literal(r"(?i)\b[A-Z]?\d{4}[A-Z]{0,3}\b"));
static AUTONOMOUS_CITY: LazyLock<Regex> = LazyLock::new(|| {
    literal(r"(?i)\b(?:Cdad\.?|Ciudad)\s+Aut[oó]noma\s+de\s+Buenos\s+Aires\b")
});
static FEDERAL_CAPITAL: LazyLock<Regex> =
    LazyLock::new(|| literal(r"(?i)\bCapital\s+Federal\b"));
static PROVINCE: LazyLock<Regex> =
    LazyLock::new(|| literal(r"(?i)\bProvincia\s+de\s+Buenos\s+Aires\b"));
static COUNTRY: LazyLock<Regex> = LazyLock::new(|| literal(r"(?i),?\s*\bArgentina\b"));

/// Short forms the long official names are rewritten to.
const CAPITAL_SHORT: &str = "CABA";
const PROVINCE_SHORT: &str = "Buenos Aires";

/// Locality, province and country appended to geocoder queries.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AddressLocale {
    /// Short form of the federal-capital locality.
    pub locality: String,
    /// Province surrounding the locality.
    pub province: String,
    /// Country name used as the final query segment.
    pub country: String,
}

impl Default for AddressLocale {
    fn default() -> Self {
        Self {
            locality: CAPITAL_SHORT.to_owned(),
            province: PROVINCE_SHORT.to_owned(),
            country: "Argentina".to_owned(),
        }
    }
}

/// Normalises raw addresses and builds geocoder query variants.
///
/// # Examples
///
/// ```
/// use microscore_core::AddressNormalizer;
///
/// let normalizer = AddressNormalizer::default();
/// let variants = normalizer.variants("Gorriti 450, Palermo");
/// assert_eq!(
///     variants,
///     vec![
///         "Gorriti 450, Palermo, CABA, Argentina".to_owned(),
///         "Gorriti 450, Palermo, Buenos Aires, Argentina".to_owned(),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct AddressNormalizer {
    locale: AddressLocale,
}

impl AddressNormalizer {
    /// Create a normalizer appending the given locale to queries.
    #[must_use]
    pub const fn new(locale: AddressLocale) -> Self {
        Self { locale }
    }

    /// The locale appended to generated variants.
    #[must_use]
    pub const fn locale(&self) -> &AddressLocale {
        &self.locale
    }

    /// Clean `raw` into a canonical comma-separated address.
    ///
    /// Returns `None` when nothing remains after cleaning.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let collapsed = WHITESPACE.replace_all(raw, " ");
        let spaced = COMMA.replace_all(collapsed.trim(), ", ");

        let without_postal = POSTAL_CODE.replace_all(&spaced, "");
        let city = AUTONOMOUS_CITY.replace_all(&without_postal, CAPITAL_SHORT);
        let capital = FEDERAL_CAPITAL.replace_all(&city, CAPITAL_SHORT);
        let province = PROVINCE.replace_all(&capital, PROVINCE_SHORT);
        let without_country = COUNTRY.replace_all(&province, "");

        let mut seen = HashSet::new();
        let segments: Vec<String> = without_country
            .split(',')
            .map(|segment| segment.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|segment| !segment.is_empty())
            .filter(|segment| seen.insert(segment.to_lowercase()))
            .collect();

        if segments.is_empty() {
            None
        } else {
            Some(segments.join(", "))
        }
    }

    /// Expand `raw` into geocoder queries, most specific first.
    ///
    /// The list never contains two entries that differ only by case. Empty
    /// input produces an empty list.
    #[must_use]
    pub fn variants(&self, raw: &str) -> Vec<String> {
        let Some(clean) = self.normalize(raw) else {
            return Vec::new();
        };
        let AddressLocale {
            locality,
            province,
            country,
        } = &self.locale;

        let mut variants = VariantList::default();
        variants.push(format!("{clean}, {locality}, {country}"));
        variants.push(format!("{clean}, {province}, {country}"));
        if mentions_word(&clean, locality) || mentions_word(&clean, province) {
            variants.push(format!("{clean}, {country}"));
        } else {
            variants.push(format!("{clean}, {locality}, {country}"));
        }
        variants.into_inner()
    }
}

/// Clean `raw` with the default locale. See [`AddressNormalizer::normalize`].
#[must_use]
pub fn normalize_address(raw: &str) -> Option<String> {
    AddressNormalizer::default().normalize(raw)
}

/// Build query variants with the default locale. See
/// [`AddressNormalizer::variants`].
#[must_use]
pub fn build_address_variants(raw: &str) -> Vec<String> {
    AddressNormalizer::default().variants(raw)
}

/// Insertion-ordered list rejecting case-insensitive duplicates.
#[derive(Default)]
struct VariantList {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl VariantList {
    fn push(&mut self, variant: String) {
        if self.seen.insert(variant.to_lowercase()) {
            self.items.push(variant);
        }
    }

    fn into_inner(self) -> Vec<String> {
        self.items
    }
}

/// Case-insensitive whole-word search, so "Caballito" does not mention "CABA".
fn mentions_word(haystack: &str, needle: &str) -> bool {
    let haystack = haystack.to_lowercase();
    let needle = needle.to_lowercase();
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle.as_str()).any(|(start, _)| {
        let before = haystack.get(..start).and_then(|s| s.chars().next_back());
        let after = haystack
            .get(start + needle.len()..)
            .and_then(|s| s.chars().next());
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn normalizer() -> AddressNormalizer {
        AddressNormalizer::default()
    }

    #[rstest]
    #[case("C1414 Palermo", "Palermo")]
    #[case("Palermo C1425BGH", "Palermo")]
    #[case("B1636ABC, Olivos", "Olivos")]
    #[case("1406 Caballito", "Caballito")]
    fn strips_postal_codes(
        normalizer: AddressNormalizer,
        #[case] raw: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(normalizer.normalize(raw).as_deref(), Some(expected));
    }

    #[rstest]
    #[case("Gorriti 450, Ciudad Autónoma de Buenos Aires", "Gorriti 450, CABA")]
    #[case("Gorriti 450, Cdad. Autonoma de Buenos Aires", "Gorriti 450, CABA")]
    #[case("Gorriti 450, capital   federal", "Gorriti 450, CABA")]
    #[case("Olivos, Provincia de Buenos Aires", "Olivos, Buenos Aires")]
    fn canonicalises_long_forms(
        normalizer: AddressNormalizer,
        #[case] raw: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(normalizer.normalize(raw).as_deref(), Some(expected));
    }

    #[rstest]
    fn collapses_whitespace_and_comma_spacing(normalizer: AddressNormalizer) {
        let clean = normalizer.normalize("  Thames   120 ,Palermo ,,  Soho ");
        assert_eq!(clean.as_deref(), Some("Thames 120, Palermo, Soho"));
    }

    #[rstest]
    fn strips_trailing_country(normalizer: AddressNormalizer) {
        let clean = normalizer.normalize("Thames 120, Palermo, Argentina");
        assert_eq!(clean.as_deref(), Some("Thames 120, Palermo"));
    }

    #[rstest]
    fn removes_duplicate_segments_case_insensitively(normalizer: AddressNormalizer) {
        let clean = normalizer.normalize("Palermo, Thames 120, PALERMO, Capital Federal, CABA");
        assert_eq!(clean.as_deref(), Some("Palermo, Thames 120, CABA"));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case(" , ,, ")]
    #[case("C1414, Argentina")]
    fn empty_input_yields_nothing(normalizer: AddressNormalizer, #[case] raw: &str) {
        assert_eq!(normalizer.normalize(raw), None);
        assert!(normalizer.variants(raw).is_empty());
    }

    #[rstest]
    fn variants_for_address_without_locality(normalizer: AddressNormalizer) {
        assert_eq!(
            normalizer.variants("Gorriti 450, Palermo"),
            vec![
                "Gorriti 450, Palermo, CABA, Argentina",
                "Gorriti 450, Palermo, Buenos Aires, Argentina",
            ]
        );
    }

    #[rstest]
    fn variants_add_short_fallback_when_locality_present(normalizer: AddressNormalizer) {
        assert_eq!(
            normalizer.variants("Gorriti 450, Capital Federal"),
            vec![
                "Gorriti 450, CABA, CABA, Argentina",
                "Gorriti 450, CABA, Buenos Aires, Argentina",
                "Gorriti 450, CABA, Argentina",
            ]
        );
    }

    #[rstest]
    fn province_mention_counts_as_locality(normalizer: AddressNormalizer) {
        let variants = normalizer.variants("Olivos, Provincia de Buenos Aires");
        assert_eq!(
            variants.last().map(String::as_str),
            Some("Olivos, Buenos Aires, Argentina")
        );
        assert_eq!(variants.len(), 3);
    }

    #[rstest]
    fn neighbourhood_prefix_is_not_a_locality_mention(normalizer: AddressNormalizer) {
        assert_eq!(normalizer.variants("Caballito").len(), 2);
    }

    #[rstest]
    #[case("Gorriti 450, Palermo")]
    #[case("Gorriti 450, CABA")]
    #[case("Av. Cabildo 2040, Belgrano, Capital Federal, Argentina")]
    fn variants_are_deterministic_and_unique(normalizer: AddressNormalizer, #[case] raw: &str) {
        let first = normalizer.variants(raw);
        assert_eq!(first, normalizer.variants(raw));
        let lowered: HashSet<String> = first.iter().map(|v| v.to_lowercase()).collect();
        assert_eq!(lowered.len(), first.len());
    }

    #[rstest]
    fn custom_locale_changes_suffixes() {
        let normalizer = AddressNormalizer::new(AddressLocale {
            locality: "Rosario".to_owned(),
            province: "Santa Fe".to_owned(),
            country: "Argentina".to_owned(),
        });
        assert_eq!(
            normalizer.variants("Pellegrini 950"),
            vec![
                "Pellegrini 950, Rosario, Argentina",
                "Pellegrini 950, Santa Fe, Argentina",
            ]
        );
    }

    #[rstest]
    #[case("Caballito", "caba", false)]
    #[case("Palermo, CABA", "caba", true)]
    #[case("Olivos, Buenos Aires", "buenos aires", true)]
    #[case("", "caba", false)]
    fn whole_word_mentions(#[case] haystack: &str, #[case] needle: &str, #[case] expected: bool) {
        assert_eq!(mentions_word(haystack, needle), expected);
    }
}
