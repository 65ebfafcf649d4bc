//! Country and region grouping derived from source labels.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::search::SearchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RegionGroup {
    #[serde(rename = "EU")]
    Eu,
    #[serde(rename = "Non-EU")]
    NonEu,
    #[serde(rename = "MENA")]
    Mena,
}

impl RegionGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            RegionGroup::Eu => "EU",
            RegionGroup::NonEu => "Non-EU",
            RegionGroup::Mena => "MENA",
        }
    }
}

const EU_MEMBERS: &[&str] = &[
    "de", "fr", "be", "nl", "es", "pl", "cz", "sk", "si", "hu", "it", "at", "pt", "lu", "se",
    "fi", "dk", "gr",
];
const MENA: &[&str] = &["sa", "ae", "om", "eg", "ma"];

/// (code, display name, label keywords). Checked in order; first hit wins.
const COUNTRIES: &[(&str, &str, &[&str])] = &[
    ("de", "Germany", &["germany", "german"]),
    ("fr", "France", &["france", "french"]),
    ("be", "Belgium", &["belgium"]),
    ("nl", "Netherlands", &["netherlands", "dutch"]),
    ("gb", "UK", &["uk", "united kingdom", "britain"]),
    ("es", "Spain", &["spain", "spanish"]),
    ("it", "Italy", &["italy", "italian"]),
    ("at", "Austria", &["austria"]),
    ("pt", "Portugal", &["portugal"]),
    ("lu", "Luxembourg", &["luxembourg"]),
    ("ch", "Switzerland", &["switzerland", "swiss"]),
    ("se", "Sweden", &["sweden", "swedish"]),
    ("no", "Norway", &["norway"]),
    ("fi", "Finland", &["finland"]),
    ("dk", "Denmark", &["denmark"]),
    ("pl", "Poland", &["poland", "polish"]),
    ("hu", "Hungary", &["hungary"]),
    ("cz", "Czech Republic", &["czech"]),
    ("sk", "Slovakia", &["slovakia"]),
    ("si", "Slovenia", &["slovenia"]),
    ("gr", "Greece", &["greece"]),
    ("rs", "Serbia", &["serbia"]),
    ("ua", "Ukraine", &["ukraine"]),
    ("ru", "Russia", &["russia"]),
    ("tr", "Turkey", &["turkey", "türkiye"]),
    ("sa", "Saudi Arabia", &["saudi", "middleeast", "middle east", "mena"]),
    ("ae", "UAE", &["uae", "emirates"]),
    ("eg", "Egypt", &["egypt"]),
    ("om", "Oman", &["oman"]),
    ("ma", "Morocco", &["morocco"]),
];

fn words(label: &str) -> Vec<String> {
    label
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// ISO country code for a source label such as `Google-Germany`.
///
/// Keywords match whole words; multi-word keywords match a word sequence.
pub fn country_code(label: &str) -> Option<&'static str> {
    let tokens = words(label);
    let joined = format!(" {} ", tokens.join(" "));
    COUNTRIES
        .iter()
        .find(|(_, _, keywords)| {
            keywords
                .iter()
                .any(|k| joined.contains(&format!(" {k} ")))
        })
        .map(|(code, _, _)| *code)
}

pub fn country_name(code: &str) -> String {
    COUNTRIES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, name, _)| name.to_string())
        .unwrap_or_else(|| code.to_uppercase())
}

pub fn region_group(code: Option<&str>) -> RegionGroup {
    match code {
        Some(c) if EU_MEMBERS.contains(&c) => RegionGroup::Eu,
        Some(c) if MENA.contains(&c) => RegionGroup::Mena,
        _ => RegionGroup::NonEu,
    }
}

/// Result count per country code; results without a country are skipped.
pub fn country_counts(results: &[SearchResult]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for code in results.iter().filter_map(|r| country_code(&r.source)) {
        *counts.entry(code).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_plan_labels_to_countries() {
        assert_eq!(country_code("Google-Germany"), Some("de"));
        assert_eq!(country_code("Google-UK"), Some("gb"));
        assert_eq!(country_code("Google-MiddleEast(News)"), Some("sa"));
        assert_eq!(country_code("Google-MENA(Biz)"), Some("sa"));
        assert_eq!(country_code("Google-UAE"), Some("ae"));
        assert_eq!(country_code("Google-Turkey"), Some("tr"));
    }

    #[test]
    fn labels_without_country_yield_none() {
        assert_eq!(country_code("Google-Safety"), None);
        assert_eq!(country_code("Brave-Europe(En)"), None);
        assert_eq!(country_code("Brave-Competitors"), None);
        assert_eq!(country_code(""), None);
    }

    #[test]
    fn keywords_do_not_match_inside_words() {
        // "uk" must not match "Ukraine", "oman" must not match "Romania"
        assert_eq!(country_code("Google-Ukraine"), Some("ua"));
        assert_eq!(country_code("Google-Romania"), None);
    }

    #[test]
    fn groups_regions() {
        assert_eq!(region_group(Some("de")), RegionGroup::Eu);
        assert_eq!(region_group(Some("ae")), RegionGroup::Mena);
        assert_eq!(region_group(Some("gb")), RegionGroup::NonEu);
        assert_eq!(region_group(Some("ua")), RegionGroup::NonEu);
        assert_eq!(region_group(None), RegionGroup::NonEu);
    }

    #[test]
    fn counts_results_per_country() {
        let results = vec![
            SearchResult::new("a", "1", "", "Google-Germany"),
            SearchResult::new("b", "2", "", "Google-Germany"),
            SearchResult::new("c", "3", "", "Google-Sweden"),
            SearchResult::new("d", "4", "", "Google-Safety"),
        ];
        let counts = country_counts(&results);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["de"], 2);
        assert_eq!(counts["se"], 1);
    }

    #[test]
    fn names_known_and_unknown_codes() {
        assert_eq!(country_name("de"), "Germany");
        assert_eq!(country_name("xx"), "XX");
    }
}
