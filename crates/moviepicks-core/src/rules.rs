//! Declarative lookup tables and small pure helpers used by enrichment.
//!
//! The certification table is ordered: the first bucket with a matching
//! predicate wins, so "PG-13" never reaches the "PG" exact rule and "12A"
//! lands in 13+ before the 16/18 prefix rules are tried.

use moviepicks_models::{CertificationBucket, CrewCredit, ProviderMap, RegionRelease, StreamingAvailability, Video};
use std::collections::HashSet;

/// How a rule compares against an uppercased, trimmed certification code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeMatch {
    Exact(&'static str),
    Contains(&'static str),
    Prefix(&'static str),
}

impl CodeMatch {
    pub fn matches(&self, code: &str) -> bool {
        match self {
            CodeMatch::Exact(s) => code == *s,
            CodeMatch::Contains(s) => code.contains(s),
            CodeMatch::Prefix(s) => code.starts_with(s),
        }
    }
}

pub const CERTIFICATION_RULES: &[(CertificationBucket, &[CodeMatch])] = &[
    (
        CertificationBucket::AllAges,
        &[
            CodeMatch::Exact("G"),
            CodeMatch::Exact("PG"),
            CodeMatch::Exact("U"),
            CodeMatch::Contains("ALL"),
        ],
    ),
    (
        CertificationBucket::Thirteen,
        &[
            CodeMatch::Contains("PG-13"),
            CodeMatch::Contains("U/A"),
            CodeMatch::Contains("12"),
            CodeMatch::Exact("13"),
        ],
    ),
    (
        CertificationBucket::Sixteen,
        &[CodeMatch::Prefix("16"), CodeMatch::Exact("R"), CodeMatch::Exact("A")],
    ),
    (
        CertificationBucket::Eighteen,
        &[CodeMatch::Prefix("18"), CodeMatch::Exact("NC-17")],
    ),
];

/// Map a raw regional certification code to an age bucket
pub fn map_certification(code: Option<&str>) -> CertificationBucket {
    let Some(code) = code.map(|c| c.trim().to_uppercase()).filter(|c| !c.is_empty()) else {
        return CertificationBucket::NotRated;
    };

    CERTIFICATION_RULES
        .iter()
        .find(|(_, predicates)| predicates.iter().any(|p| p.matches(&code)))
        .map(|(bucket, _)| *bucket)
        .unwrap_or(CertificationBucket::NotRated)
}

/// First non-empty certification in the highest-priority region that has
/// one. Lower-priority regions are not consulted once a value is found.
pub fn pick_certification<'a>(releases: &'a [RegionRelease], regions: &[String]) -> Option<&'a str> {
    regions.iter().find_map(|region| {
        releases
            .iter()
            .filter(|release| release.region.eq_ignore_ascii_case(region))
            .flat_map(|release| release.certifications.iter())
            .map(|c| c.trim())
            .find(|c| !c.is_empty())
    })
}

pub fn certification_bucket(releases: &[RegionRelease], regions: &[String]) -> CertificationBucket {
    map_certification(pick_certification(releases, regions))
}

/// Provider names for the first region present in `providers`.
///
/// Categories are read subscription → rent → buy (→ ads), deduplicated in
/// first-seen order, then narrowed to the major platforms when any of them
/// is present.
pub fn streaming_availability(
    providers: &ProviderMap,
    regions: &[String],
    include_ads: bool,
    major_platforms: &[String],
) -> StreamingAvailability {
    let Some(region) = regions.iter().find_map(|r| providers.get(r)) else {
        return StreamingAvailability::UnavailableInRegion;
    };

    let mut categories = vec![&region.flatrate, &region.rent, &region.buy];
    if include_ads {
        categories.push(&region.ads);
    }

    let mut seen = HashSet::new();
    let names: Vec<String> = categories
        .into_iter()
        .flatten()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_string()))
        .map(str::to_string)
        .collect();

    let majors: Vec<String> = names
        .iter()
        .filter(|name| major_platforms.iter().any(|m| m.eq_ignore_ascii_case(name)))
        .cloned()
        .collect();

    let narrowed = if majors.is_empty() { names } else { majors };
    if narrowed.is_empty() {
        StreamingAvailability::UnavailableInRegion
    } else {
        StreamingAvailability::Available(narrowed)
    }
}

/// Watch URL of the preferred video hosted on `host`
pub fn trailer_url(videos: &[Video], host: &str) -> Option<String> {
    let hosted = || videos.iter().filter(|v| v.site.eq_ignore_ascii_case(host) && !v.key.is_empty());

    let preferred = hosted().find(|v| {
        let kind_ok = v.kind.eq_ignore_ascii_case("Trailer") || v.kind.eq_ignore_ascii_case("Teaser");
        kind_ok && v.official != Some(false)
    });

    preferred.or_else(|| hosted().next()).and_then(|v| video_url(&v.site, &v.key))
}

fn video_url(site: &str, key: &str) -> Option<String> {
    match site.to_ascii_lowercase().as_str() {
        "youtube" => Some(format!("https://www.youtube.com/watch?v={}", key)),
        "vimeo" => Some(format!("https://vimeo.com/{}", key)),
        _ => None,
    }
}

pub fn director(crew: &[CrewCredit]) -> Option<String> {
    crew.iter()
        .find(|c| c.job == "Director")
        .map(|c| c.name.clone())
        .filter(|name| !name.trim().is_empty())
}

pub const ELLIPSIS: &str = "...";

/// Cut `text` to at most `max_chars` characters including the ellipsis.
///
/// The cut backs off to the last whitespace inside the budget when there is
/// one; a single unbroken word is cut hard.
pub fn truncate_overview(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let budget = max_chars.saturating_sub(ELLIPSIS.chars().count());
    let head: String = text.chars().take(budget).collect();

    // The next char starting a new word means the cut already sits on a boundary
    let next_is_space = text.chars().nth(budget).map(char::is_whitespace).unwrap_or(true);
    let cut = if next_is_space {
        head.trim_end()
    } else {
        match head.rfind(char::is_whitespace) {
            Some(idx) if !head[..idx].trim().is_empty() => head[..idx].trim_end(),
            _ => head.as_str(),
        }
    };

    format!("{}{}", cut, ELLIPSIS)
}
