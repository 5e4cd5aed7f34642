use serde::{Deserialize, Serialize};

/// Full per-item detail from the catalog, with credits, release
/// certifications, videos and external ids attached.
///
/// This is the catalog's view of an item; the enrichment pipeline merges it
/// with provider and sensitivity data into an `EnrichedItem`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MovieDetail {
    pub id: u64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    pub average_rating: f64,
    pub vote_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_minutes: Option<u32>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub genre_names: Vec<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub spoken_languages: Vec<SpokenLanguage>,
    /// Cast names in catalog billing order
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub crew: Vec<CrewCredit>,
    /// Release entries grouped per region, in catalog order
    #[serde(default)]
    pub releases: Vec<RegionRelease>,
    #[serde(default)]
    pub videos: Vec<Video>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpokenLanguage {
    pub iso_639_1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub english_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrewCredit {
    pub name: String,
    pub job: String,
}

/// Certifications of every release in one region (ISO 3166-1 code).
/// Empty strings are kept; consumers decide what "present" means.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegionRelease {
    pub region: String,
    #[serde(default)]
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Video {
    pub site: String,
    pub kind: String, // "Trailer", "Teaser", "Clip", ...
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub official: Option<bool>,
}
