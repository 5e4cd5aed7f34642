use serde::{Deserialize, Serialize};
use std::fmt;
use crate::providers::StreamingAvailability;

/// A selected item merged with detail, certification, provider, trailer
/// and (optionally) sensitivity data.
///
/// Built once per selected item and never mutated afterwards; the renderer
/// only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedItem {
    pub id: u64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    pub average_rating: f64,
    pub vote_count: u32,
    pub genre_ids: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_minutes: Option<u32>,
    pub genre_names: Vec<String>,
    /// None when the crew list has no "Director" credit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    pub top_cast: Vec<String>,
    pub spoken_languages: Vec<String>,
    pub certification: CertificationBucket,
    pub streaming: StreamingAvailability,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailer_url: Option<String>,
    pub overview: String,
    /// None when the sensitivity enrichment is switched off entirely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<Sensitivity>,
}

impl EnrichedItem {
    pub fn year(&self) -> Option<u32> {
        crate::candidate::release_year(self.release_date.as_deref())
    }
}

/// Age bucket derived from a raw regional certification code
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CertificationBucket {
    AllAges,
    Thirteen,
    Sixteen,
    Eighteen,
    NotRated,
}

impl CertificationBucket {
    pub fn label(&self) -> &'static str {
        match self {
            CertificationBucket::AllAges => "All ages",
            CertificationBucket::Thirteen => "13+",
            CertificationBucket::Sixteen => "16+",
            CertificationBucket::Eighteen => "18+",
            CertificationBucket::NotRated => "Not rated",
        }
    }
}

impl fmt::Display for CertificationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured answer of the summarization service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SensitivitySummary {
    /// Approximate number of flagged scenes
    pub approximate_count: u32,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Sensitivity {
    Summary(SensitivitySummary),
    Unavailable,
}
