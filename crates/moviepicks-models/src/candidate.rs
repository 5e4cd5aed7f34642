use serde::{Deserialize, Serialize};

/// Raw catalog summary as returned by discovery.
///
/// Candidates only live for the duration of one run: discovery produces
/// them and ranking consumes them immediately.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateItem {
    pub id: u64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    pub average_rating: f64, // 0-10
    pub vote_count: u32,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

impl CandidateItem {
    /// Release year taken from the leading `YYYY` of the release date
    pub fn year(&self) -> Option<u32> {
        release_year(self.release_date.as_deref())
    }
}

pub(crate) fn release_year(release_date: Option<&str>) -> Option<u32> {
    release_date
        .filter(|d| d.len() >= 4)
        .and_then(|d| d.get(..4))
        .and_then(|y| y.parse().ok())
}
