use async_trait::async_trait;
use chrono::NaiveDate;
use moviepicks_models::{CandidateItem, FilterSet, MovieDetail, ProviderMap, SensitivitySummary, ThemeProfile};
use crate::error::SourceError;

/// One discovery request, minus the page number.
///
/// The floors are sent to the catalog so noise is cut server-side before
/// any client-side filtering happens.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverQuery {
    pub filter: FilterSet,
    pub min_rating: f64,
    pub min_vote_count: u32,
    pub min_release_date: NaiveDate,
}

impl DiscoverQuery {
    pub fn for_filter(profile: &ThemeProfile, filter: &FilterSet) -> Self {
        Self {
            filter: filter.clone(),
            min_rating: profile.rating_floor,
            min_vote_count: profile.vote_count_floor,
            min_release_date: profile.release_date_floor,
        }
    }
}

/// Paginated catalog with detail and watch-provider sub-resources
#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn source_name(&self) -> &str;

    /// One page of discovery results (pages start at 1). An empty vector
    /// means the walk is over.
    async fn discover(&self, query: &DiscoverQuery, page: u32) -> Result<Vec<CandidateItem>, SourceError>;

    /// Detail with credits, release certifications, videos and external ids
    async fn fetch_detail(&self, id: u64) -> Result<MovieDetail, SourceError>;

    async fn fetch_providers(&self, id: u64) -> Result<ProviderMap, SourceError>;
}

/// Raw page text keyed by an external cross-reference id
#[async_trait]
pub trait SensitivitySource: Send + Sync {
    async fn fetch_page_text(&self, external_id: &str) -> Result<String, SourceError>;
}

/// Text-in, structured-summary-out
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, title: &str, page_text: &str) -> Result<SensitivitySummary, SourceError>;
}

/// Outbound message sink
#[async_trait]
pub trait Notifier: Send + Sync {
    fn sink_name(&self) -> &str;

    async fn send(&self, destination: &str, body: &str) -> Result<(), SourceError>;
}
