//! In-memory collaborators for driving the engine without a network.

use async_trait::async_trait;
use moviepicks_models::{CandidateItem, FilterSet, MovieDetail, ProviderMap, SensitivitySummary};
use moviepicks_sources::{CatalogSource, DiscoverQuery, Notifier, SensitivitySource, SourceError, Summarizer};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub fn candidate(id: u64, rating: f64, votes: u32) -> CandidateItem {
    CandidateItem {
        id,
        title: format!("Movie {}", id),
        release_date: Some("2010-05-14".to_string()),
        average_rating: rating,
        vote_count: votes,
        genre_ids: vec![18],
    }
}

pub fn detail_for(candidate: &CandidateItem) -> MovieDetail {
    MovieDetail {
        id: candidate.id,
        title: candidate.title.clone(),
        release_date: candidate.release_date.clone(),
        average_rating: candidate.average_rating,
        vote_count: candidate.vote_count,
        genre_ids: candidate.genre_ids.clone(),
        ..MovieDetail::default()
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    pages: Vec<(FilterSet, Vec<Vec<CandidateItem>>)>,
    failing_pages: Vec<(FilterSet, u32)>,
    details: HashMap<u64, MovieDetail>,
    failing_details: HashSet<u64>,
    providers: HashMap<u64, ProviderMap>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register discovery pages for `filter`; every candidate also gets a
    /// minimal detail unless one is registered already.
    pub fn with_pages(mut self, filter: FilterSet, pages: Vec<Vec<CandidateItem>>) -> Self {
        for item in pages.iter().flatten() {
            self.details.entry(item.id).or_insert_with(|| detail_for(item));
        }
        self.pages.push((filter, pages));
        self
    }

    pub fn failing_page(mut self, filter: FilterSet, page: u32) -> Self {
        self.failing_pages.push((filter, page));
        self
    }

    pub fn with_detail(mut self, detail: MovieDetail) -> Self {
        self.details.insert(detail.id, detail);
        self
    }

    pub fn failing_detail(mut self, id: u64) -> Self {
        self.failing_details.insert(id);
        self
    }

    pub fn with_providers(mut self, id: u64, providers: ProviderMap) -> Self {
        self.providers.insert(id, providers);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    fn source_name(&self) -> &str {
        "fake-catalog"
    }

    async fn discover(&self, query: &DiscoverQuery, page: u32) -> Result<Vec<CandidateItem>, SourceError> {
        self.record(format!("discover {:?} {:?} p{}", query.filter.with_genres, query.filter.with_original_language, page));

        if self.failing_pages.iter().any(|(f, p)| *f == query.filter && *p == page) {
            return Err(SourceError::unavailable("fake-catalog", "503 Service Unavailable"));
        }

        Ok(self
            .pages
            .iter()
            .find(|(f, _)| *f == query.filter)
            .and_then(|(_, pages)| pages.get(page as usize - 1))
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_detail(&self, id: u64) -> Result<MovieDetail, SourceError> {
        self.record(format!("detail {}", id));

        if self.failing_details.contains(&id) {
            return Err(SourceError::unavailable("fake-catalog", "404 Not Found"));
        }
        self.details
            .get(&id)
            .cloned()
            .ok_or_else(|| SourceError::unavailable("fake-catalog", "404 Not Found"))
    }

    async fn fetch_providers(&self, id: u64) -> Result<ProviderMap, SourceError> {
        self.record(format!("providers {}", id));
        Ok(self.providers.get(&id).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    fail: bool,
    sent: Mutex<Vec<(String, String)>>,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    fn sink_name(&self) -> &str {
        "fake-notifier"
    }

    async fn send(&self, destination: &str, body: &str) -> Result<(), SourceError> {
        if self.fail {
            return Err(SourceError::unavailable("fake-notifier", "connection refused"));
        }
        self.sent.lock().unwrap().push((destination.to_string(), body.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeSensitivity {
    pages: HashMap<String, String>,
}

impl FakeSensitivity {
    pub fn with_page(mut self, external_id: &str, text: &str) -> Self {
        self.pages.insert(external_id.to_string(), text.to_string());
        self
    }
}

#[async_trait]
impl SensitivitySource for FakeSensitivity {
    async fn fetch_page_text(&self, external_id: &str) -> Result<String, SourceError> {
        self.pages
            .get(external_id)
            .cloned()
            .ok_or_else(|| SourceError::unavailable("fake-sensitivity", "404 Not Found"))
    }
}

pub struct FakeSummarizer {
    answer: Option<SensitivitySummary>,
    calls: Mutex<Vec<String>>,
}

impl FakeSummarizer {
    pub fn answering(approximate_count: u32, summary: &str) -> Self {
        Self {
            answer: Some(SensitivitySummary {
                approximate_count,
                summary: summary.to_string(),
            }),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with something that is not the expected JSON shape
    pub fn malformed() -> Self {
        Self {
            answer: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn summarize(&self, title: &str, _page_text: &str) -> Result<SensitivitySummary, SourceError> {
        self.calls.lock().unwrap().push(title.to_string());
        self.answer
            .clone()
            .ok_or_else(|| SourceError::malformed("fake-summarizer", "expected value at line 1 column 1"))
    }
}
