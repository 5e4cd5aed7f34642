use chrono::{Duration as ChronoDuration, NaiveDate};
use moviepicks_config::{Config, SelectionPolicyKind};
use moviepicks_models::{CandidateItem, MovieDetail, ProviderMap, ThemeProfile};
use moviepicks_sources::{CatalogSource, DiscoverQuery};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use crate::history::HistoryStore;
use crate::rules::streaming_availability;

/// Rating interval `[floor, ceiling)`; a ceiling at the top of the scale
/// is inclusive so a perfect 10.0 still lands in the top band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingBand {
    pub floor: f64,
    pub ceiling: f64,
}

impl RatingBand {
    pub fn new(floor: f64, ceiling: f64) -> Self {
        Self { floor, ceiling }
    }

    pub fn contains(&self, rating: f64) -> bool {
        rating >= self.floor && (rating < self.ceiling || (self.ceiling >= 10.0 && rating <= self.ceiling))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionPolicy {
    /// Best N by rank
    TopN,
    /// One pick per band per sweep, bands in the given order; leftover
    /// slots are filled in rank order
    Banded(Vec<RatingBand>),
}

/// Hard gate applied after the detail fetch
#[derive(Debug, Clone)]
pub struct EligibilityGate {
    pub allowed_languages: Vec<String>,
    pub require_provider: bool,
    pub provider_regions: Vec<String>,
    pub include_ads: bool,
}

#[derive(Debug, Clone)]
pub struct SelectionSettings {
    pub count: usize,
    /// Zero disables the no-repeat window
    pub no_repeat_days: i64,
    pub min_rating: f64,
    pub max_pages: u32,
    pub page_delay: Duration,
    pub policy: SelectionPolicy,
    pub gate: Option<EligibilityGate>,
}

impl SelectionSettings {
    pub fn from_config(config: &Config) -> Self {
        let selection = &config.selection;
        let policy = match selection.policy {
            SelectionPolicyKind::TopN => SelectionPolicy::TopN,
            SelectionPolicyKind::Banded => SelectionPolicy::Banded(
                selection
                    .bands
                    .iter()
                    .map(|b| RatingBand::new(b.floor, b.ceiling))
                    .collect(),
            ),
        };
        let gate = selection.eligibility.enabled.then(|| EligibilityGate {
            allowed_languages: selection.eligibility.allowed_languages.clone(),
            require_provider: selection.eligibility.require_provider,
            provider_regions: config.enrichment.provider_regions.clone(),
            include_ads: config.enrichment.include_ads,
        });

        Self {
            count: selection.count,
            no_repeat_days: selection.no_repeat_days,
            min_rating: selection.min_rating,
            max_pages: config.catalog.max_pages,
            page_delay: Duration::from_millis(config.catalog.page_delay_ms),
            policy,
            gate,
        }
    }
}

/// A finally accepted candidate with what was fetched while accepting it
#[derive(Debug, Clone)]
pub struct Pick {
    pub candidate: CandidateItem,
    pub detail: MovieDetail,
    /// Only present when the eligibility gate already fetched it
    pub providers: Option<ProviderMap>,
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Unique candidates after the union of every filter set
    pub candidates_found: usize,
    /// Candidates left after the history and rating checks
    pub eligible: usize,
    pub picks: Vec<Pick>,
}

pub struct SelectionEngine {
    catalog: Arc<dyn CatalogSource>,
    settings: SelectionSettings,
}

impl SelectionEngine {
    pub fn new(catalog: Arc<dyn CatalogSource>, settings: SelectionSettings) -> Self {
        Self { catalog, settings }
    }

    pub fn settings(&self) -> &SelectionSettings {
        &self.settings
    }

    pub async fn select(&self, profile: &ThemeProfile, history: &HistoryStore, today: NaiveDate) -> Selection {
        let mut candidates = self.discover_candidates(profile).await;
        let candidates_found = candidates.len();
        rank(&mut candidates);

        let pool = self.prefilter(candidates, history, today);
        let eligible = pool.len();
        debug!(candidates_found, eligible, "Candidate pool ready");

        let picks = self.fill(&pool).await;
        info!(
            operation = "selection_complete",
            theme = %profile.key,
            candidates_found,
            eligible,
            picked = picks.len(),
            "Selection finished"
        );

        Selection {
            candidates_found,
            eligible,
            picks,
        }
    }

    /// Every filter set walked independently, unioned by id (first wins)
    pub async fn discover_candidates(&self, profile: &ThemeProfile) -> Vec<CandidateItem> {
        let mut seen = HashSet::new();
        let mut union = Vec::new();

        for filter in &profile.filter_sets {
            let query = DiscoverQuery::for_filter(profile, filter);
            let found = self.walk_pages(&query).await;
            debug!(
                genres = ?filter.with_genres,
                language = ?filter.with_original_language,
                found = found.len(),
                "Filter set discovered"
            );
            union.extend(found.into_iter().filter(|c| seen.insert(c.id)));
        }

        info!(
            operation = "discovery_complete",
            source = self.catalog.source_name(),
            theme = %profile.key,
            candidates = union.len(),
            "Discovery finished"
        );
        union
    }

    async fn walk_pages(&self, query: &DiscoverQuery) -> Vec<CandidateItem> {
        let mut found = Vec::new();

        for page in 1..=self.settings.max_pages {
            if page > 1 && !self.settings.page_delay.is_zero() {
                tokio::time::sleep(self.settings.page_delay).await;
            }

            match self.catalog.discover(query, page).await {
                Ok(items) if items.is_empty() => {
                    debug!(page, "Empty discovery page, stopping");
                    break;
                }
                Ok(items) => found.extend(items),
                Err(e) => {
                    warn!(page, error = %e, "Discovery page failed, keeping what was fetched");
                    break;
                }
            }
        }

        found
    }

    fn prefilter(&self, ranked: Vec<CandidateItem>, history: &HistoryStore, today: NaiveDate) -> Vec<CandidateItem> {
        let window = no_repeat_cutoff(today, self.settings.no_repeat_days);
        let mut seen = HashSet::new();

        ranked
            .into_iter()
            .filter(|c| seen.insert(c.id))
            .filter(|c| match window {
                Some(cutoff) if history.recently_used(c.id, cutoff) => {
                    debug!(id = c.id, title = %c.title, "Skipping recently sent item");
                    false
                }
                _ => true,
            })
            .filter(|c| {
                let ok = c.average_rating >= self.settings.min_rating;
                if !ok {
                    debug!(id = c.id, rating = c.average_rating, "Skipping item below rating floor");
                }
                ok
            })
            .collect()
    }

    async fn fill(&self, pool: &[CandidateItem]) -> Vec<Pick> {
        let count = self.settings.count;
        let mut claimed = vec![false; pool.len()];
        let mut picks = Vec::with_capacity(count);

        if let SelectionPolicy::Banded(bands) = &self.settings.policy {
            'sweep: loop {
                let mut progressed = false;
                for band in bands {
                    if picks.len() >= count {
                        break 'sweep;
                    }
                    // First unclaimed candidate in the band that passes acceptance
                    while let Some(idx) = (0..pool.len()).find(|&i| !claimed[i] && band.contains(pool[i].average_rating)) {
                        claimed[idx] = true;
                        progressed = true;
                        if let Some(pick) = self.accept(&pool[idx]).await {
                            picks.push(pick);
                            break;
                        }
                    }
                }
                if !progressed {
                    break;
                }
            }
        }

        // Remaining slots (all of them for top-N) in rank order
        for idx in 0..pool.len() {
            if picks.len() >= count {
                break;
            }
            if claimed[idx] {
                continue;
            }
            claimed[idx] = true;
            if let Some(pick) = self.accept(&pool[idx]).await {
                picks.push(pick);
            }
        }

        picks
    }

    /// Detail fetch plus the optional gate. Any failure makes the candidate
    /// ineligible; nothing is retried.
    async fn accept(&self, candidate: &CandidateItem) -> Option<Pick> {
        let detail = match self.catalog.fetch_detail(candidate.id).await {
            Ok(detail) => detail,
            Err(e) => {
                warn!(id = candidate.id, error = %e, "Detail fetch failed, skipping candidate");
                return None;
            }
        };

        let Some(gate) = &self.settings.gate else {
            return Some(Pick {
                candidate: candidate.clone(),
                detail,
                providers: None,
            });
        };

        let language_ok = detail.spoken_languages.iter().any(|l| {
            gate.allowed_languages
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(&l.iso_639_1))
        });
        if !language_ok {
            debug!(id = candidate.id, "No allowed spoken language, skipping candidate");
            return None;
        }

        let providers = if gate.require_provider {
            let providers = match self.catalog.fetch_providers(candidate.id).await {
                Ok(providers) => providers,
                Err(e) => {
                    warn!(id = candidate.id, error = %e, "Provider fetch failed, skipping candidate");
                    return None;
                }
            };
            if !streaming_availability(&providers, &gate.provider_regions, gate.include_ads, &[]).is_available() {
                debug!(id = candidate.id, "No provider in priority regions, skipping candidate");
                return None;
            }
            Some(providers)
        } else {
            None
        };

        Some(Pick {
            candidate: candidate.clone(),
            detail,
            providers,
        })
    }
}

/// First date still inside the no-repeat window, or `None` when the window
/// is disabled. A window reaching past the calendar blocks every dated entry.
pub fn no_repeat_cutoff(today: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days <= 0 {
        return None;
    }
    let cutoff = ChronoDuration::try_days(days)
        .and_then(|window| today.checked_sub_signed(window))
        .unwrap_or(NaiveDate::MIN);
    Some(cutoff)
}

/// Rating descending, then vote count descending. Stable: full ties keep
/// discovery order.
pub fn rank(candidates: &mut [CandidateItem]) {
    candidates.sort_by(|a, b| {
        b.average_rating
            .total_cmp(&a.average_rating)
            .then_with(|| b.vote_count.cmp(&a.vote_count))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{candidate, detail_for, FakeCatalog};
    use moviepicks_models::{FilterSet, HistoryEntry, RegionProviders, SpokenLanguage, ThemeKey};
    use std::path::PathBuf;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 6, 3)
    }

    fn profile(filter_sets: Vec<FilterSet>) -> ThemeProfile {
        ThemeProfile {
            key: ThemeKey::Mix,
            label: ThemeKey::Mix.label().to_string(),
            filter_sets,
            rating_floor: 5.0,
            vote_count_floor: 500,
            release_date_floor: date(1990, 1, 1),
            cast_size: 4,
        }
    }

    fn settings(policy: SelectionPolicy) -> SelectionSettings {
        SelectionSettings {
            count: 3,
            no_repeat_days: 180,
            min_rating: 5.0,
            max_pages: 3,
            page_delay: Duration::ZERO,
            policy,
            gate: None,
        }
    }

    fn default_bands() -> SelectionPolicy {
        SelectionPolicy::Banded(vec![
            RatingBand::new(9.0, 10.0),
            RatingBand::new(8.0, 9.0),
            RatingBand::new(7.0, 8.0),
        ])
    }

    fn empty_history() -> HistoryStore {
        HistoryStore::empty(PathBuf::from("unused.json"))
    }

    fn ids(selection: &Selection) -> Vec<u64> {
        selection.picks.iter().map(|p| p.candidate.id).collect()
    }

    fn four_candidates() -> Vec<CandidateItem> {
        vec![
            candidate(1, 9.5, 1000),
            candidate(2, 9.2, 1000),
            candidate(3, 8.7, 1000),
            candidate(4, 7.1, 1000),
        ]
    }

    #[test]
    fn test_band_contains() {
        let top = RatingBand::new(9.0, 10.0);
        assert!(top.contains(9.0));
        assert!(top.contains(10.0));
        assert!(!top.contains(8.99));

        let mid = RatingBand::new(8.0, 9.0);
        assert!(mid.contains(8.95));
        assert!(!mid.contains(9.0));
    }

    #[test]
    fn test_rank_is_stable() {
        let mut items = vec![
            candidate(1, 7.0, 600),
            candidate(2, 8.0, 600),
            candidate(3, 8.0, 900),
            candidate(4, 7.0, 600),
        ];
        rank(&mut items);
        let order: Vec<u64> = items.iter().map(|c| c.id).collect();
        assert_eq!(order, vec![3, 2, 1, 4]);
    }

    #[tokio::test]
    async fn test_banded_spreads_across_bands() {
        let catalog = FakeCatalog::new().with_pages(FilterSet::default(), vec![four_candidates()]);
        let engine = SelectionEngine::new(Arc::new(catalog), settings(default_bands()));

        let selection = engine
            .select(&profile(vec![FilterSet::default()]), &empty_history(), today())
            .await;
        assert_eq!(ids(&selection), vec![1, 3, 4]);
    }

    #[tokio::test]
    async fn test_top_n_takes_best_ranked() {
        let catalog = FakeCatalog::new().with_pages(FilterSet::default(), vec![four_candidates()]);
        let engine = SelectionEngine::new(Arc::new(catalog), settings(SelectionPolicy::TopN));

        let selection = engine
            .select(&profile(vec![FilterSet::default()]), &empty_history(), today())
            .await;
        assert_eq!(ids(&selection), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_banded_fills_leftover_slots_in_rank_order() {
        // Nothing in 8-9 or 7-8: second sweep takes the next 9-10 item, and
        // the 6.x item only comes in through the rank-order fill.
        let items = vec![candidate(1, 9.6, 900), candidate(2, 9.1, 900), candidate(3, 6.4, 900)];
        let catalog = FakeCatalog::new().with_pages(FilterSet::default(), vec![items]);
        let engine = SelectionEngine::new(Arc::new(catalog), settings(default_bands()));

        let selection = engine
            .select(&profile(vec![FilterSet::default()]), &empty_history(), today())
            .await;
        assert_eq!(ids(&selection), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_history_window_and_rating_floor() {
        let items = vec![
            candidate(1, 9.5, 900), // sent yesterday
            candidate(2, 9.0, 900), // sent long ago
            candidate(3, 8.0, 900),
            candidate(4, 4.9, 900), // below floor
            candidate(5, 7.0, 900),
        ];
        let catalog = FakeCatalog::new().with_pages(FilterSet::default(), vec![items]);
        let engine = SelectionEngine::new(Arc::new(catalog), settings(SelectionPolicy::TopN));

        let mut history = empty_history();
        history.append([
            HistoryEntry::new(1, date(2024, 6, 2)),
            HistoryEntry::new(2, date(2023, 1, 1)),
            HistoryEntry::new(4, HistoryEntry::epoch()),
        ]);

        let selection = engine
            .select(&profile(vec![FilterSet::default()]), &history, today())
            .await;
        assert_eq!(ids(&selection), vec![2, 3, 5]);
        assert_eq!(selection.candidates_found, 5);
        assert_eq!(selection.eligible, 3);
        assert!(selection.picks.iter().all(|p| p.candidate.average_rating >= 5.0));
    }

    #[tokio::test]
    async fn test_zero_window_disables_history() {
        let catalog = FakeCatalog::new().with_pages(FilterSet::default(), vec![vec![candidate(1, 8.0, 900)]]);
        let mut settings = settings(SelectionPolicy::TopN);
        settings.no_repeat_days = 0;
        let engine = SelectionEngine::new(Arc::new(catalog), settings);

        let mut history = empty_history();
        history.append([HistoryEntry::new(1, today())]);

        let selection = engine
            .select(&profile(vec![FilterSet::default()]), &history, today())
            .await;
        assert_eq!(ids(&selection), vec![1]);
    }

    #[test]
    fn test_no_repeat_cutoff() {
        assert_eq!(no_repeat_cutoff(today(), 0), None);
        assert_eq!(no_repeat_cutoff(date(2024, 6, 3), 3), Some(date(2024, 5, 31)));
        assert_eq!(no_repeat_cutoff(today(), 100_000_000), Some(NaiveDate::MIN));
        assert_eq!(no_repeat_cutoff(today(), i64::MAX), Some(NaiveDate::MIN));
    }

    #[tokio::test]
    async fn test_oversized_window_blocks_dated_history_without_panicking() {
        let items = vec![candidate(1, 9.0, 900), candidate(2, 8.5, 900), candidate(3, 8.0, 900)];
        let catalog = FakeCatalog::new().with_pages(FilterSet::default(), vec![items]);
        let mut settings = settings(SelectionPolicy::TopN);
        settings.no_repeat_days = 100_000_000;
        let engine = SelectionEngine::new(Arc::new(catalog), settings);

        let mut history = empty_history();
        history.append([
            HistoryEntry::new(1, date(1995, 3, 14)),
            HistoryEntry::new(2, HistoryEntry::epoch()),
        ]);

        let selection = engine
            .select(&profile(vec![FilterSet::default()]), &history, today())
            .await;
        assert_eq!(ids(&selection), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_pagination_stops_on_empty_page() {
        let pages = vec![vec![candidate(1, 8.0, 900)], vec![], vec![candidate(3, 9.0, 900)]];
        let catalog = Arc::new(FakeCatalog::new().with_pages(FilterSet::default(), pages));
        let engine = SelectionEngine::new(catalog.clone(), settings(SelectionPolicy::TopN));

        let found = engine.discover_candidates(&profile(vec![FilterSet::default()])).await;
        assert_eq!(found.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1]);
        let discover_calls = catalog.calls().iter().filter(|c| c.starts_with("discover")).count();
        assert_eq!(discover_calls, 2);
    }

    #[tokio::test]
    async fn test_max_pages_bounds_walk() {
        let pages = (1..=5).map(|i| vec![candidate(i, 8.0, 900)]).collect();
        let catalog = Arc::new(FakeCatalog::new().with_pages(FilterSet::default(), pages));
        let engine = SelectionEngine::new(catalog.clone(), settings(SelectionPolicy::TopN));

        let found = engine.discover_candidates(&profile(vec![FilterSet::default()])).await;
        assert_eq!(found.len(), 3);
    }

    #[tokio::test]
    async fn test_union_by_id_first_occurrence_wins() {
        let genres = FilterSet::genres(&[9648, 10752]);
        let hindi = FilterSet::original_language("hi");
        let mut dup = candidate(2, 9.9, 5000);
        dup.title = "Duplicate".to_string();

        let catalog = FakeCatalog::new()
            .with_pages(genres.clone(), vec![vec![candidate(1, 8.0, 900), candidate(2, 7.5, 900)]])
            .with_pages(hindi.clone(), vec![vec![dup, candidate(3, 7.2, 900)]]);
        let engine = SelectionEngine::new(Arc::new(catalog), settings(SelectionPolicy::TopN));

        let found = engine.discover_candidates(&profile(vec![genres, hindi])).await;
        assert_eq!(found.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(found[1].title, "Movie 2");
    }

    #[tokio::test]
    async fn test_discovery_failure_degrades_one_filter_set() {
        let genres = FilterSet::genres(&[9648, 10752]);
        let hindi = FilterSet::original_language("hi");
        let catalog = FakeCatalog::new()
            .with_pages(genres.clone(), vec![vec![candidate(1, 8.0, 900)]])
            .failing_page(genres.clone(), 1)
            .with_pages(hindi.clone(), vec![vec![candidate(2, 7.0, 900)], vec![candidate(3, 6.0, 900)]])
            .failing_page(hindi.clone(), 2);
        let engine = SelectionEngine::new(Arc::new(catalog), settings(SelectionPolicy::TopN));

        let selection = engine
            .select(&profile(vec![genres, hindi]), &empty_history(), today())
            .await;
        assert_eq!(ids(&selection), vec![2]);
    }

    #[tokio::test]
    async fn test_detail_failure_skips_candidate() {
        let catalog = FakeCatalog::new()
            .with_pages(FilterSet::default(), vec![four_candidates()])
            .failing_detail(1);
        let engine = SelectionEngine::new(Arc::new(catalog), settings(default_bands()));

        let selection = engine
            .select(&profile(vec![FilterSet::default()]), &empty_history(), today())
            .await;
        // 9.2 stands in for the failed 9.5 within the top band
        assert_eq!(ids(&selection), vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn test_never_more_than_count_and_no_duplicates() {
        let items: Vec<CandidateItem> = (1..=20).map(|i| candidate(i, 5.0 + (i % 5) as f64, 900)).collect();
        let mut doubled = items.clone();
        doubled.extend(items);

        for policy in [SelectionPolicy::TopN, default_bands()] {
            let catalog = FakeCatalog::new().with_pages(FilterSet::default(), vec![doubled.clone()]);
            let engine = SelectionEngine::new(Arc::new(catalog), settings(policy));
            let selection = engine
                .select(&profile(vec![FilterSet::default()]), &empty_history(), today())
                .await;
            let unique: HashSet<u64> = ids(&selection).into_iter().collect();
            assert_eq!(selection.picks.len(), 3);
            assert_eq!(unique.len(), 3);
        }
    }

    #[tokio::test]
    async fn test_nothing_eligible_is_empty_not_error() {
        let catalog = FakeCatalog::new().with_pages(FilterSet::default(), vec![vec![candidate(1, 8.0, 900)]]);
        let engine = SelectionEngine::new(Arc::new(catalog), settings(default_bands()));
        let mut history = empty_history();
        history.append([HistoryEntry::new(1, date(2024, 5, 1))]);

        let selection = engine
            .select(&profile(vec![FilterSet::default()]), &history, today())
            .await;
        assert!(selection.picks.is_empty());
    }

    #[tokio::test]
    async fn test_eligibility_gate() {
        let mut german = detail_for(&candidate(1, 9.0, 900));
        german.spoken_languages = vec![SpokenLanguage { iso_639_1: "de".to_string(), english_name: Some("German".to_string()) }];
        let mut hindi_no_provider = detail_for(&candidate(2, 8.5, 900));
        hindi_no_provider.spoken_languages = vec![SpokenLanguage { iso_639_1: "hi".to_string(), english_name: None }];
        let mut english = detail_for(&candidate(3, 8.0, 900));
        english.spoken_languages = vec![SpokenLanguage { iso_639_1: "en".to_string(), english_name: Some("English".to_string()) }];

        let mut providers = ProviderMap::new();
        providers.insert(
            "US".to_string(),
            RegionProviders { rent: vec!["Apple TV".to_string()], ..RegionProviders::default() },
        );

        let catalog = FakeCatalog::new()
            .with_pages(
                FilterSet::default(),
                vec![vec![candidate(1, 9.0, 900), candidate(2, 8.5, 900), candidate(3, 8.0, 900)]],
            )
            .with_detail(german)
            .with_detail(hindi_no_provider)
            .with_detail(english)
            .with_providers(3, providers);

        let mut settings = settings(SelectionPolicy::TopN);
        settings.gate = Some(EligibilityGate {
            allowed_languages: vec!["en".to_string(), "hi".to_string()],
            require_provider: true,
            provider_regions: vec!["IN".to_string(), "US".to_string()],
            include_ads: false,
        });
        let engine = SelectionEngine::new(Arc::new(catalog), settings);

        let selection = engine
            .select(&profile(vec![FilterSet::default()]), &empty_history(), today())
            .await;
        assert_eq!(ids(&selection), vec![3]);
        assert!(selection.picks[0].providers.is_some());
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = Config::default();
        config.selection.eligibility.enabled = true;
        let settings = SelectionSettings::from_config(&config);

        assert_eq!(settings.count, 3);
        assert_eq!(settings.max_pages, 3);
        assert_eq!(settings.page_delay, Duration::from_millis(250));
        assert!(matches!(&settings.policy, SelectionPolicy::Banded(bands) if bands.len() == 3));
        assert_eq!(settings.gate.map(|g| g.provider_regions.len()), Some(3));

        config.selection.policy = SelectionPolicyKind::TopN;
        assert_eq!(SelectionSettings::from_config(&config).policy, SelectionPolicy::TopN);
    }
}
