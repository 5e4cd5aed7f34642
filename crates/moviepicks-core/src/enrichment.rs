use moviepicks_config::Config;
use moviepicks_models::{EnrichedItem, MovieDetail, ProviderMap, Sensitivity, SensitivitySummary, StreamingAvailability};
use moviepicks_sources::{CatalogSource, SensitivitySource, SourceError, Summarizer};
use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::rules;
use crate::selection::Pick;

#[derive(Debug, Clone)]
pub struct EnrichmentSettings {
    pub certification_regions: Vec<String>,
    pub provider_regions: Vec<String>,
    pub include_ads: bool,
    pub major_platforms: Vec<String>,
    pub overview_max_chars: usize,
    pub video_host: String,
}

impl EnrichmentSettings {
    pub fn from_config(config: &Config) -> Self {
        let enrichment = &config.enrichment;
        Self {
            certification_regions: enrichment.certification_regions.clone(),
            provider_regions: enrichment.provider_regions.clone(),
            include_ads: enrichment.include_ads,
            major_platforms: enrichment.major_platforms.clone(),
            overview_max_chars: enrichment.overview_max_chars,
            video_host: enrichment.video_host.clone(),
        }
    }
}

/// Whether the content-sensitivity field is produced at all
pub enum SensitivityMode {
    Disabled,
    /// A missing summarizer still yields the `Unavailable` sentinel
    Enabled {
        source: Arc<dyn SensitivitySource>,
        summarizer: Option<Arc<dyn Summarizer>>,
    },
}

/// Merges each pick with certification, provider, trailer and sensitivity
/// data into an `EnrichedItem`.
///
/// Every auxiliary field has its own fallback; a failing field never drops
/// the item.
pub struct EnrichmentPipeline {
    catalog: Arc<dyn CatalogSource>,
    settings: EnrichmentSettings,
    sensitivity: SensitivityMode,
}

impl EnrichmentPipeline {
    pub fn new(catalog: Arc<dyn CatalogSource>, settings: EnrichmentSettings, sensitivity: SensitivityMode) -> Self {
        Self {
            catalog,
            settings,
            sensitivity,
        }
    }

    /// Sequential: one item at a time, in pick order
    pub async fn enrich_all(&self, picks: Vec<Pick>, cast_size: usize) -> Vec<EnrichedItem> {
        let mut items = Vec::with_capacity(picks.len());
        for pick in picks {
            items.push(self.enrich(pick, cast_size).await);
        }
        info!(operation = "enrichment_complete", items = items.len(), "Enrichment finished");
        items
    }

    pub async fn enrich(&self, pick: Pick, cast_size: usize) -> EnrichedItem {
        let Pick {
            candidate,
            detail,
            providers,
        } = pick;

        let providers = match providers {
            Some(map) => Ok(map),
            None => self.catalog.fetch_providers(candidate.id).await,
        };
        let streaming = self.streaming(candidate.id, providers);
        let sensitivity = self.sensitivity(&detail).await;

        let certification = rules::certification_bucket(&detail.releases, &self.settings.certification_regions);
        let trailer_url = rules::trailer_url(&detail.videos, &self.settings.video_host);
        let director = rules::director(&detail.crew);
        let overview = rules::truncate_overview(&detail.overview, self.settings.overview_max_chars);

        debug!(
            id = candidate.id,
            certification = %certification,
            providers = streaming.providers().len(),
            trailer = trailer_url.is_some(),
            "Item enriched"
        );

        EnrichedItem {
            id: candidate.id,
            title: if detail.title.trim().is_empty() { candidate.title } else { detail.title },
            release_date: detail.release_date.or(candidate.release_date),
            average_rating: candidate.average_rating,
            vote_count: candidate.vote_count,
            genre_ids: candidate.genre_ids,
            runtime_minutes: detail.runtime_minutes,
            genre_names: detail.genre_names,
            director,
            top_cast: detail.cast.into_iter().take(cast_size).collect(),
            spoken_languages: detail
                .spoken_languages
                .into_iter()
                .filter_map(|l| l.english_name)
                .collect(),
            certification,
            streaming,
            trailer_url,
            overview,
            sensitivity,
        }
    }

    fn streaming(&self, id: u64, providers: Result<ProviderMap, SourceError>) -> StreamingAvailability {
        match providers {
            Ok(map) => rules::streaming_availability(
                &map,
                &self.settings.provider_regions,
                self.settings.include_ads,
                &self.settings.major_platforms,
            ),
            Err(e) => {
                warn!(id, error = %e, "Provider lookup failed");
                StreamingAvailability::UnavailableInRegion
            }
        }
    }

    async fn sensitivity(&self, detail: &MovieDetail) -> Option<Sensitivity> {
        let SensitivityMode::Enabled { source, summarizer } = &self.sensitivity else {
            return None;
        };

        match summarize(source.as_ref(), summarizer.as_deref(), detail).await {
            Ok(summary) => Some(Sensitivity::Summary(summary)),
            Err(SourceError::NotConfigured(name)) => {
                debug!(id = detail.id, name, "Sensitivity summary not configured");
                Some(Sensitivity::Unavailable)
            }
            Err(e) => {
                warn!(id = detail.id, malformed = e.is_malformed(), error = %e, "Sensitivity summary unavailable");
                Some(Sensitivity::Unavailable)
            }
        }
    }
}

async fn summarize(
    source: &dyn SensitivitySource,
    summarizer: Option<&dyn Summarizer>,
    detail: &MovieDetail,
) -> Result<SensitivitySummary, SourceError> {
    let summarizer = summarizer.ok_or(SourceError::NotConfigured("summarizer"))?;
    let external_id = detail
        .imdb_id
        .as_deref()
        .ok_or_else(|| SourceError::malformed("tmdb", "detail has no external id"))?;

    let text = source.fetch_page_text(external_id).await?;
    summarizer.summarize(&detail.title, &text).await
}
