use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use moviepicks_config::{ConfigError, Config, Credentials};
use moviepicks_models::{EnrichedItem, HistoryEntry, ThemeKey};
use moviepicks_sources::{CatalogSource, ChatSummarizer, Notifier, ParentsGuideClient, Summarizer, TmdbClient, UltraMsgNotifier};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};
use crate::enrichment::{EnrichmentPipeline, EnrichmentSettings, SensitivityMode};
use crate::history::HistoryStore;
use crate::render::{render_nothing_found, render_report};
use crate::selection::{SelectionEngine, SelectionSettings};
use crate::theme::{CatalogFloors, ThemeSelector};

/// Outcome of one run
#[derive(Debug, Clone, Serialize)]
pub struct PicksResult {
    pub date: NaiveDate,
    pub theme: ThemeKey,
    pub theme_label: String,
    pub candidates_found: usize,
    pub items: Vec<EnrichedItem>,
    pub message: String,
    pub dry_run: bool,
    pub delivered: bool,
    pub history_persisted: bool,
    pub duration_ms: u64,
}

impl PicksResult {
    pub fn nothing_found(&self) -> bool {
        self.items.is_empty()
    }
}

struct Delivery {
    notifier: Arc<dyn Notifier>,
    destination: String,
}

/// Sequences one run: theme → discovery/selection → enrichment → render →
/// history → delivery.
///
/// History is appended only after enrichment of a non-empty selection and
/// never in dry-run mode. Nothing after construction can fail the run.
pub struct PicksOrchestrator {
    themes: ThemeSelector,
    selection: SelectionEngine,
    enrichment: EnrichmentPipeline,
    history_path: PathBuf,
    delivery: Option<Delivery>,
}

impl PicksOrchestrator {
    /// Message is rendered but not sent, history is not written
    pub fn new(themes: ThemeSelector, selection: SelectionEngine, enrichment: EnrichmentPipeline, history_path: PathBuf) -> Self {
        Self {
            themes,
            selection,
            enrichment,
            history_path,
            delivery: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>, destination: impl Into<String>) -> Self {
        self.delivery = Some(Delivery {
            notifier,
            destination: destination.into(),
        });
        self
    }

    /// Builds the HTTP collaborators. Settings are validated before any of
    /// them exist, so a missing key aborts before the first request.
    pub fn from_config(config: &Config, credentials: &Credentials, history_path: PathBuf, dry_run: bool) -> Result<Self> {
        config.validate()?;
        credentials.validate(!dry_run)?;

        let tmdb_api_key = credentials
            .tmdb_api_key
            .clone()
            .ok_or_else(|| ConfigError::MissingSettings(vec!["TMDB_API_KEY".to_string()]))?;
        let offset = config
            .schedule
            .reference_offset()
            .context("schedule.utc_offset_minutes is out of range")?;
        let timeout = Duration::from_secs(config.catalog.request_timeout_secs);

        let catalog: Arc<dyn CatalogSource> = Arc::new(TmdbClient::new(tmdb_api_key, &config.catalog));

        let sensitivity = if config.sensitivity.enabled {
            let summarizer = credentials.openai_api_key.clone().map(|key| {
                Arc::new(ChatSummarizer::new(
                    &config.sensitivity.summarizer_url,
                    key,
                    &config.sensitivity.model,
                    timeout,
                )) as Arc<dyn Summarizer>
            });
            if summarizer.is_none() {
                info!("OPENAI_API_KEY not set, sensitivity summaries will be marked unavailable");
            }
            SensitivityMode::Enabled {
                source: Arc::new(ParentsGuideClient::new(
                    &config.sensitivity.page_base_url,
                    timeout,
                    config.sensitivity.max_input_chars,
                )),
                summarizer,
            }
        } else {
            SensitivityMode::Disabled
        };

        let floors = CatalogFloors {
            rating: config.selection.min_rating,
            vote_count: config.selection.min_vote_count,
            release_date: config.selection.min_release_date,
        };

        let orchestrator = Self::new(
            ThemeSelector::new(floors, offset),
            SelectionEngine::new(catalog.clone(), SelectionSettings::from_config(config)),
            EnrichmentPipeline::new(catalog, EnrichmentSettings::from_config(config), sensitivity),
            history_path,
        );

        if dry_run {
            return Ok(orchestrator);
        }

        // validate(true) above guarantees all three are present
        match (&credentials.ultra_instance_id, &credentials.ultra_token, &credentials.whatsapp_to) {
            (Some(instance_id), Some(token), Some(to)) => {
                let notifier = UltraMsgNotifier::new(&config.notifier.base_url, instance_id.clone(), token.clone(), timeout);
                Ok(orchestrator.with_notifier(Arc::new(notifier), to.clone()))
            }
            _ => Err(ConfigError::MissingSettings(credentials.missing(true)).into()),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.delivery.is_none()
    }

    /// Run for "today" in the reference time zone
    pub async fn run(&self, now: DateTime<Utc>) -> PicksResult {
        let today = self.themes.today(now);
        self.run_for_date(today).await
    }

    #[instrument(skip(self))]
    pub async fn run_for_date(&self, date: NaiveDate) -> PicksResult {
        let start = Instant::now();
        let profile = self.themes.profile_for(date);
        info!(operation = "run_started", theme = %profile.key, label = %profile.label, "Starting daily picks");

        let mut history = HistoryStore::open(self.history_path.clone());
        let selection = self.selection.select(&profile, &history, date).await;

        if selection.picks.is_empty() {
            info!(operation = "nothing_found", theme = %profile.key, "No eligible items today");
            let message = render_nothing_found(&profile.label, date);
            let delivered = self.deliver(&message).await;
            return PicksResult {
                date,
                theme: profile.key,
                theme_label: profile.label,
                candidates_found: selection.candidates_found,
                items: Vec::new(),
                message,
                dry_run: self.is_dry_run(),
                delivered,
                history_persisted: false,
                duration_ms: start.elapsed().as_millis() as u64,
            };
        }

        let items = self.enrichment.enrich_all(selection.picks, profile.cast_size).await;
        let message = render_report(&items, &profile.label, date, self.selection.settings().min_rating);

        let history_persisted = if self.is_dry_run() {
            false
        } else {
            history.append(items.iter().map(|item| HistoryEntry::new(item.id, date)));
            history.persist()
        };

        let delivered = self.deliver(&message).await;

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            operation = "run_complete",
            theme = %profile.key,
            picks = items.len(),
            delivered,
            history_persisted,
            duration_ms,
            "Daily picks finished"
        );

        PicksResult {
            date,
            theme: profile.key,
            theme_label: profile.label,
            candidates_found: selection.candidates_found,
            items,
            message,
            dry_run: self.is_dry_run(),
            delivered,
            history_persisted,
            duration_ms,
        }
    }

    /// Delivery failures are logged and reported, never raised
    async fn deliver(&self, message: &str) -> bool {
        let Some(delivery) = &self.delivery else {
            info!("Dry run, message not sent");
            return false;
        };

        match delivery.notifier.send(&delivery.destination, message).await {
            Ok(()) => {
                info!(sink = delivery.notifier.sink_name(), "Message delivered");
                true
            }
            Err(e) => {
                warn!(sink = delivery.notifier.sink_name(), error = %e, "Message delivery failed");
                false
            }
        }
    }
}
