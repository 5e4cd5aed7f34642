use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub sensitivity: SensitivityConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Upper bound on discovery pages walked per filter set
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Pause between discovery pages (third-party rate limits)
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default = "default_no_repeat_days")]
    pub no_repeat_days: i64,
    #[serde(default = "default_min_rating")]
    pub min_rating: f64,
    #[serde(default = "default_min_vote_count")]
    pub min_vote_count: u32,
    #[serde(default = "default_min_release_date")]
    pub min_release_date: NaiveDate,
    #[serde(default)]
    pub policy: SelectionPolicyKind,
    /// Rating bands swept in order by the banded policy
    #[serde(default = "default_bands")]
    pub bands: Vec<BandConfig>,
    #[serde(default)]
    pub eligibility: EligibilityConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicyKind {
    #[default]
    Banded,
    TopN,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BandConfig {
    pub floor: f64,
    pub ceiling: f64,
}

/// Hard gate applied to each pick after its detail has been fetched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityConfig {
    #[serde(default)]
    pub enabled: bool,
    /// ISO 639-1 codes; at least one spoken language must match
    #[serde(default = "default_allowed_languages")]
    pub allowed_languages: Vec<String>,
    #[serde(default = "default_true")]
    pub require_provider: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default = "default_regions")]
    pub certification_regions: Vec<String>,
    #[serde(default = "default_regions")]
    pub provider_regions: Vec<String>,
    /// Also collect ad-supported offers after subscription, rent and buy
    #[serde(default)]
    pub include_ads: bool,
    #[serde(default = "default_major_platforms")]
    pub major_platforms: Vec<String>,
    #[serde(default = "default_overview_max_chars")]
    pub overview_max_chars: usize,
    #[serde(default = "default_video_host")]
    pub video_host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_page_base_url")]
    pub page_base_url: String,
    #[serde(default = "default_summarizer_url")]
    pub summarizer_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Page text is cut to this many characters before summarizing
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    #[serde(default = "default_notifier_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Six-field cron expression (with seconds), evaluated in UTC
    #[serde(default = "default_cron")]
    pub cron: String,
    /// Offset of the reference time zone used for "today" and the theme
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HistoryConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_catalog_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_max_pages() -> u32 {
    3
}

fn default_page_delay_ms() -> u64 {
    250
}

fn default_count() -> usize {
    3
}

/// A century; anything longer is a typo.
pub const MAX_NO_REPEAT_DAYS: i64 = 36_500;

fn default_no_repeat_days() -> i64 {
    180
}

fn default_min_rating() -> f64 {
    5.0
}

fn default_min_vote_count() -> u32 {
    500
}

fn default_min_release_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or(NaiveDate::MIN)
}

pub fn default_bands() -> Vec<BandConfig> {
    vec![
        BandConfig { floor: 9.0, ceiling: 10.0 },
        BandConfig { floor: 8.0, ceiling: 9.0 },
        BandConfig { floor: 7.0, ceiling: 8.0 },
    ]
}

fn default_allowed_languages() -> Vec<String> {
    ["en", "hi", "ur", "pa"].iter().map(|s| s.to_string()).collect()
}

fn default_regions() -> Vec<String> {
    ["IN", "US", "GB"].iter().map(|s| s.to_string()).collect()
}

pub fn default_major_platforms() -> Vec<String> {
    [
        "Netflix",
        "Amazon Prime Video",
        "Disney Plus Hotstar",
        "Disney Plus",
        "JioCinema",
        "Apple TV Plus",
        "Zee5",
        "SonyLIV",
        "Hulu",
        "Max",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_overview_max_chars() -> usize {
    300
}

fn default_video_host() -> String {
    "YouTube".to_string()
}

fn default_page_base_url() -> String {
    "https://www.imdb.com".to_string()
}

fn default_summarizer_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_input_chars() -> usize {
    12_000
}

fn default_notifier_base_url() -> String {
    "https://api.ultramsg.com".to_string()
}

fn default_cron() -> String {
    "0 0 4 * * *".to_string() // 09:00 in Asia/Karachi
}

fn default_utc_offset_minutes() -> i32 {
    5 * 60
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base_url(),
            language: default_language(),
            request_timeout_secs: default_request_timeout_secs(),
            max_pages: default_max_pages(),
            page_delay_ms: default_page_delay_ms(),
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            no_repeat_days: default_no_repeat_days(),
            min_rating: default_min_rating(),
            min_vote_count: default_min_vote_count(),
            min_release_date: default_min_release_date(),
            policy: SelectionPolicyKind::default(),
            bands: default_bands(),
            eligibility: EligibilityConfig::default(),
        }
    }
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_languages: default_allowed_languages(),
            require_provider: default_true(),
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            certification_regions: default_regions(),
            provider_regions: default_regions(),
            include_ads: false,
            major_platforms: default_major_platforms(),
            overview_max_chars: default_overview_max_chars(),
            video_host: default_video_host(),
        }
    }
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            page_base_url: default_page_base_url(),
            summarizer_url: default_summarizer_url(),
            model: default_model(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            base_url: default_notifier_base_url(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron: default_cron(),
            utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

impl ScheduleConfig {
    /// `None` when the offset is outside +/-24h
    pub fn reference_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
    }

    /// Calendar date of `now` in the reference zone, falling back to UTC
    pub fn reference_today(&self, now: DateTime<Utc>) -> NaiveDate {
        match self.reference_offset() {
            Some(offset) => now.with_timezone(&offset).date_naive(),
            None => now.date_naive(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// A missing file means "all defaults"; an unreadable one is an error
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let selection = &self.selection;
        if selection.count == 0 {
            return Err(ConfigError::Invalid("selection.count must be at least 1".to_string()));
        }
        if !(0..=MAX_NO_REPEAT_DAYS).contains(&selection.no_repeat_days) {
            return Err(ConfigError::Invalid(format!(
                "selection.no_repeat_days must be within 0-{}",
                MAX_NO_REPEAT_DAYS
            )));
        }
        if !(0.0..=10.0).contains(&selection.min_rating) {
            return Err(ConfigError::Invalid("selection.min_rating must be within 0-10".to_string()));
        }
        for band in &selection.bands {
            if band.floor >= band.ceiling {
                return Err(ConfigError::Invalid(format!(
                    "rating band {}-{} has floor >= ceiling",
                    band.floor, band.ceiling
                )));
            }
        }
        if selection.policy == SelectionPolicyKind::Banded && selection.bands.is_empty() {
            return Err(ConfigError::Invalid("banded policy needs at least one rating band".to_string()));
        }
        if selection.eligibility.enabled && selection.eligibility.allowed_languages.is_empty() {
            return Err(ConfigError::Invalid("eligibility.allowed_languages cannot be empty".to_string()));
        }
        if self.catalog.max_pages == 0 {
            return Err(ConfigError::Invalid("catalog.max_pages must be at least 1".to_string()));
        }
        if self.catalog.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("catalog.request_timeout_secs must be at least 1".to_string()));
        }
        if self.enrichment.overview_max_chars <= 3 {
            return Err(ConfigError::Invalid("enrichment.overview_max_chars must exceed 3".to_string()));
        }
        if self.schedule.utc_offset_minutes.abs() > 14 * 60 {
            return Err(ConfigError::Invalid("schedule.utc_offset_minutes must be within +/-14h".to_string()));
        }
        Ok(())
    }
}
