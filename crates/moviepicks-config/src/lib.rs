pub mod config;
pub mod credentials;
pub mod error;
pub mod paths;

pub use config::{BandConfig, CatalogConfig, Config, EligibilityConfig, EnrichmentConfig, HistoryConfig, NotifierConfig, ScheduleConfig, SelectionConfig, SelectionPolicyKind, SensitivityConfig, default_bands, default_major_platforms};
pub use credentials::{CredentialStore, Credentials, KNOWN_SETTINGS};
pub use error::ConfigError;
pub use paths::{PathManager, container_base_path};
