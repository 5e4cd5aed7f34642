pub mod candidate;
pub mod detail;
pub mod enriched;
pub mod history_entry;
pub mod providers;
pub mod theme;

pub use candidate::CandidateItem;
pub use detail::{CrewCredit, MovieDetail, RegionRelease, SpokenLanguage, Video};
pub use enriched::{CertificationBucket, EnrichedItem, Sensitivity, SensitivitySummary};
pub use history_entry::HistoryEntry;
pub use providers::{ProviderMap, RegionProviders, StreamingAvailability};
pub use theme::{FilterSet, ThemeKey, ThemeProfile};
