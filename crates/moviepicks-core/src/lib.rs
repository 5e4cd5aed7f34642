pub mod enrichment;
pub mod history;
pub mod orchestrator;
pub mod render;
pub mod rules;
pub mod selection;
pub mod theme;

#[cfg(test)]
pub(crate) mod testing;

pub use enrichment::{EnrichmentPipeline, EnrichmentSettings, SensitivityMode};
pub use history::{HistoryStore, PersistenceError};
pub use orchestrator::{PicksOrchestrator, PicksResult};
pub use render::{render_nothing_found, render_report};
pub use selection::{EligibilityGate, Pick, RatingBand, Selection, SelectionEngine, SelectionPolicy, SelectionSettings};
pub use theme::{CatalogFloors, ThemeSelector};
