use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Watch providers per region (ISO 3166-1 code → categories)
pub type ProviderMap = HashMap<String, RegionProviders>;

/// Provider names per offer category within one region
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RegionProviders {
    #[serde(default)]
    pub flatrate: Vec<String>,
    #[serde(default)]
    pub rent: Vec<String>,
    #[serde(default)]
    pub buy: Vec<String>,
    #[serde(default)]
    pub ads: Vec<String>,
}

/// Where an item can be watched, after region and platform narrowing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", content = "providers", rename_all = "snake_case")]
pub enum StreamingAvailability {
    Available(Vec<String>),
    UnavailableInRegion,
}

impl StreamingAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, StreamingAvailability::Available(names) if !names.is_empty())
    }

    pub fn providers(&self) -> &[String] {
        match self {
            StreamingAvailability::Available(names) => names,
            StreamingAvailability::UnavailableInRegion => &[],
        }
    }
}
