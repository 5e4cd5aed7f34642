use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weekly themes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ThemeKey {
    Mix,
    HorrorThriller,
    MysteryWarBollywood,
    ComedyFeelGood,
}

impl ThemeKey {
    pub fn label(&self) -> &'static str {
        match self {
            ThemeKey::Mix => "Mix Theme",
            ThemeKey::HorrorThriller => "Horror / Thriller",
            ThemeKey::MysteryWarBollywood => "Mystery / War / Bollywood",
            ThemeKey::ComedyFeelGood => "Comedy / Feel Good",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeKey::Mix => "mix",
            ThemeKey::HorrorThriller => "horror_thriller",
            ThemeKey::MysteryWarBollywood => "mystery_war_bollywood",
            ThemeKey::ComedyFeelGood => "comedy_feelgood",
        }
    }
}

impl fmt::Display for ThemeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovery constraint set. Several sets in a profile are run
/// independently and their results unioned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FilterSet {
    /// Genre ids, sent comma-joined (the catalog treats them as AND)
    #[serde(default)]
    pub with_genres: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_original_language: Option<String>,
}

impl FilterSet {
    pub fn genres(genres: &[u32]) -> Self {
        Self {
            with_genres: genres.to_vec(),
            with_original_language: None,
        }
    }

    pub fn original_language(language: &str) -> Self {
        Self {
            with_genres: Vec::new(),
            with_original_language: Some(language.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThemeProfile {
    pub key: ThemeKey,
    pub label: String,
    pub filter_sets: Vec<FilterSet>,
    pub rating_floor: f64,
    pub vote_count_floor: u32,
    pub release_date_floor: NaiveDate,
    /// How many cast members the report lists for this theme
    pub cast_size: usize,
}
