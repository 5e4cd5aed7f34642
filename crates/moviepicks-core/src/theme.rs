use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc, Weekday};
use moviepicks_models::{FilterSet, ThemeKey, ThemeProfile};

// TMDB genre ids
const HORROR: u32 = 27;
const THRILLER: u32 = 53;
const MYSTERY: u32 = 9648;
const WAR: u32 = 10752;
const COMEDY: u32 = 35;
const FAMILY: u32 = 10751;
const ROMANCE: u32 = 10749;

/// Server-side discovery floors shared by every theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogFloors {
    pub rating: f64,
    pub vote_count: u32,
    pub release_date: NaiveDate,
}

/// Fixed weekly schedule from calendar day to theme profile.
///
/// Mon-Thu → mix, Fri → horror/thriller, Sat → mystery/war plus Hindi-language,
/// Sun → comedy/feel-good. "Today" is taken in the reference time zone.
#[derive(Debug, Clone)]
pub struct ThemeSelector {
    floors: CatalogFloors,
    reference_offset: FixedOffset,
}

impl ThemeSelector {
    pub fn new(floors: CatalogFloors, reference_offset: FixedOffset) -> Self {
        Self { floors, reference_offset }
    }

    /// Calendar date of `now` in the reference time zone
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.reference_offset).date_naive()
    }

    pub fn theme_for_weekday(weekday: Weekday) -> ThemeKey {
        match weekday {
            Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu => ThemeKey::Mix,
            Weekday::Fri => ThemeKey::HorrorThriller,
            Weekday::Sat => ThemeKey::MysteryWarBollywood,
            Weekday::Sun => ThemeKey::ComedyFeelGood,
        }
    }

    pub fn profile_for(&self, date: NaiveDate) -> ThemeProfile {
        let key = Self::theme_for_weekday(date.weekday());
        let (filter_sets, cast_size) = match key {
            ThemeKey::Mix => (vec![FilterSet::default()], 4),
            ThemeKey::HorrorThriller => (vec![FilterSet::genres(&[HORROR, THRILLER])], 3),
            ThemeKey::MysteryWarBollywood => (
                vec![
                    FilterSet::genres(&[MYSTERY, WAR]),
                    FilterSet::original_language("hi"),
                ],
                3,
            ),
            ThemeKey::ComedyFeelGood => (vec![FilterSet::genres(&[COMEDY, FAMILY, ROMANCE])], 3),
        };

        ThemeProfile {
            key,
            label: key.label().to_string(),
            filter_sets,
            rating_floor: self.floors.rating,
            vote_count_floor: self.floors.vote_count,
            release_date_floor: self.floors.release_date,
            cast_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn selector() -> ThemeSelector {
        ThemeSelector::new(
            CatalogFloors {
                rating: 5.0,
                vote_count: 500,
                release_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            },
            FixedOffset::east_opt(5 * 3600).unwrap(),
        )
    }

    #[test]
    fn test_every_weekday_maps_to_exactly_one_theme() {
        let selector = selector();
        // 2024-06-03 is a Monday
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let keys: Vec<ThemeKey> = (0..7)
            .map(|offset| selector.profile_for(monday + chrono::Duration::days(offset)).key)
            .collect();

        assert_eq!(
            keys,
            vec![
                ThemeKey::Mix,
                ThemeKey::Mix,
                ThemeKey::Mix,
                ThemeKey::Mix,
                ThemeKey::HorrorThriller,
                ThemeKey::MysteryWarBollywood,
                ThemeKey::ComedyFeelGood,
            ]
        );
        let distinct: HashSet<ThemeKey> = keys.into_iter().collect();
        assert_eq!(distinct.len(), 4);
    }

    #[test]
    fn test_mapping_is_deterministic_across_weeks() {
        let selector = selector();
        let friday = NaiveDate::from_ymd_opt(2024, 6, 7).unwrap();
        let later_friday = friday + chrono::Duration::weeks(9);
        assert_eq!(selector.profile_for(friday), selector.profile_for(later_friday));
    }

    #[test]
    fn test_saturday_unions_two_filter_sets() {
        let profile = selector().profile_for(NaiveDate::from_ymd_opt(2024, 6, 8).unwrap());
        assert_eq!(profile.key, ThemeKey::MysteryWarBollywood);
        assert_eq!(profile.filter_sets.len(), 2);
        assert_eq!(profile.filter_sets[0].with_genres, vec![MYSTERY, WAR]);
        assert_eq!(profile.filter_sets[1].with_original_language.as_deref(), Some("hi"));
        assert_eq!(profile.label, "Mystery / War / Bollywood");
    }

    #[test]
    fn test_profile_carries_floors() {
        let profile = selector().profile_for(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(profile.rating_floor, 5.0);
        assert_eq!(profile.vote_count_floor, 500);
        assert_eq!(profile.cast_size, 4);
        assert_eq!(profile.filter_sets, vec![FilterSet::default()]);
    }

    #[test]
    fn test_today_uses_reference_zone() {
        let selector = selector();
        // 20:30 UTC on Thursday is already Friday 01:30 at UTC+5
        let now = Utc.with_ymd_and_hms(2024, 6, 6, 20, 30, 0).unwrap();
        assert_eq!(selector.today(now), NaiveDate::from_ymd_opt(2024, 6, 7).unwrap());
        assert_eq!(selector.profile_for(selector.today(now)).key, ThemeKey::HorrorThriller);
    }
}
