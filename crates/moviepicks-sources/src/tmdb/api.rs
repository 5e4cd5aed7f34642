//! Wire shapes of the TMDB v3 endpoints we call, and their conversion into
//! the domain model. Every field is optional or defaulted: TMDB omits keys
//! freely and a missing field must not sink a whole page.

use moviepicks_models::{CandidateItem, CrewCredit, MovieDetail, ProviderMap, RegionProviders, RegionRelease, SpokenLanguage, Video};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub(crate) struct DiscoverPage {
    #[serde(default)]
    pub results: Vec<DiscoverResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DiscoverResult {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmdbMovie {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub spoken_languages: Vec<TmdbSpokenLanguage>,
    #[serde(default)]
    pub credits: Option<TmdbCredits>,
    #[serde(default)]
    pub release_dates: Option<TmdbReleaseDates>,
    #[serde(default)]
    pub videos: Option<TmdbVideos>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub external_ids: Option<TmdbExternalIds>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmdbGenre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmdbSpokenLanguage {
    #[serde(default)]
    pub iso_639_1: String,
    #[serde(default)]
    pub english_name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmdbCastMember {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmdbCrewMember {
    pub name: String,
    #[serde(default)]
    pub job: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmdbReleaseDates {
    #[serde(default)]
    pub results: Vec<TmdbRegionReleases>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmdbRegionReleases {
    pub iso_3166_1: String,
    #[serde(default)]
    pub release_dates: Vec<TmdbRelease>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmdbRelease {
    #[serde(default)]
    pub certification: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmdbVideos {
    #[serde(default)]
    pub results: Vec<TmdbVideo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmdbVideo {
    #[serde(default)]
    pub site: String,
    #[serde(rename = "type", default)]
    pub video_type: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub official: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmdbExternalIds {
    #[serde(default)]
    pub imdb_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmdbWatchProviders {
    #[serde(default)]
    pub results: HashMap<String, TmdbRegionProviders>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct TmdbRegionProviders {
    #[serde(default)]
    pub flatrate: Vec<TmdbProvider>,
    #[serde(default)]
    pub rent: Vec<TmdbProvider>,
    #[serde(default)]
    pub buy: Vec<TmdbProvider>,
    #[serde(default)]
    pub ads: Vec<TmdbProvider>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmdbProvider {
    pub provider_name: String,
}

impl From<DiscoverResult> for CandidateItem {
    fn from(result: DiscoverResult) -> Self {
        CandidateItem {
            id: result.id,
            title: result
                .title
                .or(result.name)
                .unwrap_or_else(|| "Unknown title".to_string()),
            release_date: result.release_date.filter(|d| !d.is_empty()),
            average_rating: result.vote_average,
            vote_count: result.vote_count,
            genre_ids: result.genre_ids,
        }
    }
}

impl From<TmdbMovie> for MovieDetail {
    fn from(movie: TmdbMovie) -> Self {
        let credits = movie.credits.unwrap_or_default();

        let imdb_id = movie
            .imdb_id
            .or_else(|| movie.external_ids.and_then(|ids| ids.imdb_id))
            .filter(|id| !id.is_empty());

        MovieDetail {
            id: movie.id,
            title: movie.title.unwrap_or_else(|| "Unknown title".to_string()),
            release_date: movie.release_date.filter(|d| !d.is_empty()),
            average_rating: movie.vote_average,
            vote_count: movie.vote_count,
            runtime_minutes: movie.runtime.filter(|r| *r > 0),
            genre_ids: movie.genres.iter().map(|g| g.id).collect(),
            genre_names: movie.genres.into_iter().map(|g| g.name).collect(),
            overview: movie.overview.unwrap_or_default(),
            spoken_languages: movie
                .spoken_languages
                .into_iter()
                .map(|l| SpokenLanguage {
                    iso_639_1: l.iso_639_1,
                    english_name: l.english_name.filter(|n| !n.is_empty()),
                })
                .collect(),
            cast: credits.cast.into_iter().map(|c| c.name).collect(),
            crew: credits
                .crew
                .into_iter()
                .map(|c| CrewCredit { name: c.name, job: c.job })
                .collect(),
            releases: movie
                .release_dates
                .map(|rd| rd.results)
                .unwrap_or_default()
                .into_iter()
                .map(|region| RegionRelease {
                    region: region.iso_3166_1,
                    certifications: region
                        .release_dates
                        .into_iter()
                        .map(|r| r.certification.unwrap_or_default())
                        .collect(),
                })
                .collect(),
            videos: movie
                .videos
                .map(|v| v.results)
                .unwrap_or_default()
                .into_iter()
                .map(|v| Video {
                    site: v.site,
                    kind: v.video_type,
                    key: v.key,
                    official: v.official,
                })
                .collect(),
            imdb_id,
        }
    }
}

fn provider_names(providers: Vec<TmdbProvider>) -> Vec<String> {
    providers.into_iter().map(|p| p.provider_name).collect()
}

impl From<TmdbWatchProviders> for ProviderMap {
    fn from(response: TmdbWatchProviders) -> Self {
        response
            .results
            .into_iter()
            .map(|(region, providers)| {
                (
                    region,
                    RegionProviders {
                        flatrate: provider_names(providers.flatrate),
                        rent: provider_names(providers.rent),
                        buy: provider_names(providers.buy),
                        ads: provider_names(providers.ads),
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_JSON: &str = r#"{
        "id": 603,
        "title": "The Matrix",
        "release_date": "1999-03-30",
        "vote_average": 8.2,
        "vote_count": 25000,
        "runtime": 136,
        "imdb_id": "tt0133093",
        "overview": "Set in the 22nd century...",
        "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
        "spoken_languages": [{"iso_639_1": "en", "english_name": "English", "name": "English"}],
        "credits": {
            "cast": [
                {"name": "Keanu Reeves", "order": 0},
                {"name": "Laurence Fishburne", "order": 1},
                {"name": "Carrie-Anne Moss", "order": 2}
            ],
            "crew": [
                {"name": "Bill Pope", "job": "Director of Photography"},
                {"name": "Lana Wachowski", "job": "Director"}
            ]
        },
        "release_dates": {
            "results": [
                {"iso_3166_1": "US", "release_dates": [{"certification": ""}, {"certification": "R"}]},
                {"iso_3166_1": "IN", "release_dates": [{"certification": null}]}
            ]
        },
        "videos": {
            "results": [
                {"site": "YouTube", "type": "Trailer", "key": "vKQi3bBA1y8", "official": true}
            ]
        }
    }"#;

    #[test]
    fn test_detail_conversion() {
        let movie: TmdbMovie = serde_json::from_str(DETAIL_JSON).unwrap();
        let detail = MovieDetail::from(movie);

        assert_eq!(detail.id, 603);
        assert_eq!(detail.runtime_minutes, Some(136));
        assert_eq!(detail.genre_names, vec!["Action", "Science Fiction"]);
        assert_eq!(detail.genre_ids, vec![28, 878]);
        assert_eq!(detail.cast, vec!["Keanu Reeves", "Laurence Fishburne", "Carrie-Anne Moss"]);
        assert_eq!(detail.crew[1].job, "Director");
        assert_eq!(detail.imdb_id.as_deref(), Some("tt0133093"));
        assert_eq!(detail.releases.len(), 2);
        assert_eq!(detail.releases[0].certifications, vec!["", "R"]);
        assert_eq!(detail.releases[1].certifications, vec![""]);
        assert_eq!(detail.videos[0].kind, "Trailer");
        assert_eq!(detail.spoken_languages[0].english_name.as_deref(), Some("English"));
    }

    #[test]
    fn test_detail_conversion_with_missing_sections() {
        let movie: TmdbMovie = serde_json::from_str(r#"{"id": 7, "runtime": 0, "imdb_id": ""}"#).unwrap();
        let detail = MovieDetail::from(movie);

        assert_eq!(detail.title, "Unknown title");
        assert_eq!(detail.runtime_minutes, None);
        assert!(detail.cast.is_empty());
        assert!(detail.releases.is_empty());
        assert_eq!(detail.imdb_id, None);
    }

    #[test]
    fn test_discover_page_conversion() {
        let page: DiscoverPage = serde_json::from_str(
            r#"{"page": 1, "results": [
                {"id": 1, "title": "A", "release_date": "2001-01-01", "vote_average": 7.5, "vote_count": 900, "genre_ids": [27]},
                {"id": 2, "name": "B", "release_date": "", "vote_average": 6.0, "vote_count": 501}
            ], "total_pages": 1}"#,
        )
        .unwrap();
        let items: Vec<CandidateItem> = page.results.into_iter().map(CandidateItem::from).collect();

        assert_eq!(items[0].title, "A");
        assert_eq!(items[0].genre_ids, vec![27]);
        assert_eq!(items[1].title, "B");
        assert_eq!(items[1].release_date, None);
    }

    #[test]
    fn test_watch_providers_conversion() {
        let response: TmdbWatchProviders = serde_json::from_str(
            r#"{"id": 603, "results": {
                "IN": {"link": "https://example.org", "flatrate": [{"provider_name": "Netflix", "provider_id": 8}],
                       "rent": [{"provider_name": "Apple TV"}]},
                "US": {"buy": [{"provider_name": "Vudu"}]}
            }}"#,
        )
        .unwrap();
        let map = ProviderMap::from(response);

        assert_eq!(map["IN"].flatrate, vec!["Netflix"]);
        assert_eq!(map["IN"].rent, vec!["Apple TV"]);
        assert!(map["IN"].buy.is_empty());
        assert_eq!(map["US"].buy, vec!["Vudu"]);
    }
}
