use async_trait::async_trait;
use moviepicks_config::CatalogConfig;
use moviepicks_models::{CandidateItem, MovieDetail, ProviderMap};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use crate::error::SourceError;
use crate::http::{create_client, ensure_success};
use crate::tmdb::api::{DiscoverPage, TmdbMovie, TmdbWatchProviders};
use crate::traits::{CatalogSource, DiscoverQuery};

const SOURCE_NAME: &str = "tmdb";

/// TMDB v3 catalog over the api_key query parameter
#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
    language: String,
}

impl TmdbClient {
    pub fn new(api_key: String, config: &CatalogConfig) -> Self {
        Self {
            client: create_client(Duration::from_secs(config.request_timeout_secs)),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
        }
    }

    /// Query parameters for one discovery page
    pub fn discover_params(&self, query: &DiscoverQuery, page: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("api_key", self.api_key.clone()),
            ("language", self.language.clone()),
            ("sort_by", "vote_average.desc".to_string()),
            ("vote_average.gte", query.min_rating.to_string()),
            ("vote_count.gte", query.min_vote_count.to_string()),
            ("primary_release_date.gte", query.min_release_date.format("%Y-%m-%d").to_string()),
            ("include_adult", "false".to_string()),
            ("include_video", "false".to_string()),
            ("page", page.to_string()),
        ];
        if !query.filter.with_genres.is_empty() {
            let genres = query
                .filter
                .with_genres
                .iter()
                .map(|g| g.to_string())
                .collect::<Vec<_>>()
                .join(",");
            params.push(("with_genres", genres));
        }
        if let Some(language) = &query.filter.with_original_language {
            params.push(("with_original_language", language.clone()));
        }
        params
    }

    async fn get_json<T>(&self, path: &str, params: &[(&str, String)]) -> Result<T, SourceError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(params)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(SOURCE_NAME, e))?;

        let response = ensure_success(SOURCE_NAME, response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::from_reqwest(SOURCE_NAME, e))
    }
}

#[async_trait]
impl CatalogSource for TmdbClient {
    fn source_name(&self) -> &str {
        SOURCE_NAME
    }

    async fn discover(&self, query: &DiscoverQuery, page: u32) -> Result<Vec<CandidateItem>, SourceError> {
        let params = self.discover_params(query, page);
        let page_data: DiscoverPage = self.get_json("/discover/movie", &params).await?;
        debug!(page, results = page_data.results.len(), "TMDB discover page fetched");
        Ok(page_data.results.into_iter().map(CandidateItem::from).collect())
    }

    async fn fetch_detail(&self, id: u64) -> Result<MovieDetail, SourceError> {
        let params = [
            ("api_key", self.api_key.clone()),
            ("language", self.language.clone()),
            ("append_to_response", "credits,release_dates,videos,external_ids".to_string()),
        ];
        let movie: TmdbMovie = self.get_json(&format!("/movie/{}", id), &params).await?;
        Ok(MovieDetail::from(movie))
    }

    async fn fetch_providers(&self, id: u64) -> Result<ProviderMap, SourceError> {
        let params = [("api_key", self.api_key.clone())];
        let providers: TmdbWatchProviders = self
            .get_json(&format!("/movie/{}/watch/providers", id), &params)
            .await?;
        Ok(ProviderMap::from(providers))
    }
}
