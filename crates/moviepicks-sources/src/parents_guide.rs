use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Node};
use std::time::Duration;
use tracing::debug;
use crate::error::SourceError;
use crate::http::{create_client, ensure_success};
use crate::traits::SensitivitySource;

const SOURCE_NAME: &str = "parents_guide";

/// IMDb parents-guide page, fetched by IMDb title id and flattened to text
pub struct ParentsGuideClient {
    client: Client,
    base_url: String,
    max_chars: usize,
}

impl ParentsGuideClient {
    pub fn new(base_url: &str, timeout: Duration, max_chars: usize) -> Self {
        Self {
            client: create_client(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_chars,
        }
    }

    fn page_url(&self, imdb_id: &str) -> String {
        format!("{}/title/{}/parentalguide", self.base_url, urlencoding::encode(imdb_id))
    }
}

/// Visible text of an HTML document: script/style/noscript contents are
/// dropped, whitespace runs collapse to one space.
pub fn page_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let mut words: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|el| el.name()))
            .map(|name| matches!(name, "script" | "style" | "noscript"))
            .unwrap_or(false);
        if hidden {
            continue;
        }
        words.extend(text.split_whitespace());
    }

    words.join(" ").chars().take(max_chars).collect()
}

#[async_trait]
impl SensitivitySource for ParentsGuideClient {
    async fn fetch_page_text(&self, external_id: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .get(self.page_url(external_id))
            .header("Accept", "text/html")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(SOURCE_NAME, e))?;
        let response = ensure_success(SOURCE_NAME, response).await?;
        let html = response
            .text()
            .await
            .map_err(|e| SourceError::from_reqwest(SOURCE_NAME, e))?;

        let text = page_text(&html, self.max_chars);
        debug!(imdb_id = external_id, chars = text.len(), "Parents guide text extracted");
        if text.is_empty() {
            return Err(SourceError::malformed(SOURCE_NAME, "page has no visible text"));
        }
        Ok(text)
    }
}
