use async_trait::async_trait;
use moviepicks_models::SensitivitySummary;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use crate::error::SourceError;
use crate::http::{create_client, ensure_success};
use crate::traits::Summarizer;

const SOURCE_NAME: &str = "summarizer";

const SYSTEM_PROMPT: &str = "You read parental-guide notes for a film and answer with a JSON object \
{\"approximate_count\": <integer number of sexual or nudity scenes>, \"summary\": <one or two plain sentences>}. \
Do not add any other keys or text.";

/// OpenAI-compatible chat-completions endpoint asked for a JSON object
pub struct ChatSummarizer {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatSummarizer {
    pub fn new(endpoint: &str, api_key: String, model: &str, timeout: Duration) -> Self {
        Self {
            client: create_client(timeout),
            endpoint: endpoint.to_string(),
            api_key,
            model: model.to_string(),
        }
    }
}

/// Parse the model's JSON answer. Accepts `count` as an alias and
/// fractional counts (rounded); anything else is malformed.
pub fn parse_summary_content(content: &str) -> Result<SensitivitySummary, SourceError> {
    let value: Value = serde_json::from_str(content.trim())
        .map_err(|e| SourceError::malformed(SOURCE_NAME, e))?;

    let count_value = value
        .get("approximate_count")
        .or_else(|| value.get("count"))
        .ok_or_else(|| SourceError::malformed(SOURCE_NAME, "missing approximate_count"))?;
    let approximate_count = count_value
        .as_u64()
        .or_else(|| count_value.as_f64().filter(|c| *c >= 0.0).map(|c| c.round() as u64))
        .ok_or_else(|| SourceError::malformed(SOURCE_NAME, "approximate_count is not a number"))?;

    let summary = value
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SourceError::malformed(SOURCE_NAME, "missing summary"))?;

    Ok(SensitivitySummary {
        approximate_count: u32::try_from(approximate_count).unwrap_or(u32::MAX),
        summary: summary.to_string(),
    })
}

#[async_trait]
impl Summarizer for ChatSummarizer {
    async fn summarize(&self, title: &str, page_text: &str) -> Result<SensitivitySummary, SourceError> {
        let user_content = format!("Film: {}\n\n{}", title, page_text);
        let request = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            response_format: ResponseFormat { format_type: "json_object" },
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &user_content },
            ],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(SOURCE_NAME, e))?;
        let response = ensure_success(SOURCE_NAME, response).await?;
        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| SourceError::from_reqwest(SOURCE_NAME, e))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| SourceError::malformed(SOURCE_NAME, "no message content"))?;
        parse_summary_content(&content)
    }
}
