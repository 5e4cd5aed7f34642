use reqwest::{Client, Response};
use std::time::Duration;
use crate::error::SourceError;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Shared client with a bounded per-request timeout so a stuck call fails
/// fast instead of hanging the run.
pub fn create_client(timeout: Duration) -> Client {
    Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Turn a non-2xx response into `SourceError::Unavailable`, keeping a bit
/// of the body for the log line.
pub async fn ensure_success(source_name: &'static str, response: Response) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(200).collect();
    Err(SourceError::unavailable(source_name, format!("{} - {}", status, snippet)))
}
