use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::info;
use crate::error::SourceError;
use crate::http::{create_client, ensure_success};
use crate::traits::Notifier;

const SINK_NAME: &str = "ultramsg";

/// WhatsApp delivery through an UltraMsg instance
pub struct UltraMsgNotifier {
    client: Client,
    base_url: String,
    instance_id: String,
    token: String,
}

impl UltraMsgNotifier {
    pub fn new(base_url: &str, instance_id: String, token: String, timeout: Duration) -> Self {
        Self {
            client: create_client(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
            instance_id,
            token,
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/{}/messages/chat", self.base_url, self.instance_id)
    }
}

#[async_trait]
impl Notifier for UltraMsgNotifier {
    fn sink_name(&self) -> &str {
        SINK_NAME
    }

    async fn send(&self, destination: &str, body: &str) -> Result<(), SourceError> {
        let form = [("token", self.token.as_str()), ("to", destination), ("body", body)];
        let response = self
            .client
            .post(self.chat_url())
            .form(&form)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(SINK_NAME, e))?;
        let response = ensure_success(SINK_NAME, response).await?;
        let status = response.status();
        let reply = response.text().await.unwrap_or_default();
        info!(status = %status, reply = %reply, "UltraMsg accepted message");
        Ok(())
    }
}
