// ============================================================================
// Groupcast Infrastructure - HTTP Webhook Sender
// File: crates/groupcast-infrastructure/src/webhook/http_webhook.rs
// ============================================================================

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info};

use groupcast_core::domain::DispatchPayload;
use groupcast_core::error::DomainError;
use groupcast_core::ports::WebhookSender;
use groupcast_shared::config::WebhookSettings;

/// Posts dispatch payloads as JSON to a fixed URL.
pub struct HttpWebhookSender {
    client: Client,
    url: String,
}

impl HttpWebhookSender {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// `None` when no webhook URL is configured.
    pub fn from_settings(settings: &WebhookSettings) -> Option<Self> {
        let url = settings.url.as_deref()?;
        info!("Dispatching to webhook at {}", url);
        Some(Self::new(url))
    }
}

#[async_trait]
impl WebhookSender for HttpWebhookSender {
    async fn deliver(&self, payload: &DispatchPayload) -> Result<(), DomainError> {
        debug!("POST {} ({} group ids)", self.url, payload.group_ids.len());

        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| DomainError::WebhookError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Webhook returned {}: {}", status, body);
            return Err(DomainError::WebhookRejected {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(())
    }
}
