//! Webhook sender trait (port)

use async_trait::async_trait;

use crate::domain::DispatchPayload;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookSender: Send + Sync {
    /// POST the payload. Any non-2xx response is an error.
    async fn deliver(&self, payload: &DispatchPayload) -> Result<(), DomainError>;
}
