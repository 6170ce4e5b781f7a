//! Domain errors

use thiserror::Error;

use crate::domain::GroupKey;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Group not found: {0}")]
    GroupNotFound(GroupKey),

    #[error("Store request failed: {0}")]
    StoreError(String),

    #[error("Store rejected request ({status}): {body}")]
    StoreRejected { status: u16, body: String },

    #[error("Webhook request failed: {0}")]
    WebhookError(String),

    #[error("Webhook rejected payload ({status}): {reason}")]
    WebhookRejected { status: u16, reason: String },

    #[error("Host context error: {0}")]
    HostError(String),
}
