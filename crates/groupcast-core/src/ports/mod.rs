//! Outbound ports other than the record store

pub mod host;
pub mod webhook;

pub use host::HostBridge;
pub use webhook::WebhookSender;
