//! Webhook delivery

pub mod http_webhook;

pub use http_webhook::HttpWebhookSender;
