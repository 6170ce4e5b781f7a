//! # Groupcast Infrastructure
//!
//! HTTP adapters for the record store and the webhook, and the Telegram WebApp host bridge.

pub mod host;
pub mod store;
pub mod webhook;

pub use host::TelegramWebApp;
pub use store::{create_client, PostgrestGroupRepository};
pub use webhook::HttpWebhookSender;
