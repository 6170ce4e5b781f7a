//! Host-embedded-browser bridges

pub mod telegram;

pub use telegram::TelegramWebApp;
