// ============================================================================
// Groupcast Infrastructure - Telegram WebApp Host
// File: crates/groupcast-infrastructure/src/host/telegram.rs
// ============================================================================
//! Host bridge built from a Telegram WebApp `initData` launch string.

use reqwest::Url;
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use groupcast_core::error::DomainError;
use groupcast_core::ports::HostBridge;
use groupcast_shared::config::HostSettings;

pub struct TelegramWebApp {
    context: Value,
    closed: watch::Sender<bool>,
}

impl TelegramWebApp {
    /// Parse the `initData` query string the host hands to the embedded view.
    ///
    /// The raw string is kept as `initData`. Each pair is decoded into `initDataUnsafe`,
    /// with JSON-encoded values (`user`, `chat`, `receiver`) expanded into objects.
    pub fn from_init_data(init_data: &str) -> Result<Self, DomainError> {
        let init_data = init_data.trim().trim_start_matches('?');
        if init_data.is_empty() {
            return Err(DomainError::HostError("initData is empty".to_string()));
        }

        let mut url = Url::parse("tg://webapp").map_err(|e| DomainError::HostError(e.to_string()))?;
        url.set_query(Some(init_data));

        let mut unsafe_data = Map::new();
        for (key, value) in url.query_pairs() {
            let decoded = decode_value(&key, &value);
            unsafe_data.insert(key.into_owned(), decoded);
        }
        if unsafe_data.is_empty() {
            return Err(DomainError::HostError("initData has no fields".to_string()));
        }
        if !unsafe_data.contains_key("hash") {
            warn!("initData carries no hash, it cannot be verified by the receiver");
        }

        let mut context = Map::new();
        context.insert("initData".to_string(), Value::String(init_data.to_string()));
        context.insert("initDataUnsafe".to_string(), Value::Object(unsafe_data));

        let (closed, _) = watch::channel(false);
        Ok(Self {
            context: Value::Object(context),
            closed,
        })
    }

    /// `None` when the session was not launched from the host app.
    pub fn from_settings(settings: &HostSettings) -> Result<Option<Self>, DomainError> {
        match settings.init_data.as_deref() {
            Some(init_data) => {
                let host = Self::from_init_data(init_data)?;
                info!("Running inside Telegram WebApp");
                Ok(Some(host))
            }
            None => Ok(None),
        }
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Resolves once the view has been asked to close.
    pub async fn closed(&self) {
        let mut rx = self.closed.subscribe();
        // The sender lives in `self`, so the channel cannot be dropped while we wait.
        let _ = rx.wait_for(|closed| *closed).await;
    }
}

fn decode_value(key: &str, value: &str) -> Value {
    if value.starts_with('{') || value.starts_with('[') {
        if let Ok(parsed) = serde_json::from_str::<Value>(value) {
            return parsed;
        }
        debug!("initData field {} looks like JSON but does not parse", key);
    }
    if key == "auth_date" {
        if let Ok(seconds) = value.parse::<i64>() {
            return Value::from(seconds);
        }
    }
    Value::String(value.to_string())
}

impl HostBridge for TelegramWebApp {
    fn context(&self) -> Value {
        self.context.clone()
    }

    fn close(&self) {
        info!("Host view closed");
        self.closed.send_replace(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groupcast_core::domain::HostPassthrough;
    use serde_json::json;

    const INIT_DATA: &str = concat!(
        "query_id=AAHdF6IQ",
        "&user=%7B%22id%22%3A279058397%2C%22first_name%22%3A%22Vlad%22%7D",
        "&auth_date=1662771648&hash=c501b71e"
    );

    #[test]
    fn test_init_data_is_decoded() {
        let host = TelegramWebApp::from_init_data(INIT_DATA).unwrap();
        let context = host.context();

        assert_eq!(context["initData"], INIT_DATA);
        assert_eq!(context["initDataUnsafe"]["query_id"], "AAHdF6IQ");
        assert_eq!(
            context["initDataUnsafe"]["user"],
            json!({ "id": 279058397, "first_name": "Vlad" })
        );
        assert_eq!(context["initDataUnsafe"]["auth_date"], 1662771648);
    }

    #[test]
    fn test_context_feeds_passthrough_user_id() {
        let host = TelegramWebApp::from_init_data(INIT_DATA).unwrap();
        let passthrough = HostPassthrough::from_raw(host.context());

        assert_eq!(passthrough.user_id, Some(json!(279058397)));
        assert_eq!(passthrough.init_data, Some(json!(INIT_DATA)));
    }

    #[test]
    fn test_malformed_json_field_stays_a_string() {
        let host = TelegramWebApp::from_init_data("user=%7Bbroken&start_param=promo").unwrap();
        let context = host.context();

        assert_eq!(context["initDataUnsafe"]["user"], "{broken");
        assert_eq!(context["initDataUnsafe"]["start_param"], "promo");
    }

    #[test]
    fn test_empty_init_data_is_rejected() {
        assert!(matches!(
            TelegramWebApp::from_init_data("  "),
            Err(DomainError::HostError(_))
        ));
    }

    #[test]
    fn test_from_settings_without_init_data() {
        assert!(TelegramWebApp::from_settings(&HostSettings::default())
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_close_wakes_waiters() {
        let host = TelegramWebApp::from_init_data("hash=abc").unwrap();
        assert!(!host.is_closed());

        tokio::join!(host.closed(), async { host.close() });
        assert!(host.is_closed());
    }
}
