//! Configuration management

use std::collections::HashMap;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use validator::Validate;

use crate::constants::{
    DEFAULT_APP_NAME, DEFAULT_CLOSE_DELAY_MS, DEFAULT_GROUPS_TABLE, DEFAULT_RESET_DELAY_MS,
    DEFAULT_SELECTION_COLUMN,
};
use crate::error::AppError;

/// Flat variable names accepted for compatibility with existing deployments.
/// They sit below files and `__`-separated variables in precedence.
const LEGACY_KEYS: &[(&str, &str)] = &[
    ("SUPABASE_URL", "store.url"),
    ("SUPABASE_ANON_KEY", "store.key"),
    ("WEBHOOK_URL", "webhook.url"),
    ("TELEGRAM_INIT_DATA", "host.init_data"),
];

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct AppConfig {
    pub app: AppSettings,
    #[validate(nested)]
    pub store: StoreSettings,
    #[serde(default)]
    #[validate(nested)]
    pub webhook: WebhookSettings,
    pub dispatch: DispatchSettings,
    #[serde(default)]
    pub host: HostSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct StoreSettings {
    #[validate(url(message = "store.url must be an absolute URL"))]
    pub url: String,
    #[validate(length(min = 1, message = "store.key must not be empty"))]
    pub key: String,
    pub table: String,
    pub selection_column: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, Default, Validate)]
pub struct WebhookSettings {
    #[validate(url(message = "webhook.url must be an absolute URL"))]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DispatchSettings {
    pub close_delay_ms: u64,
    pub reset_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct HostSettings {
    /// Raw Telegram WebApp `initData` query string.
    pub init_data: Option<String>,
}

impl AppConfig {
    /// Load from config files and the process environment. `.env` is read by the binary.
    pub fn load() -> Result<Self, AppError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Build the configuration from an explicit variable map instead of the process
    /// environment.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, AppError> {
        let env = vars
            .get("APP_ENV")
            .cloned()
            .unwrap_or_else(|| "development".into());

        let mut builder = Config::builder()
            .set_default("app.env", env.as_str())?
            .set_default("app.name", DEFAULT_APP_NAME)?
            .set_default("store.table", DEFAULT_GROUPS_TABLE)?
            .set_default("store.selection_column", DEFAULT_SELECTION_COLUMN)?
            .set_default("dispatch.close_delay_ms", DEFAULT_CLOSE_DELAY_MS)?
            .set_default("dispatch.reset_delay_ms", DEFAULT_RESET_DELAY_MS)?;

        for (legacy, key) in LEGACY_KEYS {
            if let Some(value) = vars.get(*legacy) {
                builder = builder.set_default(*key, value.as_str())?;
            }
        }

        let config = builder
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .source(Some(
                        vars.into_iter()
                            .filter(|(key, _)| key.contains("__"))
                            .collect(),
                    )),
            )
            .build()?;

        let mut settings: AppConfig = config.try_deserialize()?;
        settings.webhook.url = non_blank(settings.webhook.url.take());
        settings.host.init_data = non_blank(settings.host.init_data.take());
        settings.validate()?;
        Ok(settings)
    }
}

impl StoreSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl DispatchSettings {
    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }

    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_structured_variables_with_defaults() {
        let config = AppConfig::from_vars(vars(&[
            ("STORE__URL", "https://demo.supabase.co"),
            ("STORE__KEY", "anon-key"),
        ]))
        .unwrap();

        assert_eq!(config.store.url, "https://demo.supabase.co");
        assert_eq!(config.store.key, "anon-key");
        assert_eq!(config.store.table, "groups");
        assert_eq!(config.store.selection_column, "chouse");
        assert_eq!(config.dispatch.close_delay(), Duration::from_secs(1));
        assert_eq!(config.dispatch.reset_delay(), Duration::from_secs(3));
        assert!(config.webhook.url.is_none());
        assert!(config.host.init_data.is_none());
        assert_eq!(config.app.env, "development");
    }

    #[test]
    fn test_legacy_variables_are_accepted() {
        let config = AppConfig::from_vars(vars(&[
            ("SUPABASE_URL", "https://legacy.supabase.co"),
            ("SUPABASE_ANON_KEY", "legacy-key"),
            ("WEBHOOK_URL", "https://hooks.example.com/send"),
        ]))
        .unwrap();

        assert_eq!(config.store.url, "https://legacy.supabase.co");
        assert_eq!(config.store.key, "legacy-key");
        assert_eq!(
            config.webhook.url.as_deref(),
            Some("https://hooks.example.com/send")
        );
    }

    #[test]
    fn test_structured_variables_win_over_legacy() {
        let config = AppConfig::from_vars(vars(&[
            ("SUPABASE_URL", "https://legacy.supabase.co"),
            ("STORE__URL", "https://primary.supabase.co"),
            ("STORE__KEY", "anon-key"),
        ]))
        .unwrap();

        assert_eq!(config.store.url, "https://primary.supabase.co");
    }

    #[test]
    fn test_blank_webhook_is_treated_as_absent() {
        let config = AppConfig::from_vars(vars(&[
            ("STORE__URL", "https://demo.supabase.co"),
            ("STORE__KEY", "anon-key"),
            ("WEBHOOK__URL", "   "),
        ]))
        .unwrap();

        assert!(config.webhook.url.is_none());
    }

    #[test]
    fn test_missing_store_url_is_rejected() {
        let result = AppConfig::from_vars(vars(&[("STORE__KEY", "anon-key")]));
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_webhook_url_is_rejected() {
        let result = AppConfig::from_vars(vars(&[
            ("STORE__URL", "https://demo.supabase.co"),
            ("STORE__KEY", "anon-key"),
            ("WEBHOOK__URL", "not a url"),
        ]));
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
