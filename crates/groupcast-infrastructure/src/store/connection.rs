//! Store HTTP client

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Client;

use groupcast_core::DomainError;

/// Build a client that authenticates every request with the store key.
pub fn create_client(key: &str, timeout: Option<Duration>) -> Result<Client, DomainError> {
    let invalid_key = |e: reqwest::header::InvalidHeaderValue| {
        DomainError::StoreError(format!("Invalid store key: {}", e))
    };

    let mut api_key = HeaderValue::from_str(key).map_err(invalid_key)?;
    api_key.set_sensitive(true);
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", key)).map_err(invalid_key)?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static("apikey"), api_key);
    headers.insert(AUTHORIZATION, bearer);

    let mut builder = Client::builder().default_headers(headers);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|e| DomainError::StoreError(format!("Failed to build store client: {}", e)))
}
