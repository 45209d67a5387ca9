// src/sync/http.rs

// This module handles HTTP client creation for talking to the Syncthing REST API

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Certificate;
use std::path::Path;
use std::time::Duration;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Build the client used for every daemon call (created once at startup).
///
/// The daemon's own certificate is added as a trust root, and every request
/// carries the API key and is bounded by `timeout`.
pub fn create_http_client(
    api_key: &str,
    cert_file: Option<&Path>,
    timeout: Duration,
) -> Result<Client> {
    let mut key = HeaderValue::from_str(api_key).context("API key is not a valid header value")?;
    key.set_sensitive(true);
    let mut headers = HeaderMap::new();
    headers.insert(API_KEY_HEADER, key);

    let mut builder = Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .user_agent(concat!("syncled/", env!("CARGO_PKG_VERSION")));

    if let Some(path) = cert_file {
        let pem = std::fs::read(path)
            .with_context(|| format!("Failed to read certificate file: {}", path.display()))?;
        let cert = Certificate::from_pem(&pem)
            .with_context(|| format!("Failed to parse certificate file: {}", path.display()))?;
        builder = builder.add_root_certificate(cert);
    }

    builder.build().context("Failed to build HTTP client")
}
