// src/sync/api.rs

//! Thin client for the parts of the Syncthing REST API the monitor reads.

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use url::Url;

/// Reads the monitor needs from the sync daemon. Any `Err` means "unreachable".
pub trait DaemonApi {
    fn ping(&self) -> Result<()>;
    /// Overall completion in percent, `100.0` when fully in sync.
    fn completion(&self) -> Result<f64>;
    /// Recent daemon errors; `None` when the daemon reports `null`.
    fn errors(&self) -> Result<Option<Vec<DaemonError>>>;
    fn connection_totals(&self) -> Result<ConnectionTotals>;
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DaemonError {
    /// ISO-8601 timestamp as sent by the daemon.
    pub when: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTotals {
    pub in_bytes_total: u64,
    pub out_bytes_total: u64,
}

impl ConnectionTotals {
    pub fn sum(&self) -> u64 {
        self.in_bytes_total.saturating_add(self.out_bytes_total)
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    completion: f64,
}

#[derive(Deserialize)]
struct ErrorsResponse {
    errors: Option<Vec<DaemonError>>,
}

#[derive(Deserialize)]
struct ConnectionsResponse {
    total: ConnectionTotals,
}

pub struct SyncthingClient {
    base_url: String,
    http: Client,
}

impl SyncthingClient {
    pub fn new(base_url: &str, http: Client) -> Result<Self> {
        Url::parse(base_url).with_context(|| format!("Invalid Syncthing URL: {}", base_url))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Endpoints are appended to the base URL, so a reverse-proxy prefix survives.
    fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, endpoint);
        Url::parse(&raw).with_context(|| format!("Failed to build URL {}", raw))
    }

    fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.endpoint_url(endpoint)?;

        let response = self
            .http
            .get(url.clone())
            .send()
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error from {}: {}", url, response.status()));
        }

        response
            .json::<T>()
            .with_context(|| format!("Failed to parse response body from {}", url))
    }
}

impl DaemonApi for SyncthingClient {
    fn ping(&self) -> Result<()> {
        self.get_json::<IgnoredAny>("/rest/system/ping").map(|_| ())
    }

    fn completion(&self) -> Result<f64> {
        Ok(self.get_json::<CompletionResponse>("/rest/db/completion")?.completion)
    }

    fn errors(&self) -> Result<Option<Vec<DaemonError>>> {
        Ok(self.get_json::<ErrorsResponse>("/rest/system/error")?.errors)
    }

    fn connection_totals(&self) -> Result<ConnectionTotals> {
        Ok(self.get_json::<ConnectionsResponse>("/rest/system/connections")?.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_null_error_list() -> Result<()> {
        let body: ErrorsResponse = serde_json::from_str(r#"{"errors": null}"#)?;
        assert!(body.errors.is_none());
        Ok(())
    }

    #[test]
    fn parses_error_entries() -> Result<()> {
        let body: ErrorsResponse = serde_json::from_str(
            r#"{"errors": [{"when": "2024-03-01T10:00:00.123456789+01:00", "message": "folder marker missing"}]}"#,
        )?;
        let errors = body.errors.unwrap_or_default();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "folder marker missing");
        Ok(())
    }

    #[test]
    fn sums_connection_totals() -> Result<()> {
        let body: ConnectionsResponse = serde_json::from_str(
            r#"{"connections": {}, "total": {"at": "2024-03-01T10:00:00Z", "inBytesTotal": 1500, "outBytesTotal": 700}}"#,
        )?;
        assert_eq!(body.total.sum(), 2200);
        Ok(())
    }

    #[test]
    fn endpoint_is_appended_to_base_url() -> Result<()> {
        let client = SyncthingClient::new("https://127.0.0.1:8384/", Client::new())?;
        let url = client.endpoint_url("/rest/db/completion")?;
        assert_eq!(url.as_str(), "https://127.0.0.1:8384/rest/db/completion");

        let proxied = SyncthingClient::new("https://nas.local/syncthing", Client::new())?;
        let url = proxied.endpoint_url("/rest/system/ping")?;
        assert_eq!(url.as_str(), "https://nas.local/syncthing/rest/system/ping");
        Ok(())
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(SyncthingClient::new("127.0.0.1 8384", Client::new()).is_err());
    }
}
