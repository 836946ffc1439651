use std::time::Duration;

use {
    gamedock_config::CatalogConfig,
    reqwest::Client,
    serde_json::Value,
    tracing::{debug, info, warn},
};

use crate::{
    error::{CatalogError, Result},
    types::{CatalogEntry, parse_entries},
};

const USER_AGENT: &str = "gamedock";

#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    url: String,
}

impl CatalogClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        Self::new(config.url.clone(), Duration::from_secs(config.timeout_secs))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and validate the listing.
    pub async fn fetch(&self) -> Result<Vec<CatalogEntry>> {
        debug!(url = %self.url, "fetching catalog");
        let resp = self
            .http
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(CatalogError::Status { status, body });
        }

        let payload: Value = resp
            .json()
            .await
            .map_err(|e| CatalogError::malformed(e.to_string()))?;
        let entries = parse_entries(payload)?;
        info!(count = entries.len(), "fetched catalog");
        Ok(entries)
    }

    /// Like [`CatalogClient::fetch`], but a failure is logged and yields an empty list.
    pub async fn fetch_all(&self) -> Vec<CatalogEntry> {
        self.fetch().await.unwrap_or_else(|e| {
            warn!(url = %self.url, error = %e, "catalog fetch failed");
            Vec::new()
        })
    }
}
