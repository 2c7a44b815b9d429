//! Remote neighbor discovery. One lookup reveals one node's adjacency.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::directory::{NodeDirectory, NodeId, NodeRecord};
use crate::error::LookupError;

/// Default public instance of the territory API.
pub const DEFAULT_BASE_URL: &str = "https://restcountries.com/v3.1";

/// Single-node-at-a-time remote lookup.
///
/// One invocation is one remote call. Deduplication belongs to the search
/// engine's visited set; implementations must not be relied on to memoize
/// (the opt-in [`CachingFetcher`](crate::cache::CachingFetcher) is the one
/// deliberate exception).
#[async_trait]
pub trait NeighborFetcher: Send + Sync {
    /// Identifiers adjacent to `id`, in the order the remote reports them.
    async fn fetch_neighbors(&self, id: &NodeId) -> Result<Vec<NodeId>, LookupError>;
}

/// Neighbor lookup payload. The wire record is larger; only the adjacency
/// list matters here, and a record without the field has no neighbors.
#[derive(Debug, Deserialize)]
struct NeighborPayload {
    #[serde(default)]
    borders: Vec<NodeId>,
}

/// One entry of the catalog listing.
#[derive(Debug, Deserialize)]
struct CatalogEntry {
    cca3: NodeId,
    name: EntryName,
    #[serde(default)]
    area: f64,
}

#[derive(Debug, Deserialize)]
struct EntryName {
    common: String,
}

/// HTTP client for a restcountries-compatible API.
///
/// Non-success responses become [`LookupError`] with the status attached;
/// connect, timeout, body and decode failures become the transport flavor
/// with no status. Per-request timeouts live here, not in the engine.
pub struct CountryApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl CountryApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Client that fails any single request after `timeout`.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LookupError::from)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    async fn get_json<T>(&self, url: &str) -> Result<T, LookupError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "remote rejected lookup");
            return Err(LookupError::status(status.as_u16()));
        }
        Ok(response.json::<T>().await?)
    }

    /// Fetch the full node catalog and index it into a directory.
    pub async fn load_directory(&self) -> Result<NodeDirectory, LookupError> {
        let url = format!("{}/all?fields=name&fields=cca3&fields=area", self.base_url);
        debug!(%url, "loading node catalog");
        let entries: Vec<CatalogEntry> = self.get_json(&url).await?;
        let records: Vec<NodeRecord> = entries
            .into_iter()
            .map(|entry| NodeRecord {
                id: entry.cca3,
                display_name: entry.name.common,
                ordering_weight: entry.area,
            })
            .collect();
        debug!(nodes = records.len(), "catalog loaded");
        Ok(NodeDirectory::new(records))
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => LookupError::status(status.as_u16()),
            None => LookupError::transport(err.to_string()),
        }
    }
}

#[async_trait]
impl NeighborFetcher for CountryApiClient {
    async fn fetch_neighbors(&self, id: &NodeId) -> Result<Vec<NodeId>, LookupError> {
        let url = format!("{}/alpha/{}?fields=name&fields=borders", self.base_url, id);
        debug!(node = %id, "fetching neighbors");
        let payload: NeighborPayload = self.get_json(&url).await?;
        Ok(payload.borders)
    }
}
