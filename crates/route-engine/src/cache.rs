//! Opt-in cross-search adjacency cache.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::directory::NodeId;
use crate::error::LookupError;
use crate::fetch::NeighborFetcher;

/// Memoizes successful lookups across searches.
///
/// The engine never installs this on its own; every search starts from an
/// empty visited set and pays for its own lookups. Callers that rerun
/// searches against the same graph wrap their fetcher in one of these.
/// Failures pass through uncached, so a transient outage is retried by the
/// next search that needs the node.
pub struct CachingFetcher {
    inner: Arc<dyn NeighborFetcher>,
    adjacency: DashMap<NodeId, Vec<NodeId>>,
}

impl CachingFetcher {
    pub fn new(inner: Arc<dyn NeighborFetcher>) -> Self {
        Self {
            inner,
            adjacency: DashMap::new(),
        }
    }

    /// Number of nodes with cached adjacency.
    pub fn cached_nodes(&self) -> usize {
        self.adjacency.len()
    }
}

#[async_trait]
impl NeighborFetcher for CachingFetcher {
    async fn fetch_neighbors(&self, id: &NodeId) -> Result<Vec<NodeId>, LookupError> {
        if let Some(hit) = self.adjacency.get(id) {
            debug!(node = %id, "adjacency served from cache");
            return Ok(hit.value().clone());
        }
        let neighbors = self.inner.fetch_neighbors(id).await?;
        self.adjacency.insert(id.clone(), neighbors.clone());
        Ok(neighbors)
    }
}
