//! Breadth-first route discovery over lazily fetched adjacency.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::directory::NodeId;
use crate::error::SearchError;
use crate::fetch::NeighborFetcher;

/// Outcome of a completed search.
///
/// `route` holds the inclusive source..destination sequence when one
/// exists, and is `None` when the reachable component was drained without
/// meeting the destination. `lookups` counts remote calls either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathResult {
    pub route: Option<Vec<NodeId>>,
    pub lookups: usize,
}

impl PathResult {
    pub fn found(&self) -> bool {
        self.route.is_some()
    }
}

/// Breadth-first search driver over a [`NeighborFetcher`].
///
/// All run state (predecessor map, frontier, lookup counter) is created
/// inside [`run`](Self::run) and dropped with it, so one value can serve
/// successive searches without any state bleeding between them. Lookups
/// are issued strictly one at a time; the remote is rate-limited and FIFO
/// expansion order is what makes fewest-hops routes come out first.
pub struct FrontierSearch {
    fetcher: Arc<dyn NeighborFetcher>,
    cancel: CancellationToken,
}

impl FrontierSearch {
    pub fn new(fetcher: Arc<dyn NeighborFetcher>) -> Self {
        Self {
            fetcher,
            cancel: CancellationToken::new(),
        }
    }

    /// Search that can be abandoned between lookups.
    ///
    /// The token is checked before every fetch, so cancelling wastes at
    /// most the lookup already in flight and never corrupts anything.
    pub fn with_cancellation(fetcher: Arc<dyn NeighborFetcher>, cancel: CancellationToken) -> Self {
        Self { fetcher, cancel }
    }

    /// Find a fewest-hops route from `source` to `destination`.
    ///
    /// Every node is fetched at most once per run, enforced here by the
    /// visited set rather than by fetcher-side memoization. A drained
    /// frontier is the legitimate no-route outcome; a failed lookup aborts
    /// the run instead, because an incomplete exploration cannot be
    /// trusted to report "no route".
    pub async fn run(
        &self,
        source: &NodeId,
        destination: &NodeId,
    ) -> Result<PathResult, SearchError> {
        // Checked before anything else so the trivial case costs nothing.
        if source == destination {
            return Ok(PathResult {
                route: Some(vec![source.clone()]),
                lookups: 0,
            });
        }

        // A node is visited iff it is a key here; the source's None value
        // still counts as visited.
        let mut visited_from: HashMap<NodeId, Option<NodeId>> = HashMap::new();
        visited_from.insert(source.clone(), None);

        let mut frontier: VecDeque<NodeId> = VecDeque::new();
        frontier.push_back(source.clone());

        let mut lookups = 0usize;

        while let Some(current) = frontier.pop_front() {
            if self.cancel.is_cancelled() {
                debug!(lookups, "search abandoned before next lookup");
                return Err(SearchError::Cancelled { lookups });
            }

            // One count per call, no matter how it turns out.
            lookups += 1;
            debug!(node = %current, lookups, "expanding frontier");
            let neighbors = match self.fetcher.fetch_neighbors(&current).await {
                Ok(neighbors) => neighbors,
                Err(err) => {
                    return Err(SearchError::Lookup {
                        lookups,
                        source: err,
                    })
                }
            };

            if neighbors.contains(destination) {
                // Reachable from the current hop level, so nothing shorter
                // can exist. Stop here instead of enqueueing the
                // destination; that skips draining the frontier and saves
                // the lookup for the destination itself.
                visited_from.insert(destination.clone(), Some(current));
                let route = reconstruct(&visited_from, destination);
                info!(hops = route.len() - 1, lookups, "route found");
                return Ok(PathResult {
                    route: Some(route),
                    lookups,
                });
            }

            for neighbor in neighbors {
                // Write-once: first discovery is the earliest hop
                // distance, later edges never overwrite it. The same check
                // drops duplicates inside one neighbor list.
                if !visited_from.contains_key(&neighbor) {
                    visited_from.insert(neighbor.clone(), Some(current.clone()));
                    frontier.push_back(neighbor);
                }
            }
        }

        info!(lookups, "frontier exhausted without reaching destination");
        Ok(PathResult {
            route: None,
            lookups,
        })
    }
}

/// Walk predecessor links back from `destination`, then flip the chain
/// into source-first order.
fn reconstruct(
    visited_from: &HashMap<NodeId, Option<NodeId>>,
    destination: &NodeId,
) -> Vec<NodeId> {
    let mut route = Vec::new();
    let mut cursor = Some(destination.clone());
    while let Some(node) = cursor {
        cursor = visited_from.get(&node).cloned().flatten();
        route.push(node);
    }
    route.reverse();
    route
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::LookupError;

    /// Scripted adjacency with a call log and an optional failure point.
    struct StubFetcher {
        adjacency: HashMap<NodeId, Vec<NodeId>>,
        calls: Mutex<Vec<NodeId>>,
        fail_on_call: Option<usize>,
    }

    impl StubFetcher {
        fn new(edges: Vec<(&str, Vec<&str>)>) -> Self {
            let adjacency = edges
                .into_iter()
                .map(|(node, neighbors)| {
                    (
                        NodeId::from(node),
                        neighbors.into_iter().map(NodeId::from).collect(),
                    )
                })
                .collect();
            Self {
                adjacency,
                calls: Mutex::new(Vec::new()),
                fail_on_call: None,
            }
        }

        fn failing_on_call(mut self, call: usize) -> Self {
            self.fail_on_call = Some(call);
            self
        }

        fn calls(&self) -> Vec<NodeId> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NeighborFetcher for StubFetcher {
        async fn fetch_neighbors(&self, id: &NodeId) -> Result<Vec<NodeId>, LookupError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(id.clone());
            if self.fail_on_call == Some(calls.len()) {
                return Err(LookupError::status(500));
            }
            Ok(self.adjacency.get(id).cloned().unwrap_or_default())
        }
    }

    fn ids(raw: &[&str]) -> Vec<NodeId> {
        raw.iter().map(|id| NodeId::from(*id)).collect()
    }

    fn linear_chain() -> StubFetcher {
        StubFetcher::new(vec![
            ("A", vec!["B"]),
            ("B", vec!["A", "C"]),
            ("C", vec!["B", "D"]),
            ("D", vec!["C"]),
        ])
    }

    #[tokio::test]
    async fn self_route_needs_no_lookup() {
        let stub = Arc::new(linear_chain());
        let search = FrontierSearch::new(stub.clone());
        let result = search
            .run(&NodeId::from("A"), &NodeId::from("A"))
            .await
            .unwrap();
        assert_eq!(result.route, Some(ids(&["A"])));
        assert_eq!(result.lookups, 0);
        assert!(result.found());
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn linear_route_stops_before_fetching_destination() {
        let stub = Arc::new(linear_chain());
        let search = FrontierSearch::new(stub.clone());
        let result = search
            .run(&NodeId::from("A"), &NodeId::from("D"))
            .await
            .unwrap();
        assert_eq!(result.route, Some(ids(&["A", "B", "C", "D"])));
        assert_eq!(result.lookups, 3);
        // D is reported as C's neighbor, never fetched itself.
        assert_eq!(stub.calls(), ids(&["A", "B", "C"]));
    }

    #[tokio::test]
    async fn unreachable_destination_drains_component_once() {
        // {A, B, C} form a closed component; Z sits outside it.
        let stub = Arc::new(StubFetcher::new(vec![
            ("A", vec!["B", "C"]),
            ("B", vec!["A", "C"]),
            ("C", vec!["A", "B"]),
            ("Z", vec![]),
        ]));
        let search = FrontierSearch::new(stub.clone());
        let result = search
            .run(&NodeId::from("A"), &NodeId::from("Z"))
            .await
            .unwrap();
        assert_eq!(result.route, None);
        assert!(!result.found());
        assert_eq!(result.lookups, 3);
        let mut calls = stub.calls();
        calls.sort();
        assert_eq!(calls, ids(&["A", "B", "C"]));
    }

    #[tokio::test]
    async fn failed_lookup_aborts_with_count() {
        let stub = Arc::new(linear_chain().failing_on_call(2));
        let search = FrontierSearch::new(stub.clone());
        let err = search
            .run(&NodeId::from("A"), &NodeId::from("D"))
            .await
            .unwrap_err();
        match err {
            SearchError::Lookup { lookups, source } => {
                assert_eq!(lookups, 2);
                assert_eq!(source.status, Some(500));
            }
            other => panic!("expected lookup failure, got {other:?}"),
        }
        assert_eq!(stub.calls(), ids(&["A", "B"]));
    }

    #[tokio::test]
    async fn no_node_is_fetched_twice() {
        // Dense mesh full of back-edges; every node names every other.
        let stub = Arc::new(StubFetcher::new(vec![
            ("A", vec!["B", "C", "D"]),
            ("B", vec!["A", "C", "D"]),
            ("C", vec!["A", "B", "D"]),
            ("D", vec!["A", "B", "C"]),
            ("Z", vec![]),
        ]));
        let search = FrontierSearch::new(stub.clone());
        let result = search
            .run(&NodeId::from("A"), &NodeId::from("Z"))
            .await
            .unwrap();
        assert_eq!(result.route, None);
        let calls = stub.calls();
        let mut deduped = calls.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(calls.len(), deduped.len(), "duplicate fetch in {calls:?}");
    }

    #[tokio::test]
    async fn first_discovery_fixes_the_predecessor() {
        // Diamond: both B and C lead to D, but B is discovered first and
        // expanded first, so the route goes through B.
        let stub = Arc::new(StubFetcher::new(vec![
            ("A", vec!["B", "C"]),
            ("B", vec!["A", "D"]),
            ("C", vec!["A", "D"]),
            ("D", vec!["B", "C"]),
        ]));
        let search = FrontierSearch::new(stub.clone());
        let result = search
            .run(&NodeId::from("A"), &NodeId::from("D"))
            .await
            .unwrap();
        assert_eq!(result.route, Some(ids(&["A", "B", "D"])));
        assert_eq!(result.lookups, 2);
    }

    #[tokio::test]
    async fn duplicate_neighbors_in_one_list_enqueue_once() {
        let stub = Arc::new(StubFetcher::new(vec![
            ("A", vec!["B", "B", "B"]),
            ("B", vec!["A"]),
            ("Z", vec![]),
        ]));
        let search = FrontierSearch::new(stub.clone());
        let result = search
            .run(&NodeId::from("A"), &NodeId::from("Z"))
            .await
            .unwrap();
        assert_eq!(result.route, None);
        assert_eq!(result.lookups, 2);
        assert_eq!(stub.calls(), ids(&["A", "B"]));
    }

    #[tokio::test]
    async fn zero_neighbor_node_just_stops_growing() {
        let stub = Arc::new(StubFetcher::new(vec![("A", vec![]), ("Z", vec![])]));
        let search = FrontierSearch::new(stub.clone());
        let result = search
            .run(&NodeId::from("A"), &NodeId::from("Z"))
            .await
            .unwrap();
        assert_eq!(result.route, None);
        assert_eq!(result.lookups, 1);
    }

    #[tokio::test]
    async fn empty_neighbor_list_still_counts_as_a_lookup() {
        let stub = Arc::new(StubFetcher::new(vec![
            ("A", vec!["B"]),
            ("B", vec![]),
            ("Z", vec![]),
        ]));
        let search = FrontierSearch::new(stub.clone());
        let result = search
            .run(&NodeId::from("A"), &NodeId::from("Z"))
            .await
            .unwrap();
        assert_eq!(result.lookups, 2);
    }

    #[tokio::test]
    async fn cancelled_token_aborts_before_the_first_fetch() {
        let stub = Arc::new(linear_chain());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let search = FrontierSearch::with_cancellation(stub.clone(), cancel);
        let err = search
            .run(&NodeId::from("A"), &NodeId::from("D"))
            .await
            .unwrap_err();
        assert_eq!(err, SearchError::Cancelled { lookups: 0 });
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn self_route_wins_over_cancellation() {
        // The trivial case is decided before the token is ever consulted.
        let stub = Arc::new(linear_chain());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let search = FrontierSearch::with_cancellation(stub, cancel);
        let result = search
            .run(&NodeId::from("B"), &NodeId::from("B"))
            .await
            .unwrap();
        assert_eq!(result.route, Some(ids(&["B"])));
        assert_eq!(result.lookups, 0);
    }
}
