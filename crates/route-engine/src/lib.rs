//! Corridor: lazy shortest-route discovery over a remote territory graph.
//!
//! Adjacency is not known up front; one remote lookup reveals one node's
//! neighbors. [`FrontierSearch`] runs a breadth-first exploration over any
//! [`NeighborFetcher`], fetching each node at most once, and reports the
//! discovered route together with the number of lookups it spent.
//! [`NodeDirectory`] maps the display names used at the boundary to the
//! identifiers the engine works with; [`CountryApiClient`] is the HTTP
//! fetcher and catalog loader for restcountries-compatible APIs.

pub mod cache;
pub mod directory;
pub mod error;
pub mod fetch;
pub mod search;

pub use cache::CachingFetcher;
pub use directory::{NodeDirectory, NodeId, NodeRecord};
pub use error::{LookupError, SearchError, UnknownName, LOOKUP_ERROR_CODE};
pub use fetch::{CountryApiClient, NeighborFetcher, DEFAULT_BASE_URL};
pub use search::{FrontierSearch, PathResult};
