//! Immutable catalog of known nodes, indexed by identifier and display name.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::UnknownName;

/// Opaque node identifier. Equality is exact, case-sensitive string
/// equality; the engine never interprets the contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Catalog metadata for one node. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub display_name: String,
    /// Orders selection lists; larger sorts first.
    pub ordering_weight: f64,
}

/// Pre-loaded node catalog, read-only after construction.
///
/// Building one is the loader's job (see
/// [`CountryApiClient::load_directory`](crate::fetch::CountryApiClient::load_directory));
/// a failed load is an input error, never a search outcome.
pub struct NodeDirectory {
    records: Vec<NodeRecord>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<NodeId, usize>,
}

impl NodeDirectory {
    pub fn new(records: Vec<NodeRecord>) -> Self {
        let mut by_name = HashMap::with_capacity(records.len());
        let mut by_id = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            // First record wins on duplicates, matching catalog load order.
            by_name.entry(record.display_name.clone()).or_insert(idx);
            by_id.entry(record.id.clone()).or_insert(idx);
        }
        Self {
            records,
            by_name,
            by_id,
        }
    }

    /// Resolve an exact display name to its identifier.
    pub fn resolve(&self, display_name: &str) -> Result<&NodeId, UnknownName> {
        self.by_name
            .get(display_name)
            .map(|&idx| &self.records[idx].id)
            .ok_or_else(|| UnknownName {
                name: display_name.to_string(),
            })
    }

    pub fn get(&self, id: &NodeId) -> Option<&NodeRecord> {
        self.by_id.get(id).map(|&idx| &self.records[idx])
    }

    /// Display name for an identifier, for rendering results.
    pub fn display_name(&self, id: &NodeId) -> Option<&str> {
        self.get(id).map(|record| record.display_name.as_str())
    }

    /// All records, heaviest ordering weight first. The sort is stable, so
    /// equal weights keep their catalog order, which downstream renders
    /// verbatim.
    pub fn all(&self) -> Vec<&NodeRecord> {
        let mut records: Vec<&NodeRecord> = self.records.iter().collect();
        records.sort_by_key(|record| Reverse(OrderedFloat(record.ordering_weight)));
        records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
