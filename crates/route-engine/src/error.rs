use std::fmt;

use thiserror::Error;

/// Fixed marker carried by every failed lookup, mirroring the wire shape
/// `{ status?: number, code: "LOOKUP_ERROR" }` of the remote client.
pub const LOOKUP_ERROR_CODE: &str = "LOOKUP_ERROR";

/// A neighbor or catalog lookup failed.
///
/// HTTP rejections and transport failures are merged into this one shape:
/// `status` is present only when the remote answered with a non-success
/// code, and absent when the request died below HTTP (connect, timeout,
/// body read, decode). The [`LOOKUP_ERROR_CODE`] marker lets callers match
/// on the kind without inspecting ad hoc fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupError {
    pub status: Option<u16>,
    detail: String,
}

impl LookupError {
    /// Remote answered with a non-success HTTP status.
    pub fn status(status: u16) -> Self {
        Self {
            status: Some(status),
            detail: String::new(),
        }
    }

    /// The request never produced an HTTP status.
    pub fn transport(detail: impl Into<String>) -> Self {
        Self {
            status: None,
            detail: detail.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        LOOKUP_ERROR_CODE
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(
                f,
                "lookup rejected with HTTP status {status} ({LOOKUP_ERROR_CODE})"
            ),
            None => write!(
                f,
                "lookup transport failure: {} ({LOOKUP_ERROR_CODE})",
                self.detail
            ),
        }
    }
}

impl std::error::Error for LookupError {}

/// A display name with no catalog entry. Fatal to the request; the search
/// never starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no node named {name:?} in the directory")]
pub struct UnknownName {
    pub name: String,
}

/// Terminal failure of a route search.
///
/// Both variants report how many lookups had already been performed, so
/// the caller can surface the count next to the failure. Exhausting the
/// frontier is not a failure and is never represented here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// A neighbor lookup failed; the failed call is included in the count.
    #[error("search aborted after {lookups} lookup(s): {source}")]
    Lookup {
        lookups: usize,
        #[source]
        source: LookupError,
    },

    /// The caller abandoned the search before the next lookup was issued.
    #[error("search cancelled after {lookups} lookup(s)")]
    Cancelled { lookups: usize },
}

impl SearchError {
    /// Lookups performed before the run aborted.
    pub fn lookups(&self) -> usize {
        match self {
            Self::Lookup { lookups, .. } | Self::Cancelled { lookups } => *lookups,
        }
    }
}
