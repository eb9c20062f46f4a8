//! Error types for meshcache operations

use std::sync::Arc;

/// Result type alias for meshcache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error type used at the capability boundaries (loaders and peer
/// fetchers return whatever error their backend produces).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Core error type for meshcache operations.
///
/// Sources are stored as `Arc` so the enum is `Clone`: the single-flight
/// mechanism delivers one result to every coalesced waiter, errors
/// included.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// A cache key was rejected before any load was attempted
    #[error("invalid cache key: {reason}")]
    InvalidKey { reason: String },

    /// The loader capability failed; nothing was cached
    #[error("loader failed for key {key:?} in group {group:?}")]
    LoaderFailed {
        group: String,
        key: String,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// A remote peer fetch failed. Never surfaced from `Group::get`;
    /// the group falls back to its local loader instead.
    #[error("peer fetch failed for key {key:?} in group {group:?}")]
    PeerFetch {
        group: String,
        key: String,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// A group with this name already exists in the registry
    #[error("cache group {name:?} is already registered")]
    DuplicateGroup { name: String },

    /// `register_peer_locator` was called more than once on a group
    #[error("peer locator already registered for group {group:?}")]
    PeerLocatorAlreadyRegistered { group: String },
}

impl Error {
    /// Build a `LoaderFailed` from the loader's boxed error.
    pub fn loader_failed(group: &str, key: &str, source: BoxError) -> Self {
        Error::LoaderFailed {
            group: group.to_string(),
            key: key.to_string(),
            source: Arc::from(source),
        }
    }

    /// Build a `PeerFetch` from the fetcher's boxed error.
    pub fn peer_fetch(group: &str, key: &str, source: BoxError) -> Self {
        Error::PeerFetch {
            group: group.to_string(),
            key: key.to_string(),
            source: Arc::from(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_are_cloneable() {
        let err = Error::loader_failed("scores", "Tom", "db offline".into());
        let copy = err.clone();
        assert_eq!(err.to_string(), copy.to_string());
    }

    #[test]
    fn loader_failure_keeps_source() {
        let err = Error::loader_failed("scores", "Tom", "db offline".into());
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "db offline");
    }
}
