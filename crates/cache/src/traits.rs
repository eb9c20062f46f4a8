//! Capability traits supplied by the embedding application
//!
//! Each seam is a single-method trait so test doubles (and plain
//! closures, for loaders) can stand in directly.

use meshcache_core::BoxError;
use std::sync::Arc;

/// Loads the authoritative value for a key on a confirmed local miss.
///
/// Loads for the same key are coalesced within one process, but the
/// loader must tolerate concurrent calls for different keys. The core
/// imposes no deadline; timeout or retry policy belongs to the
/// implementation.
pub trait Loader: Send + Sync {
    fn load(&self, key: &str) -> std::result::Result<Vec<u8>, BoxError>;
}

/// Any `Fn(&str) -> Result<Vec<u8>, BoxError>` is a loader.
impl<F> Loader for F
where
    F: Fn(&str) -> std::result::Result<Vec<u8>, BoxError> + Send + Sync,
{
    fn load(&self, key: &str) -> std::result::Result<Vec<u8>, BoxError> {
        self(key)
    }
}

/// Fetches a key from a remote peer over some transport.
///
/// The core treats the transport as opaque: success yields bytes,
/// failure triggers fallback to the local loader.
pub trait PeerFetcher: Send + Sync {
    fn fetch(&self, group: &str, key: &str) -> std::result::Result<Vec<u8>, BoxError>;
}

/// Resolves which peer owns a key.
///
/// Returns `None` when no peers are configured or the key maps to the
/// local node, in which case the caller loads locally.
pub trait PeerLocator: Send + Sync {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_loaders() {
        let loader = |key: &str| Ok(key.as_bytes().to_vec());
        assert_eq!(loader.load("key").unwrap(), b"key");
    }
}
