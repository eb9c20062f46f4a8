//! Read-through cache group
//!
//! A [`Group`] is one named cache namespace: a bounded LRU store, a
//! loader for authoritative data, and optionally a peer locator that
//! routes misses to the cluster node owning the key.

use crate::flight::FlightGroup;
use crate::store::LruStore;
use crate::traits::{Loader, PeerFetcher, PeerLocator};
use meshcache_core::{Error, Result, Snapshot};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

/// A named cache namespace with read-through loading.
///
/// Created through [`Registry::add_group`](crate::Registry::add_group);
/// shared freely as `Arc<Group>`. All methods take `&self` and are safe
/// to call from any thread.
pub struct Group {
    name: String,
    loader: Box<dyn Loader>,
    /// The locking decorator around the store: one exclusive lock per
    /// group, so distinct groups never contend.
    store: Mutex<LruStore>,
    flight: FlightGroup<Snapshot>,
    peers: OnceCell<Arc<dyn PeerLocator>>,
}

impl Group {
    pub(crate) fn new(name: &str, capacity: usize, loader: Box<dyn Loader>) -> Self {
        Self {
            name: name.to_string(),
            loader,
            store: Mutex::new(LruStore::new(capacity)),
            flight: FlightGroup::new(),
            peers: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Route misses for keys owned elsewhere through `locator`.
    ///
    /// A group accepts at most one locator; a second registration
    /// fails with [`Error::PeerLocatorAlreadyRegistered`].
    pub fn register_peer_locator(&self, locator: Arc<dyn PeerLocator>) -> Result<()> {
        self.peers
            .set(locator)
            .map_err(|_| Error::PeerLocatorAlreadyRegistered {
                group: self.name.clone(),
            })
    }

    /// Fetch the value for `key`.
    ///
    /// Lookup order: local store, owning peer (if a locator is
    /// registered and the key is owned remotely), local loader.
    /// Concurrent calls for the same missing key share a single load.
    /// Only an empty key or a loader failure produce an error; peer
    /// failures are absorbed by the local fallback.
    pub fn get(&self, key: &str) -> Result<Snapshot> {
        if key.is_empty() {
            return Err(Error::InvalidKey {
                reason: "key must not be empty".to_string(),
            });
        }

        if let Some(value) = self.store.lock().get(key) {
            debug!(group = %self.name, key, "cache hit");
            return Ok(value.clone());
        }

        debug!(group = %self.name, key, "cache miss");
        // Scope the coalescing key by group name so identical keys in
        // different groups never collide.
        self.flight
            .work(&format!("{}/{}", self.name, key), || self.load(key))
    }

    /// Drop `key` from the local store if present.
    pub fn remove(&self, key: &str) -> bool {
        self.store.lock().remove(key)
    }

    /// Number of entries currently cached locally.
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    fn load(&self, key: &str) -> Result<Snapshot> {
        if let Some(locator) = self.peers.get() {
            if let Some(peer) = locator.pick_peer(key) {
                match self.fetch_from_peer(peer.as_ref(), key) {
                    Ok(value) => return Ok(value),
                    // Non-fatal: fall through to the local loader.
                    Err(err) => warn!(group = %self.name, key, %err, "peer fetch failed"),
                }
            }
        }
        self.load_locally(key)
    }

    /// The owning peer already caches this key, so the snapshot is
    /// returned without warming the local store.
    fn fetch_from_peer(&self, peer: &dyn PeerFetcher, key: &str) -> Result<Snapshot> {
        let bytes = peer
            .fetch(&self.name, key)
            .map_err(|source| Error::peer_fetch(&self.name, key, source))?;
        debug!(group = %self.name, key, "loaded from peer");
        Ok(Snapshot::new(bytes))
    }

    fn load_locally(&self, key: &str) -> Result<Snapshot> {
        let bytes = self
            .loader
            .load(key)
            .map_err(|source| Error::loader_failed(&self.name, key, source))?;
        let value = Snapshot::new(bytes);
        self.store.lock().put(key, value.clone());
        debug!(group = %self.name, key, "loaded locally");
        Ok(value)
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshcache_core::BoxError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn loader_from_table() -> Box<dyn Loader> {
        Box::new(|key: &str| -> std::result::Result<Vec<u8>, BoxError> {
            match key {
                "Tom" => Ok(b"630".to_vec()),
                "Jack" => Ok(b"589".to_vec()),
                _ => Err(format!("key {key} not found").into()),
            }
        })
    }

    #[test]
    fn empty_key_is_rejected_before_loading() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let group = Group::new(
            "scores",
            2,
            Box::new(move |key: &str| -> std::result::Result<Vec<u8>, BoxError> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(key.as_bytes().to_vec())
            }),
        );
        let err = group.get("").unwrap_err();
        assert!(matches!(err, Error::InvalidKey { .. }));
        assert_eq!(loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn loader_error_surfaces_and_caches_nothing() {
        let group = Group::new("scores", 2, loader_from_table());
        let err = group.get("Unknown").unwrap_err();
        assert!(matches!(err, Error::LoaderFailed { .. }));
        assert_eq!(group.len(), 0);
    }

    #[test]
    fn second_locator_registration_fails() {
        struct NoPeers;
        impl PeerLocator for NoPeers {
            fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerFetcher>> {
                None
            }
        }

        let group = Group::new("scores", 2, loader_from_table());
        group.register_peer_locator(Arc::new(NoPeers)).unwrap();
        let err = group.register_peer_locator(Arc::new(NoPeers)).unwrap_err();
        assert!(matches!(err, Error::PeerLocatorAlreadyRegistered { .. }));
    }

    #[test]
    fn remove_forces_a_reload() {
        let group = Group::new("scores", 2, loader_from_table());
        assert_eq!(group.get("Tom").unwrap().to_string(), "630");
        assert!(group.remove("Tom"));
        assert_eq!(group.len(), 0);
        assert_eq!(group.get("Tom").unwrap().to_string(), "630");
    }
}
