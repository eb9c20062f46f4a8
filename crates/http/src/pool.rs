//! Peer pool: ring membership plus one fetcher per peer

use crate::fetcher::HttpFetcher;
use crate::server;
use meshcache::{HashRing, PeerFetcher, PeerLocator, Registry};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Base path every pool endpoint lives under.
pub const DEFAULT_BASE_PATH: &str = "/_meshcache/";

/// Virtual nodes per peer on the consistent-hash ring.
pub const DEFAULT_REPLICAS: usize = 50;

/// Tuning knobs for an [`HttpPool`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// URL prefix for peer traffic; must start and end with `/`.
    pub base_path: String,
    /// Virtual nodes per peer; more replicas flatten key skew.
    pub replicas: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
        }
    }
}

struct Membership {
    ring: HashRing,
    fetchers: HashMap<String, Arc<HttpFetcher>>,
}

/// HTTP transport binding a node into a meshcache cluster.
///
/// One pool per process: it serves every group in the shared
/// [`Registry`] under `{base_path}{group}/{key}` and, registered as a
/// group's peer locator, routes that group's misses to whichever peer
/// the ring says owns the key. `self_addr` must appear in the peer
/// list exactly as the other nodes address this one, so the pool can
/// recognize keys it owns itself.
pub struct HttpPool {
    self_addr: String,
    config: PoolConfig,
    registry: Arc<Registry>,
    membership: Mutex<Membership>,
}

impl HttpPool {
    pub fn new(self_addr: impl Into<String>, registry: Arc<Registry>) -> Self {
        Self::with_config(self_addr, registry, PoolConfig::default())
    }

    pub fn with_config(
        self_addr: impl Into<String>,
        registry: Arc<Registry>,
        config: PoolConfig,
    ) -> Self {
        let membership = Mutex::new(Membership {
            ring: HashRing::new(config.replicas),
            fetchers: HashMap::new(),
        });
        Self {
            self_addr: self_addr.into(),
            config,
            registry,
            membership,
        }
    }

    /// Replace the pool's peer set.
    ///
    /// Builds a fresh ring and a fetcher per peer; there is no
    /// incremental update. Peers with malformed addresses are skipped
    /// with a warning. Purely data-structural — no connection or
    /// blocking client is created until a fetcher is first used — so
    /// it is safe to call from async startup code.
    pub fn set_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ring = HashRing::new(self.config.replicas);
        let mut fetchers = HashMap::new();
        for peer in peers {
            let peer = peer.into();
            let base = format!("{}{}", peer, self.config.base_path);
            match HttpFetcher::new(&base) {
                Ok(fetcher) => {
                    ring.add_peers([peer.clone()]);
                    fetchers.insert(peer, Arc::new(fetcher));
                }
                Err(err) => warn!(peer = %peer, %err, "skipping unusable peer address"),
            }
        }
        info!(peers = fetchers.len(), "peer set replaced");

        let mut membership = self.membership.lock();
        membership.ring = ring;
        membership.fetchers = fetchers;
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Build the axum router serving this pool's groups.
    pub fn router(self: &Arc<Self>) -> axum::Router {
        server::router(Arc::clone(self))
    }

    /// Bind `addr` and serve peer traffic until the task is dropped.
    pub async fn serve(self: Arc<Self>, addr: SocketAddr) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, self_addr = %self.self_addr, "serving peer traffic");
        axum::serve(listener, self.router()).await
    }
}

impl PeerLocator for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>> {
        let membership = self.membership.lock();
        let owner = membership.ring.locate(key)?;
        if owner == self.self_addr {
            return None;
        }
        debug!(key, owner, "key owned by remote peer");
        membership
            .fetchers
            .get(owner)
            .map(|fetcher| Arc::clone(fetcher) as Arc<dyn PeerFetcher>)
    }
}

impl std::fmt::Debug for HttpPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPool")
            .field("self_addr", &self.self_addr)
            .field("base_path", &self.config.base_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(self_addr: &str) -> HttpPool {
        HttpPool::new(self_addr, Arc::new(Registry::new()))
    }

    #[test]
    fn empty_pool_picks_nobody() {
        let pool = pool("http://a:8000");
        assert!(pool.pick_peer("Tom").is_none());
    }

    #[test]
    fn sole_self_peer_means_local_ownership() {
        let pool = pool("http://a:8000");
        pool.set_peers(["http://a:8000"]);
        for key in ["Tom", "Jack", "Sam"] {
            assert!(pool.pick_peer(key).is_none(), "{key} must be local");
        }
    }

    #[test]
    fn remote_only_ring_always_picks_the_peer() {
        let pool = pool("http://a:8000");
        pool.set_peers(["http://b:8000"]);
        for key in ["Tom", "Jack", "Sam"] {
            assert!(pool.pick_peer(key).is_some(), "{key} must be remote");
        }
    }

    #[test]
    fn picks_are_deterministic() {
        let pool = pool("http://a:8000");
        pool.set_peers(["http://a:8000", "http://b:8000", "http://c:8000"]);
        for key in ["Tom", "Jack", "Sam", "Unknown"] {
            let first = pool.pick_peer(key).is_some();
            for _ in 0..10 {
                assert_eq!(pool.pick_peer(key).is_some(), first);
            }
        }
    }

    #[test]
    fn malformed_peer_addresses_are_skipped() {
        let pool = pool("http://a:8000");
        pool.set_peers(["not a url"]);
        assert!(pool.pick_peer("Tom").is_none());
    }
}
