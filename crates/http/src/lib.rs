//! HTTP peer transport for meshcache.
//!
//! An [`HttpPool`] makes a set of meshcache processes into a cluster:
//! it serves this node's groups over HTTP and implements
//! [`meshcache::PeerLocator`] so groups route misses to the node that
//! owns the key on a consistent-hash ring.
//!
//! ```no_run
//! use meshcache::Registry;
//! use meshcache_http::HttpPool;
//! use std::sync::Arc;
//!
//! # async fn run() -> std::io::Result<()> {
//! let registry = Arc::new(Registry::new());
//! let pool = Arc::new(HttpPool::new("http://10.0.0.1:8000", Arc::clone(&registry)));
//! pool.set_peers(["http://10.0.0.1:8000", "http://10.0.0.2:8000"]);
//!
//! let loader = |key: &str| -> Result<Vec<u8>, meshcache::BoxError> {
//!     Ok(key.as_bytes().to_vec())
//! };
//! let group = registry
//!     .add_group("scores", 1024, Box::new(loader))
//!     .expect("fresh registry");
//! group.register_peer_locator(pool.clone()).expect("first locator");
//!
//! pool.serve("10.0.0.1:8000".parse().expect("addr")).await
//! # }
//! ```

pub mod fetcher;
pub mod pool;
mod server;

pub use fetcher::HttpFetcher;
pub use pool::{HttpPool, PoolConfig};
