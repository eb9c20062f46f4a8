//! Read-through distributed in-process cache.
//!
//! meshcache lets many cooperating processes share one logical cache
//! namespace (a [`Group`]) without a central coordinator. A group
//! composes four pieces into a single [`Group::get`] operation:
//!
//! - [`store::LruStore`]: a bounded least-recently-used store,
//! - [`flight::FlightGroup`]: per-key deduplication of concurrent loads,
//! - [`ring::HashRing`]: consistent hashing from keys to owning peers,
//! - the capability traits in [`traits`], supplied by the embedding
//!   application (loader, peer locator, peer fetcher).
//!
//! On a miss, a group asks the owning peer for the key and falls back
//! to its local loader if the peer is unreachable or the key is owned
//! locally. Within one process the expensive load runs at most once
//! per key, no matter how many callers ask concurrently.

pub mod flight;
pub mod group;
pub mod registry;
pub mod ring;
pub mod store;
pub mod traits;

pub use flight::FlightGroup;
pub use group::Group;
pub use meshcache_core::{BoxError, Error, Result, Snapshot};
pub use registry::Registry;
pub use ring::HashRing;
pub use store::LruStore;
pub use traits::{Loader, PeerFetcher, PeerLocator};
