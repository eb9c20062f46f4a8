//! Consistent-hash ring mapping keys to owning peers
//!
//! Each peer is placed on the ring `replicas` times ("virtual nodes")
//! to flatten key-distribution skew. Lookups hash the key and walk
//! clockwise to the first virtual node, wrapping at the end. The hash
//! function defaults to crc32c and is pluggable so tests can pin the
//! layout; it must be identical on every node sharing a ring.
//!
//! Changing the peer set is a full rebuild: construct a fresh ring and
//! swap it in. Incremental minimal-disruption updates are not
//! supported.

use std::collections::HashMap;

/// Hash function placing keys and virtual nodes on the ring.
pub type RingHashFn = Box<dyn Fn(&[u8]) -> u32 + Send + Sync>;

/// Consistent-hash ring over peer identities.
pub struct HashRing {
    replicas: usize,
    hash: RingHashFn,
    /// Virtual-node hashes, kept sorted ascending.
    hashes: Vec<u32>,
    /// Virtual-node hash to the peer that owns it.
    owners: HashMap<u32, String>,
}

impl HashRing {
    /// An empty ring with `replicas` virtual nodes per peer and the
    /// default crc32c hash.
    pub fn new(replicas: usize) -> Self {
        Self::with_hasher(replicas, crc32c::crc32c)
    }

    /// An empty ring with a caller-supplied hash function.
    pub fn with_hasher<F>(replicas: usize, hash: F) -> Self
    where
        F: Fn(&[u8]) -> u32 + Send + Sync + 'static,
    {
        Self {
            replicas: replicas.max(1),
            hash: Box::new(hash),
            hashes: Vec::new(),
            owners: HashMap::new(),
        }
    }

    /// Place every peer on the ring, `replicas` virtual nodes each.
    ///
    /// Virtual node `i` of a peer hashes `"{i}{peer}"`, so replicas of
    /// one peer land at unrelated positions.
    pub fn add_peers<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for peer in peers {
            let peer = peer.into();
            for i in 0..self.replicas {
                let vnode = (self.hash)(format!("{i}{peer}").as_bytes());
                self.hashes.push(vnode);
                self.owners.insert(vnode, peer.clone());
            }
        }
        self.hashes.sort_unstable();
        self.hashes.dedup();
    }

    /// The peer owning `key`, or `None` on an empty ring.
    ///
    /// Deterministic for a fixed peer set and hash function.
    pub fn locate(&self, key: &str) -> Option<&str> {
        if self.hashes.is_empty() {
            return None;
        }
        let hash = (self.hash)(key.as_bytes());
        // First virtual node clockwise of the key, wrapping around.
        let idx = self.hashes.partition_point(|&h| h < hash) % self.hashes.len();
        self.owners.get(&self.hashes[idx]).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

impl std::fmt::Debug for HashRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("virtual_nodes", &self.hashes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hash that parses the input as a decimal number, so virtual-node
    /// positions are predictable: peer "6" with replica index 1 lands
    /// at 16.
    fn numeric_hash(data: &[u8]) -> u32 {
        std::str::from_utf8(data)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }

    #[test]
    fn empty_ring_locates_nothing() {
        let ring = HashRing::new(3);
        assert_eq!(ring.locate("any"), None);
        assert!(ring.is_empty());
    }

    #[test]
    fn clockwise_lookup_with_wraparound() {
        let mut ring = HashRing::with_hasher(3, numeric_hash);
        // Virtual nodes: 2, 12, 22 / 4, 14, 24 / 6, 16, 26.
        ring.add_peers(["6", "4", "2"]);

        let cases = [
            ("2", "2"),
            ("11", "2"),  // next vnode is 12
            ("23", "4"),  // next vnode is 24
            ("25", "6"),  // next vnode is 26
            ("27", "2"),  // wraps to vnode 2
        ];
        for (key, owner) in cases {
            assert_eq!(ring.locate(key), Some(owner), "key {key}");
        }
    }

    #[test]
    fn adding_a_peer_only_moves_adjacent_keys() {
        let mut ring = HashRing::with_hasher(3, numeric_hash);
        ring.add_peers(["6", "4", "2"]);
        // Peer 8 adds vnodes 8, 18, 28; key 27 now stops there
        // instead of wrapping.
        ring.add_peers(["8"]);
        assert_eq!(ring.locate("27"), Some("8"));
        assert_eq!(ring.locate("11"), Some("2"));
        assert_eq!(ring.locate("23"), Some("4"));
    }

    #[test]
    fn locate_is_stable_across_calls() {
        let mut ring = HashRing::new(50);
        ring.add_peers(["http://a:8000", "http://b:8000", "http://c:8000"]);
        for key in ["Tom", "Jack", "Sam", "Unknown"] {
            let first = ring.locate(key).map(str::to_string);
            for _ in 0..10 {
                assert_eq!(ring.locate(key).map(str::to_string), first);
            }
        }
    }

    #[test]
    fn replicas_spread_keys_across_peers() {
        let mut ring = HashRing::new(50);
        ring.add_peers(["a", "b", "c"]);
        let mut seen = std::collections::HashSet::new();
        for i in 0..1000 {
            seen.insert(ring.locate(&format!("key-{i}")).unwrap().to_string());
        }
        assert_eq!(seen.len(), 3, "all peers should own some keys");
    }
}
