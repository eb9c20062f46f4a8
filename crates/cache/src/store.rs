//! Bounded least-recently-used store
//!
//! `LruStore` is the eviction store behind every cache group: a map
//! from key to [`Snapshot`] bounded by entry count, evicting the least
//! recently used entry once full. It performs no locking itself; a
//! group wraps it in a single exclusive lock, so distinct groups never
//! contend on each other's stores.
//!
//! Recency is tracked with a slab-backed doubly-linked list: nodes are
//! slots in a `Vec` linked by indices, giving O(1) insert, remove, and
//! move-to-front without unsafe code. Freed slots are recycled via a
//! free list.

use meshcache_core::Snapshot;
use std::collections::HashMap;

/// Called with `(key, value)` as an entry leaves the store, whether by
/// capacity eviction, [`LruStore::remove`], or [`LruStore::clear`].
///
/// The hook runs synchronously while the caller may hold the store's
/// lock: it must not re-enter the same store, or it deadlocks.
pub type EvictionHook = Box<dyn Fn(&str, &Snapshot) + Send>;

struct Node {
    key: String,
    value: Snapshot,
    prev: Option<u32>,
    next: Option<u32>,
}

/// Entry-count-bounded LRU map from key to [`Snapshot`].
///
/// Capacity `0` means unbounded. Not safe for concurrent use on its
/// own; callers serialize access.
pub struct LruStore {
    capacity: usize,
    map: HashMap<String, u32>,
    slots: Vec<Option<Node>>,
    free: Vec<u32>,
    /// Most recently used entry.
    head: Option<u32>,
    /// Least recently used entry; evicted first.
    tail: Option<u32>,
    on_evict: Option<EvictionHook>,
}

impl LruStore {
    /// Create a store holding at most `capacity` entries (0 = unbounded).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            on_evict: None,
        }
    }

    /// Create a store that reports departing entries to `hook`.
    pub fn with_eviction_hook(capacity: usize, hook: EvictionHook) -> Self {
        let mut store = Self::new(capacity);
        store.on_evict = Some(hook);
        store
    }

    /// Insert or overwrite `key`, marking it most recently used.
    ///
    /// If the insert pushes the store past its capacity, least recently
    /// used entries are evicted until it fits.
    pub fn put(&mut self, key: &str, value: Snapshot) {
        if let Some(&idx) = self.map.get(key) {
            if let Some(node) = self.slots[idx as usize].as_mut() {
                node.value = value;
            }
            self.move_to_front(idx);
            return;
        }

        let idx = self.alloc(Node {
            key: key.to_string(),
            value,
            prev: None,
            next: None,
        });
        self.map.insert(key.to_string(), idx);
        self.push_front(idx);

        while self.capacity > 0 && self.map.len() > self.capacity {
            self.evict_lru();
        }
    }

    /// Look up `key`, marking it most recently used on a hit.
    pub fn get(&mut self, key: &str) -> Option<&Snapshot> {
        let idx = *self.map.get(key)?;
        self.move_to_front(idx);
        self.slots[idx as usize].as_ref().map(|node| &node.value)
    }

    /// Remove `key` if present, firing the eviction hook exactly like a
    /// capacity eviction. Returns whether an entry was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.map.remove(key) {
            Some(idx) => {
                let node = self.unlink_and_take(idx);
                if let Some(hook) = &self.on_evict {
                    hook(&node.key, &node.value);
                }
                true
            }
            None => false,
        }
    }

    /// Report every entry to the eviction hook, then empty the store.
    pub fn clear(&mut self) {
        if let Some(hook) = &self.on_evict {
            for slot in &self.slots {
                if let Some(node) = slot {
                    hook(&node.key, &node.value);
                }
            }
        }
        self.map.clear();
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The configured maximum entry count (0 = unbounded).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn evict_lru(&mut self) {
        let Some(idx) = self.tail else { return };
        let node = self.unlink_and_take(idx);
        self.map.remove(&node.key);
        if let Some(hook) = &self.on_evict {
            hook(&node.key, &node.value);
        }
    }

    fn alloc(&mut self, node: Node) -> u32 {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx as usize] = Some(node);
                idx
            }
            None => {
                let idx = self.slots.len() as u32;
                self.slots.push(Some(node));
                idx
            }
        }
    }

    fn node(&mut self, idx: u32) -> &mut Node {
        self.slots[idx as usize]
            .as_mut()
            .expect("linked slot is occupied")
    }

    fn push_front(&mut self, idx: u32) {
        let old_head = self.head;
        {
            let node = self.node(idx);
            node.prev = None;
            node.next = old_head;
        }
        if let Some(old) = old_head {
            self.node(old).prev = Some(idx);
        } else {
            self.tail = Some(idx);
        }
        self.head = Some(idx);
    }

    fn unlink(&mut self, idx: u32) {
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.node(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node(n).prev = prev,
            None => self.tail = prev,
        }
    }

    fn unlink_and_take(&mut self, idx: u32) -> Node {
        self.unlink(idx);
        self.free.push(idx);
        self.slots[idx as usize]
            .take()
            .expect("linked slot is occupied")
    }

    fn move_to_front(&mut self, idx: u32) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }
}

impl std::fmt::Debug for LruStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruStore")
            .field("capacity", &self.capacity)
            .field("len", &self.map.len())
            .finish()
    }
}
