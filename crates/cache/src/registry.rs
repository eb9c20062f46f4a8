//! Named group registry
//!
//! An explicit registry object rather than process-global state, so
//! embedding applications (and tests) control its lifetime and scope.
//! Typically one registry per process, shared as `Arc<Registry>` with
//! whatever serves peer traffic.

use crate::group::Group;
use crate::traits::Loader;
use meshcache_core::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Owns every [`Group`] in a process, keyed by unique name.
///
/// Lookups take a read lock and run concurrently; registration takes
/// the write lock. Groups are never torn down while the registry
/// lives.
#[derive(Default)]
pub struct Registry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a group named `name` holding at most
    /// `capacity` entries (0 = unbounded), loading misses through
    /// `loader`.
    ///
    /// Fails with [`Error::DuplicateGroup`] if the name is taken;
    /// registration is all-or-nothing.
    pub fn add_group(
        &self,
        name: &str,
        capacity: usize,
        loader: Box<dyn Loader>,
    ) -> Result<Arc<Group>> {
        let mut groups = self.groups.write();
        if groups.contains_key(name) {
            return Err(Error::DuplicateGroup {
                name: name.to_string(),
            });
        }
        let group = Arc::new(Group::new(name, capacity, loader));
        groups.insert(name.to_string(), Arc::clone(&group));
        debug!(group = name, capacity, "registered cache group");
        Ok(group)
    }

    /// Look up a group by name.
    pub fn group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("groups", &self.groups.read().len())
            .finish()
    }
}
