//! Finder Registry
//!
//! The ordered list of finders the import machinery walks on every lookup.
//! First match wins.
//!
//! Registration is explicit and idempotent per `Finder::key()`: registering a
//! finder whose key is already present hands back a handle to the existing
//! entry. `append_unguarded` bypasses that guard for callers that really want
//! duplicate entries.
//!
//! A process-wide registry is available through `global()`, and `install()`
//! puts a `JsonFinder` at the end of it.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::RwLock;
use tracing::debug;

use super::descriptor::ModuleDescriptor;
use super::finder::{Finder, JsonFinder};

/// Unique identifier for a registry entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FinderId(pub u64);

impl FinderId {
    /// Get the raw u64 value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for FinderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FinderId({})", self.0)
    }
}

struct Entry {
    id: FinderId,
    finder: Arc<dyn Finder>,
}

/// Ordered list of finders.
pub struct FinderRegistry {
    entries: Vec<Entry>,

    /// Counter for generating unique FinderIds.
    next_id: u64,
}

/// Thread-safe wrapper for FinderRegistry.
pub type SharedFinderRegistry = Arc<RwLock<FinderRegistry>>;

/// Create a new shared finder registry.
pub fn new_shared_registry() -> SharedFinderRegistry {
    Arc::new(RwLock::new(FinderRegistry::new()))
}

impl FinderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    fn push(&mut self, finder: Arc<dyn Finder>) -> FinderId {
        let id = FinderId(self.next_id);
        self.next_id += 1;
        debug!(key = finder.key(), %id, position = self.entries.len(), "finder appended");
        self.entries.push(Entry { id, finder });
        id
    }

    /// Append `finder` unless one with the same key is already registered.
    ///
    /// # Returns
    /// The id of the new entry, or of the existing one.
    pub fn add(&mut self, finder: Arc<dyn Finder>) -> FinderId {
        if let Some(entry) = self.entries.iter().find(|e| e.finder.key() == finder.key()) {
            debug!(key = finder.key(), id = %entry.id, "finder already registered");
            return entry.id;
        }
        self.push(finder)
    }

    /// Append `finder` even if an equal one is already registered.
    pub fn add_unguarded(&mut self, finder: Arc<dyn Finder>) -> FinderId {
        self.push(finder)
    }

    /// Remove an entry. Returns whether it was present.
    pub fn remove(&mut self, id: FinderId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        let removed = self.entries.len() != before;
        if removed {
            debug!(%id, "finder removed");
        }
        removed
    }

    /// Check if an entry is still registered.
    pub fn contains(&self, id: FinderId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Check if a finder with `key` is registered.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.finder.key() == key)
    }

    /// Get the number of registered finders.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no finders are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered finder keys, in lookup order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.finder.key().to_string()).collect()
    }

    /// Ask each finder in order; the first descriptor returned wins.
    pub fn find(&self, name: &str, search_paths: Option<&[PathBuf]>) -> Option<ModuleDescriptor> {
        self.entries
            .iter()
            .find_map(|e| e.finder.find_spec(name, search_paths))
    }
}

impl Default for FinderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FinderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderRegistry")
            .field("finders", &self.keys())
            .finish()
    }
}

/// Handle to one registry entry.
///
/// Dropping the handle leaves the finder registered; call `unregister` to
/// remove it.
#[derive(Debug, Clone)]
pub struct Registration {
    id: FinderId,
    registry: Weak<RwLock<FinderRegistry>>,
}

impl Registration {
    /// The entry this handle refers to.
    pub fn id(&self) -> FinderId {
        self.id
    }

    /// Whether the entry is still registered.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.read().contains(self.id))
    }

    /// Remove the entry. Returns whether anything was removed.
    pub fn unregister(self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.write().remove(self.id),
            None => false,
        }
    }
}

/// Register `finder` at the end of `registry`, idempotently by key.
pub fn register(registry: &SharedFinderRegistry, finder: Arc<dyn Finder>) -> Registration {
    let id = registry.write().add(finder);
    Registration {
        id,
        registry: Arc::downgrade(registry),
    }
}

/// Register `finder` at the end of `registry`, allowing duplicates.
pub fn append_unguarded(registry: &SharedFinderRegistry, finder: Arc<dyn Finder>) -> Registration {
    let id = registry.write().add_unguarded(finder);
    Registration {
        id,
        registry: Arc::downgrade(registry),
    }
}

static GLOBAL_REGISTRY: OnceLock<SharedFinderRegistry> = OnceLock::new();

/// The process-wide finder registry.
pub fn global() -> &'static SharedFinderRegistry {
    GLOBAL_REGISTRY.get_or_init(new_shared_registry)
}

/// Register a `JsonFinder` as the last finder of the process-wide registry.
///
/// Safe to call more than once; later calls return a handle to the same entry.
pub fn install() -> Registration {
    register(global(), Arc::new(JsonFinder::new()))
}
