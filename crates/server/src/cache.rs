//! Rendered view cache
//!
//! Listing views are expensive relative to how rarely they change, so their
//! rendered bodies are kept here until a mutation revalidates the path.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Receives cache invalidation signals from mutations.
pub trait Revalidator: Send + Sync {
    fn revalidate_path(&self, path: &str);
}

#[derive(Default)]
struct Entries {
    bodies: HashMap<String, String>,
    /// Bumped by every invalidation.
    generation: u64,
}

/// In-memory cache of rendered view bodies keyed by path
///
/// A view rendered from data read before an invalidation must not be cached
/// after it. Renderers take [`PageCache::generation`] before reading and
/// store through [`PageCache::insert_if_current`].
#[derive(Default)]
pub struct PageCache {
    entries: RwLock<Entries>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.bodies.get(path).cloned()
    }

    pub fn generation(&self) -> u64 {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    pub fn insert(&self, path: impl Into<String>, body: String) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.bodies.insert(path.into(), body);
    }

    /// Cache `body` only if nothing was invalidated since `generation` was read.
    /// Returns whether the body was stored.
    pub fn insert_if_current(&self, path: impl Into<String>, body: String, generation: u64) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.generation != generation {
            return false;
        }
        entries.bodies.insert(path.into(), body);
        true
    }

    /// Drop the cached body for `path`. Returns whether anything was cached.
    pub fn invalidate(&self, path: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.generation = entries.generation.wrapping_add(1);
        entries.bodies.remove(path).is_some()
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Revalidator for PageCache {
    fn revalidate_path(&self, path: &str) {
        let was_cached = self.invalidate(path);
        tracing::debug!(path, was_cached, "Revalidated cached view");
    }
}
