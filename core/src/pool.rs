//! Thread-safe interning pools.
//!
//! A [`Pool`] maps a recipe (the structural description of an object) to the
//! one canonical instance built from it. Lookups take a shared lock; a miss
//! builds the instance outside of any lock and then inserts it under the
//! exclusive lock, keeping whichever instance got there first. Concurrent
//! creators of the same recipe therefore always observe the same instance.

use core::hash::Hash;

use hashbrown::HashMap;
use parking_lot::{RwLock, RwLockWriteGuard};
use rustc_hash::FxBuildHasher;

pub(crate) type PoolMap<K, V> = HashMap<K, V, FxBuildHasher>;

pub struct Pool<K, V> {
    name: &'static str,
    entries: RwLock<PoolMap<K, V>>,
}

impl<K: Eq + Hash, V: Clone> Pool<K, V> {
    pub fn new(name: &'static str) -> Self {
        Pool {
            name,
            entries: RwLock::new(HashMap::with_hasher(FxBuildHasher)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, recipe: &K) -> Option<V> {
        self.entries.read().get(recipe).cloned()
    }

    /// Returns the canonical instance for `recipe`, building it on a miss.
    pub fn create(&self, recipe: K, build: impl FnOnce(&K) -> V) -> V {
        if let Some(existing) = self.entries.read().get(&recipe) {
            return existing.clone();
        }
        let built = build(&recipe);
        self.insert_or_keep(recipe, built)
    }

    /// Like [`Pool::create`], for builders that can fail. Nothing is
    /// inserted when the builder returns an error.
    pub fn try_create<E>(
        &self,
        recipe: K,
        build: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(existing) = self.entries.read().get(&recipe) {
            return Ok(existing.clone());
        }
        let built = build(&recipe)?;
        Ok(self.insert_or_keep(recipe, built))
    }

    fn insert_or_keep(&self, recipe: K, built: V) -> V {
        let mut entries = self.entries.write();
        let len = entries.len();
        let canonical = entries.entry(recipe).or_insert(built).clone();
        if entries.len() > len {
            tracing::trace!(pool = self.name, size = entries.len(), "interned new entry");
        }
        canonical
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Evicts every entry of this pool.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        tracing::debug!(pool = self.name, size = entries.len(), "clearing pool");
        entries.clear();
    }

    /// Takes the exclusive lock. Used to clear several pools atomically.
    pub(crate) fn lock(&self) -> RwLockWriteGuard<'_, PoolMap<K, V>> {
        self.entries.write()
    }
}
