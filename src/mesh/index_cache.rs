//! Sequential index assignment.

use std::collections::HashMap;
use std::hash::Hash;

/// Assigns consecutive indices to keys in order of first use.
///
/// Looking up an unknown key inserts it with the next free index, so the
/// cache doubles as a compaction map: after a pass over all triangles the
/// keys, in insertion order, are exactly the referenced vertices.
#[derive(Debug, Clone)]
pub struct IndexCache<K> {
    indices: HashMap<K, usize>,
    keys: Vec<K>,
}

impl<K: Hash + Eq + Clone> IndexCache<K> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            indices: HashMap::new(),
            keys: Vec::new(),
        }
    }

    /// Get the index of `key`, assigning the next one if it is new.
    pub fn index_of(&mut self, key: K) -> usize {
        if let Some(&index) = self.indices.get(&key) {
            return index;
        }
        let index = self.keys.len();
        self.indices.insert(key.clone(), index);
        self.keys.push(key);
        index
    }

    /// Index of `key` without inserting.
    pub fn get(&self, key: &K) -> Option<usize> {
        self.indices.get(key).copied()
    }

    /// Number of distinct keys seen.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if no key was inserted yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in the order their indices were assigned.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Consume the cache, returning the keys in index order.
    pub fn into_keys(self) -> Vec<K> {
        self.keys
    }
}

impl<K: Hash + Eq + Clone> Default for IndexCache<K> {
    fn default() -> Self {
        Self::new()
    }
}
