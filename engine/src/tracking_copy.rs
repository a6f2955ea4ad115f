//! This module defines the `TrackingCopy` - a utility that caches operations on the state, so that
//! the underlying state remains unmodified, but it can be interacted with as if the modifications
//! were applied on it.

use std::collections::{BTreeMap, BTreeSet};

use linked_hash_map::LinkedHashMap;

use multi_staking_types::{Key, KeyTag, StoredValue};

use crate::global_state::{
    Effects, Error as GlobalStateError, StateReader, Transform, TransformKind,
};

/// Number of read values kept before the least recently used ones are evicted.
const MAX_CACHED_READS: usize = 1024;

/// Keeps track of already accessed keys.
/// Reads are kept apart from mutations so the read cache can be bounded.
struct TrackingCopyCache {
    reads_cached: LinkedHashMap<Key, StoredValue>,
    muts_cached: BTreeMap<Key, StoredValue>,
    prunes_cached: BTreeSet<Key>,
}

impl TrackingCopyCache {
    fn new() -> Self {
        TrackingCopyCache {
            reads_cached: LinkedHashMap::new(),
            muts_cached: BTreeMap::new(),
            prunes_cached: BTreeSet::new(),
        }
    }

    fn insert_read(&mut self, key: Key, value: StoredValue) {
        self.reads_cached.insert(key, value);
        while self.reads_cached.len() > MAX_CACHED_READS {
            if self.reads_cached.pop_front().is_none() {
                break;
            }
        }
    }

    fn insert_write(&mut self, key: Key, value: StoredValue) {
        self.prunes_cached.remove(&key);
        self.muts_cached.insert(key, value);
    }

    fn insert_prune(&mut self, key: Key) {
        self.muts_cached.remove(&key);
        self.prunes_cached.insert(key);
    }

    /// `Some(None)` means the key is pruned; `None` means the cache knows nothing about it.
    fn get(&mut self, key: &Key) -> Option<Option<&StoredValue>> {
        if self.prunes_cached.contains(key) {
            return Some(None);
        }
        if let Some(value) = self.muts_cached.get(key) {
            return Some(Some(value));
        }
        self.reads_cached.get_refresh(key).map(|value| Some(&*value))
    }
}

/// An interface for the global state that caches all operations (reads and writes) instead of
/// applying them directly to the state. This way the state remains unmodified, while the user can
/// interact with it as if it was being modified in real time.
pub struct TrackingCopy<R> {
    reader: R,
    cache: TrackingCopyCache,
    effects: Effects,
}

impl<R> TrackingCopy<R>
where
    R: StateReader<Key, StoredValue, Error = GlobalStateError>,
{
    /// Creates a new `TrackingCopy` using the `reader` as the interface to the state.
    pub fn new(reader: R) -> TrackingCopy<R> {
        TrackingCopy {
            reader,
            cache: TrackingCopyCache::new(),
            effects: Effects::new(),
        }
    }

    /// Returns the `reader` used to access the state.
    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Returns a copy of the execution effects cached by this instance.
    pub fn effects(&self) -> Effects {
        self.effects.clone()
    }

    /// Consumes `self`, returning the cached execution effects.
    pub fn into_effects(self) -> Effects {
        self.effects
    }

    /// Reads the value stored under `key`, as modified by this tracking copy.
    pub fn read(&mut self, key: &Key) -> Result<Option<StoredValue>, GlobalStateError> {
        if let Some(cached) = self.cache.get(key) {
            return Ok(cached.cloned());
        }
        let value = self.reader.read(key)?;
        if let Some(value) = &value {
            self.cache.insert_read(key.clone(), value.clone());
        }
        Ok(value)
    }

    /// Writes `value` under `key`. Note that the write is only cached, and the global state itself
    /// remains unmodified.
    pub fn write(&mut self, key: Key, value: StoredValue) {
        self.cache.insert_write(key.clone(), value.clone());
        self.effects
            .push(Transform::new(key, TransformKind::Write(value)));
    }

    /// Prunes a `key`.
    pub fn prune(&mut self, key: Key) {
        self.cache.insert_prune(key.clone());
        self.effects.push(Transform::new(key, TransformKind::Prune));
    }

    /// Gets the set of keys in the state whose tag is `key_tag`, including uncommitted writes and
    /// excluding uncommitted prunes.
    pub fn get_keys(&mut self, key_tag: &KeyTag) -> Result<BTreeSet<Key>, GlobalStateError> {
        let mut keys: BTreeSet<Key> = self
            .reader
            .keys_with_prefix(&key_tag.prefix())?
            .into_iter()
            .filter(|key| !self.cache.prunes_cached.contains(key))
            .collect();
        keys.extend(
            self.cache
                .muts_cached
                .keys()
                .filter(|key| key.tag() == *key_tag)
                .cloned(),
        );
        Ok(keys)
    }
}
