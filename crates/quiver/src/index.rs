//! Multi-key index with keys unique across every key spec.
//!
//! A [`KeyIndex`] keeps one map per [`KeySpec`]. A key value belongs to at
//! most one item no matter which spec produced it, so a lookup never needs
//! to say which key it means: [`KeyIndex::resolve`] tries each map in
//! declaration order and the first hit is the only possible hit.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use quiver_filter::Record;
use tracing::{debug, trace};

use crate::error::{CollectionError, Result};
use crate::key::{KeySpec, KeyValue};

/// Maps key values to items under several key specs at once.
pub struct KeyIndex<T> {
    specs: Vec<KeySpec>,
    maps: Vec<HashMap<KeyValue, Arc<T>>>,
}

impl<T: Record> KeyIndex<T> {
    /// Creates an empty index over the given key specs.
    ///
    /// Specs are consulted in the order given.
    pub fn new<I, S>(specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<KeySpec>,
    {
        let specs: Vec<KeySpec> = specs.into_iter().map(Into::into).collect();
        let maps = specs.iter().map(|_| HashMap::new()).collect();
        Self { specs, maps }
    }

    /// Reads every key value of `item`, one per spec.
    pub fn keys_of(&self, item: &T) -> Result<Vec<KeyValue>> {
        self.specs
            .iter()
            .map(|spec| spec.extract(item).map_err(CollectionError::from))
            .collect()
    }

    /// Indexes `item` under each of its key values.
    ///
    /// Fails without touching the index if the item lacks a key attribute,
    /// or if any of its key values is already mapped to a different item
    /// under any spec. Registering an item that is already indexed is a
    /// no-op.
    pub fn register(&mut self, item: &Arc<T>) -> Result<()> {
        let keys = self.keys_of(item)?;

        for key in &keys {
            if let Some(owner) = self.lookup(key) {
                if !Arc::ptr_eq(owner, item) {
                    debug!(key = %key, "rejecting duplicate key");
                    return Err(CollectionError::DuplicateKey { key: key.clone() });
                }
            }
        }

        for (map, key) in self.maps.iter_mut().zip(keys) {
            trace!(key = %key, "indexing item");
            map.insert(key, Arc::clone(item));
        }
        Ok(())
    }

    /// Drops every entry that maps to `item`.
    ///
    /// Returns whether anything was removed. Unknown items are ignored.
    pub fn unregister(&mut self, item: &Arc<T>) -> bool {
        let mut removed = false;
        match self.keys_of(item) {
            Ok(keys) => {
                for (map, key) in self.maps.iter_mut().zip(keys) {
                    if map.get(&key).is_some_and(|owner| Arc::ptr_eq(owner, item)) {
                        trace!(key = %key, "unindexing item");
                        map.remove(&key);
                        removed = true;
                    }
                }
            }
            // Key attributes no longer readable; fall back to a scan.
            Err(_) => {
                for map in &mut self.maps {
                    let before = map.len();
                    map.retain(|_, owner| !Arc::ptr_eq(owner, item));
                    removed |= map.len() != before;
                }
            }
        }
        removed
    }

    /// Whether `item` itself is indexed (identity, not key equality).
    pub fn is_registered(&self, item: &Arc<T>) -> bool {
        let Some(spec) = self.specs.first() else {
            return false;
        };
        spec.extract(&**item)
            .ok()
            .and_then(|key| self.maps[0].get(&key))
            .is_some_and(|owner| Arc::ptr_eq(owner, item))
    }

    /// A copy of this index holding only the items `keep` accepts.
    pub fn retained<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&Arc<T>) -> bool,
    {
        let maps = self
            .maps
            .iter()
            .map(|map| {
                map.iter()
                    .filter(|(_, item)| keep(item))
                    .map(|(key, item)| (key.clone(), Arc::clone(item)))
                    .collect()
            })
            .collect();
        Self {
            specs: self.specs.clone(),
            maps,
        }
    }
}

impl<T> KeyIndex<T> {
    /// A copy of this index pointing at `replacements` instead of the
    /// items it holds, keyed by the held item's address.
    ///
    /// Entries whose item has no replacement are dropped.
    pub(crate) fn remapped(&self, replacements: &HashMap<*const T, Arc<T>>) -> Self {
        let maps = self
            .maps
            .iter()
            .map(|map| {
                map.iter()
                    .filter_map(|(key, item)| {
                        let new = replacements.get(&Arc::as_ptr(item))?;
                        Some((key.clone(), Arc::clone(new)))
                    })
                    .collect()
            })
            .collect();
        Self {
            specs: self.specs.clone(),
            maps,
        }
    }

    /// Finds the item mapped to `key` under any spec.
    pub fn lookup(&self, key: &KeyValue) -> Option<&Arc<T>> {
        self.maps.iter().find_map(|map| map.get(key))
    }

    /// Like [`lookup`](Self::lookup), failing with
    /// [`CollectionError::NonExistentKey`] on a miss.
    pub fn resolve(&self, key: &KeyValue) -> Result<&Arc<T>> {
        self.lookup(key)
            .ok_or_else(|| CollectionError::NonExistentKey { key: key.clone() })
    }

    /// Whether any spec maps `key`.
    pub fn contains_key(&self, key: &KeyValue) -> bool {
        self.lookup(key).is_some()
    }

    /// The key specs, in declaration order.
    pub fn specs(&self) -> &[KeySpec] {
        &self.specs
    }

    /// Number of indexed items.
    ///
    /// Every item has exactly one entry per spec, so this is the size of any
    /// one map. An index with no specs holds nothing.
    pub fn len(&self) -> usize {
        self.maps.first().map_or(0, HashMap::len)
    }

    /// Whether no items are indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry, keeping the specs.
    pub fn clear(&mut self) {
        for map in &mut self.maps {
            map.clear();
        }
    }
}

impl<T> Clone for KeyIndex<T> {
    fn clone(&self) -> Self {
        Self {
            specs: self.specs.clone(),
            maps: self.maps.clone(),
        }
    }
}

impl<T> fmt::Debug for KeyIndex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyIndex")
            .field("specs", &self.specs)
            .field("len", &self.len())
            .finish()
    }
}
