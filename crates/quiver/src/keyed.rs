//! Keyed collection: a [`Sequence`] with constant-time lookup by key.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{BitAnd, BitOr};
use std::slice;
use std::sync::Arc;

use quiver_filter::{Filter, Operand, Record};
use tracing::debug;

use crate::error::Result;
use crate::index::KeyIndex;
use crate::key::{KeySpec, KeyValue};
use crate::sequence::{summarize, Sequence};

/// What a membership test is asked about.
#[derive(Debug)]
pub enum Lookup<'a, T> {
    /// A bare key value, under any key spec.
    Key(KeyValue),
    /// An item, resolved through its own key values or by equality.
    Item(&'a T),
}

impl<'a, T> Lookup<'a, T> {
    /// Shorthand for `Lookup::Key(key.into())`.
    pub fn key(key: impl Into<KeyValue>) -> Self {
        Lookup::Key(key.into())
    }
}

/// An ordered collection indexed by one or more unique keys.
///
/// Every key value, under every key spec, belongs to at most one item, so
/// [`index`](Keyed::index) takes a bare value and finds the item whichever
/// key it is.
///
/// ```rust
/// use quiver::{CollectionError, Keyed, Record};
///
/// #[derive(Record)]
/// struct Country {
///     #[record(String)]
///     iso2: String,
///     #[record(String)]
///     iso3: String,
/// }
///
/// let mut countries: Keyed<Country> = Keyed::new([Country::ISO2, Country::ISO3]);
/// countries
///     .add(Country { iso2: "TH".into(), iso3: "THA".into() })
///     .unwrap();
///
/// assert_eq!(countries.index("THA").unwrap().iso2, "TH");
///
/// let clash = countries.add(Country { iso2: "XX".into(), iso3: "TH".into() });
/// assert!(matches!(clash, Err(CollectionError::DuplicateKey { .. })));
/// ```
pub struct Keyed<T> {
    items: Sequence<T>,
    index: KeyIndex<T>,
}

impl<T: Record> Keyed<T> {
    /// Creates an empty collection keyed by `specs`.
    pub fn new<I, S>(specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<KeySpec>,
    {
        Self {
            items: Sequence::new(),
            index: KeyIndex::new(specs),
        }
    }

    /// Starts a [`KeyedBuilder`].
    pub fn builder() -> KeyedBuilder<T> {
        KeyedBuilder::new()
    }

    /// Adds an item, indexing it under every key spec.
    ///
    /// Returns `Ok(false)` if this very item is already held. Fails with
    /// [`CollectionError::DuplicateKey`](crate::CollectionError::DuplicateKey) if any of its key values belongs
    /// to another item; the collection is then unchanged.
    pub fn add(&mut self, item: impl Into<Arc<T>>) -> Result<bool> {
        let item = item.into();
        if self.holds(&item) {
            return Ok(false);
        }
        self.index.register(&item)?;
        self.items.add(item);
        Ok(true)
    }

    /// Adds items one at a time, stopping at the first failure.
    ///
    /// Items before the failing one stay added. Returns how many items were
    /// new.
    pub fn extend<I>(&mut self, items: I) -> Result<usize>
    where
        I: IntoIterator,
        I::Item: Into<Arc<T>>,
    {
        let mut added = 0;
        for item in items {
            if self.add(item)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Removes and returns the item under `key`.
    pub fn remove(&mut self, key: impl Into<KeyValue>) -> Result<Arc<T>> {
        let key = key.into();
        let item = Arc::clone(self.index.resolve(&key)?);
        self.detach(&item)?;
        debug!(key = %key, "removed item");
        Ok(item)
    }

    /// Removes this very item.
    pub fn remove_item(&mut self, item: &Arc<T>) -> Result<Arc<T>> {
        self.detach(item)
    }

    /// The held item matching `item` by identity or by any of its key
    /// values.
    pub fn find(&self, item: &T) -> Option<&Arc<T>> {
        if let Some(held) = self
            .items
            .iter()
            .find(|held| std::ptr::eq(Arc::as_ptr(held), item))
        {
            return Some(held);
        }
        self.index
            .specs()
            .iter()
            .filter_map(|spec| spec.extract(item).ok())
            .find_map(|key| self.index.lookup(&key))
    }

    /// The held item matching `item` (see [`find`](Self::find)), adding
    /// `item` if there is none.
    pub fn find_or_add(&mut self, item: impl Into<Arc<T>>) -> Result<Arc<T>> {
        let item = item.into();
        if let Some(held) = self.find(&item) {
            return Ok(Arc::clone(held));
        }
        self.add(Arc::clone(&item))?;
        Ok(item)
    }

    /// Puts `item` in the place of the held item it matches (see
    /// [`find`](Self::find)), reindexing it under its own keys.
    ///
    /// Returns the item that was replaced, or `None` if nothing matched, in
    /// which case nothing changes. If `item` is the held item itself it is
    /// returned as is. Fails with a duplicate key, leaving the collection
    /// unchanged, if one of `item`'s keys belongs to yet another item.
    pub fn find_and_replace(&mut self, item: impl Into<Arc<T>>) -> Result<Option<Arc<T>>> {
        let item = item.into();
        let Some(held) = self.find(&item).cloned() else {
            return Ok(None);
        };
        if Arc::ptr_eq(&held, &item) {
            return Ok(Some(held));
        }

        self.index.unregister(&held);
        if let Err(e) = self.index.register(&item) {
            // `held`'s keys were just freed and nothing else was indexed.
            self.index.register(&held)?;
            return Err(e);
        }
        self.items.replace(&held, item)?;
        debug!("replaced item");
        Ok(Some(held))
    }

    /// [`find_and_replace`](Self::find_and_replace), adding `item` when
    /// nothing matches. Returns the replaced item, or `None` if `item` was
    /// added.
    pub fn find_and_replace_or_add(&mut self, item: impl Into<Arc<T>>) -> Result<Option<Arc<T>>> {
        let item = item.into();
        match self.find_and_replace(Arc::clone(&item))? {
            Some(replaced) => Ok(Some(replaced)),
            None => {
                self.add(item)?;
                Ok(None)
            }
        }
    }

    /// Membership by key or by item.
    ///
    /// An item is held if it is held itself or if one of its key values
    /// resolves. [`contains_item`](Self::contains_item) also accepts an
    /// equal item.
    pub fn contains(&self, lookup: Lookup<'_, T>) -> bool {
        match lookup {
            Lookup::Key(key) => self.index.contains_key(&key),
            Lookup::Item(item) => self.find(item).is_some(),
        }
    }

    /// Items matching every spec in `filter`, keyed the same way.
    pub fn filter(&self, filter: &Filter) -> Result<Self> {
        Ok(self.with_items(self.items.filter(filter)?))
    }

    /// Filters on a single `attr__op` spec.
    pub fn filter_by(&self, spec: &str, operand: impl Into<Operand>) -> Result<Self> {
        self.filter(&Filter::new().with(spec, operand))
    }

    /// The single item matching `filter`.
    pub fn filter_only(&self, filter: &Filter) -> Result<Arc<T>> {
        self.items.filter_only(filter)
    }

    /// The single item matching `filter`, or `None`.
    pub fn filter_only_or_none(&self, filter: &Filter) -> Result<Option<Arc<T>>> {
        self.items.filter_only_or_none(filter)
    }

    /// Items of `self`, then items of `other` not already held.
    ///
    /// The result is keyed by `self`'s specs. Fails with
    /// [`CollectionError::DuplicateKey`](crate::CollectionError::DuplicateKey) if an item of `other` shares a key
    /// with a different item of `self`, which cannot happen when both sides
    /// come from the same collection.
    pub fn union(&self, other: &Self) -> Result<Self> {
        let mut merged = self.clone();
        for item in other.iter() {
            merged.add(Arc::clone(item))?;
        }
        Ok(merged)
    }

    /// Items of `self` that `other` also holds, in `self`'s order.
    pub fn intersection(&self, other: &Self) -> Self {
        self.with_items(self.items.intersection(&other.items))
    }

    /// The first `n` items.
    pub fn head(&self, n: usize) -> Self {
        self.with_items(self.items.head(n))
    }

    /// The last `n` items.
    pub fn tail(&self, n: usize) -> Self {
        self.with_items(self.items.tail(n))
    }

    fn holds(&self, item: &Arc<T>) -> bool {
        if self.index.specs().is_empty() {
            self.items.contains(item)
        } else {
            self.index.is_registered(item)
        }
    }

    fn detach(&mut self, item: &Arc<T>) -> Result<Arc<T>> {
        let removed = self.items.remove(item)?;
        self.index.unregister(item);
        Ok(removed)
    }

    // `items` is a subset of `self.items`, so the index only needs pruning.
    fn with_items(&self, items: Sequence<T>) -> Self {
        let kept: HashSet<*const T> = items.iter().map(Arc::as_ptr).collect();
        let index = self.index.retained(|item| kept.contains(&Arc::as_ptr(item)));
        Self { items, index }
    }
}

impl<T> Keyed<T> {
    /// The item under `key`, failing with
    /// [`CollectionError::NonExistentKey`](crate::CollectionError::NonExistentKey).
    pub fn index(&self, key: impl Into<KeyValue>) -> Result<&Arc<T>> {
        self.index.resolve(&key.into())
    }

    /// The item under `key`, if any.
    pub fn get(&self, key: impl Into<KeyValue>) -> Option<&Arc<T>> {
        self.index.lookup(&key.into())
    }

    /// The item under `key`, or `default`.
    pub fn get_or<'a>(&'a self, key: impl Into<KeyValue>, default: &'a Arc<T>) -> &'a Arc<T> {
        self.get(key).unwrap_or(default)
    }

    /// Whether any key spec maps `key`.
    pub fn contains_key(&self, key: impl Into<KeyValue>) -> bool {
        self.index.contains_key(&key.into())
    }

    /// The key specs, in declaration order.
    pub fn specs(&self) -> &[KeySpec] {
        self.index.specs()
    }

    /// The underlying sequence.
    pub fn as_sequence(&self) -> &Sequence<T> {
        &self.items
    }

    /// Drops the index, keeping the items in order.
    pub fn into_sequence(self) -> Sequence<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Arc<T>> {
        self.items.iter()
    }

    pub fn first(&self) -> Option<&Arc<T>> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&Arc<T>> {
        self.items.last()
    }

    pub fn only(&self) -> Result<&Arc<T>> {
        self.items.only()
    }

    pub fn only_or_none(&self) -> Result<Option<&Arc<T>>> {
        self.items.only_or_none()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    /// A copy holding fresh clones of the items, keyed the same way.
    ///
    /// [`Clone`] shares the items with the original; this does not.
    pub fn deep_clone(&self) -> Self
    where
        T: Clone,
    {
        let replacements: HashMap<*const T, Arc<T>> = self
            .items
            .iter()
            .map(|item| (Arc::as_ptr(item), Arc::new(T::clone(item))))
            .collect();
        let items = self
            .items
            .iter()
            .filter_map(|item| replacements.get(&Arc::as_ptr(item)).cloned())
            .collect();
        Self {
            items,
            index: self.index.remapped(&replacements),
        }
    }
}

impl<T: Record + PartialEq> Keyed<T> {
    /// Whether `item` is held: itself, through one of its key values, or
    /// as an equal item.
    pub fn contains_item(&self, item: &T) -> bool {
        self.find(item).is_some() || self.items.contains_item(item)
    }
}

impl<T> Clone for Keyed<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            index: self.index.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Keyed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keyed")
            .field("specs", &self.index.specs())
            .field("items", &self.items)
            .finish()
    }
}

impl<T: fmt::Display> fmt::Display for Keyed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        summarize(f, "Keyed", self.items.len(), self.items.iter())
    }
}

impl<T> IntoIterator for Keyed<T> {
    type Item = Arc<T>;
    type IntoIter = std::vec::IntoIter<Arc<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Keyed<T> {
    type Item = &'a Arc<T>;
    type IntoIter = slice::Iter<'a, Arc<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Record> BitOr for &Keyed<T> {
    type Output = Result<Keyed<T>>;

    fn bitor(self, other: Self) -> Result<Keyed<T>> {
        self.union(other)
    }
}

impl<T: Record> BitAnd for &Keyed<T> {
    type Output = Keyed<T>;

    fn bitand(self, other: Self) -> Keyed<T> {
        self.intersection(other)
    }
}

/// Fluent configuration for a [`Keyed`] collection.
///
/// ```rust
/// use quiver::{Keyed, Record};
///
/// #[derive(Record)]
/// struct Seat {
///     #[record(String)]
///     code: String,
///     #[record(Number)]
///     row: u32,
///     #[record(String)]
///     letter: String,
/// }
///
/// let seats: Keyed<Seat> = Keyed::builder()
///     .key(Seat::CODE)
///     .composite([Seat::ROW, Seat::LETTER])
///     .build();
/// assert_eq!(seats.specs().len(), 2);
/// ```
pub struct KeyedBuilder<T> {
    specs: Vec<KeySpec>,
    _items: PhantomData<fn() -> T>,
}

impl<T: Record> KeyedBuilder<T> {
    pub fn new() -> Self {
        Self {
            specs: Vec::new(),
            _items: PhantomData,
        }
    }

    /// Adds a single-attribute key.
    pub fn key(mut self, name: impl Into<String>) -> Self {
        self.specs.push(KeySpec::single(name));
        self
    }

    /// Adds a composite key over several attributes.
    pub fn composite<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.specs.push(KeySpec::composite(names));
        self
    }

    /// Adds an already built key spec.
    pub fn spec(mut self, spec: KeySpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn build(self) -> Keyed<T> {
        Keyed::new(self.specs)
    }
}

impl<T: Record> Default for KeyedBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
