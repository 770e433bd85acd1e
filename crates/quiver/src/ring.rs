//! Fixed-capacity collection that overwrites its oldest item.

use std::fmt;
use std::iter::{Chain, FilterMap, Rev};
use std::ops::{BitAnd, BitOr};
use std::slice;
use std::sync::Arc;

use quiver_filter::{Filter, Operand, Record};
use tracing::trace;

use crate::error::{CollectionError, Result};
use crate::sequence::{intersection_of, matching, summarize, union_of, Sequence};

/// Iterator over a [`Ring`], oldest item first.
pub type RingIter<'a, T> = FilterMap<
    Chain<slice::Iter<'a, Option<Arc<T>>>, slice::Iter<'a, Option<Arc<T>>>>,
    fn(&'a Option<Arc<T>>) -> Option<&'a Arc<T>>,
>;

/// A ring buffer of shared items.
///
/// Holds at most [`capacity`](Ring::capacity) items. Adding to a full ring
/// overwrites the oldest item, and iteration always runs from the oldest
/// item to the newest. Items only leave by being overwritten or by
/// [`clear`](Ring::clear); there is no `remove`.
///
/// Derived rings (filtered, unions, intersections, head and tail) keep the
/// capacity of the ring they came from.
///
/// ```rust
/// use quiver::Ring;
///
/// let mut recent: Ring<&str> = Ring::new(2);
/// recent.add("a");
/// recent.add("b");
/// let evicted = recent.add("c");
///
/// assert_eq!(evicted.as_deref(), Some(&"a"));
/// let held: Vec<&str> = recent.iter().map(|s| **s).collect();
/// assert_eq!(held, ["b", "c"]);
/// ```
pub struct Ring<T> {
    slots: Vec<Option<Arc<T>>>,
    cursor: usize,
    len: usize,
}

impl<T> Ring<T> {
    /// Creates an empty ring holding up to `capacity` items.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring capacity must be non-zero");
        Self {
            slots: vec![None; capacity],
            cursor: 0,
            len: 0,
        }
    }

    /// Adds an item as the newest, returning the item it overwrote.
    pub fn add(&mut self, item: impl Into<Arc<T>>) -> Option<Arc<T>> {
        let capacity = self.capacity();
        let evicted = self.slots[self.cursor].replace(item.into());
        self.cursor = (self.cursor + 1) % capacity;
        if self.len < capacity {
            self.len += 1;
        }
        if evicted.is_some() {
            trace!(capacity, "ring overwrote its oldest item");
        }
        evicted
    }

    /// Adds every item in order. Returns how many were added, counting
    /// those overwritten again before the end.
    pub fn extend<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator,
        I::Item: Into<Arc<T>>,
    {
        let mut added = 0;
        for item in items {
            self.add(item);
            added += 1;
        }
        added
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the next add overwrites an item.
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Iterates from the oldest item to the newest.
    pub fn iter<'a>(&'a self) -> RingIter<'a, T> {
        // Slots from the cursor on are the older ones; before a wrap they
        // are all empty.
        let (newer, older) = self.slots.split_at(self.cursor);
        older
            .iter()
            .chain(newer.iter())
            .filter_map(Option::as_ref as fn(&'a Option<Arc<T>>) -> Option<&'a Arc<T>>)
    }

    /// Iterates from the newest item to the oldest.
    pub fn rev(&self) -> Rev<RingIter<'_, T>> {
        self.iter().rev()
    }

    /// The item `index` places after the oldest one.
    pub fn get(&self, index: usize) -> Option<&Arc<T>> {
        if index >= self.len {
            return None;
        }
        let start = if self.is_full() { self.cursor } else { 0 };
        self.slots
            .get((start + index) % self.capacity())
            .and_then(Option::as_ref)
    }

    /// The oldest item.
    pub fn first(&self) -> Option<&Arc<T>> {
        self.iter().next()
    }

    /// The newest item.
    pub fn last(&self) -> Option<&Arc<T>> {
        self.rev().next()
    }

    /// The single item, failing if there are none or several.
    pub fn only(&self) -> Result<&Arc<T>> {
        match (self.len, self.first()) {
            (1, Some(item)) => Ok(item),
            (0, _) => Err(CollectionError::NoItems),
            (count, _) => Err(CollectionError::MultipleItems { count }),
        }
    }

    /// The single item or `None`, failing only if there are several.
    pub fn only_or_none(&self) -> Result<Option<&Arc<T>>> {
        match self.only() {
            Ok(item) => Ok(Some(item)),
            Err(CollectionError::NoItems) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Whether `item` itself is held (identity).
    pub fn contains(&self, item: &Arc<T>) -> bool {
        self.iter().any(|held| Arc::ptr_eq(held, item))
    }

    /// The held item identical or equal to `item`, oldest first.
    pub fn find(&self, item: &T) -> Option<&Arc<T>>
    where
        T: PartialEq,
    {
        self.iter()
            .find(|held| std::ptr::eq(Arc::as_ptr(held), item) || ***held == *item)
    }

    /// The `n` oldest items.
    pub fn head(&self, n: usize) -> Self {
        self.refilled(self.iter().take(n).cloned())
    }

    /// The `n` newest items, oldest first.
    pub fn tail(&self, n: usize) -> Self {
        self.refilled(self.iter().skip(self.len.saturating_sub(n)).cloned())
    }

    /// Items of `self`, then items of `other` not already held (by
    /// identity), overwriting the oldest once the capacity is reached.
    pub fn union(&self, other: &Self) -> Self {
        self.refilled(union_of(self.iter(), other.iter()))
    }

    /// Items of `self` that `other` also holds, oldest first.
    pub fn intersection(&self, other: &Self) -> Self {
        self.refilled(intersection_of(self.iter(), other.iter()))
    }

    /// Empties the ring, keeping its capacity.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.cursor = 0;
        self.len = 0;
    }

    /// The items, oldest first, as a [`Sequence`].
    pub fn to_sequence(&self) -> Sequence<T> {
        self.iter().cloned().collect()
    }

    /// A copy holding fresh clones of the items.
    ///
    /// [`Clone`] shares the items with the original; this does not.
    pub fn deep_clone(&self) -> Self
    where
        T: Clone,
    {
        self.refilled(self.iter().map(|item| Arc::new(T::clone(item))))
    }

    // A new ring of the same capacity holding `items` in order.
    fn refilled(&self, items: impl IntoIterator<Item = Arc<T>>) -> Self {
        let mut ring = Self::new(self.capacity());
        ring.extend(items);
        ring
    }
}

impl<T: Record> Ring<T> {
    /// Items matching every spec in `filter`, oldest first, in a ring of
    /// the same capacity.
    pub fn filter(&self, filter: &Filter) -> Result<Self> {
        Ok(self.refilled(matching(filter, self.iter())?))
    }

    /// Filters on a single `attr__op` spec.
    pub fn filter_by(&self, spec: &str, operand: impl Into<Operand>) -> Result<Self> {
        self.filter(&Filter::new().with(spec, operand))
    }

    /// The single item matching `filter`.
    pub fn filter_only(&self, filter: &Filter) -> Result<Arc<T>> {
        self.filter(filter)?.only().cloned()
    }

    /// The single item matching `filter`, or `None`.
    pub fn filter_only_or_none(&self, filter: &Filter) -> Result<Option<Arc<T>>> {
        Ok(self.filter(filter)?.only_or_none()?.cloned())
    }
}

impl<T> Clone for Ring<T> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            cursor: self.cursor,
            len: self.len,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Ring<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ring")
            .field("capacity", &self.capacity())
            .field("items", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<T: fmt::Display> fmt::Display for Ring<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        summarize(f, "Ring", self.len, self.iter())
    }
}

impl<'a, T> IntoIterator for &'a Ring<T> {
    type Item = &'a Arc<T>;
    type IntoIter = RingIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> BitOr for &Ring<T> {
    type Output = Ring<T>;

    fn bitor(self, other: Self) -> Ring<T> {
        self.union(other)
    }
}

impl<T> BitAnd for &Ring<T> {
    type Output = Ring<T>;

    fn bitand(self, other: Self) -> Ring<T> {
        self.intersection(other)
    }
}
