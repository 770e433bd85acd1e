//! Ordered collection with predicate filtering.

use std::collections::HashSet;
use std::fmt;
use std::iter::Rev;
use std::ops::{BitAnd, BitOr};
use std::slice;
use std::sync::Arc;

use quiver_filter::{Filter, Operand, Record};

use crate::error::{CollectionError, Result};

/// Items shown by a collection's `Display` summary before it is cut short.
pub const SUMMARY_LIMIT: usize = 20;

/// An ordered collection of shared items.
///
/// Items are held as `Arc<T>`: filtered results, unions and intersections
/// share the same items as the collection they came from, and membership
/// ("the same item") means pointer identity.
pub struct Sequence<T> {
    items: Vec<Arc<T>>,
}

impl<T> Sequence<T> {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends an item and returns the shared handle to it.
    pub fn add(&mut self, item: impl Into<Arc<T>>) -> Arc<T> {
        let item = item.into();
        self.items.push(Arc::clone(&item));
        item
    }

    /// Appends every item in order. Returns how many were added.
    pub fn extend<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator,
        I::Item: Into<Arc<T>>,
    {
        let before = self.items.len();
        self.items.extend(items.into_iter().map(Into::into));
        self.items.len() - before
    }

    /// Removes the first occurrence of `item` (by identity).
    pub fn remove(&mut self, item: &Arc<T>) -> Result<Arc<T>> {
        let position = self.position(item).ok_or(CollectionError::ItemNotFound)?;
        Ok(self.items.remove(position))
    }

    /// Index of the first occurrence of `item` (by identity).
    pub fn position(&self, item: &Arc<T>) -> Option<usize> {
        self.items.iter().position(|held| Arc::ptr_eq(held, item))
    }

    /// Swaps `new` in at `old`'s position (by identity), returning `old`.
    pub fn replace(&mut self, old: &Arc<T>, new: impl Into<Arc<T>>) -> Result<Arc<T>> {
        let position = self.position(old).ok_or(CollectionError::ItemNotFound)?;
        Ok(std::mem::replace(&mut self.items[position], new.into()))
    }

    /// Whether `item` itself is held (identity).
    pub fn contains(&self, item: &Arc<T>) -> bool {
        self.position(item).is_some()
    }

    /// Whether an item identical or equal to `item` is held.
    pub fn contains_item(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.items
            .iter()
            .any(|held| std::ptr::eq(Arc::as_ptr(held), item) || **held == *item)
    }

    /// Item at `index`.
    pub fn get(&self, index: usize) -> Option<&Arc<T>> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates in insertion order. Double-ended, so `.rev()` works too.
    pub fn iter(&self) -> slice::Iter<'_, Arc<T>> {
        self.items.iter()
    }

    /// Iterates in reverse insertion order.
    pub fn rev(&self) -> Rev<slice::Iter<'_, Arc<T>>> {
        self.items.iter().rev()
    }

    pub fn as_slice(&self) -> &[Arc<T>] {
        &self.items
    }

    pub fn first(&self) -> Option<&Arc<T>> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&Arc<T>> {
        self.items.last()
    }

    /// The single item, failing if there are none or several.
    pub fn only(&self) -> Result<&Arc<T>> {
        match self.items.as_slice() {
            [item] => Ok(item),
            [] => Err(CollectionError::NoItems),
            items => Err(CollectionError::MultipleItems { count: items.len() }),
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

    /// The first `n` items.
    pub fn head(&self, n: usize) -> Self {
        self.items.iter().take(n).cloned().collect()
    }

    /// The last `n` items, in order.
    pub fn tail(&self, n: usize) -> Self {
        let start = self.items.len().saturating_sub(n);
        self.items[start..].iter().cloned().collect()
    }

    /// Items of `self`, then items of `other` not already present.
    ///
    /// Membership is by identity; order of first appearance is kept.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            items: union_of(&self.items, &other.items),
        }
    }

    /// Items of `self` that `other` also holds, in `self`'s order.
    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            items: intersection_of(&self.items, &other.items),
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// A copy holding fresh clones of the items.
    ///
    /// [`Clone`] shares the items with the original; this does not.
    pub fn deep_clone(&self) -> Self
    where
        T: Clone,
    {
        self.items.iter().map(|item| T::clone(item)).collect()
    }
}

impl<T: Record> Sequence<T> {
    /// Items matching every spec in `filter`, in order.
    ///
    /// The filter is compiled first, so an unknown operator fails even on
    /// an empty sequence. An empty filter keeps everything.
    pub fn filter(&self, filter: &Filter) -> Result<Self> {
        Ok(Self {
            items: matching(filter, &self.items)?,
        })
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

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T, I: Into<Arc<T>>> FromIterator<I> for Sequence<T> {
    fn from_iter<It: IntoIterator<Item = I>>(iter: It) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<T> IntoIterator for Sequence<T> {
    type Item = Arc<T>;
    type IntoIter = std::vec::IntoIter<Arc<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Sequence<T> {
    type Item = &'a Arc<T>;
    type IntoIter = slice::Iter<'a, Arc<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> BitOr for &Sequence<T> {
    type Output = Sequence<T>;

    fn bitor(self, other: Self) -> Sequence<T> {
        self.union(other)
    }
}

impl<T> BitAnd for &Sequence<T> {
    type Output = Sequence<T>;

    fn bitand(self, other: Self) -> Sequence<T> {
        self.intersection(other)
    }
}

impl<T: fmt::Display> fmt::Display for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        summarize(f, "Sequence", self.items.len(), &self.items)
    }
}

/// Writes `<Name: N [a, b, ...]>`, listing at most [`SUMMARY_LIMIT`] items.
pub(crate) fn summarize<'a, T: fmt::Display + 'a>(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    len: usize,
    items: impl IntoIterator<Item = &'a Arc<T>>,
) -> fmt::Result {
    write!(f, "<{}: {} [", name, len)?;
    for (i, item) in items.into_iter().take(SUMMARY_LIMIT).enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    if len > SUMMARY_LIMIT {
        write!(f, ", ...({} more)", len - SUMMARY_LIMIT)?;
    }
    write!(f, "]>")
}

/// The items matching `filter`, in order. Compiles before looking at any.
pub(crate) fn matching<'a, T: Record + 'a>(
    filter: &Filter,
    items: impl IntoIterator<Item = &'a Arc<T>>,
) -> Result<Vec<Arc<T>>> {
    let predicate = filter.compile()?;
    let mut hits = Vec::new();
    for item in items {
        if predicate.matches(&**item)? {
            hits.push(Arc::clone(item));
        }
    }
    Ok(hits)
}

/// `ours`, then the items of `theirs` not already seen (by identity).
pub(crate) fn union_of<'a, T: 'a>(
    ours: impl IntoIterator<Item = &'a Arc<T>>,
    theirs: impl IntoIterator<Item = &'a Arc<T>>,
) -> Vec<Arc<T>> {
    let mut seen: HashSet<*const T> = HashSet::new();
    ours.into_iter()
        .chain(theirs)
        .filter(|item| seen.insert(Arc::as_ptr(item)))
        .cloned()
        .collect()
}

/// The items of `ours` that `theirs` also holds (by identity), in order.
pub(crate) fn intersection_of<'a, T: 'a>(
    ours: impl IntoIterator<Item = &'a Arc<T>>,
    theirs: impl IntoIterator<Item = &'a Arc<T>>,
) -> Vec<Arc<T>> {
    let theirs: HashSet<*const T> = theirs.into_iter().map(Arc::as_ptr).collect();
    ours.into_iter()
        .filter(|item| theirs.contains(&Arc::as_ptr(item)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiver_filter::{filter, FilterError, Number, Value};

    #[derive(Debug, PartialEq)]
    struct Track {
        title: String,
        year: u16,
    }

    impl Record for Track {
        fn attribute(&self, name: &str) -> Value<'_> {
            match name {
                "title" => Value::String(&self.title),
                "year" => Value::Number(Number::from(self.year)),
                _ => Value::None,
            }
        }
    }

    impl fmt::Display for Track {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.title)
        }
    }

    fn track(title: &str, year: u16) -> Track {
        Track {
            title: title.to_string(),
            year,
        }
    }

    fn tracks() -> Sequence<Track> {
        [
            track("Alpha", 1999),
            track("Bravo", 2004),
            track("Charlie", 2010),
            track("Delta", 1985),
        ]
        .into_iter()
        .collect()
    }

    fn titles(seq: &Sequence<Track>) -> Vec<&str> {
        seq.iter().map(|t| t.title.as_str()).collect()
    }

    // ============================================================================
    // Basics
    // ============================================================================

    #[test]
    fn add_keeps_insertion_order() {
        let mut seq: Sequence<Track> = Sequence::new();
        seq.add(track("b", 1));
        seq.add(track("a", 2));
        assert_eq!(titles(&seq), ["b", "a"]);
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn add_returns_shared_handle() {
        let mut seq: Sequence<Track> = Sequence::new();
        let handle = seq.add(track("a", 1));
        assert!(seq.contains(&handle));
        assert!(!seq.contains(&Arc::new(track("a", 1))));
    }

    #[test]
    fn extend_counts() {
        let mut seq: Sequence<Track> = Sequence::new();
        assert_eq!(seq.extend([track("a", 1), track("b", 2)]), 2);
        assert_eq!(seq.extend(Vec::<Track>::new()), 0);
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn remove_by_identity() {
        let mut seq = tracks();
        let bravo = Arc::clone(seq.get(1).unwrap());
        assert!(Arc::ptr_eq(&seq.remove(&bravo).unwrap(), &bravo));
        assert_eq!(titles(&seq), ["Alpha", "Charlie", "Delta"]);
        assert!(matches!(seq.remove(&bravo), Err(CollectionError::ItemNotFound)));
    }

    #[test]
    fn replace_keeps_position() {
        let mut seq = tracks();
        let bravo = Arc::clone(seq.get(1).unwrap());
        let old = seq.replace(&bravo, track("Bravo", 2005)).unwrap();
        assert!(Arc::ptr_eq(&old, &bravo));
        assert_eq!(titles(&seq), ["Alpha", "Bravo", "Charlie", "Delta"]);
        assert_eq!(seq.get(1).unwrap().year, 2005);
        assert!(matches!(
            seq.replace(&bravo, track("x", 1)),
            Err(CollectionError::ItemNotFound)
        ));
    }

    #[test]
    fn deep_clone_owns_fresh_items() {
        #[derive(Clone)]
        struct Tag(&'static str);

        let seq: Sequence<Tag> = [Tag("a"), Tag("b")].into_iter().collect();
        let shallow = seq.clone();
        let deep = seq.deep_clone();
        assert!(Arc::ptr_eq(shallow.first().unwrap(), seq.first().unwrap()));
        assert!(!Arc::ptr_eq(deep.first().unwrap(), seq.first().unwrap()));
        assert_eq!(deep.last().unwrap().0, "b");
    }

    #[test]
    fn contains_item_uses_equality() {
        let seq = tracks();
        assert!(seq.contains_item(&track("Bravo", 2004)));
        assert!(!seq.contains_item(&track("Bravo", 2005)));
    }

    #[test]
    fn iteration_is_restartable_and_reversible() {
        let seq = tracks();
        assert_eq!(seq.iter().count(), 4);
        assert_eq!(seq.iter().count(), 4);
        let backwards: Vec<&str> = seq.rev().map(|t| t.title.as_str()).collect();
        assert_eq!(backwards, ["Delta", "Charlie", "Bravo", "Alpha"]);
    }

    #[test]
    fn first_last_head_tail() {
        let seq = tracks();
        assert_eq!(seq.first().unwrap().title, "Alpha");
        assert_eq!(seq.last().unwrap().title, "Delta");
        assert_eq!(titles(&seq.head(2)), ["Alpha", "Bravo"]);
        assert_eq!(titles(&seq.tail(2)), ["Charlie", "Delta"]);
        assert_eq!(seq.tail(10).len(), 4);
        assert!(Sequence::<Track>::new().first().is_none());
    }

    #[test]
    fn only_variants() {
        let seq = tracks();
        assert!(matches!(
            seq.only(),
            Err(CollectionError::MultipleItems { count: 4 })
        ));
        assert!(seq.only_or_none().is_err());

        let empty = Sequence::<Track>::new();
        assert!(matches!(empty.only(), Err(CollectionError::NoItems)));
        assert!(empty.only_or_none().unwrap().is_none());

        let one = seq.head(1);
        assert_eq!(one.only().unwrap().title, "Alpha");
    }

    // ============================================================================
    // Filtering
    // ============================================================================

    #[test]
    fn filter_keeps_order_and_shares_items() {
        let seq = tracks();
        let recent = seq.filter(&filter!(year__gt = 2000)).unwrap();
        assert_eq!(titles(&recent), ["Bravo", "Charlie"]);
        assert!(Arc::ptr_eq(recent.first().unwrap(), seq.get(1).unwrap()));
        assert_eq!(seq.len(), 4);
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let seq = tracks();
        assert_eq!(seq.filter(&Filter::new()).unwrap().len(), 4);
    }

    #[test]
    fn filter_by_single_spec() {
        let seq = tracks();
        let hits = seq.filter_by("title__icontains", "LTA").unwrap();
        assert_eq!(titles(&hits), ["Delta"]);
    }

    #[test]
    fn unknown_operator_fails_even_when_empty() {
        let empty = Sequence::<Track>::new();
        let err = empty.filter_by("year__between", 5).unwrap_err();
        assert!(matches!(
            err,
            CollectionError::Filter(FilterError::UnknownOperator { .. })
        ));
    }

    #[test]
    fn missing_attribute_fails() {
        let err = tracks().filter_by("artist", "x").unwrap_err();
        assert!(matches!(
            err,
            CollectionError::Filter(FilterError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn filter_only_variants() {
        let seq = tracks();
        let hit = seq.filter_only(&filter!(title = "Charlie")).unwrap();
        assert_eq!(hit.year, 2010);
        assert!(seq.filter_only_or_none(&filter!(title = "Echo")).unwrap().is_none());
        assert!(seq.filter_only(&filter!(year__lt = 2005)).is_err());
    }

    // ============================================================================
    // Set operations
    // ============================================================================

    #[test]
    fn union_by_identity() {
        let seq = tracks();
        let old = seq.filter_by("year__lt", 2000).unwrap();
        let early = seq.head(2);
        let both = &old | &early;
        assert_eq!(titles(&both), ["Alpha", "Delta", "Bravo"]);
        assert_eq!((&seq | &seq).len(), seq.len());
    }

    #[test]
    fn union_keeps_equal_but_distinct_items() {
        let a: Sequence<Track> = [track("x", 1)].into_iter().collect();
        let b: Sequence<Track> = [track("x", 1)].into_iter().collect();
        assert_eq!(a.union(&b).len(), 2);
    }

    #[test]
    fn intersection_by_identity() {
        let seq = tracks();
        let old = seq.filter_by("year__lt", 2005).unwrap();
        let late = seq.tail(3);
        assert_eq!(titles(&(&old & &late)), ["Bravo", "Delta"]);
        assert!((&seq & &Sequence::new()).is_empty());
    }

    // ============================================================================
    // Display
    // ============================================================================

    #[test]
    fn display_summary() {
        let seq = tracks().head(2);
        assert_eq!(seq.to_string(), "<Sequence: 2 [Alpha, Bravo]>");
    }

    #[test]
    fn display_truncates() {
        let seq: Sequence<Track> = (0..25).map(|i| track(&i.to_string(), 2000)).collect();
        let shown = seq.to_string();
        assert!(shown.starts_with("<Sequence: 25 [0, 1, 2,"));
        assert!(shown.contains(", 19, ...(5 more)]>"));
        assert!(!shown.contains("20"));
    }
}
