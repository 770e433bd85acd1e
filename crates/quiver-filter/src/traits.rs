//! The attribute-access capability items must provide.
//!
//! [`Record`] is what the filter engine and the quiver collections read
//! items through. It is usually derived with `#[derive(Record)]` from
//! `quiver-macros`, but a manual `match` on the attribute name works too.

use std::rc::Rc;
use std::sync::Arc;

use crate::clause::SUFFIX_SEPARATOR;
use crate::value::{Timestamp, Value};

/// Named attribute access for filterable and indexable items.
///
/// # Manual Implementation
///
/// ```
/// use quiver_filter::{Record, Value, Number};
///
/// struct Country {
///     iso2: String,
///     population: u64,
/// }
///
/// impl Record for Country {
///     fn attribute(&self, name: &str) -> Value<'_> {
///         match name {
///             "iso2" => Value::String(&self.iso2),
///             "population" => Value::Number(Number::U64(self.population)),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
pub trait Record {
    /// The named attribute; [`Value::None`] when there is no such
    /// attribute.
    fn attribute(&self, name: &str) -> Value<'_>;

    /// The named sub-record, for attribute paths like `album__title`.
    ///
    /// `#[derive(Record)]` answers this for `#[record(Nested)]` fields.
    fn nested(&self, _name: &str) -> Option<&dyn Record> {
        None
    }

    /// Reads a `__`-separated attribute path.
    ///
    /// Each leading segment naming a [`nested`](Record::nested) record
    /// descends into it; the rest of the path is read with
    /// [`attribute`](Record::attribute). A plain name is just
    /// `attribute(name)`.
    ///
    /// ```
    /// use quiver_filter::{Record, Value};
    ///
    /// struct Album {
    ///     title: String,
    /// }
    ///
    /// struct Song {
    ///     album: Album,
    /// }
    ///
    /// impl Record for Album {
    ///     fn attribute(&self, name: &str) -> Value<'_> {
    ///         match name {
    ///             "title" => Value::String(&self.title),
    ///             _ => Value::None,
    ///         }
    ///     }
    /// }
    ///
    /// impl Record for Song {
    ///     fn attribute(&self, _name: &str) -> Value<'_> {
    ///         Value::None
    ///     }
    ///
    ///     fn nested(&self, name: &str) -> Option<&dyn Record> {
    ///         match name {
    ///             "album" => Some(&self.album),
    ///             _ => None,
    ///         }
    ///     }
    /// }
    ///
    /// let song = Song { album: Album { title: "Parachutes".into() } };
    /// assert_eq!(song.lookup("album__title"), Value::String("Parachutes"));
    /// assert!(song.lookup("album__year").is_none());
    /// ```
    fn lookup(&self, path: &str) -> Value<'_> {
        if let Some((head, rest)) = path.split_once(SUFFIX_SEPARATOR) {
            if let Some(inner) = self.nested(head) {
                return inner.lookup(rest);
            }
        }
        self.attribute(path)
    }

    /// [`Record::attribute`] as a free function, for
    /// [`Predicate::filter`](crate::Predicate::filter) and friends.
    fn accessor<'a>(item: &'a Self, name: &str) -> Value<'a>
    where
        Self: Sized,
    {
        item.attribute(name)
    }
}

// Smart pointers and references read through to the item.

impl<T: Record + ?Sized> Record for &T {
    fn attribute(&self, name: &str) -> Value<'_> {
        (**self).attribute(name)
    }

    fn nested(&self, name: &str) -> Option<&dyn Record> {
        (**self).nested(name)
    }
}

impl<T: Record + ?Sized> Record for Box<T> {
    fn attribute(&self, name: &str) -> Value<'_> {
        (**self).attribute(name)
    }

    fn nested(&self, name: &str) -> Option<&dyn Record> {
        (**self).nested(name)
    }
}

impl<T: Record + ?Sized> Record for Rc<T> {
    fn attribute(&self, name: &str) -> Value<'_> {
        (**self).attribute(name)
    }

    fn nested(&self, name: &str) -> Option<&dyn Record> {
        (**self).nested(name)
    }
}

impl<T: Record + ?Sized> Record for Arc<T> {
    fn attribute(&self, name: &str) -> Value<'_> {
        (**self).attribute(name)
    }

    fn nested(&self, name: &str) -> Option<&dyn Record> {
        (**self).nested(name)
    }
}

/// Stable numeric identity of an enum variant.
///
/// Backs `#[record(Enum)]` fields. Ordering filters compare discriminants,
/// so assign them in the order the variants should sort.
///
/// ```
/// use quiver_filter::RecordEnum;
///
/// enum Genre {
///     Rock,
///     Jazz,
/// }
///
/// impl RecordEnum for Genre {
///     fn discriminant(&self) -> u32 {
///         match self {
///             Genre::Rock => 0,
///             Genre::Jazz => 1,
///         }
///     }
/// }
/// ```
pub trait RecordEnum {
    fn discriminant(&self) -> u32;
}

/// Datetime types readable as a [`Timestamp`].
///
/// Backs `#[record(Timestamp)]` fields. Plain integers are taken as
/// milliseconds.
pub trait RecordTimestamp {
    fn timestamp(&self) -> Timestamp;
}

impl RecordTimestamp for i64 {
    fn timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self)
    }
}

impl RecordTimestamp for u64 {
    fn timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self as i64)
    }
}

impl RecordTimestamp for Timestamp {
    fn timestamp(&self) -> Timestamp {
        *self
    }
}
