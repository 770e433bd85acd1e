//! Attribute values as the filter engine sees them.
//!
//! Items expose attributes as borrowed [`Value`]s, so filtering never
//! clones strings out of the items it inspects.

use std::cmp::Ordering;

/// An attribute read from an item, borrowing from it.
///
/// Returned by [`Record::attribute`](crate::Record::attribute);
/// `Value::None` stands for "no such attribute".
///
/// ```
/// use quiver_filter::{Number, Value};
///
/// struct Song {
///     title: String,
///     year: u16,
/// }
///
/// fn read<'a>(song: &'a Song, name: &str) -> Value<'a> {
///     match name {
///         "title" => Value::String(&song.title),
///         "year" => Value::Number(Number::from(song.year)),
///         _ => Value::None,
///     }
/// }
///
/// let song = Song { title: "Clocks".into(), year: 2002 };
/// assert_eq!(read(&song, "title").as_str(), Some("Clocks"));
/// assert!(read(&song, "album").is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    String(&'a str),
    Number(Number),
    /// Milliseconds since the Unix epoch.
    Timestamp(Timestamp),
    /// Discriminant of a unit-only enum.
    Enum(u32),
    Bool(bool),
    /// Elements of a collection-typed attribute.
    List(Vec<Value<'a>>),
    None,
}

impl<'a> Value<'a> {
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// The borrowed string, for `String` values.
    pub fn as_str(&self) -> Option<&'a str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Name of the variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Timestamp(_) => "timestamp",
            Value::Enum(_) => "enum",
            Value::Bool(_) => "bool",
            Value::List(_) => "list",
            Value::None => "none",
        }
    }
}

/// A number of any primitive type.
///
/// Integers compare exactly across signedness; anything involving a float
/// compares as `f64`, and NaN compares to nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    I64(i64),
    U64(u64),
    F64(f64),
}

impl Number {
    /// Orders two numbers, or `None` if a NaN is involved.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self.widened(), other.widened()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }

    // Every i64 and u64 fits in an i128, so integer pairs never lose precision.
    fn widened(self) -> Option<i128> {
        match self {
            Number::I64(n) => Some(i128::from(n)),
            Number::U64(n) => Some(i128::from(n)),
            Number::F64(_) => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

macro_rules! number_from {
    ($variant:ident, $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for Number {
                fn from(n: $source) -> Self {
                    Number::$variant(n as $target)
                }
            }
        )+
    };
}

number_from!(I64, i64: i8, i16, i32, i64, isize);
number_from!(U64, u64: u8, u16, u32, u64, usize);
number_from!(F64, f64: f32, f64);

/// Point in time, in milliseconds since the Unix epoch.
///
/// ```
/// use quiver_filter::Timestamp;
///
/// let released = Timestamp::from_secs(1_700_000_000);
/// assert_eq!(released.as_millis(), 1_700_000_000_000);
/// assert!(released > Timestamp::from_millis(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs.saturating_mul(1000))
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Whole seconds, rounded toward negative infinity.
    pub fn as_secs(self) -> i64 {
        self.0.div_euclid(1000)
    }
}

/// Borrows a plain Rust value as a [`Value`].
///
/// `#[derive(Record)]` uses it for `List` attributes; manual
/// [`Record`](crate::Record) impls can use it too.
pub trait AsValue {
    fn as_value(&self) -> Value<'_>;
}

impl AsValue for str {
    fn as_value(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl AsValue for String {
    fn as_value(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl AsValue for bool {
    fn as_value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

impl AsValue for Timestamp {
    fn as_value(&self) -> Value<'_> {
        Value::Timestamp(*self)
    }
}

macro_rules! as_value_number {
    ($($source:ty),+) => {
        $(
            impl AsValue for $source {
                fn as_value(&self) -> Value<'_> {
                    Value::Number(Number::from(*self))
                }
            }
        )+
    };
}

as_value_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: AsValue> AsValue for [T] {
    fn as_value(&self) -> Value<'_> {
        Value::List(self.iter().map(AsValue::as_value).collect())
    }
}

impl<T: AsValue> AsValue for Vec<T> {
    fn as_value(&self) -> Value<'_> {
        self.as_slice().as_value()
    }
}

impl<T: AsValue + ?Sized> AsValue for &T {
    fn as_value(&self) -> Value<'_> {
        (**self).as_value()
    }
}
