//! Key values and key specs.
//!
//! A [`KeySpec`] names the attribute (or attributes, for a composite key) a
//! keyed collection indexes by. A [`KeyValue`] is the owned, hashable value
//! such an attribute produces, and what lookups are made with.

use std::fmt;

use quiver_filter::{FilterError, Number, Record, Timestamp, Value};

/// Owned, hashable key value.
///
/// Numbers are normalised so that the same quantity is the same key
/// whatever its source type: `5i32`, `5u64` and `5.0f64` all become
/// `KeyValue::Uint(5)`. Negative integers are `Int`; floats without an
/// integral value keep their bit pattern in `Float`. Enum discriminants
/// are numbers too, so an enum-keyed item is found by its discriminant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyValue {
    /// String key.
    Str(String),
    /// Negative integer key.
    Int(i64),
    /// Non-negative integer key.
    Uint(u64),
    /// Non-integral float key, stored as its bit pattern.
    Float(u64),
    /// Timestamp key.
    Timestamp(Timestamp),
    /// Boolean key.
    Bool(bool),
    /// Tuple of keys, produced by composite key specs.
    Composite(Vec<KeyValue>),
}

impl KeyValue {
    /// Converts an attribute value into a key.
    ///
    /// Returns `None` for a missing attribute. A list becomes a composite
    /// key.
    pub fn from_value(value: &Value<'_>) -> Option<KeyValue> {
        match value {
            Value::String(s) => Some(KeyValue::Str((*s).to_string())),
            Value::Number(n) => Some(KeyValue::from(*n)),
            Value::Timestamp(t) => Some(KeyValue::Timestamp(*t)),
            Value::Enum(d) => Some(KeyValue::Uint(u64::from(*d))),
            Value::Bool(b) => Some(KeyValue::Bool(*b)),
            Value::List(items) => items
                .iter()
                .map(KeyValue::from_value)
                .collect::<Option<Vec<_>>>()
                .map(KeyValue::Composite),
            Value::None => None,
        }
    }

    /// Returns the string key, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            KeyValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Number> for KeyValue {
    fn from(n: Number) -> Self {
        match n {
            Number::I64(i) if i < 0 => KeyValue::Int(i),
            Number::I64(i) => KeyValue::Uint(i as u64),
            Number::U64(u) => KeyValue::Uint(u),
            Number::F64(f) => float_key(f),
        }
    }
}

fn float_key(f: f64) -> KeyValue {
    // 2^64 and -2^63 are exactly representable, so the range checks are exact.
    const U64_END: f64 = 18_446_744_073_709_551_616.0;
    const I64_START: f64 = -9_223_372_036_854_775_808.0;

    if f.is_finite() && f.fract() == 0.0 {
        if f >= 0.0 && f < U64_END {
            return KeyValue::Uint(f as u64);
        }
        if f < 0.0 && f >= I64_START {
            return KeyValue::Int(f as i64);
        }
    }
    KeyValue::Float(f.to_bits())
}

impl From<&str> for KeyValue {
    fn from(s: &str) -> Self {
        KeyValue::Str(s.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(s: String) -> Self {
        KeyValue::Str(s)
    }
}

impl From<&String> for KeyValue {
    fn from(s: &String) -> Self {
        KeyValue::Str(s.clone())
    }
}

impl From<bool> for KeyValue {
    fn from(b: bool) -> Self {
        KeyValue::Bool(b)
    }
}

impl From<Timestamp> for KeyValue {
    fn from(t: Timestamp) -> Self {
        KeyValue::Timestamp(t)
    }
}

impl From<&KeyValue> for KeyValue {
    fn from(key: &KeyValue) -> Self {
        key.clone()
    }
}

macro_rules! key_from_number {
    ($($source:ty),+) => {
        $(
            impl From<$source> for KeyValue {
                fn from(n: $source) -> Self {
                    KeyValue::from(Number::from(n))
                }
            }
        )+
    };
}

key_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<A: Into<KeyValue>, B: Into<KeyValue>> From<(A, B)> for KeyValue {
    fn from((a, b): (A, B)) -> Self {
        KeyValue::Composite(vec![a.into(), b.into()])
    }
}

impl<A: Into<KeyValue>, B: Into<KeyValue>, C: Into<KeyValue>> From<(A, B, C)> for KeyValue {
    fn from((a, b, c): (A, B, C)) -> Self {
        KeyValue::Composite(vec![a.into(), b.into(), c.into()])
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Str(s) => write!(f, "{:?}", s),
            KeyValue::Int(i) => write!(f, "{}", i),
            KeyValue::Uint(u) => write!(f, "{}", u),
            KeyValue::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            KeyValue::Timestamp(t) => write!(f, "@{}ms", t.as_millis()),
            KeyValue::Bool(b) => write!(f, "{}", b),
            KeyValue::Composite(parts) => {
                write!(f, "(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", part)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// The attribute(s) a keyed collection indexes by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeySpec {
    /// One attribute; its value is the key.
    Single(String),
    /// Several attributes; the tuple of their values is the key.
    Composite(Vec<String>),
}

impl KeySpec {
    /// A single-attribute key.
    pub fn single(name: impl Into<String>) -> Self {
        KeySpec::Single(name.into())
    }

    /// A composite key over the given attributes, in order.
    pub fn composite<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeySpec::Composite(names.into_iter().map(Into::into).collect())
    }

    /// The attribute names this spec reads.
    pub fn attributes(&self) -> &[String] {
        match self {
            KeySpec::Single(name) => std::slice::from_ref(name),
            KeySpec::Composite(names) => names,
        }
    }

    /// Reads this spec's key from an item.
    ///
    /// Attribute names may be `__` paths into nested records. Fails with
    /// [`FilterError::MissingAttribute`] if the item lacks any of the
    /// attributes.
    pub fn extract<T: Record + ?Sized>(&self, item: &T) -> Result<KeyValue, FilterError> {
        let read = |name: &String| {
            KeyValue::from_value(&item.lookup(name)).ok_or_else(|| {
                FilterError::MissingAttribute {
                    attribute: name.clone(),
                }
            })
        };

        match self {
            KeySpec::Single(name) => read(name),
            KeySpec::Composite(names) => names
                .iter()
                .map(read)
                .collect::<Result<Vec<_>, _>>()
                .map(KeyValue::Composite),
        }
    }
}

impl From<&str> for KeySpec {
    fn from(name: &str) -> Self {
        KeySpec::single(name)
    }
}

impl From<String> for KeySpec {
    fn from(name: String) -> Self {
        KeySpec::Single(name)
    }
}

impl fmt::Display for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySpec::Single(name) => write!(f, "{}", name),
            KeySpec::Composite(names) => write!(f, "({})", names.join(", ")),
        }
    }
}
