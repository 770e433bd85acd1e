//! Clause types for filter predicates.
//!
//! A [`Clause`] is a single predicate: an attribute name, an operator, and
//! an operand. Clauses are usually parsed from a filter spec such as
//! `"year__gt"` with [`Clause::parse`].

use regex::Regex;

use crate::error::{FilterError, Result};
use crate::op::Op;
use crate::ordering::{compare, equals};
use crate::value::{Number, Timestamp, Value};

/// Separator between the attribute name and the operator suffix.
pub const SUFFIX_SEPARATOR: &str = "__";

/// Splits a filter spec into its attribute name and operator.
///
/// A spec without a `__` suffix means equality. The split happens at the
/// last separator, and the suffix must name a known operator.
///
/// ```
/// use quiver_filter::{split_spec, Op};
///
/// assert_eq!(split_spec("year__gt").unwrap(), ("year", Op::Gt));
/// assert_eq!(split_spec("title").unwrap(), ("title", Op::Eq));
/// assert!(split_spec("title__like").is_err());
/// ```
pub fn split_spec(spec: &str) -> Result<(&str, Op)> {
    let (attribute, op) = match spec.rsplit_once(SUFFIX_SEPARATOR) {
        None => (spec, Op::Eq),
        Some((attribute, suffix)) => {
            let op = Op::from_suffix(suffix).ok_or_else(|| FilterError::UnknownOperator {
                spec: spec.to_string(),
                op: suffix.to_string(),
            })?;
            (attribute, op)
        }
    };

    if attribute.is_empty() {
        return Err(FilterError::EmptyAttribute {
            spec: spec.to_string(),
        });
    }

    Ok((attribute, op))
}

/// A single filter predicate.
///
/// Case-insensitive operators store their operand already lowercased, and
/// the `Regex` operator stores its compiled pattern, so evaluation does no
/// parsing.
///
/// # Example
///
/// ```
/// use quiver_filter::{Clause, Op, Value};
///
/// let clause = Clause::parse("title__icontains", "OVER").unwrap();
/// assert_eq!(clause.op, Op::IContains);
/// assert!(clause.evaluate(&Value::String("Hangover")).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Clause {
    /// The attribute name to read from each item.
    pub attribute: String,
    /// The comparison operator.
    pub op: Op,
    /// The value to compare against.
    pub operand: Operand,
    regex: Option<Regex>,
}

impl Clause {
    /// Creates a clause from its parts.
    ///
    /// Fails if `op` is `Regex` and the operand is not a valid pattern.
    pub fn new(attribute: impl Into<String>, op: Op, operand: impl Into<Operand>) -> Result<Self> {
        let mut operand = operand.into();
        if op.is_case_insensitive() {
            operand = operand.folded();
        }

        let regex = match (op, &operand) {
            (Op::Regex, Operand::String(pattern)) => Some(Regex::new(pattern)?),
            (Op::Regex, other) => {
                return Err(FilterError::TypeMismatch {
                    op: op.as_str(),
                    expected: "string",
                    actual: other.type_name(),
                })
            }
            _ => None,
        };

        Ok(Clause {
            attribute: attribute.into(),
            op,
            operand,
            regex,
        })
    }

    /// Parses a `attribute__op` spec into a clause.
    pub fn parse(spec: &str, operand: impl Into<Operand>) -> Result<Self> {
        let (attribute, op) = split_spec(spec)?;
        Clause::new(attribute, op, operand)
    }

    /// Evaluates this clause against an attribute value.
    ///
    /// A missing attribute (`Value::None`) is an error, not a non-match.
    /// So is an attribute whose type the operator cannot work with. An
    /// operand of a different type than the attribute simply does not match.
    pub fn evaluate(&self, value: &Value<'_>) -> Result<bool> {
        if value.is_none() {
            return Err(FilterError::MissingAttribute {
                attribute: self.attribute.clone(),
            });
        }

        if self.op.is_string_only() && !value.is_string() {
            return Err(self.mismatch("string", value));
        }

        match self.op {
            Op::Eq => Ok(equals(value, &self.operand)),
            Op::Ne => Ok(!equals(value, &self.operand)),
            Op::IEq => Ok(self.operand_str().is_some_and(|expected| {
                value
                    .as_str()
                    .is_some_and(|s| s.to_lowercase() == expected)
            })),
            Op::Contains => match value {
                Value::String(s) => Ok(self.operand_str().is_some_and(|p| s.contains(p))),
                Value::List(items) => Ok(items.iter().any(|v| equals(v, &self.operand))),
                other => Err(self.mismatch("string or list", other)),
            },
            Op::IContains => match value {
                Value::String(s) => Ok(self
                    .operand_str()
                    .is_some_and(|p| s.to_lowercase().contains(p))),
                Value::List(items) => Ok(items.iter().any(|v| self.folded_equals(v))),
                other => Err(self.mismatch("string or list", other)),
            },
            Op::In | Op::IIn => self.membership(value),
            Op::StartsWith => Ok(self
                .operand_str()
                .is_some_and(|p| value.as_str().is_some_and(|s| s.starts_with(p)))),
            Op::EndsWith => Ok(self
                .operand_str()
                .is_some_and(|p| value.as_str().is_some_and(|s| s.ends_with(p)))),
            Op::Regex => Ok(self
                .regex
                .as_ref()
                .is_some_and(|r| value.as_str().is_some_and(|s| r.is_match(s)))),
            Op::Gt | Op::Gte | Op::Lt | Op::Lte => compare(value, &self.operand)
                .map(|ordering| self.op.eval_ordering(ordering))
                .ok_or_else(|| FilterError::Unorderable {
                    attribute: self.attribute.clone(),
                    operand: self.operand.type_name(),
                }),
        }
    }

    // A string operand is a haystack; anything else is a set of members.
    fn membership(&self, value: &Value<'_>) -> Result<bool> {
        let folding = self.op.is_case_insensitive();
        match (&self.operand, value) {
            (Operand::String(haystack), Value::String(s)) if folding => {
                Ok(haystack.contains(&s.to_lowercase()))
            }
            (Operand::String(haystack), Value::String(s)) => Ok(haystack.contains(s)),
            (Operand::String(_), other) => Err(self.mismatch("string", other)),
            (operand, value) if folding => {
                Ok(operand.members().iter().any(|m| self.member_folded_equals(value, m)))
            }
            (operand, value) => Ok(operand.members().iter().any(|m| equals(value, m))),
        }
    }

    fn member_folded_equals(&self, value: &Value<'_>, member: &Operand) -> bool {
        match (value, member) {
            (Value::String(s), Operand::String(m)) => s.to_lowercase() == *m,
            _ => equals(value, member),
        }
    }

    fn operand_str(&self) -> Option<&str> {
        match &self.operand {
            Operand::String(s) => Some(s),
            _ => None,
        }
    }

    fn folded_equals(&self, value: &Value<'_>) -> bool {
        match value {
            Value::String(s) => self.operand_str() == Some(s.to_lowercase().as_str()),
            other => equals(other, &self.operand),
        }
    }

    fn mismatch(&self, expected: &'static str, value: &Value<'_>) -> FilterError {
        FilterError::TypeMismatch {
            op: self.op.as_str(),
            expected,
            actual: value.type_name(),
        }
    }
}

/// Owned comparison value stored in a clause.
///
/// Unlike [`Value`], which borrows from the item, an `Operand` owns its data
/// so it can live in a [`Filter`](crate::Filter). `List` holds the allowed
/// members for `in` / `iin`; a `String` operand there is searched as a
/// substring instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// String value.
    String(String),
    /// Numeric value.
    Number(Number),
    /// Timestamp value.
    Timestamp(Timestamp),
    /// Enum discriminant.
    Enum(u32),
    /// Boolean value.
    Bool(bool),
    /// Collection of operands.
    List(Vec<Operand>),
}

impl Operand {
    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Operand::String(_) => "string",
            Operand::Number(_) => "number",
            Operand::Timestamp(_) => "timestamp",
            Operand::Enum(_) => "enum",
            Operand::Bool(_) => "bool",
            Operand::List(_) => "list",
        }
    }

    /// Members for membership tests. A scalar is its own single member.
    ///
    /// `in` and `iin` do not use this for `String` operands, which they
    /// search as substrings.
    pub fn members(&self) -> &[Operand] {
        match self {
            Operand::List(items) => items,
            scalar => std::slice::from_ref(scalar),
        }
    }

    /// Returns a copy with every string lowercased.
    pub fn folded(self) -> Operand {
        match self {
            Operand::String(s) => Operand::String(s.to_lowercase()),
            Operand::List(items) => Operand::List(items.into_iter().map(Operand::folded).collect()),
            other => other,
        }
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::String(s)
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::String(s.to_string())
    }
}

impl From<&String> for Operand {
    fn from(s: &String) -> Self {
        Operand::String(s.clone())
    }
}

impl From<Number> for Operand {
    fn from(n: Number) -> Self {
        Operand::Number(n)
    }
}

impl From<Timestamp> for Operand {
    fn from(t: Timestamp) -> Self {
        Operand::Timestamp(t)
    }
}

impl From<bool> for Operand {
    fn from(b: bool) -> Self {
        Operand::Bool(b)
    }
}

macro_rules! operand_from_number {
    ($($source:ty),+) => {
        $(
            impl From<$source> for Operand {
                fn from(n: $source) -> Self {
                    Operand::Number(Number::from(n))
                }
            }
        )+
    };
}

operand_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: Into<Operand>> From<Vec<T>> for Operand {
    fn from(items: Vec<T>) -> Self {
        Operand::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Operand>, const N: usize> From<[T; N]> for Operand {
    fn from(items: [T; N]) -> Self {
        Operand::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(spec: &str, operand: impl Into<Operand>) -> Clause {
        Clause::parse(spec, operand).unwrap()
    }

    #[test]
    fn parse_without_suffix_is_eq() {
        let c = clause("title", "Hello");
        assert_eq!(c.attribute, "title");
        assert_eq!(c.op, Op::Eq);
    }

    #[test]
    fn parse_splits_on_last_separator() {
        let c = clause("release__year__gte", 2000);
        assert_eq!(c.attribute, "release__year");
        assert_eq!(c.op, Op::Gte);
    }

    #[test]
    fn parse_rejects_unknown_suffix() {
        let err = Clause::parse("title__like", "x").unwrap_err();
        assert!(matches!(
            err,
            FilterError::UnknownOperator { ref op, .. } if op == "like"
        ));
        assert!(err.to_string().contains("title__like"));
    }

    #[test]
    fn parse_rejects_empty_attribute() {
        assert!(matches!(
            Clause::parse("__gt", 1),
            Err(FilterError::EmptyAttribute { .. })
        ));
        assert!(matches!(
            Clause::parse("", 1),
            Err(FilterError::EmptyAttribute { .. })
        ));
    }

    #[test]
    fn parse_rejects_bad_regex() {
        assert!(matches!(
            Clause::parse("title__regex", "(unclosed"),
            Err(FilterError::InvalidRegex(_))
        ));
        assert!(matches!(
            Clause::parse("title__regex", 5),
            Err(FilterError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn eq_and_ne() {
        let c = clause("title__eq", "hello");
        assert!(c.evaluate(&Value::String("hello")).unwrap());
        assert!(!c.evaluate(&Value::String("Hello")).unwrap());
        // type mismatch is a plain non-match
        assert!(!c.evaluate(&Value::Number(Number::I64(1))).unwrap());

        let c = clause("title__ne", "hello");
        assert!(c.evaluate(&Value::String("world")).unwrap());
    }

    #[test]
    fn ieq_folds_both_sides() {
        let c = clause("title__ieq", "HeLLo");
        assert!(c.evaluate(&Value::String("hello")).unwrap());
        assert!(c.evaluate(&Value::String("HELLO")).unwrap());
        assert!(!c.evaluate(&Value::String("help")).unwrap());
    }

    #[test]
    fn ieq_rejects_non_string_attribute() {
        let c = clause("year__ieq", "2000");
        assert!(matches!(
            c.evaluate(&Value::Number(Number::I64(2000))),
            Err(FilterError::TypeMismatch { op: "ieq", .. })
        ));
    }

    #[test]
    fn contains_on_strings_and_lists() {
        let c = clause("title__contains", "ver");
        assert!(c.evaluate(&Value::String("Over")).unwrap());
        assert!(!c.evaluate(&Value::String("OVER")).unwrap());

        let c = clause("tags__contains", "live");
        let tags = Value::List(vec![Value::String("rock"), Value::String("live")]);
        assert!(c.evaluate(&tags).unwrap());

        assert!(c.evaluate(&Value::Bool(true)).is_err());
    }

    #[test]
    fn icontains_is_case_insensitive() {
        let c = clause("title__icontains", "OVER");
        assert!(c.evaluate(&Value::String("Hangover")).unwrap());
        assert!(c.evaluate(&Value::String("Over the Hills")).unwrap());
        assert!(!c.evaluate(&Value::String("Under")).unwrap());

        let tags = Value::List(vec![Value::String("Rock")]);
        assert!(clause("tags__icontains", "ROCK").evaluate(&tags).unwrap());
    }

    #[test]
    fn in_and_iin() {
        let c = clause("year__in", vec![1999, 2001]);
        assert!(c.evaluate(&Value::Number(Number::U64(2001))).unwrap());
        assert!(!c.evaluate(&Value::Number(Number::U64(2000))).unwrap());

        // scalar operand is a single member
        let c = clause("year__in", 2000);
        assert!(c.evaluate(&Value::Number(Number::I64(2000))).unwrap());

        let c = clause("code__iin", ["TH", "us"]);
        assert!(c.evaluate(&Value::String("th")).unwrap());
        assert!(c.evaluate(&Value::String("US")).unwrap());
        assert!(!c.evaluate(&Value::String("de")).unwrap());
        assert!(!c.evaluate(&Value::Number(Number::I64(1))).unwrap());
    }

    #[test]
    fn iin_on_non_strings_is_plain_membership() {
        let c = clause("year__iin", vec![2002, 1971]);
        assert!(c.evaluate(&Value::Number(Number::U64(1971))).unwrap());
        assert!(!c.evaluate(&Value::Number(Number::U64(1972))).unwrap());

        let c = clause("flag__iin", vec![Operand::Bool(true), Operand::from("YES")]);
        assert!(c.evaluate(&Value::Bool(true)).unwrap());
        assert!(c.evaluate(&Value::String("yes")).unwrap());
    }

    #[test]
    fn in_with_string_operand_is_substring() {
        let c = clause("title__in", "Clocks and more");
        assert!(c.evaluate(&Value::String("Clocks")).unwrap());
        assert!(c.evaluate(&Value::String("and")).unwrap());
        assert!(!c.evaluate(&Value::String("clocks")).unwrap());
        assert!(matches!(
            c.evaluate(&Value::Number(Number::I64(1))),
            Err(FilterError::TypeMismatch { op: "in", .. })
        ));

        let c = clause("code__iin", "TH VN LA");
        assert!(c.evaluate(&Value::String("vn")).unwrap());
        assert!(!c.evaluate(&Value::String("KH")).unwrap());
    }

    #[test]
    fn ordering_operators() {
        let gt = clause("year__gt", 2000);
        assert!(gt.evaluate(&Value::Number(Number::I64(2001))).unwrap());
        assert!(!gt.evaluate(&Value::Number(Number::I64(2000))).unwrap());

        let lte = clause("title__lte", "m");
        assert!(lte.evaluate(&Value::String("apple")).unwrap());
        assert!(!lte.evaluate(&Value::String("zebra")).unwrap());
    }

    #[test]
    fn ordering_type_mismatch_is_error() {
        let gt = clause("year__gt", 2000);
        assert!(matches!(
            gt.evaluate(&Value::String("2001")),
            Err(FilterError::Unorderable { .. })
        ));
        assert!(matches!(
            gt.evaluate(&Value::Number(Number::F64(f64::NAN))),
            Err(FilterError::Unorderable { .. })
        ));
    }

    #[test]
    fn missing_attribute_is_error() {
        let c = clause("title", "x");
        let err = c.evaluate(&Value::None).unwrap_err();
        assert!(matches!(
            err,
            FilterError::MissingAttribute { ref attribute } if attribute == "title"
        ));
    }

    #[test]
    fn string_prefix_suffix_regex() {
        assert!(clause("t__startswith", "he")
            .evaluate(&Value::String("hello"))
            .unwrap());
        assert!(clause("t__endswith", "lo")
            .evaluate(&Value::String("hello"))
            .unwrap());
        assert!(clause("t__regex", r"^h\w+o$")
            .evaluate(&Value::String("hello"))
            .unwrap());
        assert!(clause("t__startswith", "he")
            .evaluate(&Value::Bool(true))
            .is_err());
    }

    #[test]
    fn operand_members_and_folding() {
        assert_eq!(Operand::from(1).members().len(), 1);
        assert_eq!(Operand::from(vec![1, 2, 3]).members().len(), 3);
        assert_eq!(
            Operand::from(vec!["A", "b"]).folded(),
            Operand::from(vec!["a", "b"])
        );
    }
}
