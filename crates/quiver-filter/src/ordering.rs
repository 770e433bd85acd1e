//! Equality and ordering between attribute values and clause operands.

use std::cmp::Ordering;

use crate::clause::Operand;
use crate::value::{Number, Value};

/// Compares an attribute value against an operand.
///
/// Returns `None` if the two have no common ordering (type mismatch, NaN,
/// lists, or a missing attribute).
pub fn compare(value: &Value<'_>, operand: &Operand) -> Option<Ordering> {
    match (value, operand) {
        (Value::String(a), Operand::String(b)) => Some((*a).cmp(b.as_str())),
        (Value::Number(a), Operand::Number(b)) => a.compare(*b),
        (Value::Timestamp(a), Operand::Timestamp(b)) => Some(a.cmp(b)),
        (Value::Enum(a), Operand::Enum(b)) => Some(a.cmp(b)),
        (Value::Enum(a), Operand::Number(b)) => Number::U64(u64::from(*a)).compare(*b),
        (Value::Bool(a), Operand::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Tests an attribute value for equality with an operand.
///
/// Values of different types are never equal. Lists are equal when they
/// have the same length and are equal element-wise.
pub fn equals(value: &Value<'_>, operand: &Operand) -> bool {
    match (value, operand) {
        (Value::List(items), Operand::List(expected)) => {
            items.len() == expected.len()
                && items.iter().zip(expected).all(|(v, o)| equals(v, o))
        }
        _ => compare(value, operand) == Some(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Timestamp;

    #[test]
    fn compare_same_types() {
        assert_eq!(
            compare(&Value::String("a"), &Operand::from("b")),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare(&Value::Number(Number::I64(2001)), &Operand::from(2000)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            compare(&Value::Timestamp(Timestamp(5)), &Operand::from(Timestamp(5))),
            Some(Ordering::Equal)
        );
        assert_eq!(
            compare(&Value::Bool(false), &Operand::from(true)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn compare_mismatch_is_none() {
        assert_eq!(compare(&Value::String("1"), &Operand::from(1)), None);
        assert_eq!(compare(&Value::None, &Operand::from(1)), None);
        assert_eq!(
            compare(&Value::List(vec![]), &Operand::List(vec![])),
            None
        );
    }

    #[test]
    fn enum_matches_plain_number() {
        assert!(equals(&Value::Enum(2), &Operand::from(2u32)));
        assert!(equals(&Value::Enum(2), &Operand::Enum(2)));
        assert!(!equals(&Value::Enum(2), &Operand::from(3)));
    }

    #[test]
    fn list_equality() {
        let value = Value::List(vec![Value::String("a"), Value::String("b")]);
        assert!(equals(&value, &Operand::from(vec!["a", "b"])));
        assert!(!equals(&value, &Operand::from(vec!["a"])));
        assert!(!equals(&value, &Operand::from("a")));
    }
}
