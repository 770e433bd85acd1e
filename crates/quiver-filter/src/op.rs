//! Comparison operators for filter clauses.
//!
//! The [`Op`] enum is the fixed operator table. Filter specs name an
//! operator with a double-underscore suffix (`year__gt`); [`Op::from_suffix`]
//! maps the suffix to its operator.

use std::cmp::Ordering;

/// Operator of a filter clause, named in specs by its suffix.
///
/// The `I`-prefixed operators fold case on both sides before comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `eq`, also what a spec without a suffix means.
    Eq,
    /// `ieq`; string attributes only.
    IEq,
    Ne,
    /// `contains`: substring for strings, element for lists.
    Contains,
    IContains,
    /// `in`: the attribute is one of the operand's members. With a string
    /// operand, the attribute must be a string and a substring of it.
    In,
    /// `iin`: `in` with string attributes and members compared
    /// case-insensitively; other types compare as `in` does.
    IIn,
    StartsWith,
    EndsWith,
    /// `regex`: the pattern matches somewhere in the string.
    Regex,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Op {
    /// Every operator, in suffix-table order.
    pub const ALL: [Op; 14] = [
        Op::Eq,
        Op::IEq,
        Op::Ne,
        Op::Contains,
        Op::IContains,
        Op::In,
        Op::IIn,
        Op::StartsWith,
        Op::EndsWith,
        Op::Regex,
        Op::Gt,
        Op::Gte,
        Op::Lt,
        Op::Lte,
    ];

    /// The operator a spec suffix names (`"gt"`, `"icontains"`), if any.
    pub fn from_suffix(suffix: &str) -> Option<Op> {
        Op::ALL.into_iter().find(|op| op.as_str() == suffix)
    }

    pub fn is_case_insensitive(self) -> bool {
        matches!(self, Op::IEq | Op::IContains | Op::IIn)
    }

    pub fn is_ordering(self) -> bool {
        matches!(self, Op::Gt | Op::Gte | Op::Lt | Op::Lte)
    }

    /// Operators that fail on non-string attributes.
    pub fn is_string_only(self) -> bool {
        matches!(
            self,
            Op::IEq | Op::StartsWith | Op::EndsWith | Op::Regex
        )
    }

    /// Whether `ordering` (attribute against operand) satisfies this
    /// operator. Always `false` for operators that are not comparisons.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        use Ordering::{Equal, Greater, Less};
        matches!(
            (self, ordering),
            (Op::Eq | Op::IEq | Op::Gte | Op::Lte, Equal)
                | (Op::Gt | Op::Gte | Op::Ne, Greater)
                | (Op::Lt | Op::Lte | Op::Ne, Less)
        )
    }

    /// Suffix spelling, as written in a spec.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::IEq => "ieq",
            Op::Ne => "ne",
            Op::Contains => "contains",
            Op::IContains => "icontains",
            Op::In => "in",
            Op::IIn => "iin",
            Op::StartsWith => "startswith",
            Op::EndsWith => "endswith",
            Op::Regex => "regex",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lt => "lt",
            Op::Lte => "lte",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_lookup() {
        assert_eq!(Op::from_suffix("gt"), Some(Op::Gt));
        assert_eq!(Op::from_suffix("gte"), Some(Op::Gte));
        assert_eq!(Op::from_suffix("icontains"), Some(Op::IContains));
        assert_eq!(Op::from_suffix("iin"), Some(Op::IIn));
        assert_eq!(Op::from_suffix("GT"), None);
        assert_eq!(Op::from_suffix("between"), None);
        assert_eq!(Op::from_suffix(""), None);
    }

    #[test]
    fn suffix_round_trips_through_table() {
        for op in Op::ALL {
            assert_eq!(Op::from_suffix(op.as_str()), Some(op));
        }
    }

    #[test]
    fn op_classes() {
        assert!(Op::IEq.is_case_insensitive());
        assert!(!Op::Eq.is_case_insensitive());
        assert!(Op::Lte.is_ordering());
        assert!(!Op::In.is_ordering());
        assert!(Op::Regex.is_string_only());
        assert!(!Op::Contains.is_string_only());
        assert!(!Op::IIn.is_string_only());
    }

    #[test]
    fn op_eval_ordering() {
        assert!(Op::Gt.eval_ordering(Ordering::Greater));
        assert!(!Op::Gt.eval_ordering(Ordering::Equal));
        assert!(Op::Gte.eval_ordering(Ordering::Equal));
        assert!(!Op::Gte.eval_ordering(Ordering::Less));
        assert!(Op::Lt.eval_ordering(Ordering::Less));
        assert!(Op::Lte.eval_ordering(Ordering::Equal));
        assert!(!Op::Lte.eval_ordering(Ordering::Greater));
        assert!(!Op::Contains.eval_ordering(Ordering::Equal));
    }

    #[test]
    fn op_display() {
        assert_eq!(Op::Eq.to_string(), "eq");
        assert_eq!(Op::StartsWith.to_string(), "startswith");
        assert_eq!(Op::IIn.to_string(), "iin");
    }
}
