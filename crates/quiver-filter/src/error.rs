//! Error types for the filter engine.

use thiserror::Error;

/// Errors raised while compiling or evaluating a filter.
///
/// Compilation errors (`UnknownOperator`, `EmptyAttribute`, `InvalidRegex`)
/// surface when a [`Filter`](crate::Filter) is compiled, before any item is
/// looked at. The rest surface while evaluating an item.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The `__suffix` of a filter spec names no known operator.
    #[error("unknown filter operator '{op}' in '{spec}'")]
    UnknownOperator { spec: String, op: String },

    /// The filter spec has no attribute name before the operator suffix.
    #[error("filter spec '{spec}' has an empty attribute name")]
    EmptyAttribute { spec: String },

    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// The item does not expose the queried attribute.
    #[error("item has no attribute '{attribute}'")]
    MissingAttribute { attribute: String },

    /// Operator applied to a value of the wrong type.
    #[error("operator '{op}' expects {expected} values, got {actual}")]
    TypeMismatch {
        op: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    /// Ordering comparison between values that have no common ordering.
    #[error("attribute '{attribute}' cannot be ordered against {operand}")]
    Unorderable {
        attribute: String,
        operand: &'static str,
    },
}

/// Result type for filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;
