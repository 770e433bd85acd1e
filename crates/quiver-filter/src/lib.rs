//! quiver-filter - attribute filter engine for in-memory collections.
//!
//! Filters are written as keyword-style specs: an attribute name, an optional
//! double-underscore operator suffix, and an operand.
//!
//! ```rust
//! use quiver_filter::{filter, Number, Record, Value};
//!
//! struct Song {
//!     title: String,
//!     year: u16,
//! }
//!
//! impl Record for Song {
//!     fn attribute(&self, name: &str) -> Value<'_> {
//!         match name {
//!             "title" => Value::String(&self.title),
//!             "year" => Value::Number(Number::from(self.year)),
//!             _ => Value::None,
//!         }
//!     }
//! }
//!
//! let songs = vec![
//!     Song { title: "Hangover".into(), year: 2011 },
//!     Song { title: "Yesterday".into(), year: 1965 },
//! ];
//!
//! let predicate = filter!(year__gt = 2000, title__icontains = "OVER")
//!     .compile()
//!     .unwrap();
//!
//! let hits = predicate.filter(&songs, Song::accessor).unwrap();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].title, "Hangover");
//! ```
//!
//! # Operators
//!
//! | Suffix | Meaning |
//! |--------|---------|
//! | *(none)*, `eq` | equal |
//! | `ieq` | equal ignoring case (string attributes) |
//! | `ne` | not equal |
//! | `contains`, `icontains` | substring of a string, element of a list |
//! | `in`, `iin` | attribute is one of the operand's members |
//! | `startswith`, `endswith`, `regex` | string matching |
//! | `gt`, `gte`, `lt`, `lte` | native ordering |
//!
//! Every spec in a filter must hold (AND). Unknown suffixes are rejected
//! when the filter is compiled. A missing attribute or an attribute of a
//! type the operator cannot handle is an error at evaluation time.

mod clause;
mod error;
mod op;
mod ordering;
mod predicate;
mod traits;
mod value;

pub use clause::{split_spec, Clause, Operand, SUFFIX_SEPARATOR};
pub use error::{FilterError, Result};
pub use op::Op;
pub use ordering::{compare, equals};
pub use predicate::{Filter, Predicate};
pub use traits::{Record, RecordEnum, RecordTimestamp};
pub use value::{AsValue, Number, Timestamp, Value};
