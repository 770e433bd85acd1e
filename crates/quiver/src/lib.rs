//! # Quiver - In-Memory Keyed Collections
//!
//! Quiver holds application objects in memory and finds them again, either
//! by filtering on their attributes or by looking them up under any of
//! several unique keys.
//!
//! - [`Sequence`]: ordered collection with keyword-style filtering
//!   (`year__gt`, `title__icontains`, ...), union and intersection
//! - [`Keyed`]: a sequence plus a [`KeyIndex`]; constant-time lookup by any
//!   key, where every key value belongs to at most one item
//! - [`Ring`]: fixed-capacity buffer that overwrites its oldest item
//! - [`Record`]: how a collection reads an item's attributes, usually
//!   derived with `#[derive(Record)]`
//!
//! ## Quick Start
//!
//! ```rust
//! use quiver::{filter, Keyed, Record};
//!
//! #[derive(Record)]
//! struct Country {
//!     #[record(String)]
//!     iso2: String,
//!     #[record(String)]
//!     iso3: String,
//!     #[record(Number)]
//!     population: u32,
//! }
//!
//! let mut countries: Keyed<Country> = Keyed::new([Country::ISO2, Country::ISO3]);
//! countries.add(Country { iso2: "TH".into(), iso3: "THA".into(), population: 70 }).unwrap();
//! countries.add(Country { iso2: "LA".into(), iso3: "LAO".into(), population: 7 }).unwrap();
//!
//! // Either key finds the same item.
//! assert_eq!(countries.index("LAO").unwrap().iso2, "LA");
//!
//! // Filtering keeps the keys.
//! let big = countries.filter(&filter!(population__gte = 10)).unwrap();
//! assert_eq!(big.len(), 1);
//! assert!(big.contains_key("TH"));
//! ```
//!
//! ## Filtering
//!
//! A filter is a set of `attribute__operator` specs, all of which must
//! hold. The [`filter`](mod@filter) module lists the operators. Filters are
//! checked when compiled, so a misspelled operator fails even on an empty
//! collection. Attribute names may be paths into nested records
//! (`album__title__icontains`); see `#[record(Nested)]`.
//!
//! ## Errors
//!
//! Collection operations return [`CollectionError`]. Failed key lookups can
//! also be handled through the [`MissingKey`] trait.

mod error;
mod index;
mod key;
mod keyed;
mod ring;
mod sequence;

pub use error::{CollectionError, MissingKey, Result};
pub use index::KeyIndex;
pub use key::{KeySpec, KeyValue};
pub use keyed::{Keyed, KeyedBuilder, Lookup};
pub use ring::{Ring, RingIter};
pub use sequence::{Sequence, SUMMARY_LIMIT};

// Filter engine (re-export from quiver-filter)
pub use quiver_filter as filter;
pub use quiver_filter::{filter, Filter, Record};

// Record derive macro
pub use quiver_macros::Record;
