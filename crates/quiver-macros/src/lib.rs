//! Proc macros for quiver.
//!
//! - [`Record`] - Generate the attribute accessor used by quiver filters and
//!   key indices.

mod record;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `Record` trait for filterable, indexable structs.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `String` | String field |
/// | `Number` | Numeric field (any primitive integer or float) |
/// | `Timestamp` | Timestamp field - requires `RecordTimestamp` impl |
/// | `Enum` | Enum field - requires `RecordEnum` impl |
/// | `Bool` | Boolean field |
/// | `List` | `Vec` of any `AsValue` type (for `contains` / `icontains`) |
/// | `Nested` | Field that is itself a `Record`, reached as `field__attr` |
/// | `skip` | Exclude this field |
/// | `rename = "..."` | Expose under a different attribute name |
///
/// Fields without a `#[record(...)]` annotation are not exposed.
///
/// # Generated Code
///
/// 1. Attribute name constants (e.g., `Country::ISO2`)
/// 2. Implementation of `Record::attribute()`
///
/// # Example
///
/// ```ignore
/// use quiver::{Keyed, Record};
///
/// #[derive(Record)]
/// struct Country {
///     #[record(String)]
///     iso2: String,
///     #[record(String)]
///     iso3: String,
///     #[record(Number)]
///     population: u64,
/// }
///
/// let mut countries: Keyed<Country> = Keyed::new([Country::ISO2, Country::ISO3]);
/// countries.add(Country { iso2: "TH".into(), iso3: "THA".into(), population: 70 })?;
/// assert_eq!(countries.index("THA")?.iso2, "TH");
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
