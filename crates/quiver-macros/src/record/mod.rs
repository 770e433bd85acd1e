//! Implementation of the `#[derive(Record)]` macro.
//!
//! Generates the `Record` attribute accessor and attribute name constants
//! from struct field annotations.

mod attrs;
mod derive;

pub use derive::record_derive_impl;
