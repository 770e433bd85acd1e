//! Attribute parsing for the Record derive macro.
//!
//! Parses the `#[record(...)]` field attributes.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Ident, Lit, Meta, Result, Token,
};

/// How a field is exposed as an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    /// `#[record(String)]`
    String,
    /// `#[record(Number)]`
    Number,
    /// `#[record(Timestamp)]`
    Timestamp,
    /// `#[record(Enum)]`
    Enum,
    /// `#[record(Bool)]`
    Bool,
    /// `#[record(List)]`
    List,
    /// `#[record(Nested)]`: the field is itself a `Record`.
    Nested,
}

impl RecordType {
    fn parse_name(name: &str, span: Span) -> Result<Self> {
        match name {
            "String" | "string" => Ok(RecordType::String),
            "Number" | "number" => Ok(RecordType::Number),
            "Timestamp" | "timestamp" => Ok(RecordType::Timestamp),
            "Enum" | "enum" | "enumeration" => Ok(RecordType::Enum),
            "Bool" | "bool" | "boolean" => Ok(RecordType::Bool),
            "List" | "list" => Ok(RecordType::List),
            "Nested" | "nested" => Ok(RecordType::Nested),
            other => Err(Error::new(
                span,
                format!(
                    "unknown record type: '{}'. Expected one of: String, Number, Timestamp, Enum, Bool, List, Nested",
                    other
                ),
            )),
        }
    }

    /// Parse a record type from an identifier.
    pub fn from_ident(ident: &Ident) -> Result<Self> {
        Self::parse_name(&ident.to_string(), ident.span())
    }

    /// Parse a record type from a string literal (`ty = "enum"`).
    pub fn from_literal(s: &str, span: Span) -> Result<Self> {
        Self::parse_name(s, span)
    }
}

/// Field-level attributes from `#[record(...)]`.
#[derive(Debug, Clone, Default)]
pub struct RecordAttr {
    /// How this field is exposed.
    pub record_type: Option<RecordType>,
    /// Keep this field out of the accessor.
    pub skip: bool,
    /// Attribute name to expose (default: field name).
    pub rename: Option<String>,
}

fn string_literal(expr: &syn::Expr, what: &str) -> Result<syn::LitStr> {
    match expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.clone()),
        other => Err(Error::new(
            other.span(),
            format!("{} must be a string literal", what),
        )),
    }
}

impl Parse for RecordAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = RecordAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) => {
                    if p.is_ident("skip") {
                        attr.skip = true;
                    } else if let Some(ident) = p.get_ident() {
                        attr.record_type = Some(RecordType::from_ident(ident)?);
                    } else {
                        return Err(Error::new(
                            p.span(),
                            "expected record type: String, Number, Timestamp, Enum, Bool, List, Nested, or skip",
                        ));
                    }
                }

                Meta::NameValue(nv) => {
                    if nv.path.is_ident("rename") {
                        attr.rename = Some(string_literal(&nv.value, "rename")?.value());
                    } else if nv.path.is_ident("ty") {
                        let lit = string_literal(&nv.value, "ty")?;
                        attr.record_type = Some(RecordType::from_literal(&lit.value(), lit.span())?);
                    } else {
                        return Err(Error::new(
                            nv.path.span(),
                            "unknown attribute. Expected: rename or ty",
                        ));
                    }
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown record attribute. Expected: a record type, skip, rename = \"...\", or ty = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Extract `#[record(...)]` attributes from a field's attributes.
pub fn parse_record_attrs(attrs: &[Attribute]) -> Result<RecordAttr> {
    for attr in attrs {
        if attr.path().is_ident("record") {
            return attr.parse_args::<RecordAttr>();
        }
    }
    Ok(RecordAttr::default())
}
