//! Implementation of the `#[derive(Record)]` macro.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::{parse_record_attrs, RecordType};

/// Main implementation of the Record derive macro.
pub fn record_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Record can only be derived for structs",
            ))
        }
    };

    let mut attribute_arms: Vec<TokenStream> = Vec::new();
    let mut nested_arms: Vec<TokenStream> = Vec::new();
    let mut name_constants: Vec<TokenStream> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_record_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        // Unannotated fields are not exposed.
        let Some(record_type) = attrs.record_type else {
            continue;
        };

        let attribute_name = attrs.rename.unwrap_or_else(|| field_name.to_string());
        let const_name = format_ident!("{}", to_screaming_snake_case(&attribute_name));

        name_constants.push(quote! {
            /// Attribute name constant for filters and key specs.
            pub const #const_name: &'static str = #attribute_name;
        });

        let value_expr = match record_type {
            RecordType::Nested => {
                nested_arms.push(quote! {
                    #attribute_name => ::core::option::Option::Some(
                        &self.#field_name as &dyn ::quiver::filter::Record
                    ),
                });
                continue;
            }
            RecordType::String => {
                quote! { ::quiver::filter::Value::String(&self.#field_name) }
            }
            RecordType::Number => {
                quote! { ::quiver::filter::Value::Number(::quiver::filter::Number::from(self.#field_name)) }
            }
            RecordType::Timestamp => {
                quote! {
                    ::quiver::filter::Value::Timestamp(
                        ::quiver::filter::RecordTimestamp::timestamp(&self.#field_name)
                    )
                }
            }
            RecordType::Enum => {
                quote! {
                    ::quiver::filter::Value::Enum(
                        ::quiver::filter::RecordEnum::discriminant(&self.#field_name)
                    )
                }
            }
            RecordType::Bool => {
                quote! { ::quiver::filter::Value::Bool(self.#field_name) }
            }
            RecordType::List => {
                quote! { ::quiver::filter::AsValue::as_value(&self.#field_name) }
            }
        };

        attribute_arms.push(quote! {
            #attribute_name => #value_expr,
        });
    }

    let nested_fn = if nested_arms.is_empty() {
        TokenStream::new()
    } else {
        quote! {
            fn nested(&self, name: &str) -> ::core::option::Option<&dyn ::quiver::filter::Record> {
                match name {
                    #(#nested_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    };

    let expanded = quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#name_constants)*
        }

        impl #impl_generics ::quiver::filter::Record for #struct_name #ty_generics #where_clause {
            fn attribute(&self, name: &str) -> ::quiver::filter::Value<'_> {
                match name {
                    #(#attribute_arms)*
                    _ => ::quiver::filter::Value::None,
                }
            }

            #nested_fn
        }
    };

    Ok(expanded)
}

/// Convert a string to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = true;
        }
    }

    result
}
