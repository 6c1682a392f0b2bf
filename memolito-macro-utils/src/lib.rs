//! Shared utilities for memolito procedural macros
//!
//! This crate provides the attribute parsing and code generation helpers
//! used by `memolito-macros`.

use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{punctuated::Punctuated, Expr, MetaNameValue, Token};

/// Parsed `#[memoized(...)]` attributes
pub struct MemoizedAttributes {
    /// Registry name override (`name = "..."`); defaults to the function name
    pub custom_name: Option<String>,
    /// Owner field holding the instance cache (`slot = "..."`), methods only
    pub slot: Option<String>,
}

impl Default for MemoizedAttributes {
    fn default() -> Self {
        Self {
            custom_name: None,
            slot: None,
        }
    }
}

/// Parse a string-valued attribute such as `name = "..."` or `slot = "..."`
pub fn parse_string_attribute(nv: &MetaNameValue) -> Option<String> {
    match &nv.value {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            syn::Lit::Str(s) => Some(s.value()),
            _ => None,
        },
        _ => None,
    }
}

/// Parse `#[memoized]` attributes from a token stream
pub fn parse_memoized_attributes(attr: TokenStream2) -> Result<MemoizedAttributes, TokenStream2> {
    use syn::parse::Parser;

    let parser = Punctuated::<MetaNameValue, Token![,]>::parse_terminated;
    let parsed_args = parser.parse2(attr).map_err(|e| {
        let msg = format!("Failed to parse attributes: {}", e);
        quote! { compile_error!(#msg) }
    })?;

    let mut attrs = MemoizedAttributes::default();

    for nv in parsed_args {
        if nv.path.is_ident("name") {
            match parse_string_attribute(&nv) {
                Some(name) => attrs.custom_name = Some(name),
                None => {
                    return Err(
                        quote! { compile_error!("Invalid syntax for `name`: expected `name = \"...\"`") },
                    )
                }
            }
        } else if nv.path.is_ident("slot") {
            match parse_string_attribute(&nv) {
                Some(slot) => attrs.slot = Some(slot),
                None => {
                    return Err(
                        quote! { compile_error!("Invalid syntax for `slot`: expected `slot = \"field\"`") },
                    )
                }
            }
        } else {
            let path = nv.path.clone();
            let msg = format!(
                "Unknown attribute `{}`: expected `name` or `slot`",
                quote! { #path }
            );
            return Err(quote! { compile_error!(#msg) });
        }
    }

    Ok(attrs)
}

/// Generate the `CallArgs` expression capturing the function arguments.
///
/// Parts are resolved with method-call syntax so reference arguments
/// auto-deref to their `CacheableKey` implementation.
pub fn generate_call_args_expr(arg_pats: &[TokenStream2]) -> TokenStream2 {
    if arg_pats.is_empty() {
        quote! { memolito_core::CallArgs::new() }
    } else {
        quote! {{
            use memolito_core::CacheableKey;
            let mut __args = memolito_core::CallArgs::new();
            #(
                __args = __args.positional_part((#arg_pats).to_cache_key());
            )*
            __args
        }}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    #[test]
    fn test_parse_empty_attributes() {
        let attrs = parse_memoized_attributes(quote! {}).unwrap();
        assert!(attrs.custom_name.is_none());
        assert!(attrs.slot.is_none());
    }

    #[test]
    fn test_parse_name_attribute() {
        let attrs = parse_memoized_attributes(quote! { name = "custom_cache" }).unwrap();
        assert_eq!(attrs.custom_name.as_deref(), Some("custom_cache"));
    }

    #[test]
    fn test_parse_slot_attribute() {
        let attrs = parse_memoized_attributes(quote! { slot = "cache" }).unwrap();
        assert_eq!(attrs.slot.as_deref(), Some("cache"));
    }

    #[test]
    fn test_parse_both_attributes() {
        let attrs =
            parse_memoized_attributes(quote! { slot = "cache", name = "renamed" }).unwrap();
        assert_eq!(attrs.slot.as_deref(), Some("cache"));
        assert_eq!(attrs.custom_name.as_deref(), Some("renamed"));
    }

    #[test]
    fn test_unknown_attribute_is_rejected() {
        let err = parse_memoized_attributes(quote! { ttl = "10" }).unwrap_err();
        assert!(err.to_string().contains("compile_error"));
    }

    #[test]
    fn test_non_string_value_is_rejected() {
        let err = parse_memoized_attributes(quote! { name = 3 }).unwrap_err();
        assert!(err.to_string().contains("compile_error"));
    }

    #[test]
    fn test_call_args_expr_zero_args() {
        let expr = generate_call_args_expr(&[]);
        assert_eq!(
            expr.to_string(),
            quote! { memolito_core::CallArgs::new() }.to_string()
        );
    }

    #[test]
    fn test_call_args_expr_captures_each_argument() {
        let pats = vec![quote! { a }, quote! { b }];
        let rendered = generate_call_args_expr(&pats).to_string();
        assert!(rendered.contains("positional_part"));
        assert!(rendered.contains("(a)"));
        assert!(rendered.contains("(b)"));
    }
}
