use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, FnArg, ItemFn, ReturnType};

// Import shared utilities
use memolito_macro_utils::{generate_call_args_expr, parse_memoized_attributes, MemoizedAttributes};

/// Parse macro attributes from the attribute token stream
fn parse_attributes(attr: TokenStream) -> Result<MemoizedAttributes, TokenStream2> {
    let attr_stream: TokenStream2 = attr.into();
    parse_memoized_attributes(attr_stream)
}

/// Generate the free-function branch: a per-function shared cache declared
/// as a static, registered once in the function cache registry
fn generate_function_branch(
    cache_ident: &syn::Ident,
    ret_type: &TokenStream2,
    call_args_expr: &TokenStream2,
    block: &syn::Block,
    fn_name_str: &str,
    is_result: bool,
) -> TokenStream2 {
    let get_call = if is_result {
        quote! { #cache_ident.get_or_compute_result(#fn_name_str, &__args, || #block) }
    } else {
        quote! { #cache_ident.get_or_compute(#fn_name_str, &__args, || #block) }
    };

    quote! {
        static #cache_ident: once_cell::sync::Lazy<memolito_core::FunctionCache<#ret_type>> =
            once_cell::sync::Lazy::new(memolito_core::FunctionCache::new);

        {
            static __REGISTER_ONCE: ::std::sync::Once = ::std::sync::Once::new();
            __REGISTER_ONCE.call_once(|| {
                memolito_core::function_registry::register(
                    #fn_name_str,
                    || #cache_ident.clear(),
                    |__key| {
                        #cache_ident.evict_key(__key);
                    },
                );
            });
        }

        let __args = #call_args_expr;
        #get_call
    }
}

/// Generate the method branch: a definition-site member descriptor routed
/// through the owner's instance cache slot
fn generate_method_branch(
    slot_ident: &syn::Ident,
    call_args_expr: &TokenStream2,
    block: &syn::Block,
    member_name_str: &str,
    is_result: bool,
) -> TokenStream2 {
    let get_call = if is_result {
        quote! { __MEMBER.get_or_compute_result(&self.#slot_ident, &__args, || #block) }
    } else {
        quote! { __MEMBER.get_or_compute(&self.#slot_ident, &__args, || #block) }
    };

    quote! {
        static __MEMBER: memolito_core::MemoizedMethod =
            memolito_core::MemoizedMethod::new(concat!(module_path!(), "::", #member_name_str));

        let __args = #call_args_expr;
        #get_call
    }
}

/// A procedural macro that adds automatic memoization to functions and
/// methods.
///
/// On a free function the macro declares a process-wide cache owned by the
/// function itself (`once_cell::sync::Lazy<FunctionCache<_>>`), registers it
/// in the function cache registry for manual invalidation, and returns the
/// cached result for repeated calls with equal arguments.
///
/// On an inherent method the macro routes through the owner's embedded
/// [`InstanceCache`] slot named by the `slot` attribute, so each instance
/// caches independently while all instances share one member identity.
///
/// # Requirements
///
/// - **Arguments**: Must implement `CacheableKey` (or `DefaultCacheableKey`
///   + `Debug`). Arguments whose `to_cache_key` returns `None` make the call
///   run uncached.
/// - **Return type**: Must implement `Clone` for cache storage and retrieval
/// - **Methods**: Must take `&self` and name the cache slot field via
///   `slot = "field"`; the field's type is `memolito_core::InstanceCache`
///
/// # Macro Parameters
///
/// - `name` (optional): Custom identifier in the function cache registry
///   (free functions) or member identity suffix (methods). Default: the
///   function name.
/// - `slot` (required for methods, rejected on free functions): Name of the
///   owner field holding the `InstanceCache`.
///
/// # Cache Behavior
///
/// - **Regular functions**: All results are cached
/// - **Result-returning functions**: Only `Ok` values are cached, `Err`
///   values are recomputed on the next call
/// - **Free functions**: One cache per function, shared by every caller in
///   the process
/// - **Methods**: One cache per instance, keyed by member identity plus
///   arguments
/// - **Scoped suppression**: Reads inside `scope::disable_caching()` miss
///   unconditionally; writes still land
///
/// # Examples
///
/// ## Free Function
///
/// ```ignore
/// use memolito::memoized;
///
/// #[memoized]
/// fn fibonacci(n: u32) -> u64 {
///     if n <= 1 {
///         return n as u64;
///     }
///     fibonacci(n - 1) + fibonacci(n - 2)
/// }
///
/// // First call computes and caches the result
/// let result1 = fibonacci(10);
/// // Subsequent calls return the cached result
/// let result2 = fibonacci(10);
/// ```
///
/// ## Method With an Instance Slot
///
/// ```ignore
/// use memolito::memoized;
/// use memolito_core::InstanceCache;
///
/// struct Calculator {
///     cache: InstanceCache,
/// }
///
/// impl Calculator {
///     #[memoized(slot = "cache")]
///     fn add(&self, a: i32, b: i32) -> i32 {
///         a + b
///     }
/// }
/// ```
///
/// ## Result Type Caching (Errors NOT Cached)
///
/// ```ignore
/// use memolito::memoized;
///
/// #[memoized]
/// fn divide(a: i32, b: i32) -> Result<i32, String> {
///     if b == 0 {
///         Err("Division by zero".to_string())
///     } else {
///         Ok(a / b)
///     }
/// }
/// ```
///
/// ## Custom Registry Name
///
/// ```ignore
/// use memolito::{clear_function_cache, memoized};
///
/// #[memoized(name = "user_api_v1")]
/// fn fetch_user(id: u32) -> String {
///     format!("user-{id}")
/// }
///
/// // Later, when the backing data changes:
/// clear_function_cache("user_api_v1");
/// ```
///
/// [`InstanceCache`]: https://docs.rs/memolito-core/latest/memolito_core/struct.InstanceCache.html
#[proc_macro_attribute]
pub fn memoized(attr: TokenStream, item: TokenStream) -> TokenStream {
    // Parse macro attributes
    let attrs = match parse_attributes(attr) {
        Ok(attrs) => attrs,
        Err(err) => return TokenStream::from(err),
    };

    // Parse function
    let input = parse_macro_input!(item as ItemFn);
    let vis = &input.vis;
    let sig = &input.sig;
    let ident = &sig.ident;
    let block = &input.block;

    // Extract return type
    let ret_type = match &sig.output {
        ReturnType::Type(_, ty) => quote! { #ty },
        ReturnType::Default => quote! { () },
    };

    // Parse arguments and detect self
    let mut arg_pats = Vec::new();
    let mut has_self = false;
    for arg in sig.inputs.iter() {
        match arg {
            FnArg::Receiver(_) => has_self = true,
            FnArg::Typed(pat_type) => {
                let pat = &pat_type.pat;
                arg_pats.push(quote! { #pat });
            }
        }
    }

    // Detect Result type
    let is_result = {
        let s = quote!(#ret_type).to_string().replace(' ', "");
        s.starts_with("Result<") || s.starts_with("std::result::Result<")
    };

    // Use custom name if provided, otherwise use function name
    let fn_name_str = attrs.custom_name.unwrap_or_else(|| ident.to_string());

    // Generate cache key capture expression
    let call_args_expr = generate_call_args_expr(&arg_pats);

    let body = if has_self {
        let slot = match &attrs.slot {
            Some(slot) => slot,
            None => {
                return TokenStream::from(quote! {
                    compile_error!("`#[memoized]` on a method requires `slot = \"field\"` naming the owner's InstanceCache field");
                });
            }
        };
        let slot_ident = format_ident!("{}", slot);
        generate_method_branch(&slot_ident, &call_args_expr, block, &fn_name_str, is_result)
    } else {
        if attrs.slot.is_some() {
            return TokenStream::from(quote! {
                compile_error!("`slot` only applies to methods; free functions own their cache");
            });
        }
        let cache_ident = format_ident!("FUNCTION_CACHE_{}", ident.to_string().to_uppercase());
        generate_function_branch(
            &cache_ident,
            &ret_type,
            &call_args_expr,
            block,
            &fn_name_str,
            is_result,
        )
    };

    // Generate final expanded code
    let expanded = quote! {
        #vis #sig {
            #body
        }
    };

    TokenStream::from(expanded)
}
