//! # Memolito
//!
//! A lightweight memoization library for Rust: attach a cache to a computed
//! property, an instance method, a free function, or a manually-managed
//! key/value store, so an expensive computation runs at most once per
//! distinct set of inputs - or per time window.
//!
//! ## Features
//!
//! - **Easy to use**: Add `#[memoized]` to a free function or a method
//! - **Per-instance or shared**: Methods and properties cache on the owning
//!   instance; free functions share one process-wide cache
//! - **Validity tracking**: Stop serving values without forgetting them,
//!   with bulk invalidation and timed expiry against an injectable clock
//! - **Scoped suppression**: Temporarily force every read to miss on the
//!   current thread, with guaranteed restore on scope exit
//! - **Cache sweeping**: Eagerly warm every memoized member of an object
//!   before a latency-sensitive phase
//! - **Result-aware**: Intelligently caches only successful `Result::Ok`
//!   values
//!
//! ## Quick Start
//!
//! Add the `#[memoized]` attribute to any function you want to memoize:
//!
//! ```rust
//! use memolito::memoized;
//!
//! #[memoized]
//! fn fibonacci(n: u32) -> u64 {
//!     if n <= 1 {
//!         return n as u64;
//!     }
//!     fibonacci(n - 1) + fibonacci(n - 2)
//! }
//!
//! // First call computes the result
//! let result1 = fibonacci(10);
//! // Second call returns the cached result instantly
//! let result2 = fibonacci(10);
//! assert_eq!(result1, result2);
//! ```
//!
//! ## Memoized Properties and Methods
//!
//! Owner types embed an [`InstanceCache`] slot; member descriptors defined
//! at the definition site route through it:
//!
//! ```rust
//! use memolito::{memoized, InstanceCache, MemoizedProperty};
//!
//! struct Report {
//!     raw: Vec<u64>,
//!     cache: InstanceCache,
//! }
//!
//! static TOTAL: MemoizedProperty<u64> = MemoizedProperty::new("Report::total");
//!
//! impl Report {
//!     fn total(&self) -> u64 {
//!         TOTAL.get(&self.cache, || self.raw.iter().sum())
//!     }
//!
//!     #[memoized(slot = "cache")]
//!     fn scaled_total(&self, factor: u64) -> u64 {
//!         self.total() * factor
//!     }
//! }
//!
//! let report = Report { raw: vec![1, 2, 3], cache: InstanceCache::new() };
//! assert_eq!(report.total(), 6);
//! assert_eq!(report.scaled_total(10), 60);
//! ```
//!
//! ## Suppressing Caches Temporarily
//!
//! ```rust
//! use memolito::scope;
//!
//! let guard = scope::disable_caching();
//! // ... every cache read on this thread misses here ...
//! drop(guard);
//! // ... previously cached values are served again ...
//! ```
//!
//! ## Custom Cache Keys
//!
//! Arguments contribute key parts through [`CacheableKey`]. For your own
//! types, either derive the part from `Debug`:
//!
//! ```rust
//! use memolito::DefaultCacheableKey;
//!
//! #[derive(Debug, Clone)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! impl DefaultCacheableKey for User {}
//! ```
//!
//! or implement [`CacheableKey`] directly (but not both):
//!
//! ```rust
//! use memolito::CacheableKey;
//!
//! #[derive(Debug, Clone)]
//! struct UserId {
//!     id: u64,
//! }
//!
//! impl CacheableKey for UserId {
//!     fn to_cache_key(&self) -> Option<String> {
//!         Some(format!("user:{}", self.id))
//!     }
//! }
//! ```
//!
//! Returning `None` marks a value as having no identity usable as a key;
//! calls carrying such an argument run uncached instead of failing.
//!
//! ## Error Handling
//!
//! Functions returning `Result<T, E>` only cache successful results:
//!
//! ```rust
//! use memolito::memoized;
//!
//! #[memoized]
//! fn divide(a: i32, b: i32) -> Result<i32, String> {
//!     if b == 0 {
//!         Err("Division by zero".to_string())
//!     } else {
//!         Ok(a / b)
//!     }
//! }
//!
//! // Ok results are cached
//! let _ = divide(10, 2);
//! // Err results are NOT cached
//! let _ = divide(10, 0);
//! ```

pub use memolito_core::*;
pub use memolito_macros::memoized;

/// Empties the shared cache of a memoized free function.
///
/// The cache is addressed by the function's registry name: the function name
/// by default, or its `name = "..."` override.
///
/// # Arguments
///
/// * `name` - The registry name of the memoized function
///
/// # Returns
///
/// `true` if a cache with that name was registered (a function registers on
/// its first call), `false` otherwise
///
/// # Examples
///
/// ```rust
/// use memolito::{clear_function_cache, memoized};
///
/// #[memoized]
/// fn lookup(id: u32) -> String {
///     format!("record-{id}")
/// }
///
/// let _ = lookup(1);
/// // Later, when the backing data changes:
/// assert!(clear_function_cache("lookup"));
/// ```
pub fn clear_function_cache(name: &str) -> bool {
    function_registry::clear(name)
}

/// Removes a single entry from the shared cache of a memoized free
/// function, leaving entries for other argument tuples intact.
///
/// Builds the same key the memoized function itself would derive for those
/// arguments. Unknown names, non-cacheable arguments and absent entries do
/// nothing.
///
/// # Arguments
///
/// * `name` - The registry name of the memoized function
/// * `args` - The argument tuple to evict, captured as [`CallArgs`]
///
/// # Returns
///
/// `true` if the cache was registered and the arguments were cacheable
///
/// # Examples
///
/// ```rust
/// use memolito::{evict_function_entry, memoized, CallArgs};
///
/// #[memoized]
/// fn describe(id: u32) -> String {
///     format!("item-{id}")
/// }
///
/// let _ = describe(1);
/// let _ = describe(2);
///
/// // Only `describe(1)` is recomputed on its next call.
/// evict_function_entry("describe", &CallArgs::new().positional(&1_u32));
/// ```
pub fn evict_function_entry(name: &str, args: &CallArgs) -> bool {
    function_registry::evict_entry(name, args)
}
