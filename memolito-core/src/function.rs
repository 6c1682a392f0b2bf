//! Per-function shared caches.
//!
//! Unlike the per-instance slots, a [`FunctionCache`] is owned by the
//! computation itself: one `static` per function, shared by every caller in
//! the process. Declare it with `once_cell::sync::Lazy` (the `#[memoized]`
//! attribute generates exactly this):
//!
//! ```
//! use memolito_core::{CallArgs, FunctionCache};
//! use once_cell::sync::Lazy;
//!
//! static FIB_CACHE: Lazy<FunctionCache<u64>> = Lazy::new(FunctionCache::new);
//!
//! fn fib(n: u64) -> u64 {
//!     let args = CallArgs::new().positional(&n);
//!     FIB_CACHE.get_or_compute("fib", &args, || {
//!         if n <= 1 { n } else { fib(n - 1) + fib(n - 2) }
//!     })
//! }
//!
//! assert_eq!(fib(30), 832040);
//! ```
//!
//! Keys use the function scheme (no identity prefix; named parts keep their
//! names, order-independent). Storage sits behind a `parking_lot::RwLock`,
//! so concurrent readers never block each other; no cross-call atomicity is
//! promised, and two racing callers may both run the computation - the
//! second write wins, with identical results for a pure function.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::keys::{self, CallArgs};
use crate::scope;

/// Process-wide cache for one free function.
pub struct FunctionCache<R> {
    entries: RwLock<HashMap<String, R>>,
}

impl<R> Default for FunctionCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> FunctionCache<R> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Empties the cache.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Removes one entry by its derived key. Used by the registry, which
    /// stores keys rather than typed arguments.
    pub fn evict_key(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Removes the entry for exactly these arguments. Non-cacheable
    /// arguments and unknown entries are a quiet no-op.
    pub fn evict_entry(&self, args: &CallArgs) -> bool {
        match keys::function_key(args) {
            Some(key) => self.evict_key(&key),
            None => false,
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: Clone> FunctionCache<R> {
    /// Looks up a value by its derived key. Misses inside a disabled
    /// caching scope.
    pub fn get(&self, key: &str) -> Option<R> {
        if !scope::caching_enabled() {
            return None;
        }
        self.entries.read().get(key).cloned()
    }

    /// Writes a value under its derived key.
    pub fn insert(&self, key: &str, value: R) {
        self.entries.write().insert(key.to_string(), value);
    }

    /// Returns the cached value for these arguments or computes, stores and
    /// returns it. `name` only labels the diagnostic emitted when the
    /// arguments have no cache identity.
    pub fn get_or_compute(&self, name: &str, args: &CallArgs, compute: impl FnOnce() -> R) -> R {
        let key = match keys::function_key(args) {
            Some(key) => key,
            None => {
                tracing::debug!(
                    function = name,
                    "arguments have no cache identity; result will not be cached"
                );
                return compute();
            }
        };
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = compute();
        self.insert(&key, value.clone());
        value
    }
}

/// Result-aware variant: only `Ok` values enter the cache, so a failing
/// call is retried on the next invocation instead of serving a stale error.
impl<T: Clone, E: Clone> FunctionCache<Result<T, E>> {
    /// Writes a result only if it is `Ok`.
    pub fn insert_result(&self, key: &str, value: &Result<T, E>) {
        if let Ok(inner) = value {
            self.insert(key, Ok(inner.clone()));
        }
    }

    /// [`get_or_compute`](FunctionCache::get_or_compute) for fallible
    /// computations; `Err` results pass through uncached.
    pub fn get_or_compute_result(
        &self,
        name: &str,
        args: &CallArgs,
        compute: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let key = match keys::function_key(args) {
            Some(key) => key,
            None => {
                tracing::debug!(
                    function = name,
                    "arguments have no cache identity; result will not be cached"
                );
                return compute();
            }
        };
        if let Some(value) = self.get(&key) {
            return value;
        }
        let result = compute();
        self.insert_result(&key, &result);
        result
    }
}
