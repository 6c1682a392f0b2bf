//! Process-wide directory of function caches.
//!
//! Caches generated by `#[memoized]` live as `static`s inside the expanded
//! function body, out of reach of ordinary code. Each expansion registers a
//! pair of callbacks here under the function's name (or its `name = "..."`
//! override), which keeps manual invalidation possible from anywhere:
//!
//! ```
//! use memolito_core::function_registry;
//!
//! // Drop everything a memoized function has cached so far:
//! function_registry::clear("fetch_user");
//!
//! // Or drop a single argument tuple:
//! use memolito_core::CallArgs;
//! let args = CallArgs::new().positional(&42_u32);
//! function_registry::evict_entry("fetch_user", &args);
//! ```
//!
//! Names that were never registered are silently ignored (both calls return
//! `false`), so invalidation code does not need to care whether the function
//! it targets is actually memoized.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::keys::{self, CallArgs};

struct RegisteredCache {
    clear: Arc<dyn Fn() + Send + Sync>,
    evict_key: Arc<dyn Fn(&str) + Send + Sync>,
}

static FUNCTION_REGISTRY: Lazy<RwLock<HashMap<String, RegisteredCache>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Registers a function cache's invalidation callbacks under a name.
///
/// Called from `#[memoized]` expansions behind a `std::sync::Once`, so each
/// function registers at most once, on its first call. Registering the same
/// name again replaces the previous callbacks.
pub fn register(
    name: &str,
    clear: impl Fn() + Send + Sync + 'static,
    evict_key: impl Fn(&str) + Send + Sync + 'static,
) {
    let mut registry = FUNCTION_REGISTRY.write();
    registry.insert(
        name.to_string(),
        RegisteredCache {
            clear: Arc::new(clear),
            evict_key: Arc::new(evict_key),
        },
    );
}

/// Empties the cache registered under `name`.
///
/// Returns `true` if such a cache was registered; unknown names do nothing.
pub fn clear(name: &str) -> bool {
    let callback = {
        let registry = FUNCTION_REGISTRY.read();
        registry.get(name).map(|cache| Arc::clone(&cache.clear))
    };
    match callback {
        Some(callback) => {
            callback();
            true
        }
        None => false,
    }
}

/// Removes the single entry matching `args` from the cache registered under
/// `name`.
///
/// Returns `true` if the cache was registered and the arguments were
/// cacheable; unknown names, non-cacheable arguments and absent entries do
/// nothing.
pub fn evict_entry(name: &str, args: &CallArgs) -> bool {
    let key = match keys::function_key(args) {
        Some(key) => key,
        None => return false,
    };
    evict_key(name, &key)
}

/// Removes a single entry by its already-derived key.
pub fn evict_key(name: &str, key: &str) -> bool {
    let callback = {
        let registry = FUNCTION_REGISTRY.read();
        registry.get(name).map(|cache| Arc::clone(&cache.evict_key))
    };
    match callback {
        Some(callback) => {
            callback(key);
            true
        }
        None => false,
    }
}

/// Lists all registered cache names.
pub fn registered_names() -> Vec<String> {
    let registry = FUNCTION_REGISTRY.read();
    registry.keys().cloned().collect()
}

/// Removes every registration. Does not touch the caches themselves; only
/// the directory. Useful for test isolation.
pub fn reset() {
    FUNCTION_REGISTRY.write().clear();
}
