//! Memoized member descriptors.
//!
//! A descriptor is defined once per member at its definition site (typically
//! as a `static`, or generated by the `#[memoized]` attribute) and shared by
//! every instance of the defining type; per-instance state lives in the
//! owner's [`InstanceCache`](crate::InstanceCache) or
//! [`TieredCache`](crate::TieredCache) slot.
//!
//! * [`MemoizedProperty`] binds a zero-argument computed attribute, keyed by
//!   its name alone.
//! * [`MemoizedMethod`] binds a method with arguments, keyed through the
//!   method scheme so several methods share one slot without colliding.
//!
//! Arguments without a cache identity never fail the call: the computation
//! runs uncached and a debug event records which member was affected. A
//! computation that panics or returns `Err` stores nothing.

use crate::instance::{InstanceCache, TieredCache};
use crate::keys::{self, CallArgs};

/// Descriptor for a memoized zero-argument property.
///
/// The value is computed at most once per instance and then served from the
/// owner's slot until evicted.
///
/// # Examples
///
/// ```
/// use memolito_core::{InstanceCache, MemoizedProperty};
///
/// struct Circle {
///     radius: f64,
///     cache: InstanceCache,
/// }
///
/// static AREA: MemoizedProperty<f64> = MemoizedProperty::new("Circle::area");
///
/// impl Circle {
///     fn area(&self) -> f64 {
///         AREA.get(&self.cache, || self.radius * self.radius * std::f64::consts::PI)
///     }
/// }
///
/// let c = Circle { radius: 1.0, cache: InstanceCache::new() };
/// assert_eq!(c.area(), c.area());
/// ```
#[derive(Debug)]
pub struct MemoizedProperty<T> {
    name: &'static str,
    _value: std::marker::PhantomData<fn() -> T>,
}

impl<T: Clone + 'static> MemoizedProperty<T> {
    /// Creates a descriptor. `name` is the property's stable identity and
    /// its key in the owner's slot; qualify it with the type name to keep
    /// distinct types' properties distinguishable in diagnostics.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _value: std::marker::PhantomData,
        }
    }

    /// The property's stable identity.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the cached value or computes, stores and returns it.
    pub fn get(&self, cache: &InstanceCache, compute: impl FnOnce() -> T) -> T {
        if let Some(value) = cache.get::<T>(self.name) {
            return value;
        }
        let value = compute();
        cache.insert(self.name, value.clone());
        value
    }

    /// Drops the cached value so the next read recomputes. Absent values
    /// are a quiet no-op.
    pub fn evict(&self, cache: &InstanceCache) {
        cache.remove(self.name);
    }

    /// Whether a value is physically cached for this property.
    pub fn is_cached(&self, cache: &InstanceCache) -> bool {
        cache.contains(self.name)
    }
}

/// Descriptor for a memoized instance method.
///
/// The id is assigned at the definition site and shared across all instances
/// of the defining type; it distinguishes method A from method B inside one
/// slot.
///
/// # Examples
///
/// ```
/// use memolito_core::{CallArgs, InstanceCache, MemoizedMethod};
///
/// struct Fib {
///     cache: InstanceCache,
/// }
///
/// static NTH: MemoizedMethod = MemoizedMethod::new("Fib::nth");
///
/// impl Fib {
///     fn nth(&self, n: u64) -> u64 {
///         let args = CallArgs::new().positional(&n);
///         NTH.get_or_compute(&self.cache, &args, || {
///             if n <= 1 { n } else { self.nth(n - 1) + self.nth(n - 2) }
///         })
///     }
/// }
///
/// let f = Fib { cache: InstanceCache::new() };
/// assert_eq!(f.nth(20), 6765);
/// ```
#[derive(Debug)]
pub struct MemoizedMethod {
    id: &'static str,
}

impl MemoizedMethod {
    /// Creates a descriptor with a definition-site identity.
    pub const fn new(id: &'static str) -> Self {
        Self { id }
    }

    /// The method's stable identity.
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Returns the cached value for these arguments or computes, stores and
    /// returns it. Arguments without a cache identity run the computation
    /// directly, uncached.
    pub fn get_or_compute<R: Clone + 'static>(
        &self,
        cache: &InstanceCache,
        args: &CallArgs,
        compute: impl FnOnce() -> R,
    ) -> R {
        let key = match keys::method_key(self.id, args) {
            Some(key) => key,
            None => {
                tracing::debug!(
                    member = self.id,
                    "arguments have no cache identity; result will not be cached"
                );
                return compute();
            }
        };
        if let Some(value) = cache.get::<R>(&key) {
            return value;
        }
        let value = compute();
        cache.insert(&key, value.clone());
        value
    }

    /// Like [`get_or_compute`](MemoizedMethod::get_or_compute) for fallible
    /// computations: only `Ok` results are stored, so a failed call is
    /// retried on the next invocation.
    pub fn get_or_compute_result<T, E>(
        &self,
        cache: &InstanceCache,
        args: &CallArgs,
        compute: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E>
    where
        T: Clone + 'static,
        E: Clone + 'static,
    {
        let key = match keys::method_key(self.id, args) {
            Some(key) => key,
            None => {
                tracing::debug!(
                    member = self.id,
                    "arguments have no cache identity; result will not be cached"
                );
                return compute();
            }
        };
        if let Some(value) = cache.get::<Result<T, E>>(&key) {
            return value;
        }
        let result = compute();
        if result.is_ok() {
            cache.insert(&key, result.clone());
        }
        result
    }

    /// Removes the cached entry for exactly these arguments, leaving entries
    /// for other arguments intact. Unknown entries and non-cacheable
    /// arguments are a quiet no-op.
    pub fn evict_entry(&self, cache: &InstanceCache, args: &CallArgs) {
        if let Some(key) = keys::method_key(self.id, args) {
            cache.remove(&key);
        }
    }

    /// [`get_or_compute`](MemoizedMethod::get_or_compute) against a
    /// [`TieredCache`], where this method's entries live in their own
    /// per-member store (outer level keyed by the method id).
    pub fn get_or_compute_tiered<R: Clone + 'static>(
        &self,
        cache: &TieredCache,
        args: &CallArgs,
        compute: impl FnOnce() -> R,
    ) -> R {
        let key = match keys::method_key(self.id, args) {
            Some(key) => key,
            None => {
                tracing::debug!(
                    member = self.id,
                    "arguments have no cache identity; result will not be cached"
                );
                return compute();
            }
        };
        if let Some(value) = cache.get::<R>(self.id, &key) {
            return value;
        }
        let value = compute();
        cache.insert(self.id, &key, value.clone());
        value
    }

    /// Removes the tiered entry for exactly these arguments.
    pub fn evict_entry_tiered(&self, cache: &TieredCache, args: &CallArgs) {
        if let Some(key) = keys::method_key(self.id, args) {
            cache.remove(self.id, &key);
        }
    }
}
