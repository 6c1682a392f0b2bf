//! Owner-embedded cache slots.
//!
//! A type with memoized members embeds one slot that all of its members
//! share. Two shapes are provided:
//!
//! * [`InstanceCache`] - a flat map from derived key to value, the default.
//!   Properties key by name, methods by [`method_key`](crate::method_key)
//!   (which embeds the member id), so a single flat map serves them all.
//! * [`TieredCache`] - a two-level slot for per-member cache policies: a
//!   validity-tracked outer map from member id to a pluggable per-member
//!   store. Choosing [`TimedStore`](crate::TimedStore) as the factory gives
//!   each member its own expiry window, and `invalidate_all` on the outer
//!   level is a bulk-miss across every member at once.
//!
//! Both slots initialize lazily on the first write, so owners that never
//! touch a memoized member never allocate. Values are type-erased
//! (`Box<dyn Any>`): members of different return types share the slot, and
//! each read downcasts back to the concrete type it stored.
//!
//! Slots use `RefCell` internally and are therefore single-threaded; wrap
//! the owner in a lock if it crosses threads.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;

use crate::scope;
use crate::store::{BasicStore, CacheStore, ValidityStore};

/// Boxed per-member store used by [`TieredCache`].
pub type BoxedMemberStore = Box<dyn CacheStore<Box<dyn Any>>>;

/// Flat per-instance cache slot.
///
/// # Examples
///
/// ```
/// use memolito_core::InstanceCache;
///
/// let cache = InstanceCache::new();
/// assert!(!cache.is_initialized());
///
/// cache.insert("answer", 42_u32);
/// assert_eq!(cache.get::<u32>("answer"), Some(42));
/// assert!(cache.is_initialized());
/// ```
#[derive(Default)]
pub struct InstanceCache {
    slot: RefCell<Option<HashMap<String, Box<dyn Any>>>>,
}

impl InstanceCache {
    /// Creates an empty slot. No map is allocated until the first write.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up and downcasts a value. Misses when the key is absent, when
    /// the stored value is of a different type, or when reads are disabled
    /// for the current scope.
    pub fn get<R: Clone + 'static>(&self, key: &str) -> Option<R> {
        if !scope::caching_enabled() {
            return None;
        }
        let slot = self.slot.borrow();
        slot.as_ref()?.get(key)?.downcast_ref::<R>().cloned()
    }

    /// Writes a value, creating the backing map on first use.
    pub fn insert<R: 'static>(&self, key: &str, value: R) {
        let mut slot = self.slot.borrow_mut();
        slot.get_or_insert_with(HashMap::new)
            .insert(key.to_string(), Box::new(value));
    }

    /// Removes one entry. Returns whether an entry existed; absent keys and
    /// an uninitialized slot are quiet no-ops.
    pub fn remove(&self, key: &str) -> bool {
        let mut slot = self.slot.borrow_mut();
        match slot.as_mut() {
            Some(entries) => entries.remove(key).is_some(),
            None => false,
        }
    }

    /// Empties the slot without deallocating it. A never-initialized slot is
    /// a no-op.
    pub fn clear(&self) {
        if let Some(entries) = self.slot.borrow_mut().as_mut() {
            entries.clear();
        }
    }

    /// Physical presence check, independent of scope suppression.
    pub fn contains(&self, key: &str) -> bool {
        let slot = self.slot.borrow();
        slot.as_ref().is_some_and(|entries| entries.contains_key(key))
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        let slot = self.slot.borrow();
        slot.as_ref().map_or(0, HashMap::len)
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the backing map has been created yet.
    pub fn is_initialized(&self) -> bool {
        self.slot.borrow().is_some()
    }
}

impl std::fmt::Debug for InstanceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceCache")
            .field("initialized", &self.is_initialized())
            .field("len", &self.len())
            .finish()
    }
}

/// Two-level per-instance cache slot with pluggable per-member stores.
///
/// The outer level maps member id to that member's store and is validity
/// tracked: [`invalidate_all`](TieredCache::invalidate_all) makes every
/// member miss at once while keeping the stores warm, and the next write
/// into a member's store puts that member back in service.
///
/// # Examples
///
/// ```
/// use memolito_core::{BasicStore, TieredCache, TimedStore};
/// use std::time::Duration;
///
/// // Default: a plain store per member.
/// let cache = TieredCache::new();
/// cache.insert("Sensor::reading", "Sensor::reading|3", 21_u32);
/// assert_eq!(cache.get::<u32>("Sensor::reading", "Sensor::reading|3"), Some(21));
///
/// // Per-member expiry instead:
/// let timed = TieredCache::with_store_factory(|| {
///     Box::new(TimedStore::new(Duration::from_secs(30)))
/// });
/// timed.insert("Sensor::reading", "Sensor::reading|3", 21_u32);
/// ```
pub struct TieredCache {
    slot: RefCell<Option<ValidityStore<BoxedMemberStore>>>,
    store_factory: fn() -> BoxedMemberStore,
}

impl TieredCache {
    /// Creates a slot whose members each get a [`BasicStore`].
    pub fn new() -> Self {
        Self::with_store_factory(|| Box::new(BasicStore::new()))
    }

    /// Creates a slot with a custom per-member store constructor, invoked
    /// once per member on its first write.
    pub fn with_store_factory(store_factory: fn() -> BoxedMemberStore) -> Self {
        Self {
            slot: RefCell::new(None),
            store_factory,
        }
    }

    /// Looks up and downcasts a value for one member. Misses when the
    /// member was invalidated at the outer level, when the member's store
    /// misses (absent, expired, ...), or when reads are disabled for the
    /// current scope.
    pub fn get<R: Clone + 'static>(&self, member_id: &str, key: &str) -> Option<R> {
        let slot = self.slot.borrow();
        let store = slot.as_ref()?.get(member_id)?;
        store.get(key)?.downcast_ref::<R>().cloned()
    }

    /// Writes a value into one member's store, creating the outer map and
    /// the member's store as needed. Writing puts the member back in the
    /// outer valid set, so re-population after `invalidate_all` takes
    /// effect immediately.
    pub fn insert<R: 'static>(&self, member_id: &str, key: &str, value: R) {
        let mut slot = self.slot.borrow_mut();
        let outer = slot.get_or_insert_with(ValidityStore::new);
        if outer.get_raw(member_id).is_none() {
            outer.insert(member_id, (self.store_factory)());
        } else {
            outer.revalidate(member_id);
        }
        if let Some(store) = outer.get_raw_mut(member_id) {
            store.insert(key, Box::new(value));
        }
    }

    /// Removes one entry from one member's store.
    pub fn remove(&self, member_id: &str, key: &str) -> bool {
        let mut slot = self.slot.borrow_mut();
        match slot.as_mut().and_then(|outer| outer.get_raw_mut(member_id)) {
            Some(store) => store.remove(key).is_some(),
            None => false,
        }
    }

    /// Marks every member invalid without discarding any store. Reads miss
    /// until each member is written again.
    pub fn invalidate_all(&self) {
        if let Some(outer) = self.slot.borrow_mut().as_mut() {
            outer.invalidate_all();
        }
    }

    /// Drops every member store. A never-initialized slot is a no-op.
    pub fn clear(&self) {
        if let Some(outer) = self.slot.borrow_mut().as_mut() {
            outer.clear();
        }
    }

    /// Physical presence of a member's store, ignoring outer validity.
    pub fn contains_member(&self, member_id: &str) -> bool {
        let slot = self.slot.borrow();
        slot.as_ref().is_some_and(|outer| outer.contains_raw(member_id))
    }

    /// Whether the outer map has been created yet.
    pub fn is_initialized(&self) -> bool {
        self.slot.borrow().is_some()
    }
}

impl Default for TieredCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TieredCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredCache")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::TimedStore;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_lazy_initialization() {
        let cache = InstanceCache::new();
        assert!(!cache.is_initialized());
        assert_eq!(cache.get::<u32>("k"), None);
        assert!(!cache.is_initialized(), "reads must not allocate the slot");

        cache.insert("k", 1_u32);
        assert!(cache.is_initialized());
    }

    #[test]
    fn test_clear_without_slot_is_noop() {
        let cache = InstanceCache::new();
        cache.clear();
        assert!(!cache.is_initialized());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let cache = InstanceCache::new();
        assert!(!cache.remove("k"));
        cache.insert("k", 1_u32);
        assert!(cache.remove("k"));
        assert!(!cache.remove("k"));
    }

    #[test]
    fn test_heterogeneous_values() {
        let cache = InstanceCache::new();
        cache.insert("n", 42_u32);
        cache.insert("s", "hello".to_string());
        assert_eq!(cache.get::<u32>("n"), Some(42));
        assert_eq!(cache.get::<String>("s"), Some("hello".to_string()));
    }

    #[test]
    fn test_type_mismatch_reads_as_miss() {
        let cache = InstanceCache::new();
        cache.insert("k", 42_u32);
        assert_eq!(cache.get::<String>("k"), None);
    }

    #[test]
    fn test_scope_suppression() {
        let cache = InstanceCache::new();
        cache.insert("k", 1_u32);
        {
            let _guard = scope::disable_caching();
            assert_eq!(cache.get::<u32>("k"), None);
        }
        assert_eq!(cache.get::<u32>("k"), Some(1));
    }

    #[test]
    fn test_tiered_insert_get() {
        let cache = TieredCache::new();
        cache.insert("m1", "m1|1", 10_u32);
        cache.insert("m2", "m2|1", 20_u32);
        assert_eq!(cache.get::<u32>("m1", "m1|1"), Some(10));
        assert_eq!(cache.get::<u32>("m2", "m2|1"), Some(20));
        assert_eq!(cache.get::<u32>("m1", "m1|2"), None);
    }

    #[test]
    fn test_tiered_invalidate_all_then_repopulate() {
        let cache = TieredCache::new();
        cache.insert("m1", "k", 1_u32);
        cache.insert("m2", "k", 2_u32);

        cache.invalidate_all();
        assert_eq!(cache.get::<u32>("m1", "k"), None);
        assert_eq!(cache.get::<u32>("m2", "k"), None);
        assert!(cache.contains_member("m1"));

        // Writing one member brings only that member back.
        cache.insert("m1", "k", 11_u32);
        assert_eq!(cache.get::<u32>("m1", "k"), Some(11));
        assert_eq!(cache.get::<u32>("m2", "k"), None);
    }

    #[test]
    fn test_tiered_remove_single_entry() {
        let cache = TieredCache::new();
        cache.insert("m", "k1", 1_u32);
        cache.insert("m", "k2", 2_u32);
        assert!(cache.remove("m", "k1"));
        assert_eq!(cache.get::<u32>("m", "k1"), None);
        assert_eq!(cache.get::<u32>("m", "k2"), Some(2));
    }

    #[test]
    fn test_tiered_with_timed_member_stores() {
        // The factory is a fn pointer, so the deterministic clock is routed
        // through a thread-local rather than a capture.
        thread_local! {
            static CLOCK: Arc<ManualClock> = ManualClock::shared();
        }

        let cache = TieredCache::with_store_factory(|| {
            let clock = CLOCK.with(Arc::clone);
            Box::new(TimedStore::with_clock(Duration::from_secs(10), clock))
        });

        cache.insert("m", "k", 5_u32);
        CLOCK.with(|c| c.advance(Duration::from_secs(5)));
        assert_eq!(cache.get::<u32>("m", "k"), Some(5));

        CLOCK.with(|c| c.advance(Duration::from_secs(10)));
        assert_eq!(cache.get::<u32>("m", "k"), None);
    }

    #[test]
    fn test_tiered_scope_suppression() {
        let cache = TieredCache::new();
        cache.insert("m", "k", 1_u32);
        {
            let _guard = scope::disable_caching();
            assert_eq!(cache.get::<u32>("m", "k"), None);
        }
        assert_eq!(cache.get::<u32>("m", "k"), Some(1));
    }
}
