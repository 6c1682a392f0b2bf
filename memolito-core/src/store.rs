//! Key/value stores backing the memoization layer.
//!
//! Three variants with one object-safe contract:
//!
//! * [`BasicStore`] - a plain map; present means hit.
//! * [`ValidityStore`] - adds a valid-key set on top of the map, so an entry
//!   can be *present but not served* after a bulk [`invalidate_all`]. Useful
//!   when re-population always follows a miss: serving stops immediately,
//!   while the storage stays warm to be overwritten.
//! * [`TimedStore`] - a validity store whose entries also expire a fixed
//!   interval after they were written, against an injected [`Clock`].
//!
//! Every read consults [`scope::caching_enabled`] first; inside a disabled
//! scope all reads miss unconditionally, while writes proceed as usual.
//! None of the stores synchronize internally - callers that share a store
//! across threads serialize access themselves.
//!
//! Stores never bound their size. An entry leaves the map only through
//! [`remove`](CacheStore::remove) or [`clear`](CacheStore::clear).
//!
//! [`invalidate_all`]: ValidityStore::invalidate_all

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};
use crate::scope;

/// Common store contract. Object-safe so per-member stores can be chosen at
/// runtime (see [`TieredCache`](crate::TieredCache)).
pub trait CacheStore<V> {
    /// Looks up a value. `None` means the caller must recompute: the key may
    /// be absent, invalidated, expired, or reads may be disabled for the
    /// current scope.
    fn get(&self, key: &str) -> Option<&V>;

    /// Writes a value, replacing any previous entry under `key`.
    fn insert(&mut self, key: &str, value: V);

    /// Removes a single entry. Absent keys are a no-op.
    fn remove(&mut self, key: &str) -> Option<V>;

    /// Empties the store. Safe to call on an already-empty store.
    fn clear(&mut self);

    /// Number of physically stored entries (including invalidated ones).
    fn len(&self) -> usize;

    /// True when nothing is physically stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Plain map-backed store.
///
/// # Examples
///
/// ```
/// use memolito_core::{BasicStore, CacheStore};
///
/// let mut store = BasicStore::new();
/// store.insert("answer", 42);
/// assert_eq!(store.get("answer"), Some(&42));
/// store.clear();
/// assert_eq!(store.get("answer"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BasicStore<V> {
    entries: HashMap<String, V>,
}

impl<V> BasicStore<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> CacheStore<V> for BasicStore<V> {
    fn get(&self, key: &str) -> Option<&V> {
        if !scope::caching_enabled() {
            return None;
        }
        self.entries.get(key)
    }

    fn insert(&mut self, key: &str, value: V) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.remove(key)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Store that distinguishes "present" from "present and currently valid".
///
/// [`insert`](CacheStore::insert) marks the key valid; [`invalidate_all`]
/// clears the valid set without discarding values. A key that is physically
/// present but not in the valid set reads as a miss, exactly like a key that
/// was never written:
///
/// ```
/// use memolito_core::{CacheStore, ValidityStore};
///
/// let mut store = ValidityStore::new();
/// store.insert("k", 1);
/// store.invalidate_all();
/// assert_eq!(store.get("k"), None);
/// assert!(store.contains_raw("k")); // value still held
///
/// store.insert("k", 2);
/// assert_eq!(store.get("k"), Some(&2));
/// ```
///
/// [`invalidate_all`]: ValidityStore::invalidate_all
#[derive(Debug, Clone, Default)]
pub struct ValidityStore<V> {
    entries: HashMap<String, V>,
    valid: HashSet<String>,
}

impl<V> ValidityStore<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            valid: HashSet::new(),
        }
    }

    /// Marks every entry invalid without discarding anything. Subsequent
    /// reads miss until the keys are written again.
    pub fn invalidate_all(&mut self) {
        tracing::debug!(entries = self.entries.len(), "invalidating all cache entries");
        self.valid.clear();
    }

    /// Physical presence check, ignoring validity, expiry and scope.
    pub fn contains_raw(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Physical lookup, ignoring validity, expiry and scope.
    pub fn get_raw(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// Mutable physical lookup. Together with [`revalidate`] this is the
    /// write path for layered stores that keep live containers behind the
    /// validity gate.
    ///
    /// [`revalidate`]: ValidityStore::revalidate
    pub fn get_raw_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    /// Puts an existing key back in the valid set. No-op for keys that were
    /// never written.
    pub fn revalidate(&mut self, key: &str) {
        if self.entries.contains_key(key) {
            self.valid.insert(key.to_string());
        }
    }
}

impl<V> CacheStore<V> for ValidityStore<V> {
    fn get(&self, key: &str) -> Option<&V> {
        if !scope::caching_enabled() {
            return None;
        }
        if !self.valid.contains(key) {
            return None;
        }
        self.entries.get(key)
    }

    fn insert(&mut self, key: &str, value: V) {
        self.entries.insert(key.to_string(), value);
        self.valid.insert(key.to_string());
    }

    fn remove(&mut self, key: &str) -> Option<V> {
        self.valid.remove(key);
        self.entries.remove(key)
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.valid.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Value plus the instant it stops being served.
#[derive(Debug, Clone)]
struct TimedEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Validity store whose entries additionally expire.
///
/// Each write stamps the entry with `now() + poll_interval`. A read past
/// that instant misses; the entry stays in place and the next write simply
/// overwrites value and expiry together. Time comes from the injected
/// [`Clock`], so tests can drive expiry deterministically:
///
/// ```
/// use memolito_core::{CacheStore, ManualClock, TimedStore};
/// use std::time::Duration;
///
/// let clock = ManualClock::shared();
/// let mut store = TimedStore::with_clock(Duration::from_secs(10), clock.clone());
///
/// store.insert("k", "v");
/// clock.advance(Duration::from_secs(5));
/// assert_eq!(store.get("k"), Some(&"v"));
///
/// clock.advance(Duration::from_secs(10));
/// assert_eq!(store.get("k"), None);
/// ```
pub struct TimedStore<V> {
    inner: ValidityStore<TimedEntry<V>>,
    poll_interval: Duration,
    clock: Arc<dyn Clock>,
}

impl<V> TimedStore<V> {
    /// Creates a store whose entries expire `poll_interval` after each
    /// write, measured on the system clock.
    pub fn new(poll_interval: Duration) -> Self {
        Self::with_clock(poll_interval, Arc::new(SystemClock))
    }

    /// Same as [`new`](TimedStore::new) with an explicit time source.
    pub fn with_clock(poll_interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: ValidityStore::new(),
            poll_interval,
            clock,
        }
    }

    /// The configured expiry interval.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Marks every entry invalid, independent of expiry.
    pub fn invalidate_all(&mut self) {
        self.inner.invalidate_all();
    }

    /// Physical presence check, ignoring validity, expiry and scope.
    pub fn contains_raw(&self, key: &str) -> bool {
        self.inner.contains_raw(key)
    }
}

impl<V> CacheStore<V> for TimedStore<V> {
    fn get(&self, key: &str) -> Option<&V> {
        let entry = self.inner.get(key)?;
        if self.clock.now() > entry.expires_at {
            // Expired entries are left in place; the next insert overwrites
            // both value and expiry.
            return None;
        }
        Some(&entry.value)
    }

    fn insert(&mut self, key: &str, value: V) {
        let expires_at = self.clock.now() + self.poll_interval;
        self.inner.insert(key, TimedEntry { value, expires_at });
    }

    fn remove(&mut self, key: &str) -> Option<V> {
        self.inner.remove(key).map(|entry| entry.value)
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
