//! Lazily populated, fixed-key dictionary.
//!
//! Use this when the key set is known up front but fetching each value is
//! expensive: values load on first access through the configured loader and
//! are served from the dictionary afterwards. Keys never change after
//! construction; looking up a key outside the set returns `None` without
//! invoking the loader.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;

/// Dictionary with a fixed key set and lazily fetched values.
///
/// # Examples
///
/// ```
/// use memolito_core::LazyImmutableDict;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let loads = Rc::new(Cell::new(0));
/// let counter = Rc::clone(&loads);
/// let dict = LazyImmutableDict::new(["alpha", "beta"], move |key: &&str| {
///     counter.set(counter.get() + 1);
///     key.to_uppercase()
/// });
///
/// assert_eq!(dict.get(&"alpha"), Some("ALPHA".to_string()));
/// assert_eq!(dict.get(&"alpha"), Some("ALPHA".to_string()));
/// assert_eq!(loads.get(), 1); // fetched once
/// assert_eq!(dict.get(&"gamma"), None); // outside the key set
/// ```
pub struct LazyImmutableDict<K, V> {
    entries: RefCell<HashMap<K, Option<V>>>,
    load: Box<dyn Fn(&K) -> V>,
}

impl<K: Eq + Hash + Clone, V: Clone> LazyImmutableDict<K, V> {
    /// Creates a dictionary over the given keys. No value is fetched yet.
    pub fn new<I>(keys: I, load: impl Fn(&K) -> V + 'static) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        let entries = keys.into_iter().map(|key| (key, None)).collect();
        Self {
            entries: RefCell::new(entries),
            load: Box::new(load),
        }
    }

    /// Returns the value for `key`, fetching it on first access. `None` for
    /// keys outside the set.
    pub fn get(&self, key: &K) -> Option<V> {
        {
            let entries = self.entries.borrow();
            match entries.get(key) {
                None => return None,
                Some(Some(value)) => return Some(value.clone()),
                Some(None) => {}
            }
        }

        // The borrow is released while the loader runs, so a loader that
        // reads other keys of this dictionary does not trip the RefCell.
        let value = (self.load)(key);
        let mut entries = self.entries.borrow_mut();
        let slot = entries.get_mut(key)?;
        Some(slot.get_or_insert(value).clone())
    }

    /// True when `key` belongs to the dictionary's key set, fetched or not.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// The dictionary's key set.
    pub fn keys(&self) -> Vec<K> {
        self.entries.borrow().keys().cloned().collect()
    }

    /// Number of keys (not of fetched values).
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// True when the key set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_values_load_once() {
        let loads = Rc::new(Cell::new(0));
        let counter = Rc::clone(&loads);
        let dict = LazyImmutableDict::new([1_u32, 2, 3], move |key: &u32| {
            counter.set(counter.get() + 1);
            key * 10
        });

        assert_eq!(dict.get(&2), Some(20));
        assert_eq!(dict.get(&2), Some(20));
        assert_eq!(loads.get(), 1);

        assert_eq!(dict.get(&3), Some(30));
        assert_eq!(loads.get(), 2);
    }

    #[test]
    fn test_unknown_key_never_loads() {
        let loads = Rc::new(Cell::new(0));
        let counter = Rc::clone(&loads);
        let dict = LazyImmutableDict::new([1_u32], move |_key: &u32| {
            counter.set(counter.get() + 1);
            0_u32
        });

        assert_eq!(dict.get(&9), None);
        assert_eq!(loads.get(), 0);
    }

    #[test]
    fn test_key_set_queries() {
        let dict = LazyImmutableDict::new(["a", "b"], |key: &&str| key.len());
        assert_eq!(dict.len(), 2);
        assert!(!dict.is_empty());
        assert!(dict.contains_key(&"a"));
        assert!(!dict.contains_key(&"z"));

        let mut keys = dict.keys();
        keys.sort_unstable();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
