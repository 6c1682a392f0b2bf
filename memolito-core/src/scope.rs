//! Scoped suppression of cache reads.
//!
//! Every store read consults a per-thread flag before looking anything up.
//! [`disable_caching`] flips the flag off for the current thread and returns
//! a guard that restores the previously observed value when dropped, so
//! scopes nest and the flag survives early returns and unwinding. Writes are
//! unaffected: values cached inside a disabled scope become visible once the
//! scope ends.
//!
//! The flag is strictly thread-local. A disabled scope on one thread never
//! leaks into reads performed by another.
//!
//! # Examples
//!
//! ```
//! use memolito_core::scope;
//!
//! assert!(scope::caching_enabled());
//! {
//!     let _guard = scope::disable_caching();
//!     assert!(!scope::caching_enabled());
//! }
//! assert!(scope::caching_enabled());
//! ```

use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    static CACHING_ENABLED: Cell<bool> = Cell::new(true);
}

/// Returns whether cache reads are currently enabled on this thread.
pub fn caching_enabled() -> bool {
    CACHING_ENABLED.with(|flag| flag.get())
}

/// Disables cache reads on the current thread until the returned guard is
/// dropped.
///
/// Each guard saves the flag value it observed on entry and restores exactly
/// that value, so nested scopes compose:
///
/// ```
/// use memolito_core::scope;
///
/// let outer = scope::disable_caching();
/// {
///     let _inner = scope::disable_caching();
///     assert!(!scope::caching_enabled());
/// }
/// // Still disabled: the inner guard restored what it saw (disabled).
/// assert!(!scope::caching_enabled());
/// drop(outer);
/// assert!(scope::caching_enabled());
/// ```
pub fn disable_caching() -> CachingDisabled {
    let previous = CACHING_ENABLED.with(|flag| flag.replace(false));
    CachingDisabled {
        previous,
        _not_send: PhantomData,
    }
}

/// Guard returned by [`disable_caching`]. Restores the saved flag value on
/// drop.
#[must_use = "caching is re-enabled as soon as the guard is dropped"]
pub struct CachingDisabled {
    previous: bool,
    // The guard must be dropped on the thread whose flag it saved.
    _not_send: PhantomData<*const ()>,
}

impl Drop for CachingDisabled {
    fn drop(&mut self) {
        let previous = self.previous;
        CACHING_ENABLED.with(|flag| flag.set(previous));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_by_default() {
        assert!(caching_enabled());
    }

    #[test]
    fn test_guard_restores_on_drop() {
        {
            let _guard = disable_caching();
            assert!(!caching_enabled());
        }
        assert!(caching_enabled());
    }

    #[test]
    fn test_nested_scopes_compose() {
        let outer = disable_caching();
        assert!(!caching_enabled());
        {
            let _inner = disable_caching();
            assert!(!caching_enabled());
        }
        assert!(!caching_enabled());
        drop(outer);
        assert!(caching_enabled());
    }

    #[test]
    fn test_restored_after_panic() {
        let result = std::panic::catch_unwind(|| {
            let _guard = disable_caching();
            panic!("interrupted inside the scope");
        });
        assert!(result.is_err());
        assert!(caching_enabled());
    }

    #[test]
    fn test_flag_is_thread_local() {
        let _guard = disable_caching();
        assert!(!caching_enabled());

        let other = std::thread::spawn(caching_enabled).join().unwrap();
        assert!(other, "another thread must not observe this thread's scope");
    }
}
