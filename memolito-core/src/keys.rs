//! Cache key derivation.
//!
//! A cache key is a `String` assembled from the identity of the memoized
//! member and the call arguments. Key parts come from the [`CacheableKey`]
//! trait, whose `to_cache_key` returns `None` for values that have no stable
//! identity usable as a key (interior-mutable state, live handles, ...). A
//! single `None` part makes the whole derivation report "not cacheable" and
//! the caller is expected to run the computation uncached.
//!
//! Two derivation schemes exist and are intentionally kept distinct:
//!
//! * **Method scheme** ([`method_key`]): `member id | positional parts |
//!   named parts as values only, in lexicographic name order`. Used by
//!   [`MemoizedMethod`](crate::MemoizedMethod), where one per-instance store
//!   is shared by several members and the id disambiguates them.
//! * **Function scheme** ([`function_key`]): no leading id (the store is
//!   already per-function); positional parts followed by named parts rendered
//!   as `name=value` pairs in a canonical, insertion-order-independent order.
//!
//! The schemes differ in how named parts collide (the method scheme drops
//! names, the function scheme keeps them). Callers must not mix them.

use std::fmt::Debug;

/// Trait for types that can contribute a part to a cache key.
///
/// Returning `None` marks the value as having no identity suitable for
/// keying; the memoization layer will then skip caching for the whole call
/// and execute the computation directly.
///
/// Implementations must be stable: two values that compare equal must render
/// the same part, and unequal values should render different parts with high
/// probability.
///
/// # Examples
///
/// ```
/// use memolito_core::CacheableKey;
///
/// #[derive(Debug, Clone)]
/// struct UserId(u64);
///
/// impl CacheableKey for UserId {
///     fn to_cache_key(&self) -> Option<String> {
///         Some(format!("user:{}", self.0))
///     }
/// }
///
/// assert_eq!(UserId(7).to_cache_key(), Some("user:7".to_string()));
/// ```
///
/// A value backed by shared mutable state opts out instead:
///
/// ```
/// use memolito_core::CacheableKey;
/// use std::cell::RefCell;
///
/// struct ScratchBuffer(RefCell<Vec<u8>>);
///
/// impl CacheableKey for ScratchBuffer {
///     fn to_cache_key(&self) -> Option<String> {
///         None
///     }
/// }
/// ```
pub trait CacheableKey {
    /// Renders this value as a cache key part, or `None` if it has no
    /// stable identity.
    fn to_cache_key(&self) -> Option<String>;
}

/// Marker trait that derives a cache key part from the `Debug`
/// representation.
///
/// Implement this for your own types when the derived `Debug` output is a
/// faithful identity:
///
/// ```
/// use memolito_core::{CacheableKey, DefaultCacheableKey};
///
/// #[derive(Debug, Clone)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl DefaultCacheableKey for Point {}
///
/// assert_eq!(Point { x: 1, y: 2 }.to_cache_key(), Some("Point { x: 1, y: 2 }".to_string()));
/// ```
///
/// Implement [`CacheableKey`] directly instead when a cheaper or more precise
/// rendering exists; a type must not implement both.
pub trait DefaultCacheableKey: Debug {}

impl<T: DefaultCacheableKey> CacheableKey for T {
    fn to_cache_key(&self) -> Option<String> {
        Some(format!("{:?}", self))
    }
}

macro_rules! impl_cacheable_key_via_to_string {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CacheableKey for $ty {
                fn to_cache_key(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

impl_cacheable_key_via_to_string!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, bool, char, String,
);

impl CacheableKey for str {
    fn to_cache_key(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl CacheableKey for f32 {
    fn to_cache_key(&self) -> Option<String> {
        // Debug formatting keeps -0.0 and NaN distinguishable from their
        // Display renderings.
        Some(format!("{:?}", self))
    }
}

impl CacheableKey for f64 {
    fn to_cache_key(&self) -> Option<String> {
        Some(format!("{:?}", self))
    }
}

impl CacheableKey for () {
    fn to_cache_key(&self) -> Option<String> {
        Some("()".to_string())
    }
}

/// Separator between key parts.
///
/// Key parts are joined the same way the `#[memoized]` macro joins them, so
/// keys derived manually and keys derived by generated code agree.
const PART_SEPARATOR: &str = "|";

/// Ordered positional parts plus named parts for one call.
///
/// This is the argument-capture side of key derivation: each part is resolved
/// to its rendering (or `None`) at push time, so a `CallArgs` owns no
/// borrows. Build it fluently:
///
/// ```
/// use memolito_core::CallArgs;
///
/// let args = CallArgs::new().positional(&3_u32).named("depth", &9_u32);
/// assert!(!args.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    positional: Vec<Option<String>>,
    named: Vec<(&'static str, Option<String>)>,
}

impl CallArgs {
    /// Creates an empty argument list (the zero-argument call).
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn positional(mut self, part: &dyn CacheableKey) -> Self {
        self.positional.push(part.to_cache_key());
        self
    }

    /// Appends a named argument. The key schemes decide whether `name`
    /// participates in the key.
    pub fn named(mut self, name: &'static str, part: &dyn CacheableKey) -> Self {
        self.named.push((name, part.to_cache_key()));
        self
    }

    /// Appends an already-rendered positional part. Used by generated code,
    /// which resolves parts via method-call syntax to get auto-deref on
    /// reference arguments.
    pub fn positional_part(mut self, part: Option<String>) -> Self {
        self.positional.push(part);
        self
    }

    /// Appends an already-rendered named part.
    pub fn named_part(mut self, name: &'static str, part: Option<String>) -> Self {
        self.named.push((name, part));
        self
    }

    /// True when no arguments were captured.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Total number of captured arguments.
    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }
}

/// Derives a cache key for an instance-method call.
///
/// Zero-argument calls key on the member id alone. Otherwise the key is the
/// id, the positional parts in order, and the named parts' *values* in
/// lexicographic name order; the names themselves do not participate, which
/// makes a value passed by name key identically to the same value passed
/// positionally.
///
/// Returns `None` when any part has no cache identity.
pub fn method_key(member_id: &str, args: &CallArgs) -> Option<String> {
    if args.is_empty() {
        return Some(member_id.to_string());
    }

    let mut parts = Vec::with_capacity(1 + args.len());
    parts.push(member_id.to_string());
    for part in &args.positional {
        parts.push(part.clone()?);
    }

    let mut named: Vec<&(&'static str, Option<String>)> = args.named.iter().collect();
    named.sort_by_key(|(name, _)| *name);
    for (_, part) in named {
        parts.push(part.clone()?);
    }

    Some(parts.join(PART_SEPARATOR))
}

/// Derives a cache key for a free-function call.
///
/// The store consulted is already per-function, so no identity prefix is
/// added. Positional parts keep their order; named parts are rendered as
/// `name=value` and canonically ordered, so the key never depends on the
/// order the named parts were pushed in. Unlike [`method_key`], the names
/// do participate.
///
/// Returns `None` when any part has no cache identity.
pub fn function_key(args: &CallArgs) -> Option<String> {
    let mut parts = Vec::with_capacity(args.len());
    for part in &args.positional {
        parts.push(part.clone()?);
    }

    let mut named = Vec::with_capacity(args.named.len());
    for (name, part) in &args.named {
        named.push(format!("{}={}", name, part.clone()?));
    }
    named.sort();
    parts.extend(named);

    Some(parts.join(PART_SEPARATOR))
}
