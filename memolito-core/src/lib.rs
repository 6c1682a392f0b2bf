//! # Memolito Core
//!
//! Core building blocks for the Memolito memoization library.
//!
//! This crate provides cache key derivation, the per-instance and
//! per-function cache storage, validity-tracked and timed store variants,
//! scoped suppression of cache reads, and the registry-driven cache sweep.
//!
//! ## Features
//!
//! - **Cache Key Derivation**: Flexible traits for custom or default cache
//!   keys, with a soft "not cacheable" path for arguments without a stable
//!   identity
//! - **Per-Instance Storage**: Lazily created, type-erased cache slots that
//!   owner types embed
//! - **Per-Function Storage**: Process-wide caches shared by all callers of
//!   a free function
//! - **Validity Tracking**: Serve/stop-serving decoupled from store/forget,
//!   plus timed expiry against an injected clock
//! - **Scoped Suppression**: Thread-local disable flag with guaranteed
//!   restore on scope exit
//! - **Cache Sweep**: Explicit per-type member tables for eager warm-up
//!
//! ## Module Organization
//!
//! - [`keys`] - Cache key derivation traits and the two keying schemes
//! - [`store`] - Plain, validity-tracked and timed stores
//! - [`clock`] - Injectable time source for timed stores
//! - [`scope`] - Thread-local suppression of cache reads
//! - [`instance`] - Owner-embedded cache slots (flat and tiered)
//! - [`members`] - Memoized property and method descriptors
//! - [`function`] - Per-function shared caches
//! - [`function_registry`] - Process-wide directory of function caches
//! - [`sweep`] - Cache warming and whole-owner invalidation
//! - [`lazy_dict`] - Fixed-key dictionary with lazily fetched values

mod clock;
mod function;
mod instance;
mod keys;
mod lazy_dict;
mod members;
mod store;

pub mod function_registry;
pub mod scope;
pub mod sweep;

pub use clock::{Clock, ManualClock, SystemClock};
pub use function::FunctionCache;
pub use instance::{BoxedMemberStore, InstanceCache, TieredCache};
pub use keys::{function_key, method_key, CacheableKey, CallArgs, DefaultCacheableKey};
pub use lazy_dict::LazyImmutableDict;
pub use members::{MemoizedMethod, MemoizedProperty};
pub use store::{BasicStore, CacheStore, TimedStore, ValidityStore};
pub use sweep::{clear_cache, populate_cache, CacheOwner, MemberDescriptor, SweepError};
