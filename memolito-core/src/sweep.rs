//! Cache warming and whole-owner invalidation.
//!
//! Instead of probing an object at runtime for memoized members, each owner
//! type declares them up front: [`CacheOwner::MEMBERS`] is a per-type table
//! built at the definition site, and [`populate_cache`] walks it to force
//! every zero-argument member to evaluate before a latency-sensitive phase.
//!
//! Members that need arguments beyond the owner cannot be warmed blindly;
//! their thunks report [`SweepError::RequiresArguments`], which the sweep
//! logs and skips. Any other failure aborts the sweep and propagates.
//!
//! # Examples
//!
//! ```
//! use memolito_core::{
//!     populate_cache, CacheOwner, InstanceCache, MemberDescriptor, MemoizedProperty, SweepError,
//! };
//!
//! struct Sensor {
//!     cache: InstanceCache,
//! }
//!
//! static SERIAL: MemoizedProperty<String> = MemoizedProperty::new("Sensor::serial");
//!
//! impl Sensor {
//!     fn serial(&self) -> String {
//!         SERIAL.get(&self.cache, || "SN-001".to_string())
//!     }
//! }
//!
//! impl CacheOwner for Sensor {
//!     const MEMBERS: &'static [MemberDescriptor<Self>] = &[
//!         MemberDescriptor {
//!             name: "Sensor::serial",
//!             warm: |sensor| {
//!                 sensor.serial();
//!                 Ok(())
//!             },
//!         },
//!         // Needs a channel argument; warmed lazily on first real call.
//!         MemberDescriptor {
//!             name: "Sensor::reading",
//!             warm: |_| Err(SweepError::RequiresArguments { member: "Sensor::reading" }),
//!         },
//!     ];
//!
//!     fn instance_cache(&self) -> &InstanceCache {
//!         &self.cache
//!     }
//! }
//!
//! let sensor = Sensor { cache: InstanceCache::new() };
//! populate_cache(&sensor, &[]).unwrap();
//! assert!(sensor.cache.contains("Sensor::serial"));
//! ```

use thiserror::Error;

use crate::instance::InstanceCache;

/// Failure modes of a warm-up evaluation.
#[derive(Debug, Error)]
pub enum SweepError {
    /// The member takes arguments beyond the owner, so the sweep cannot
    /// evaluate it. Logged and skipped; never fatal to the sweep.
    #[error("member `{member}` requires arguments beyond the owner")]
    RequiresArguments {
        /// Identity of the member that was skipped.
        member: &'static str,
    },

    /// The member's computation itself failed. Propagated to the caller of
    /// [`populate_cache`] unmodified.
    #[error("member `{member}` failed to evaluate")]
    Evaluation {
        /// Identity of the member that failed.
        member: &'static str,
        /// The underlying computation error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// One entry of an owner type's member table.
pub struct MemberDescriptor<O: ?Sized> {
    /// The member's stable identity.
    pub name: &'static str,
    /// Forces the member to evaluate on the given owner.
    pub warm: fn(&O) -> Result<(), SweepError>,
}

/// Types with memoized members and an embedded cache slot.
///
/// Implemented by hand (or by generated code) at the definition site of the
/// members, which keeps the member table in one place and makes the sweep a
/// plain iteration rather than runtime introspection.
pub trait CacheOwner: 'static {
    /// Every memoized member of this type.
    const MEMBERS: &'static [MemberDescriptor<Self>];

    /// The owner's flat cache slot.
    fn instance_cache(&self) -> &InstanceCache;
}

/// Evaluates every memoized member of `owner` to pre-warm its caches.
///
/// Members listed in `skip` are not touched. Members whose thunks report
/// [`SweepError::RequiresArguments`] are logged at debug level and skipped;
/// any other error aborts the sweep and is returned.
pub fn populate_cache<O: CacheOwner>(owner: &O, skip: &[&str]) -> Result<(), SweepError> {
    for member in O::MEMBERS {
        if skip.contains(&member.name) {
            continue;
        }
        tracing::debug!(member = member.name, "warming memoized member");
        match (member.warm)(owner) {
            Ok(()) => {}
            Err(SweepError::RequiresArguments { member }) => {
                tracing::debug!(member, "member requires arguments; skipped during sweep");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

/// Empties the owner's whole cache slot. An owner whose slot was never
/// created is a quiet no-op.
pub fn clear_cache<O: CacheOwner>(owner: &O) {
    owner.instance_cache().clear();
}
