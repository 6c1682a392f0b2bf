//! Per-instance memoized properties and methods, plus cache sweeping.
//!
//! Run with: cargo run --example lazy_properties

use memolito::{
    clear_cache, memoized, populate_cache, scope, CacheOwner, InstanceCache, MemberDescriptor,
    MemoizedProperty, SweepError,
};

struct Catalog {
    entries: Vec<(String, u64)>,
    cache: InstanceCache,
}

static TOTAL_VALUE: MemoizedProperty<u64> = MemoizedProperty::new("Catalog::total_value");

impl Catalog {
    fn new(entries: Vec<(String, u64)>) -> Self {
        Self {
            entries,
            cache: InstanceCache::new(),
        }
    }

    fn total_value(&self) -> u64 {
        TOTAL_VALUE.get(&self.cache, || {
            println!("  ... summing {} entries", self.entries.len());
            self.entries.iter().map(|(_, price)| price).sum()
        })
    }

    #[memoized(slot = "cache")]
    fn priced_above(&self, threshold: u64) -> usize {
        println!("  ... scanning for entries above {threshold}");
        self.entries.iter().filter(|(_, price)| *price > threshold).count()
    }
}

impl CacheOwner for Catalog {
    const MEMBERS: &'static [MemberDescriptor<Self>] = &[
        MemberDescriptor {
            name: "Catalog::total_value",
            warm: |catalog| {
                catalog.total_value();
                Ok(())
            },
        },
        MemberDescriptor {
            name: "Catalog::priced_above",
            warm: |_| Err(SweepError::RequiresArguments { member: "Catalog::priced_above" }),
        },
    ];

    fn instance_cache(&self) -> &InstanceCache {
        &self.cache
    }
}

fn main() {
    let catalog = Catalog::new(vec![
        ("anvil".to_string(), 120),
        ("rope".to_string(), 15),
        ("lantern".to_string(), 42),
    ]);

    println!("first read computes:");
    println!("total = {}", catalog.total_value());
    println!("second read is served from the slot:");
    println!("total = {}", catalog.total_value());

    println!("methods cache per argument:");
    println!("above 20: {}", catalog.priced_above(20));
    println!("above 20: {} (cached)", catalog.priced_above(20));

    println!("inside a disabled scope every read recomputes:");
    {
        let _guard = scope::disable_caching();
        println!("total = {}", catalog.total_value());
    }
    println!("after the scope the cache serves again:");
    println!("total = {}", catalog.total_value());

    println!("sweeping a fresh catalog warms all zero-argument members:");
    let fresh = Catalog::new(vec![("bucket".to_string(), 9)]);
    populate_cache(&fresh, &[]).expect("sweep failed");
    println!("warmed total = {}", fresh.total_value());

    clear_cache(&fresh);
    println!("cleared; next read computes again:");
    println!("total = {}", fresh.total_value());
}
