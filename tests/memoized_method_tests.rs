use memolito::{
    memoized, scope, CacheableKey, CallArgs, InstanceCache, MemoizedMethod, MemoizedProperty,
};
use std::sync::atomic::{AtomicUsize, Ordering};

struct Calculator {
    base: i64,
    calls: AtomicUsize,
    cache: InstanceCache,
}

impl Calculator {
    fn new(base: i64) -> Self {
        Self {
            base,
            calls: AtomicUsize::new(0),
            cache: InstanceCache::new(),
        }
    }

    #[memoized(slot = "cache")]
    fn offset(&self, delta: i64) -> i64 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.base + delta
    }

    #[memoized(slot = "cache")]
    fn checked_div(&self, divisor: i64) -> Result<i64, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if divisor == 0 {
            Err("division by zero".to_string())
        } else {
            Ok(self.base / divisor)
        }
    }
}

#[test]
fn test_method_computes_once_per_argument() {
    let calc = Calculator::new(100);

    assert_eq!(calc.offset(1), 101);
    assert_eq!(calc.offset(1), 101);
    assert_eq!(calc.offset(2), 102);
    assert_eq!(calc.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_instances_cache_independently() {
    let small = Calculator::new(1);
    let large = Calculator::new(1000);

    assert_eq!(small.offset(1), 2);
    assert_eq!(large.offset(1), 1001);
    assert_eq!(small.offset(1), 2);

    assert_eq!(small.calls.load(Ordering::SeqCst), 1);
    assert_eq!(large.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_method_result_errors_recompute() {
    let calc = Calculator::new(100);

    assert!(calc.checked_div(0).is_err());
    assert!(calc.checked_div(0).is_err());
    assert_eq!(calc.calls.load(Ordering::SeqCst), 2);

    assert_eq!(calc.checked_div(4), Ok(25));
    assert_eq!(calc.checked_div(4), Ok(25));
    assert_eq!(calc.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_scope_suppression_forces_misses_then_serves_again() {
    let calc = Calculator::new(10);

    assert_eq!(calc.offset(5), 15);
    assert_eq!(calc.calls.load(Ordering::SeqCst), 1);

    {
        let _guard = scope::disable_caching();
        assert_eq!(calc.offset(5), 15);
        assert_eq!(calc.offset(5), 15);
        // Every read inside the scope missed.
        assert_eq!(calc.calls.load(Ordering::SeqCst), 3);
    }

    // The previously cached value is served again without recomputation.
    assert_eq!(calc.offset(5), 15);
    assert_eq!(calc.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_property_and_method_share_one_slot() {
    struct Document {
        body: String,
        cache: InstanceCache,
    }

    static WORD_COUNT: MemoizedProperty<usize> = MemoizedProperty::new("Document::word_count");

    impl Document {
        fn word_count(&self) -> usize {
            WORD_COUNT.get(&self.cache, || self.body.split_whitespace().count())
        }

        #[memoized(slot = "cache")]
        fn lines_wider_than(&self, width: usize) -> usize {
            self.body.lines().filter(|line| line.len() > width).count()
        }
    }

    let doc = Document {
        body: "one two\nthree four five".to_string(),
        cache: InstanceCache::new(),
    };

    assert_eq!(doc.word_count(), 5);
    assert_eq!(doc.lines_wider_than(7), 1);

    // Both members landed in the same embedded slot.
    assert_eq!(doc.cache.len(), 2);

    // Dropping the property entry leaves the method entry in place.
    WORD_COUNT.evict(&doc.cache);
    assert_eq!(doc.cache.len(), 1);
    assert_eq!(doc.word_count(), 5);
}

#[test]
fn test_non_cacheable_argument_computes_every_call() {
    // A handle whose identity is not stable enough to key on.
    struct LiveHandle;

    impl CacheableKey for LiveHandle {
        fn to_cache_key(&self) -> Option<String> {
            None
        }
    }

    struct Prober {
        calls: AtomicUsize,
        cache: InstanceCache,
    }

    static PROBE: MemoizedMethod = MemoizedMethod::new("Prober::probe");

    impl Prober {
        fn probe(&self, handle: &LiveHandle) -> u32 {
            let args = CallArgs::new().positional(handle);
            PROBE.get_or_compute(&self.cache, &args, || {
                self.calls.fetch_add(1, Ordering::SeqCst);
                7
            })
        }
    }

    let prober = Prober {
        calls: AtomicUsize::new(0),
        cache: InstanceCache::new(),
    };
    let handle = LiveHandle;

    assert_eq!(prober.probe(&handle), 7);
    assert_eq!(prober.probe(&handle), 7);
    assert_eq!(prober.probe(&handle), 7);

    // Never cached, never failed.
    assert_eq!(prober.calls.load(Ordering::SeqCst), 3);
    assert!(prober.cache.is_empty());
}

#[test]
fn test_named_and_positional_key_identically() {
    struct Shape {
        cache: InstanceCache,
        calls: AtomicUsize,
    }

    static SCALE: MemoizedMethod = MemoizedMethod::new("Shape::scale");

    impl Shape {
        fn scale_positional(&self, factor: u32) -> u32 {
            let args = CallArgs::new().positional(&factor);
            SCALE.get_or_compute(&self.cache, &args, || {
                self.calls.fetch_add(1, Ordering::SeqCst);
                factor * 2
            })
        }

        fn scale_named(&self, factor: u32) -> u32 {
            let args = CallArgs::new().named("factor", &factor);
            SCALE.get_or_compute(&self.cache, &args, || {
                self.calls.fetch_add(1, Ordering::SeqCst);
                factor * 2
            })
        }
    }

    let shape = Shape {
        cache: InstanceCache::new(),
        calls: AtomicUsize::new(0),
    };

    // The method scheme keys named parts by value, so both spellings of the
    // same call hit one entry.
    assert_eq!(shape.scale_positional(3), 6);
    assert_eq!(shape.scale_named(3), 6);
    assert_eq!(shape.calls.load(Ordering::SeqCst), 1);
}
