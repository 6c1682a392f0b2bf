//! Shared per-function caching with `#[memoized]`.
//!
//! Run with: cargo run --example function_cache

use memolito::{clear_function_cache, evict_function_entry, memoized, CallArgs};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

static EVALUATIONS: AtomicUsize = AtomicUsize::new(0);

#[memoized]
fn fibonacci(n: u32) -> u64 {
    EVALUATIONS.fetch_add(1, Ordering::SeqCst);
    if n <= 1 {
        return n as u64;
    }
    fibonacci(n - 1) + fibonacci(n - 2)
}

fn main() {
    let start = Instant::now();
    let value = fibonacci(80);
    println!(
        "fibonacci(80) = {value} ({} evaluations, {:?})",
        EVALUATIONS.load(Ordering::SeqCst),
        start.elapsed()
    );

    let start = Instant::now();
    let value = fibonacci(80);
    println!("fibonacci(80) = {value} again (cache hit, {:?})", start.elapsed());

    // Callers on other threads share the same cache.
    let handle = std::thread::spawn(|| fibonacci(80));
    println!("from another thread: {}", handle.join().unwrap());
    println!("total evaluations so far: {}", EVALUATIONS.load(Ordering::SeqCst));

    // Drop a single argument tuple...
    evict_function_entry("fibonacci", &CallArgs::new().positional(&80_u32));
    fibonacci(80);
    println!(
        "after evicting fibonacci(80): {} evaluations",
        EVALUATIONS.load(Ordering::SeqCst)
    );

    // ...or everything at once.
    clear_function_cache("fibonacci");
    fibonacci(10);
    println!(
        "after clearing the whole cache: {} evaluations",
        EVALUATIONS.load(Ordering::SeqCst)
    );
}
