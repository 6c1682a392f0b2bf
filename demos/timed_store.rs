//! Validity-tracked and timed stores driven by hand.
//!
//! Run with: cargo run --example timed_store

use memolito::{CacheStore, ManualClock, TimedStore, ValidityStore};
use std::time::Duration;

fn main() {
    // A validity store decouples "stop serving" from "forget".
    let mut sessions: ValidityStore<String> = ValidityStore::new();
    sessions.insert("user:1", "token-abc".to_string());
    sessions.insert("user:2", "token-def".to_string());
    println!("user:1 -> {:?}", sessions.get("user:1"));

    sessions.invalidate_all();
    println!("after invalidate_all, user:1 -> {:?}", sessions.get("user:1"));
    println!("...but the value is still held: {}", sessions.contains_raw("user:1"));

    sessions.insert("user:1", "token-xyz".to_string());
    println!("re-written, user:1 -> {:?}", sessions.get("user:1"));

    // A timed store expires entries a fixed interval after each write. The
    // manual clock stands in for wall time so the demo is instant.
    let clock = ManualClock::shared();
    let mut readings: TimedStore<f64> = TimedStore::with_clock(Duration::from_secs(10), clock.clone());

    readings.insert("temperature", 21.5);
    clock.advance(Duration::from_secs(5));
    println!("t+5s  temperature -> {:?}", readings.get("temperature"));

    clock.advance(Duration::from_secs(10));
    println!("t+15s temperature -> {:?} (expired)", readings.get("temperature"));

    readings.insert("temperature", 22.0);
    println!("re-polled temperature -> {:?}", readings.get("temperature"));
}
