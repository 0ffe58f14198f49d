//! Full-jitter exponential backoff (spec §4.1: "exponential backoff
//! starting at 500 ms with full jitter").
//!
//! The corpus has no dependency on a `rand` crate for anything this small,
//! so backoff jitter is derived from a thread-local xorshift64 seeded off
//! the high-resolution clock rather than pulling one in.

use std::cell::Cell;
use std::time::{Duration, Instant};

thread_local! {
    static RNG_STATE: Cell<u64> = Cell::new(seed());
}

fn seed() -> u64 {
    let nanos = Instant::now().elapsed().as_nanos() as u64;
    nanos ^ 0x9E3779B97F4A7C15
}

fn next_u64() -> u64 {
    RNG_STATE.with(|cell| {
        let mut x = cell.get();
        if x == 0 {
            x = seed() | 1;
        }
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        cell.set(x);
        x
    })
}

/// Returns a random duration in `[0, base * 2^attempt)`, the "full jitter"
/// backoff strategy. `attempt` is 0-based (first retry uses `attempt = 0`).
#[must_use]
pub fn full_jitter_backoff(base: Duration, attempt: u32) -> Duration {
    let cap_millis = base.as_millis().saturating_mul(1u128 << attempt.min(16));
    if cap_millis == 0 {
        return Duration::ZERO;
    }
    let jittered = (next_u64() as u128) % cap_millis;
    Duration::from_millis(jittered as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_is_bounded_by_the_cap() {
        let base = Duration::from_millis(500);
        for attempt in 0..5 {
            let d = full_jitter_backoff(base, attempt);
            let cap = base.as_millis() * (1u128 << attempt);
            assert!(d.as_millis() < cap);
        }
    }
}
