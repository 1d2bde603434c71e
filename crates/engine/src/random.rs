//! Injectable randomness for the descriptor synthesizer.
//!
//! The synthesizer's only non-deterministic choices are `heroPose`,
//! `camera`, and `timeOfDay` when no keyword matched (§4.1, P6). Injecting
//! the source of randomness, rather than calling `rand::thread_rng()`
//! directly, lets tests assert the deterministic fields stay fixed under
//! a known seed.

use std::sync::atomic::{AtomicUsize, Ordering};

/// A source of uniform-random choices over a fixed-size vocabulary.
pub trait RandomPort: Send + Sync {
    /// Return a value in `0..len`. `len` is always non-zero.
    fn choose_index(&self, len: usize) -> usize;
}

/// Real randomness, backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRandom;

impl RandomPort for SystemRandom {
    fn choose_index(&self, len: usize) -> usize {
        use rand::Rng;
        rand::thread_rng().gen_range(0..len)
    }
}

/// Fixed randomness for tests: always returns the same index, clamped
/// into range.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub usize);

impl RandomPort for FixedRandom {
    fn choose_index(&self, len: usize) -> usize {
        self.0 % len
    }
}

/// Deterministically cycles through `0..len` on each call - useful for
/// exercising every branch of a fixed vocabulary across a test loop.
#[derive(Debug, Default)]
pub struct CyclingRandom(AtomicUsize);

impl RandomPort for CyclingRandom {
    fn choose_index(&self, len: usize) -> usize {
        self.0.fetch_add(1, Ordering::Relaxed) % len
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fixed_random_clamps_into_range() {
        let r = FixedRandom(7);
        assert_eq!(r.choose_index(5), 2);
    }

    #[test]
    fn cycling_random_advances() {
        let r = CyclingRandom::default();
        assert_eq!(r.choose_index(3), 0);
        assert_eq!(r.choose_index(3), 1);
        assert_eq!(r.choose_index(3), 2);
        assert_eq!(r.choose_index(3), 0);
    }
}
