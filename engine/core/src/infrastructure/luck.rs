// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Injected randomness for the luck perturbation.
//!
//! The luck score layers a small noise term on top of the deterministic top
//! score. The source is injected so tests can substitute a fixed value and
//! assert exact scores.

use rand::Rng;

/// Source of the bounded noise added to the top score.
pub trait LuckSource: Send + Sync {
    /// A sample in `[-amplitude, amplitude]`.
    fn noise(&self, amplitude: f64) -> f64;
}

/// Production source backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngLuck;

impl LuckSource for ThreadRngLuck {
    fn noise(&self, amplitude: f64) -> f64 {
        if amplitude == 0.0 {
            return 0.0;
        }
        rand::rng().random_range(-amplitude..=amplitude)
    }
}

/// Deterministic source returning a constant sample, clamped to the
/// requested amplitude. Test seam.
#[derive(Debug, Clone, Copy)]
pub struct FixedLuck(pub f64);

impl LuckSource for FixedLuck {
    fn noise(&self, amplitude: f64) -> f64 {
        self.0.clamp(-amplitude, amplitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_rng_within_amplitude() {
        let source = ThreadRngLuck;
        for _ in 0..1000 {
            let sample = source.noise(0.05);
            assert!((-0.05..=0.05).contains(&sample));
        }
    }

    #[test]
    fn test_fixed_luck_clamped() {
        assert_eq!(FixedLuck(0.2).noise(0.05), 0.05);
        assert_eq!(FixedLuck(-0.2).noise(0.05), -0.05);
        assert_eq!(FixedLuck(0.01).noise(0.05), 0.01);
    }
}
