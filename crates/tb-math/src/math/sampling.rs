//! Posterior sampling for Beta-distributed conversion rates.
//!
//! Draws come from `rand_distr::Beta`. Callers that need reproducible
//! runs pass a seeded generator from [`seeded_rng`]; everything else can
//! use [`entropy_rng`] or the thread-local generator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Distribution};

use super::bernoulli::BetaParams;

/// Smallest value a draw may take.
const INTERIOR_MIN: f64 = f64::MIN_POSITIVE;
/// Largest value below 1.0 representable as f64.
const INTERIOR_MAX: f64 = 1.0 - f64::EPSILON / 2.0;

/// A ready-to-sample Beta distribution.
#[derive(Debug, Clone)]
pub struct BetaSampler {
    dist: Beta<f64>,
}

impl BetaSampler {
    /// Build a sampler, or None if `rand_distr` rejects the parameters.
    pub fn new(params: BetaParams) -> Option<Self> {
        let dist = Beta::new(params.alpha, params.beta).ok()?;
        Some(Self { dist })
    }

    /// Draw one value strictly inside (0, 1).
    ///
    /// Degenerate shapes can round a draw onto an endpoint; such values are
    /// moved to the nearest interior float.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.dist.sample(rng).clamp(INTERIOR_MIN, INTERIOR_MAX)
    }

    /// Draw `n` independent values.
    pub fn sample_n<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.sample(rng)).collect()
    }
}

/// Deterministic generator for reproducible simulations.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Generator seeded from the operating system.
pub fn entropy_rng() -> StdRng {
    StdRng::from_os_rng()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_interior() {
        let sampler = BetaSampler::new(BetaParams::new(12.0, 23.0).unwrap()).unwrap();
        let mut rng = seeded_rng(7);
        for x in sampler.sample_n(&mut rng, 1_000) {
            assert!(x > 0.0 && x < 1.0, "draw {} escaped (0,1)", x);
        }
    }

    #[test]
    fn extreme_shapes_stay_interior() {
        let mut rng = seeded_rng(11);
        for (a, b) in [(0.05, 0.05), (0.05, 500.0), (500.0, 0.05)] {
            let sampler = BetaSampler::new(BetaParams::new(a, b).unwrap()).unwrap();
            for x in sampler.sample_n(&mut rng, 200) {
                assert!(x > 0.0 && x < 1.0, "Beta({}, {}) draw {} escaped (0,1)", a, b, x);
            }
        }
    }

    #[test]
    fn sample_mean_tracks_distribution_mean() {
        let params = BetaParams::new(28.0, 2.0).unwrap();
        let sampler = BetaSampler::new(params).unwrap();
        let mut rng = seeded_rng(42);
        let draws = sampler.sample_n(&mut rng, 20_000);
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        assert!((mean - params.mean()).abs() < 0.01, "mean = {}", mean);
    }

    #[test]
    fn seeded_generators_repeat() {
        let sampler = BetaSampler::new(BetaParams::uniform()).unwrap();
        let a = sampler.sample_n(&mut seeded_rng(5), 16);
        let b = sampler.sample_n(&mut seeded_rng(5), 16);
        assert_eq!(a, b);
    }

    #[test]
    fn sample_n_length() {
        let sampler = BetaSampler::new(BetaParams::uniform()).unwrap();
        assert_eq!(sampler.sample_n(&mut entropy_rng(), 0).len(), 0);
        assert_eq!(sampler.sample_n(&mut entropy_rng(), 10).len(), 10);
    }
}
