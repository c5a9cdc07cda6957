//! Beta-Bernoulli conjugate model for conversion trials.
//!
//! The model uses:
//! - Prior: `p ~ Beta(α, β)`
//! - Likelihood: each trial converts with probability `p`
//! - Posterior after k successes in n trials: `p | data ~ Beta(α + k, β + (n-k))`
//!
//! Conjugate updating is additive in `(k, n)`, so batches may be folded in
//! any order and in any grouping.

use serde::{Deserialize, Serialize};

use super::beta::{beta_cdf, beta_inv_cdf};

/// Parameters for a Beta distribution used in Beta-Bernoulli conjugate updates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaParams {
    /// Shape parameter alpha (successes + prior)
    pub alpha: f64,
    /// Shape parameter beta (failures + prior)
    pub beta: f64,
}

impl BetaParams {
    /// Create new Beta parameters with validation.
    ///
    /// Returns None if parameters are non-positive, NaN, or infinite.
    pub fn new(alpha: f64, beta: f64) -> Option<Self> {
        if !alpha.is_finite() || !beta.is_finite() || alpha <= 0.0 || beta <= 0.0 {
            return None;
        }
        Some(Self { alpha, beta })
    }

    /// Create Beta(1, 1) uniform prior.
    pub fn uniform() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
        }
    }

    /// Posterior mean E[p] = α / (α + β).
    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    /// P(p <= x).
    pub fn cdf(&self, x: f64) -> f64 {
        beta_cdf(x, self.alpha, self.beta)
    }

    /// Quantile function F⁻¹(q).
    pub fn quantile(&self, q: f64) -> f64 {
        beta_inv_cdf(q, self.alpha, self.beta)
    }
}

impl Default for BetaParams {
    fn default() -> Self {
        Self::uniform()
    }
}

/// Compute posterior parameters after observing k successes in n trials.
///
/// Returns None if `k > n` or the resulting parameters are invalid.
///
/// # Example
/// ```
/// use tb_math::bernoulli::{BetaParams, posterior_params};
///
/// let prior = BetaParams::uniform();
/// let posterior = posterior_params(&prior, 7, 10).unwrap();
/// assert!((posterior.mean() - 0.667).abs() < 0.01); // ~(1+7)/(2+10)
/// ```
pub fn posterior_params(prior: &BetaParams, k: u64, n: u64) -> Option<BetaParams> {
    if k > n {
        return None;
    }
    BetaParams::new(prior.alpha + k as f64, prior.beta + (n - k) as f64)
}

/// Compute an equal-tailed credible interval for the success probability.
///
/// # Arguments
/// * `posterior` - Posterior Beta parameters
/// * `level` - Credible level in (0, 1), e.g., 0.95 for 95% CI
///
/// # Returns
/// Tuple (lower, upper), or NaN bounds when `level` is out of range.
pub fn credible_interval(posterior: &BetaParams, level: f64) -> (f64, f64) {
    if level.is_nan() || level <= 0.0 || level >= 1.0 {
        return (f64::NAN, f64::NAN);
    }

    let tail = (1.0 - level) / 2.0;
    (posterior.quantile(tail), posterior.quantile(1.0 - tail))
}
