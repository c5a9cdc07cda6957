//! A single tested variant and its Beta-Bernoulli posterior.
//!
//! A [`Variation`] starts with a fixed `Beta(prior_a, prior_b)` prior and
//! folds in batches of trial outcomes through [`Variation::record_trials`].
//! Until the first batch arrives the posterior is unset: every derived
//! statistic returns `None`, and [`Variation::posterior_a`] /
//! [`Variation::posterior_b`] read as `0.0`. Use [`Variation::has_trials`]
//! (or [`Variation::posterior`]) to tell "no data yet" apart from a real
//! value.

use rand::Rng;
use tb_common::{Error, Result, DEFAULT_CREDIBLE_LEVEL};
use tb_math::bernoulli::{credible_interval, posterior_params, BetaParams};
use tb_math::sampling::BetaSampler;
use tracing::debug;

use crate::summary::VariationSummary;

/// One arm of an experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct Variation {
    name: String,
    prior: BetaParams,
    value_at_risk_threshold: Option<f64>,
    posterior: Option<BetaParams>,
    total_successes: u64,
    total_trials: u64,
}

impl Variation {
    /// Create a variation with a `Beta(prior_a, prior_b)` prior.
    ///
    /// Fails with [`Error::InvalidArgument`] if either prior parameter is
    /// not a positive finite number, or the threshold lies outside [0, 1].
    pub fn new(
        name: impl Into<String>,
        prior_a: f64,
        prior_b: f64,
        value_at_risk_threshold: Option<f64>,
    ) -> Result<Self> {
        let name = name.into();
        let prior = BetaParams::new(prior_a, prior_b).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "prior for '{}' must be positive and finite, got Beta({}, {})",
                name, prior_a, prior_b
            ))
        })?;
        if let Some(threshold) = value_at_risk_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(Error::InvalidArgument(format!(
                    "value-at-risk threshold for '{}' must be in [0, 1], got {}",
                    name, threshold
                )));
            }
        }

        Ok(Self {
            name,
            prior,
            value_at_risk_threshold,
            posterior: None,
            total_successes: 0,
            total_trials: 0,
        })
    }

    /// Fold a batch of `trials` outcomes, `successes` of which converted.
    ///
    /// Batches are additive: any split of the same totals gives the same
    /// posterior. On error nothing is changed.
    ///
    /// Totals are kept exactly as `u64`, but the posterior shape parameters
    /// are `f64`: `posterior_a - prior_a == total_successes` holds exactly
    /// only while totals stay at or below 2^53. Larger totals round to the
    /// nearest representable float.
    pub fn record_trials(&mut self, successes: u64, trials: u64) -> Result<()> {
        if successes > trials {
            return Err(Error::InvalidArgument(format!(
                "successes ({}) exceed trials ({})",
                successes, trials
            )));
        }

        let overflow = || {
            Error::InvalidArgument(format!(
                "trial totals for '{}' would overflow",
                self.name
            ))
        };
        let total_successes = self
            .total_successes
            .checked_add(successes)
            .ok_or_else(overflow)?;
        let total_trials = self.total_trials.checked_add(trials).ok_or_else(overflow)?;

        let posterior = posterior_params(&self.prior, total_successes, total_trials)
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "posterior for '{}' is not a valid Beta distribution",
                    self.name
                ))
            })?;

        self.total_successes = total_successes;
        self.total_trials = total_trials;
        self.posterior = Some(posterior);

        debug!(
            target: "tb_core::variation",
            variation = %self.name,
            successes,
            trials,
            total_successes,
            total_trials,
            posterior_a = posterior.alpha,
            posterior_b = posterior.beta,
            "recorded trials"
        );
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prior_a(&self) -> f64 {
        self.prior.alpha
    }

    pub fn prior_b(&self) -> f64 {
        self.prior.beta
    }

    pub fn prior(&self) -> BetaParams {
        self.prior
    }

    /// Posterior alpha, or `0.0` before any trials are recorded.
    pub fn posterior_a(&self) -> f64 {
        self.posterior.map_or(0.0, |p| p.alpha)
    }

    /// Posterior beta, or `0.0` before any trials are recorded.
    pub fn posterior_b(&self) -> f64 {
        self.posterior.map_or(0.0, |p| p.beta)
    }

    /// Posterior parameters, if any batch has been recorded.
    pub fn posterior(&self) -> Option<BetaParams> {
        self.posterior
    }

    pub fn value_at_risk_threshold(&self) -> Option<f64> {
        self.value_at_risk_threshold
    }

    pub fn total_successes(&self) -> u64 {
        self.total_successes
    }

    pub fn total_trials(&self) -> u64 {
        self.total_trials
    }

    /// Whether at least one batch (possibly empty) has been recorded.
    pub fn has_trials(&self) -> bool {
        self.posterior.is_some()
    }

    /// Posterior mean `a / (a + b)`.
    pub fn posterior_mean(&self) -> Option<f64> {
        self.posterior.map(|p| p.mean())
    }

    /// Observed success rate, ignoring the prior.
    pub fn maximum_likelihood_estimate(&self) -> Option<f64> {
        if self.total_trials == 0 {
            return None;
        }
        Some(self.total_successes as f64 / self.total_trials as f64)
    }

    /// Posterior probability that the true rate is below the threshold.
    ///
    /// `None` before any trials, or when no threshold was configured.
    pub fn value_at_risk(&self) -> Option<f64> {
        let posterior = self.posterior?;
        let threshold = self.value_at_risk_threshold?;
        Some(posterior.cdf(threshold))
    }

    /// Equal-tailed 95% credible interval `(lower, upper)`.
    pub fn credible_interval(&self) -> Option<(f64, f64)> {
        self.credible_interval_at(DEFAULT_CREDIBLE_LEVEL)
    }

    /// Equal-tailed credible interval at `level`; `None` if `level` is not
    /// strictly between 0 and 1.
    pub fn credible_interval_at(&self, level: f64) -> Option<(f64, f64)> {
        let posterior = self.posterior?;
        if !(level > 0.0 && level < 1.0) {
            return None;
        }
        Some(credible_interval(&posterior, level))
    }

    /// `count` independent posterior draws using the thread-local generator.
    pub fn sample_from_posterior(&self, count: usize) -> Option<Vec<f64>> {
        self.sample_from_posterior_with(count, &mut rand::rng())
    }

    /// `count` independent posterior draws from a caller-supplied generator.
    pub fn sample_from_posterior_with<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Option<Vec<f64>> {
        Some(self.sampler()?.sample_n(rng, count))
    }

    pub(crate) fn sampler(&self) -> Option<BetaSampler> {
        BetaSampler::new(self.posterior?)
    }

    /// Snapshot of every reported statistic.
    pub fn summary(&self) -> VariationSummary {
        VariationSummary::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tb_math::sampling::seeded_rng;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn new_variation_has_no_posterior() {
        let variation = Variation::new("Variation A", 10.0, 22.0, Some(0.04)).unwrap();
        assert_eq!(variation.name(), "Variation A");
        assert_eq!(variation.prior_a(), 10.0);
        assert_eq!(variation.prior_b(), 22.0);
        assert_eq!(variation.posterior_a(), 0.0);
        assert_eq!(variation.posterior_b(), 0.0);
        assert!(!variation.has_trials());
        assert_eq!(variation.value_at_risk(), None);
        assert_eq!(variation.maximum_likelihood_estimate(), None);
        assert_eq!(variation.posterior_mean(), None);
        assert_eq!(variation.credible_interval(), None);
        assert_eq!(variation.sample_from_posterior(1), None);
    }

    #[test]
    fn new_rejects_bad_prior() {
        assert!(matches!(
            Variation::new("A", 0.0, 1.0, None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            Variation::new("A", 1.0, f64::NAN, None),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn new_rejects_threshold_outside_unit_interval() {
        assert!(Variation::new("A", 1.0, 1.0, Some(1.2)).is_err());
        assert!(Variation::new("A", 1.0, 1.0, Some(0.0)).is_ok());
        assert!(Variation::new("A", 1.0, 1.0, Some(1.0)).is_ok());
    }

    #[test]
    fn successes_greater_than_trials_fails() {
        let mut variation = Variation::new("Variation A", 1.0, 1.0, Some(0.04)).unwrap();
        let err = variation.record_trials(1, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(!variation.has_trials());
        assert_eq!(variation.total_trials(), 0);
    }

    #[test]
    fn failed_record_leaves_counts_unchanged() {
        let mut variation = Variation::new("A", 1.0, 1.0, None).unwrap();
        variation.record_trials(3, 7).unwrap();
        let before = variation.clone();
        assert!(variation.record_trials(8, 2).is_err());
        assert_eq!(variation, before);
    }

    #[test]
    fn overflowing_totals_fail_without_mutation() {
        let mut variation = Variation::new("A", 1.0, 1.0, None).unwrap();
        variation.record_trials(0, u64::MAX).unwrap();
        let before = variation.clone();
        assert!(variation.record_trials(0, 1).is_err());
        assert_eq!(variation, before);
    }

    #[test]
    fn single_success_updates_posterior() {
        let mut variation = Variation::new("Variation A", 11.0, 23.0, Some(0.45)).unwrap();
        variation.record_trials(1, 1).unwrap();

        assert_eq!(variation.prior_a(), 11.0);
        assert_eq!(variation.prior_b(), 23.0);
        assert_eq!(variation.posterior_a(), 12.0);
        assert_eq!(variation.posterior_b(), 23.0);

        let var = variation.value_at_risk().unwrap();
        assert!(approx_eq(var, 0.905, 0.005), "value at risk = {}", var);

        // The prior does not enter the MLE: one success in one trial is 100%.
        assert_eq!(variation.maximum_likelihood_estimate(), Some(1.0));

        let mean = variation.posterior_mean().unwrap();
        assert!(approx_eq(mean, 0.342_857_142_857_142_86, 1e-12));

        let (lower, upper) = variation.credible_interval().unwrap();
        assert!(approx_eq(lower, 0.197_458_647_912_342_33, 1e-7), "lower = {}", lower);
        assert!(approx_eq(upper, 0.505_265_300_898_504_6, 1e-7), "upper = {}", upper);
    }

    #[test]
    fn empty_batch_establishes_posterior_at_prior() {
        let mut variation = Variation::new("A", 2.0, 3.0, None).unwrap();
        variation.record_trials(0, 0).unwrap();
        assert!(variation.has_trials());
        assert_eq!(variation.posterior_a(), 2.0);
        assert_eq!(variation.posterior_b(), 3.0);
        assert_eq!(variation.maximum_likelihood_estimate(), None);
        assert!(variation.posterior_mean().is_some());
    }

    #[test]
    fn batches_are_additive() {
        let mut split = Variation::new("A", 1.5, 2.5, None).unwrap();
        split.record_trials(5, 10).unwrap();
        split.record_trials(52, 100).unwrap();

        let mut whole = Variation::new("A", 1.5, 2.5, None).unwrap();
        whole.record_trials(57, 110).unwrap();

        assert_eq!(split.posterior(), whole.posterior());
        assert_eq!(split.total_successes(), 57);
        assert_eq!(split.total_trials(), 110);
    }

    #[test]
    fn value_at_risk_needs_threshold() {
        let mut variation = Variation::new("A", 1.0, 1.0, None).unwrap();
        variation.record_trials(5, 10).unwrap();
        assert_eq!(variation.value_at_risk(), None);
    }

    #[test]
    fn credible_interval_narrows_with_more_data() {
        let mut few = Variation::new("A", 1.0, 1.0, None).unwrap();
        few.record_trials(5, 10).unwrap();
        let mut many = Variation::new("A", 1.0, 1.0, None).unwrap();
        many.record_trials(500, 1000).unwrap();

        let (f_lo, f_hi) = few.credible_interval().unwrap();
        let (m_lo, m_hi) = many.credible_interval().unwrap();
        let mean = few.posterior_mean().unwrap();
        assert!(f_lo < mean && mean < f_hi);
        assert!(m_hi - m_lo < f_hi - f_lo);
    }

    #[test]
    fn credible_interval_at_rejects_bad_level() {
        let mut variation = Variation::new("A", 1.0, 1.0, None).unwrap();
        variation.record_trials(5, 10).unwrap();
        assert!(variation.credible_interval_at(0.0).is_none());
        assert!(variation.credible_interval_at(1.0).is_none());
        let (lo80, hi80) = variation.credible_interval_at(0.8).unwrap();
        let (lo95, hi95) = variation.credible_interval().unwrap();
        assert!(lo95 < lo80 && hi80 < hi95);
    }

    #[test]
    fn sample_from_posterior_once() {
        let mut variation = Variation::new("Variation A", 11.0, 23.0, Some(0.45)).unwrap();
        variation.record_trials(1, 1).unwrap();
        let samples = variation.sample_from_posterior(1).unwrap();
        assert_eq!(samples.len(), 1);
        assert!(samples[0] > 0.0 && samples[0] < 1.0);
    }

    #[test]
    fn sample_from_posterior_ten_times() {
        let mut variation = Variation::new("Variation A", 11.0, 23.0, Some(0.45)).unwrap();
        variation.record_trials(1, 1).unwrap();
        let samples = variation.sample_from_posterior(10).unwrap();
        assert_eq!(samples.len(), 10);
        for sample in samples {
            assert!(sample > 0.0 && sample < 1.0);
        }
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        let mut variation = Variation::new("A", 1.0, 1.0, None).unwrap();
        variation.record_trials(6, 10).unwrap();
        let a = variation.sample_from_posterior_with(8, &mut seeded_rng(3));
        let b = variation.sample_from_posterior_with(8, &mut seeded_rng(3));
        assert_eq!(a, b);
    }

    #[test]
    fn large_totals_stay_exact_up_to_2_pow_53() {
        let half = 1u64 << 52;
        let mut variation = Variation::new("big", 1.0, 1.0, None).unwrap();
        variation.record_trials(half - 1, half).unwrap();
        variation.record_trials(half, half).unwrap();

        assert_eq!(variation.total_successes(), (1u64 << 53) - 1);
        assert_eq!(variation.posterior_a(), (1u64 << 53) as f64);
        assert_eq!(variation.posterior_a() - variation.prior_a(), ((1u64 << 53) - 1) as f64);
        assert_eq!(variation.posterior_b(), 2.0);
    }
}
