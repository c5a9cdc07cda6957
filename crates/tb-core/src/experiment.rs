//! Cross-variation comparison: Monte Carlo winner estimation and
//! Thompson Sampling.
//!
//! # Tie-break rule
//!
//! In every simulated round each variation contributes one posterior draw.
//! The round goes to the **first variation in insertion order** holding the
//! maximum draw. The overall winner is likewise the first variation with
//! the maximal win count. Every round therefore credits exactly one
//! variation and the winning percentages sum to 1, and with a seeded
//! generator ([`Experiment::with_seed`]) results are fully deterministic.
//!
//! # Thompson Sampling with several rounds
//!
//! `thompson_sample(1)` is textbook Thompson Sampling: one draw per arm,
//! play the highest. With `round_count > 1` the arm that wins the most
//! rounds is returned instead. That is a majority-vote extension: it makes
//! the choice more stable but explores less, and converges to always
//! playing the arm most likely to be best as `round_count` grows.

use rand::rngs::StdRng;
use rand::Rng;
use tb_common::{Error, Result};
use tb_config::ExperimentConfig;
use tb_math::sampling::{entropy_rng, seeded_rng, BetaSampler};
use tracing::{debug, info};

use crate::summary::ExperimentReport;
use crate::variation::Variation;

pub use tb_common::DEFAULT_SAMPLE_COUNT;

/// Lifecycle of an [`Experiment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentState {
    /// No variations registered.
    Empty,
    /// Variations registered, winner not computed.
    Populated,
    /// A winner estimate is available.
    Evaluated,
}

#[derive(Debug, Clone)]
struct WinnerEstimate {
    winner: usize,
    percentages: Vec<f64>,
    sample_count: usize,
}

/// An ordered set of variations under comparison.
#[derive(Debug, Clone)]
pub struct Experiment {
    variations: Vec<Variation>,
    estimate: Option<WinnerEstimate>,
    rng: StdRng,
}

impl Default for Experiment {
    fn default() -> Self {
        Self::new()
    }
}

impl Experiment {
    /// Empty experiment sampling from an OS-seeded generator.
    pub fn new() -> Self {
        Self::with_rng(entropy_rng())
    }

    /// Empty experiment with a reproducible generator.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(seeded_rng(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            variations: Vec::new(),
            estimate: None,
            rng,
        }
    }

    /// Build an experiment from a (validated) configuration, recording every
    /// configured trial batch.
    pub fn from_config(config: &ExperimentConfig) -> Result<Self> {
        let mut experiment = match config.seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        };
        for entry in &config.variations {
            let mut variation = Variation::new(
                entry.name.clone(),
                entry.prior.alpha,
                entry.prior.beta,
                entry.effective_value_at_risk(config.value_at_risk),
            )?;
            for batch in &entry.trials {
                variation.record_trials(batch.successes, batch.trials)?;
            }
            experiment.add_variation(variation);
        }
        Ok(experiment)
    }

    /// Append a variation and return its index.
    ///
    /// Any previous winner estimate is discarded, since its percentages no
    /// longer line up with the variation list.
    pub fn add_variation(&mut self, variation: Variation) -> usize {
        self.variations.push(variation);
        self.estimate = None;
        self.variations.len() - 1
    }

    pub fn variations(&self) -> &[Variation] {
        &self.variations
    }

    pub fn variation(&self, index: usize) -> Option<&Variation> {
        self.variations.get(index)
    }

    pub fn variation_mut(&mut self, index: usize) -> Option<&mut Variation> {
        self.variations.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.variations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variations.is_empty()
    }

    /// Record a batch on the variation at `index`.
    pub fn record_trials(&mut self, index: usize, successes: u64, trials: u64) -> Result<()> {
        let count = self.variations.len();
        self.variations
            .get_mut(index)
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "variation index {} out of range ({} registered)",
                    index, count
                ))
            })?
            .record_trials(successes, trials)
    }

    pub fn state(&self) -> ExperimentState {
        if self.estimate.is_some() {
            ExperimentState::Evaluated
        } else if self.variations.is_empty() {
            ExperimentState::Empty
        } else {
            ExperimentState::Populated
        }
    }

    /// Estimate each variation's probability of being best from
    /// `sample_count` simulated rounds, replacing any earlier estimate.
    ///
    /// Costs `sample_count × variations` Beta draws. Fails with
    /// [`Error::Precondition`] if fewer than two variations are registered
    /// or any has no trials, and with [`Error::InvalidArgument`] if
    /// `sample_count` is zero. On failure the previous estimate is kept.
    pub fn compute_winner(&mut self, sample_count: usize) -> Result<()> {
        if sample_count == 0 {
            return Err(Error::InvalidArgument(
                "sample_count must be at least 1".to_string(),
            ));
        }
        let samplers = self.samplers()?;
        let wins = tally_round_wins(&samplers, sample_count, &mut self.rng);

        let percentages: Vec<f64> = wins
            .iter()
            .map(|&w| w as f64 / sample_count as f64)
            .collect();
        let winner = first_max_index(&wins);

        info!(
            target: "tb_core::experiment",
            winner = %self.variations[winner].name(),
            sample_count,
            percentages = ?percentages,
            "computed winning variation"
        );

        self.estimate = Some(WinnerEstimate {
            winner,
            percentages,
            sample_count,
        });
        Ok(())
    }

    /// Variation judged best by the latest [`Experiment::compute_winner`].
    pub fn winning_variation(&self) -> Option<&Variation> {
        self.winning_index().map(|idx| &self.variations[idx])
    }

    pub fn winning_index(&self) -> Option<usize> {
        self.estimate.as_ref().map(|e| e.winner)
    }

    /// Probability of being best, parallel to [`Experiment::variations`].
    pub fn winning_percentages(&self) -> Option<&[f64]> {
        self.estimate.as_ref().map(|e| e.percentages.as_slice())
    }

    /// Round count behind the current estimate.
    pub fn last_sample_count(&self) -> Option<usize> {
        self.estimate.as_ref().map(|e| e.sample_count)
    }

    /// Pick the variation to serve next by Thompson Sampling.
    ///
    /// See the module docs for what `round_count > 1` means. Same
    /// preconditions as [`Experiment::compute_winner`]; does not touch the
    /// stored winner estimate.
    pub fn thompson_sample(&mut self, round_count: usize) -> Result<&Variation> {
        let idx = self.thompson_sample_index(round_count)?;
        Ok(&self.variations[idx])
    }

    /// Index form of [`Experiment::thompson_sample`].
    pub fn thompson_sample_index(&mut self, round_count: usize) -> Result<usize> {
        if round_count == 0 {
            return Err(Error::InvalidArgument(
                "round_count must be at least 1".to_string(),
            ));
        }
        let samplers = self.samplers()?;
        let wins = tally_round_wins(&samplers, round_count, &mut self.rng);
        let chosen = first_max_index(&wins);

        debug!(
            target: "tb_core::experiment",
            chosen = %self.variations[chosen].name(),
            round_count,
            "thompson selection"
        );
        Ok(chosen)
    }

    /// Snapshot for reporting.
    pub fn report(&self) -> ExperimentReport {
        ExperimentReport::from(self)
    }

    fn samplers(&self) -> Result<Vec<BetaSampler>> {
        if self.variations.len() < 2 {
            return Err(Error::Precondition(format!(
                "at least two variations are required, {} registered",
                self.variations.len()
            )));
        }
        self.variations
            .iter()
            .map(|v| {
                if !v.has_trials() {
                    return Err(Error::Precondition(format!(
                        "variation '{}' has no recorded trials",
                        v.name()
                    )));
                }
                v.sampler().ok_or_else(|| {
                    Error::Sampling(format!(
                        "cannot sample Beta({}, {}) for '{}'",
                        v.posterior_a(),
                        v.posterior_b(),
                        v.name()
                    ))
                })
            })
            .collect()
    }
}

/// Run `rounds` rounds of one draw per sampler and count round wins.
fn tally_round_wins<R: Rng + ?Sized>(
    samplers: &[BetaSampler],
    rounds: usize,
    rng: &mut R,
) -> Vec<u64> {
    let mut wins = vec![0u64; samplers.len()];
    let mut draws = vec![0.0f64; samplers.len()];
    for _ in 0..rounds {
        for (slot, sampler) in draws.iter_mut().zip(samplers) {
            *slot = sampler.sample(rng);
        }
        wins[first_max_index(&draws)] += 1;
    }
    wins
}

/// Index of the first maximal element; 0 for an empty slice.
fn first_max_index<T: PartialOrd + Copy>(values: &[T]) -> usize {
    let mut best = 0;
    for (idx, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = idx;
        }
    }
    best
}
