//! testbandit core: Bayesian A/B and multi-armed-bandit testing over
//! Bernoulli trials.
//!
//! Each [`Variation`] keeps a Beta posterior over its conversion rate.
//! An [`Experiment`] compares variations by Monte Carlo ("probability of
//! being best") and picks the next variation to serve by Thompson
//! Sampling.
//!
//! ```
//! use tb_core::{Experiment, Variation};
//!
//! let mut experiment = Experiment::with_seed(7);
//! for (name, successes) in [("A", 5), ("B", 6), ("C", 4)] {
//!     let mut v = Variation::new(name, 1.0, 1.0, Some(0.58)).unwrap();
//!     v.record_trials(successes, 10).unwrap();
//!     experiment.add_variation(v);
//! }
//! experiment.compute_winner(20_000).unwrap();
//! let shares = experiment.winning_percentages().unwrap();
//! assert_eq!(shares.len(), 3);
//! let next = experiment.thompson_sample(1).unwrap();
//! assert!(["A", "B", "C"].contains(&next.name()));
//! ```
//!
//! The engine holds no global state and no locks; share an instance across
//! threads behind your own synchronization.

pub mod exit_codes;
pub mod experiment;
pub mod logging;
pub mod output;
pub mod summary;
pub mod variation;

pub use experiment::{Experiment, ExperimentState, DEFAULT_SAMPLE_COUNT};
pub use summary::{ExperimentReport, VariationSummary};
pub use tb_common::{Error, Result};
pub use variation::Variation;
