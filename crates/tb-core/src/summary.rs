//! Reporting snapshots of variations and experiments.
//!
//! Summaries are plain serializable data for JSON output and implement
//! `Display` for the human console format.

use std::fmt;

use serde::Serialize;

use crate::experiment::Experiment;
use crate::variation::Variation;

/// Everything a report shows about one variation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariationSummary {
    pub name: String,
    pub prior_a: f64,
    pub prior_b: f64,
    /// `None` until trials are recorded.
    pub posterior_a: Option<f64>,
    pub posterior_b: Option<f64>,
    pub total_successes: u64,
    pub total_trials: u64,
    pub posterior_mean: Option<f64>,
    pub maximum_likelihood_estimate: Option<f64>,
    pub credible_interval: Option<[f64; 2]>,
    pub value_at_risk_threshold: Option<f64>,
    pub value_at_risk: Option<f64>,
}

impl From<&Variation> for VariationSummary {
    fn from(variation: &Variation) -> Self {
        let posterior = variation.posterior();
        Self {
            name: variation.name().to_string(),
            prior_a: variation.prior_a(),
            prior_b: variation.prior_b(),
            posterior_a: posterior.map(|p| p.alpha),
            posterior_b: posterior.map(|p| p.beta),
            total_successes: variation.total_successes(),
            total_trials: variation.total_trials(),
            posterior_mean: variation.posterior_mean(),
            maximum_likelihood_estimate: variation.maximum_likelihood_estimate(),
            credible_interval: variation.credible_interval().map(|(lo, hi)| [lo, hi]),
            value_at_risk_threshold: variation.value_at_risk_threshold(),
            value_at_risk: variation.value_at_risk(),
        }
    }
}

fn opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.4}", v))
}

impl fmt::Display for VariationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "  Prior:                  Beta({}, {})", self.prior_a, self.prior_b)?;
        match (self.posterior_a, self.posterior_b) {
            (Some(a), Some(b)) => writeln!(f, "  Posterior:              Beta({}, {})", a, b)?,
            _ => writeln!(f, "  Posterior:              (no trials recorded)")?,
        }
        writeln!(
            f,
            "  Trials:                 {} successes / {} trials",
            self.total_successes, self.total_trials
        )?;
        writeln!(f, "  Posterior mean:         {}", opt(self.posterior_mean))?;
        writeln!(
            f,
            "  Max likelihood est.:    {}",
            opt(self.maximum_likelihood_estimate)
        )?;
        match self.credible_interval {
            Some([lo, hi]) => writeln!(f, "  95% credible interval:  [{:.4}, {:.4}]", lo, hi)?,
            None => writeln!(f, "  95% credible interval:  n/a")?,
        }
        match self.value_at_risk_threshold {
            Some(threshold) => write!(
                f,
                "  P(rate < {}):          {}",
                threshold,
                opt(self.value_at_risk)
            ),
            None => write!(f, "  Value at risk:          (no threshold)"),
        }
    }
}

/// Report over a whole experiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentReport {
    pub variations: Vec<VariationSummary>,
    /// Parallel to `variations`; `None` until the winner has been computed.
    pub winning_percentages: Option<Vec<f64>>,
    pub winner: Option<String>,
    pub sample_count: Option<usize>,
}

impl From<&Experiment> for ExperimentReport {
    fn from(experiment: &Experiment) -> Self {
        Self {
            variations: experiment.variations().iter().map(VariationSummary::from).collect(),
            winning_percentages: experiment.winning_percentages().map(<[f64]>::to_vec),
            winner: experiment.winning_variation().map(|v| v.name().to_string()),
            sample_count: experiment.last_sample_count(),
        }
    }
}

impl fmt::Display for ExperimentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<20} {:>10} {:>10} {:>10} {:>12}",
            "variation", "successes", "trials", "mean", "P(best)"
        )?;
        for (idx, summary) in self.variations.iter().enumerate() {
            let share = self
                .winning_percentages
                .as_ref()
                .and_then(|p| p.get(idx).copied());
            writeln!(
                f,
                "{:<20} {:>10} {:>10} {:>10} {:>12}",
                summary.name,
                summary.total_successes,
                summary.total_trials,
                opt(summary.posterior_mean),
                opt(share)
            )?;
        }
        match (&self.winner, self.sample_count) {
            (Some(winner), Some(samples)) => {
                write!(f, "Winner: {} ({} samples)", winner, samples)
            }
            _ => write!(f, "Winner: not computed"),
        }
    }
}
