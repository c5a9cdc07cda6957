//! Experiment file types.
//!
//! An experiment file names the variations under test, their Beta priors,
//! and any trial batches already observed. JSON and TOML are both accepted;
//! the format is picked from the file extension.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tb_common::{DEFAULT_SAMPLE_COUNT, DEFAULT_THOMPSON_ROUNDS};

use crate::validate::ValidationError;

/// Complete experiment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Monte Carlo rounds used for the winner estimate.
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,

    /// Rounds per Thompson selection; 1 is the textbook algorithm.
    #[serde(default = "default_thompson_rounds")]
    pub thompson_rounds: usize,

    /// Seed for reproducible sampling; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Value-at-risk threshold applied to variations without their own.
    #[serde(default)]
    pub value_at_risk: Option<f64>,

    pub variations: Vec<VariationConfig>,
}

/// One variation under test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationConfig {
    pub name: String,

    #[serde(default)]
    pub prior: PriorConfig,

    #[serde(default)]
    pub value_at_risk: Option<f64>,

    #[serde(default)]
    pub trials: Vec<TrialBatch>,
}

/// Beta prior: Beta(alpha, beta).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorConfig {
    pub alpha: f64,
    pub beta: f64,
}

/// An observed batch of trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBatch {
    pub successes: u64,
    pub trials: u64,
}

fn default_sample_count() -> usize {
    DEFAULT_SAMPLE_COUNT
}

fn default_thompson_rounds() -> usize {
    DEFAULT_THOMPSON_ROUNDS
}

impl Default for PriorConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
        }
    }
}

impl VariationConfig {
    /// Threshold for this variation, falling back to the experiment default.
    pub fn effective_value_at_risk(&self, default: Option<f64>) -> Option<f64> {
        self.value_at_risk.or(default)
    }

    /// Summed (successes, trials) across all batches; None on overflow.
    pub fn totals(&self) -> Option<(u64, u64)> {
        self.trials.iter().try_fold((0u64, 0u64), |(s, t), batch| {
            Some((s.checked_add(batch.successes)?, t.checked_add(batch.trials)?))
        })
    }
}

impl ExperimentConfig {
    /// Load an experiment file; `.toml` files are parsed as TOML, anything
    /// else as JSON.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    /// Parse an experiment from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Parse an experiment from a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self, ValidationError> {
        toml::from_str(text)
            .map_err(|e| ValidationError::ParseError(format!("Invalid TOML: {}", e)))
    }

    /// The three-variation walk-through used when no file is configured.
    pub fn builtin_demo() -> Self {
        let variation = |name: &str, successes: u64| VariationConfig {
            name: name.to_string(),
            prior: PriorConfig::default(),
            value_at_risk: None,
            trials: vec![TrialBatch {
                successes,
                trials: 10,
            }],
        };

        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            description: Some("Three variations, B converting best".to_string()),
            sample_count: DEFAULT_SAMPLE_COUNT,
            thompson_rounds: DEFAULT_THOMPSON_ROUNDS,
            seed: None,
            value_at_risk: Some(0.58),
            variations: vec![
                variation("Variation A", 5),
                variation("Variation B", 6),
                variation("Variation C", 4),
            ],
        }
    }
}
