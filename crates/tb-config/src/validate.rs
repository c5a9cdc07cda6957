//! Configuration validation errors and semantic validation.

use std::collections::HashSet;

use thiserror::Error;

use crate::experiment::{ExperimentConfig, PriorConfig, VariationConfig};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

impl From<ValidationError> for tb_common::Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::IoError(msg) => tb_common::Error::Io(std::io::Error::other(msg)),
            other => tb_common::Error::Config(other.to_string()),
        }
    }
}

/// Validate an experiment configuration semantically.
pub fn validate_config(config: &ExperimentConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if config.sample_count == 0 {
        return Err(ValidationError::InvalidValue {
            field: "sample_count".to_string(),
            message: "Must be at least 1".to_string(),
        });
    }

    if config.thompson_rounds == 0 {
        return Err(ValidationError::InvalidValue {
            field: "thompson_rounds".to_string(),
            message: "Must be at least 1".to_string(),
        });
    }

    if let Some(threshold) = config.value_at_risk {
        validate_threshold("value_at_risk", threshold)?;
    }

    if config.variations.len() < 2 {
        return Err(ValidationError::SemanticError(format!(
            "At least two variations are required, got {}",
            config.variations.len()
        )));
    }

    let mut seen = HashSet::new();
    for (idx, variation) in config.variations.iter().enumerate() {
        if !seen.insert(variation.name.as_str()) {
            return Err(ValidationError::SemanticError(format!(
                "Duplicate variation name '{}'",
                variation.name
            )));
        }
        validate_variation(idx, variation)?;
    }

    Ok(())
}

/// Validate a single variation entry.
fn validate_variation(idx: usize, variation: &VariationConfig) -> ValidationResult<()> {
    let field = format!("variations[{}]", idx);

    if variation.name.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: format!("{}.name", field),
            message: "Must not be empty".to_string(),
        });
    }

    validate_prior(&format!("{}.prior", field), &variation.prior)?;

    if let Some(threshold) = variation.value_at_risk {
        validate_threshold(&format!("{}.value_at_risk", field), threshold)?;
    }

    for (batch_idx, batch) in variation.trials.iter().enumerate() {
        if batch.successes > batch.trials {
            return Err(ValidationError::InvalidValue {
                field: format!("{}.trials[{}]", field, batch_idx),
                message: format!(
                    "successes ({}) exceed trials ({})",
                    batch.successes, batch.trials
                ),
            });
        }
    }

    if variation.totals().is_none() {
        return Err(ValidationError::InvalidValue {
            field: format!("{}.trials", field),
            message: "Summed counts overflow a 64-bit counter".to_string(),
        });
    }

    Ok(())
}

/// Validate Beta prior parameters.
fn validate_prior(field: &str, prior: &PriorConfig) -> ValidationResult<()> {
    if !prior.alpha.is_finite() || prior.alpha <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: format!("{}.alpha", field),
            message: format!("Must be positive, got {}", prior.alpha),
        });
    }

    if !prior.beta.is_finite() || prior.beta <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: format!("{}.beta", field),
            message: format!("Must be positive, got {}", prior.beta),
        });
    }

    Ok(())
}

fn validate_threshold(field: &str, threshold: f64) -> ValidationResult<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("Must be in [0, 1], got {}", threshold),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::TrialBatch;

    #[test]
    fn builtin_demo_is_valid() {
        validate_config(&ExperimentConfig::builtin_demo()).unwrap();
    }

    #[test]
    fn rejects_wrong_version() {
        let mut config = ExperimentConfig::builtin_demo();
        config.schema_version = "0.9.0".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ValidationError::VersionMismatch { .. }));
        assert_eq!(err.code(), 66);
    }

    #[test]
    fn rejects_single_variation() {
        let mut config = ExperimentConfig::builtin_demo();
        config.variations.truncate(1);
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::SemanticError(_))
        ));
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut config = ExperimentConfig::builtin_demo();
        config.variations[2].name = config.variations[0].name.clone();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn rejects_non_positive_prior() {
        let mut config = ExperimentConfig::builtin_demo();
        config.variations[1].prior.beta = 0.0;
        match validate_config(&config) {
            Err(ValidationError::InvalidValue { field, .. }) => {
                assert_eq!(field, "variations[1].prior.beta");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn rejects_excess_successes() {
        let mut config = ExperimentConfig::builtin_demo();
        config.variations[0].trials.push(TrialBatch {
            successes: 4,
            trials: 3,
        });
        match validate_config(&config) {
            Err(ValidationError::InvalidValue { field, message }) => {
                assert_eq!(field, "variations[0].trials[1]");
                assert!(message.contains("exceed"));
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn rejects_overflowing_totals() {
        let mut config = ExperimentConfig::builtin_demo();
        config.variations[2].trials.push(TrialBatch {
            successes: 0,
            trials: u64::MAX,
        });
        match validate_config(&config) {
            Err(ValidationError::InvalidValue { field, message }) => {
                assert_eq!(field, "variations[2].trials");
                assert!(message.contains("overflow"));
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn rejects_threshold_out_of_range() {
        let mut config = ExperimentConfig::builtin_demo();
        config.value_at_risk = Some(1.5);
        assert!(validate_config(&config).is_err());

        let mut config = ExperimentConfig::builtin_demo();
        config.variations[0].value_at_risk = Some(-0.1);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_zero_sample_count() {
        let mut config = ExperimentConfig::builtin_demo();
        config.sample_count = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn converts_into_common_error() {
        let err: tb_common::Error =
            ValidationError::SemanticError("too few variations".to_string()).into();
        assert_eq!(err.code(), 40);
    }
}
