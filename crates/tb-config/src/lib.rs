//! testbandit configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for experiment files (JSON or TOML)
//! - Config resolution (CLI → env → XDG → built-in demo)
//! - Semantic validation

pub mod experiment;
pub mod resolve;
pub mod validate;

pub use experiment::{ExperimentConfig, PriorConfig, TrialBatch, VariationConfig};
pub use resolve::{load_config, resolve_config_path, ConfigSource, ResolvedConfig};
pub use validate::{validate_config, ValidationError, ValidationResult};

/// Schema version for experiment files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
