//! Shared types for testbandit crates.
//!
//! The error taxonomy used across the engine, the configuration loader,
//! and the CLI, plus engine defaults shared by the latter two.

pub mod error;

pub use error::{Error, ErrorCategory, ErrorReport, Result};

/// Default number of Monte Carlo rounds for winner estimation.
pub const DEFAULT_SAMPLE_COUNT: usize = 200_000;

/// Default number of Thompson rounds (one draw: canonical Thompson Sampling).
pub const DEFAULT_THOMPSON_ROUNDS: usize = 1;

/// Default credible level for reported intervals.
pub const DEFAULT_CREDIBLE_LEVEL: f64 = 0.95;
