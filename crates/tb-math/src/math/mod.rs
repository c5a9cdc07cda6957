//! Core math modules.

pub mod bernoulli;
pub mod beta;
pub mod sampling;
pub mod stable;
