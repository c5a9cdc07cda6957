//! testbandit math utilities.

pub mod math;

pub use math::bernoulli;
pub use math::beta::*;
pub use math::sampling;
pub use math::stable::*;
