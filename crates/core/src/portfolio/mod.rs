//! Position accounting: per-asset-class engines, holdings, splits and the
//! calculator that drives them over a batch of trades.

pub mod engine;
pub mod gains_calculator;
mod gains_model;
pub mod holdings;
pub mod realized;
pub mod splits;

pub use gains_calculator::*;
pub use gains_model::*;
