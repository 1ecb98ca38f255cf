//! Gainbook Core - realized gain/loss accounting for stock and option trades.
//!
//! Trade rows are normalized into per-code streams, run through a
//! weighted-average engine (stocks) or a signed net-position engine
//! (options), and the resulting realized records are aggregated into yearly
//! tables with per-currency summaries.

pub mod assets;
pub mod constants;
pub mod errors;
pub mod portfolio;
pub mod reports;
pub mod settings;
pub mod trades;
pub mod utils;

// Re-export common types from asset and portfolio modules
pub use assets::*;
pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
