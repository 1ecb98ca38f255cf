//! Position engines: one accounting model per asset class behind a common
//! trait, plus option expiration handling.

mod engine_traits;
pub mod expiration;
mod option_engine;
mod stock_engine;

#[cfg(test)]
mod option_engine_tests;
#[cfg(test)]
mod stock_engine_tests;

pub use engine_traits::{validate_trade, PositionEngine, SettlementContext};
pub use expiration::{resolve_expiration, ExpirationResolution};
pub use option_engine::OptionEngine;
pub use stock_engine::StockEngine;
