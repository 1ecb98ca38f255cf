//! Trades module - input rows, side normalization, and CSV loading.

pub mod csv_parser;
mod normalizer;
mod trades_constants;
mod trades_model;


pub use csv_parser::{
    parse_split_ratio, read_splits, read_splits_file, read_trade_files, read_trades,
    read_trades_file,
};
pub use normalizer::{
    dedupe_combo_fees, NormalizedTrades, SideMapping, TradeNormalizer, MISSING_CODE,
};
pub use trades_constants::*;
pub use trades_model::{RawTrade, TradeRecord, TradeSide};
