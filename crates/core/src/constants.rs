/// Shares of underlying represented by one option contract.
pub const OPTION_CONTRACT_MULTIPLIER: i64 = 100;

/// Decimal places kept on emitted prices and profits
pub const OUTPUT_DECIMAL_PRECISION: u32 = 4;

/// Decimal places for the implied fee shown in annual summaries
pub const FEE_DISPLAY_PRECISION: u32 = 2;

/// Decimal places kept on share counts after a split
pub const QUANTITY_DECIMAL_PRECISION: u32 = 8;

/// Quantity threshold below which a position is treated as flat
pub const QUANTITY_THRESHOLD: &str = "0.00000001";

/// Timestamp formats accepted in trade and split files, most specific first.
pub const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

/// Date-only formats accepted in trade and split files.
pub const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
