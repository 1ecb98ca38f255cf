use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::decimal_utils::contract_multiplier;

/// Accounting model an instrument code is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetClass {
    #[default]
    Stock,
    Option,
}

impl AssetClass {
    /// Factor converting a quoted price times quantity into notional.
    pub fn notional_multiplier(&self) -> Decimal {
        match self {
            AssetClass::Stock => Decimal::ONE,
            AssetClass::Option => contract_multiplier(),
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetClass::Stock => write!(f, "Stock"),
            AssetClass::Option => write!(f, "Option"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionRight {
    Call,
    Put,
}

/// Components of an option code such as `US.AAPL240419C190000`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionCode {
    /// Two-letter market prefix (`US`, `HK`), if present
    pub market: Option<String>,
    pub underlying: String,
    /// Raw `YYMMDD` digits as they appear in the code
    pub expiry_digits: String,
    /// Parsed expiry; `None` when the digits are not a calendar date
    pub expiration: Option<NaiveDate>,
    pub right: OptionRight,
    /// Strike digits as quoted by the broker (scaling is venue specific)
    pub strike_digits: String,
}
