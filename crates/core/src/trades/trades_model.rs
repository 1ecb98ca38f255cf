use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::trades_constants::{TRADE_SIDE_BUY, TRADE_SIDE_SELL};

/// Canonical direction of a fill. Raw broker spellings are mapped onto these
/// two values by the normalizer; the engines only ever see this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => TRADE_SIDE_BUY,
            TradeSide::Sell => TRADE_SIDE_SELL,
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeSide {
    type Err = String;

    /// Parses only the canonical spellings. Broker variants go through
    /// `SideMapping`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            s if s == TRADE_SIDE_BUY => Ok(TradeSide::Buy),
            s if s == TRADE_SIDE_SELL => Ok(TradeSide::Sell),
            _ => Err(format!("Unknown trade side: {}", s)),
        }
    }
}

/// One validated fill, ready for an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub code: String,
    pub side: TradeSide,
    /// Always > 0
    pub quantity: Decimal,
    /// Always >= 0
    pub price: Decimal,
    /// Total commission and charges for the fill, always >= 0
    pub fee: Decimal,
    pub timestamp: NaiveDateTime,
    pub currency: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
}

impl TradeRecord {
    pub fn new(
        code: impl Into<String>,
        side: TradeSide,
        quantity: Decimal,
        price: Decimal,
        fee: Decimal,
        timestamp: NaiveDateTime,
        currency: impl Into<String>,
    ) -> Self {
        TradeRecord {
            code: code.into(),
            side,
            quantity,
            price,
            fee,
            timestamp,
            currency: currency.into(),
            account_id: None,
            order_id: None,
        }
    }

    pub fn is_buy(&self) -> bool {
        self.side == TradeSide::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.side == TradeSide::Sell
    }
}

/// A trade row as read from a file: every field is optional text.
///
/// `row` is the 1-based data row number in its source file, used in error
/// messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrade {
    pub row: usize,
    pub code: Option<String>,
    pub side: Option<String>,
    pub quantity: Option<String>,
    pub price: Option<String>,
    pub fee: Option<String>,
    pub timestamp: Option<String>,
    pub currency: Option<String>,
    pub account_id: Option<String>,
    pub order_id: Option<String>,
}

impl RawTrade {
    /// Trimmed, non-empty code, if any.
    pub fn code(&self) -> Option<&str> {
        self.code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}
