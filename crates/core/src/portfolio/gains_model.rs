use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::assets::AssetClass;
use crate::errors::CodeFailure;
use crate::portfolio::holdings::{Holdings, HoldingsBook};
use crate::portfolio::realized::RealizedRecord;

/// A non-fatal data-quality issue met while processing one code.
///
/// Calculation continued; the affected figures may need a manual check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationWarning {
    pub code: String,
    pub message: String,
}

impl CalculationWarning {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        CalculationWarning {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for CalculationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code {}: {}", self.code, self.message)
    }
}

/// A position still held when the run ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPosition {
    pub code: String,
    pub asset_class: AssetClass,
    /// Signed for options, never negative for stocks
    pub quantity: Decimal,
    pub cost_basis: Decimal,
    pub short_proceeds: Decimal,
    /// Cost (long) or premium (short) per unit of underlying
    pub average_cost: Decimal,
    pub currency: String,
}

impl OpenPosition {
    /// Builds the open position for non-flat holdings.
    pub fn from_holdings(code: &str, holdings: &Holdings, currency: &str) -> Option<Self> {
        if holdings.is_flat() {
            return None;
        }
        let position = match holdings {
            Holdings::Stock(h) => OpenPosition {
                code: code.to_string(),
                asset_class: AssetClass::Stock,
                quantity: h.quantity,
                cost_basis: h.cost_basis,
                short_proceeds: Decimal::ZERO,
                average_cost: h.average_cost(),
                currency: currency.to_string(),
            },
            Holdings::Option(h) => OpenPosition {
                code: code.to_string(),
                asset_class: AssetClass::Option,
                quantity: h.quantity,
                cost_basis: h.cost_basis,
                short_proceeds: h.short_proceeds,
                average_cost: if h.is_long() {
                    h.average_long_cost()
                } else {
                    h.average_short_price()
                },
                currency: currency.to_string(),
            },
        };
        Some(position)
    }
}

/// Everything one calculation run produces.
///
/// Records of codes that failed are discarded, so `records` only ever holds
/// complete per-code streams.
#[derive(Debug, Clone, Default)]
pub struct GainsCalculationResult {
    /// Realized records in code order, each code's records in event order
    pub records: Vec<RealizedRecord>,
    pub open_positions: Vec<OpenPosition>,
    pub warnings: Vec<CalculationWarning>,
    pub failures: Vec<CodeFailure>,
    /// Final holdings of every code that completed
    pub holdings: HoldingsBook,
}

impl GainsCalculationResult {
    pub fn review_count(&self) -> usize {
        self.records.iter().filter(|r| r.needs_review()).count()
    }
}
