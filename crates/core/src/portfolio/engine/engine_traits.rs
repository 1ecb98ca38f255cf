use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::assets::AssetClass;
use crate::errors::{CalculatorError, Result};
use crate::portfolio::realized::RealizedRecord;
use crate::portfolio::CalculationWarning;
use crate::trades::TradeRecord;

/// What an engine knows when a code's trade stream ends.
#[derive(Debug, Clone, Copy)]
pub struct SettlementContext<'a> {
    pub code: &'a str,
    pub evaluation_date: NaiveDate,
    pub last_trade: &'a TradeRecord,
}

/// An accounting model for one asset class.
///
/// Engines hold no per-code state: the holdings they update are passed in by
/// the caller, which owns them for the duration of a run.
pub trait PositionEngine: Send + Sync {
    type Holdings: Send;

    fn asset_class(&self) -> AssetClass;

    /// Applies one fill, returning the records it realizes (possibly none).
    fn apply_trade(
        &self,
        holdings: &mut Self::Holdings,
        trade: &TradeRecord,
    ) -> Result<Vec<RealizedRecord>>;

    /// Terminal processing after the last trade of a code.
    fn settle(
        &self,
        _holdings: &mut Self::Holdings,
        _context: &SettlementContext<'_>,
        _warnings: &mut Vec<CalculationWarning>,
    ) -> Vec<RealizedRecord> {
        Vec::new()
    }
}

/// Rejects fills that break the engine input contract.
pub fn validate_trade(trade: &TradeRecord) -> Result<()> {
    let invalid = |message: String| -> Result<()> {
        Err(CalculatorError::InvalidTrade {
            code: trade.code.clone(),
            message,
        }
        .into())
    };
    if trade.quantity <= Decimal::ZERO {
        return invalid(format!("quantity must be positive, got {}", trade.quantity));
    }
    if trade.price < Decimal::ZERO {
        return invalid(format!("price must not be negative, got {}", trade.price));
    }
    if trade.fee < Decimal::ZERO {
        return invalid(format!("fee must not be negative, got {}", trade.fee));
    }
    if trade.currency.trim().is_empty() {
        return invalid("currency is missing".to_string());
    }
    Ok(())
}
