use log::{debug, info};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::engine_traits::{validate_trade, PositionEngine, SettlementContext};
use super::expiration::resolve_expiration;
use crate::assets::AssetClass;
use crate::errors::Result;
use crate::portfolio::holdings::OptionHoldings;
use crate::portfolio::realized::{RealizedKind, RealizedRecord};
use crate::portfolio::CalculationWarning;
use crate::settings::Remarks;
use crate::trades::{TradeRecord, TradeSide};
use crate::utils::decimal_utils::{contract_multiplier, round_output};

/// Signed net position ledger for option contracts.
///
/// A buy first covers any short, a sell first closes any long; whatever is
/// left of the fill opens a position on the other side. Every price times
/// quantity term is scaled by the contract multiplier.
#[derive(Debug, Clone, Default)]
pub struct OptionEngine {
    remarks: Arc<Remarks>,
}

impl OptionEngine {
    pub fn new(remarks: Arc<Remarks>) -> Self {
        OptionEngine { remarks }
    }

    fn buy(&self, holdings: &mut OptionHoldings, trade: &TradeRecord) -> Vec<RealizedRecord> {
        let mult = contract_multiplier();
        if !holdings.is_short() {
            holdings.cost_basis += trade.quantity * trade.price * mult + trade.fee;
            holdings.quantity += trade.quantity;
            return Vec::new();
        }

        let held = holdings.quantity.abs();
        let close_qty = trade.quantity.min(held);
        let avg_short_price = holdings.short_proceeds / (held * mult);
        let proceeds_closed = close_qty * avg_short_price * mult;
        let cost_to_close = close_qty * trade.price * mult + trade.fee;
        let record = RealizedRecord::new(
            RealizedKind::ShortClose,
            &trade.code,
            round_output(avg_short_price),
            trade.price,
            close_qty,
            proceeds_closed - cost_to_close,
            trade.timestamp,
            &trade.currency,
            &self.remarks,
        );

        holdings.quantity += close_qty;
        holdings.short_proceeds -= proceeds_closed;

        let residual = trade.quantity - close_qty;
        if residual > Decimal::ZERO {
            debug!(
                "{}: buy of {} reverses short, opening long {}",
                trade.code, trade.quantity, residual
            );
            holdings.settle_flat_sides();
            holdings.quantity += residual;
            holdings.cost_basis += residual * trade.price * mult;
        }
        holdings.settle_flat_sides();
        vec![record]
    }

    fn sell(&self, holdings: &mut OptionHoldings, trade: &TradeRecord) -> Vec<RealizedRecord> {
        let mult = contract_multiplier();
        if !holdings.is_long() {
            holdings.short_proceeds += trade.quantity * trade.price * mult - trade.fee;
            holdings.quantity -= trade.quantity;
            return Vec::new();
        }

        let sell_qty = trade.quantity.min(holdings.quantity);
        let avg_cost = holdings.cost_basis / (holdings.quantity * mult);
        let proceeds = sell_qty * trade.price * mult - trade.fee;
        let cost_closed = sell_qty * avg_cost * mult;
        let record = RealizedRecord::new(
            RealizedKind::LongClose,
            &trade.code,
            trade.price,
            round_output(avg_cost),
            sell_qty,
            proceeds - cost_closed,
            trade.timestamp,
            &trade.currency,
            &self.remarks,
        );

        holdings.quantity -= sell_qty;
        holdings.cost_basis -= cost_closed;

        let residual = trade.quantity - sell_qty;
        if residual > Decimal::ZERO {
            debug!(
                "{}: sell of {} reverses long, opening short {}",
                trade.code, trade.quantity, residual
            );
            holdings.settle_flat_sides();
            holdings.quantity -= residual;
            holdings.short_proceeds += residual * trade.price * mult;
        }
        holdings.settle_flat_sides();
        vec![record]
    }
}

impl PositionEngine for OptionEngine {
    type Holdings = OptionHoldings;

    fn asset_class(&self) -> AssetClass {
        AssetClass::Option
    }

    fn apply_trade(
        &self,
        holdings: &mut OptionHoldings,
        trade: &TradeRecord,
    ) -> Result<Vec<RealizedRecord>> {
        validate_trade(trade)?;
        Ok(match trade.side {
            TradeSide::Buy => self.buy(holdings, trade),
            TradeSide::Sell => self.sell(holdings, trade),
        })
    }

    /// Settles a residual position whose expiry has passed.
    fn settle(
        &self,
        holdings: &mut OptionHoldings,
        context: &SettlementContext<'_>,
        warnings: &mut Vec<CalculationWarning>,
    ) -> Vec<RealizedRecord> {
        if holdings.is_flat() {
            return Vec::new();
        }

        let resolution = resolve_expiration(context.code, context.last_trade.timestamp);
        if !resolution.is_due(context.evaluation_date) {
            debug!(
                "{} open position of {} not yet expired ({})",
                context.code, holdings.quantity, resolution.expiration_date
            );
            return Vec::new();
        }

        let mult = contract_multiplier();
        let currency = &context.last_trade.currency;
        let record = if holdings.is_long() {
            RealizedRecord::new(
                RealizedKind::ExpiredWorthless,
                context.code,
                Decimal::ZERO,
                round_output(holdings.cost_basis / (holdings.quantity * mult)),
                holdings.quantity,
                -holdings.cost_basis,
                resolution.settles_at,
                currency,
                &self.remarks,
            )
        } else {
            let quantity = holdings.quantity.abs();
            RealizedRecord::new(
                RealizedKind::ShortExpired,
                context.code,
                round_output(holdings.short_proceeds / (quantity * mult)),
                Decimal::ZERO,
                quantity,
                holdings.short_proceeds,
                resolution.settles_at,
                currency,
                &self.remarks,
            )
        };

        let record = if resolution.fallback {
            warnings.push(CalculationWarning::new(
                context.code,
                format!(
                    "Expiration date not found in code; settled as of last trade {}",
                    resolution.settles_at
                ),
            ));
            record.with_extra_note(&self.remarks.expiration_unparsable)
        } else {
            record
        };

        info!(
            "{} expired on {}: {} settled with profit {}",
            context.code, resolution.expiration_date, record.quantity, record.profit
        );
        holdings.reset();
        vec![record]
    }
}
