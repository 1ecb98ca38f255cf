use log::{debug, warn};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::engine_traits::{validate_trade, PositionEngine};
use crate::assets::AssetClass;
use crate::errors::Result;
use crate::portfolio::holdings::StockHoldings;
use crate::portfolio::realized::{RealizedKind, RealizedRecord};
use crate::settings::Remarks;
use crate::trades::{TradeRecord, TradeSide};
use crate::utils::decimal_utils::{is_quantity_significant, round_output};

/// Weighted-average cost ledger for stocks.
///
/// Buys fold into one cost pool; each sell is charged the pool's current
/// average cost. Equity shorts are not modeled: selling more than is held
/// flags the excess for manual review and flattens the position.
#[derive(Debug, Clone, Default)]
pub struct StockEngine {
    remarks: Arc<Remarks>,
}

impl StockEngine {
    pub fn new(remarks: Arc<Remarks>) -> Self {
        StockEngine { remarks }
    }

    fn buy(&self, holdings: &mut StockHoldings, trade: &TradeRecord) {
        holdings.cost_basis += trade.quantity * trade.price + trade.fee;
        holdings.quantity += trade.quantity;
    }

    fn sell(&self, holdings: &mut StockHoldings, trade: &TradeRecord) -> Vec<RealizedRecord> {
        if holdings.is_flat() {
            warn!(
                "Sell of {} {} at {} with no position. Flagged for review.",
                trade.quantity, trade.code, trade.timestamp
            );
            holdings.reset();
            return vec![self.record(
                RealizedKind::SellWithoutPosition,
                trade,
                Decimal::ZERO,
                trade.quantity,
                Decimal::ZERO,
            )];
        }

        let mut records = Vec::with_capacity(2);
        let average_cost = holdings.cost_basis / holdings.quantity;
        let mut closable = trade.quantity.min(holdings.quantity);
        // A shortfall below the quantity threshold is rounding residue, not an oversell
        if !is_quantity_significant(&(trade.quantity - closable)) {
            closable = trade.quantity;
        }
        // The whole fee is charged to the closing record
        let profit = (trade.price - average_cost) * closable - trade.fee;
        records.push(self.record(
            RealizedKind::LongClose,
            trade,
            round_output(average_cost),
            closable,
            profit,
        ));

        holdings.cost_basis -= average_cost * closable;
        holdings.quantity -= closable;
        if holdings.is_flat() {
            holdings.reset();
        }

        if trade.quantity > closable {
            let excess = trade.quantity - closable;
            warn!(
                "Sell of {} {} at {} exceeds holdings by {}. Excess flagged for review.",
                trade.quantity, trade.code, trade.timestamp, excess
            );
            records.push(self.record(
                RealizedKind::Oversold,
                trade,
                Decimal::ZERO,
                excess,
                Decimal::ZERO,
            ));
            holdings.reset();
        }

        debug!(
            "{} after sell: quantity {}, cost basis {}",
            trade.code, holdings.quantity, holdings.cost_basis
        );
        records
    }

    fn record(
        &self,
        kind: RealizedKind,
        trade: &TradeRecord,
        cost_price: Decimal,
        quantity: Decimal,
        profit: Decimal,
    ) -> RealizedRecord {
        RealizedRecord::new(
            kind,
            &trade.code,
            trade.price,
            cost_price,
            quantity,
            profit,
            trade.timestamp,
            &trade.currency,
            &self.remarks,
        )
    }
}

impl PositionEngine for StockEngine {
    type Holdings = StockHoldings;

    fn asset_class(&self) -> AssetClass {
        AssetClass::Stock
    }

    fn apply_trade(
        &self,
        holdings: &mut StockHoldings,
        trade: &TradeRecord,
    ) -> Result<Vec<RealizedRecord>> {
        validate_trade(trade)?;
        match trade.side {
            TradeSide::Buy => {
                self.buy(holdings, trade);
                Ok(Vec::new())
            }
            TradeSide::Sell => Ok(self.sell(holdings, trade)),
        }
    }
}
