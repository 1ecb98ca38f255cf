#[cfg(test)]
mod tests {
    use crate::portfolio::engine::{PositionEngine, StockEngine};
    use crate::portfolio::holdings::StockHoldings;
    use crate::portfolio::realized::RealizedKind;
    use crate::settings::Remarks;
    use crate::trades::{TradeRecord, TradeSide};
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn trade(side: TradeSide, quantity: Decimal, price: Decimal, fee: Decimal) -> TradeRecord {
        TradeRecord::new("US.AAPL", side, quantity, price, fee, at(2024, 1, 2), "USD")
    }

    fn engine() -> StockEngine {
        StockEngine::new(Arc::new(Remarks::default()))
    }

    #[test]
    fn test_buy_accumulates_cost_with_fees() {
        let engine = engine();
        let mut holdings = StockHoldings::default();
        let records = engine
            .apply_trade(&mut holdings, &trade(TradeSide::Buy, dec!(10), dec!(100), dec!(5)))
            .unwrap();
        assert!(records.is_empty());
        engine
            .apply_trade(&mut holdings, &trade(TradeSide::Buy, dec!(30), dec!(120), dec!(5)))
            .unwrap();
        assert_eq!(holdings, StockHoldings::new(dec!(40), dec!(4610)));
        assert_eq!(holdings.average_cost(), dec!(115.25));
    }

    #[test]
    fn test_partial_sell_uses_average_cost_and_charges_fee() {
        let engine = engine();
        let mut holdings = StockHoldings::new(dec!(40), dec!(4610));
        let records = engine
            .apply_trade(&mut holdings, &trade(TradeSide::Sell, dec!(10), dec!(130), dec!(3)))
            .unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.kind, RealizedKind::LongClose);
        assert_eq!(record.sale_price, dec!(130));
        assert_eq!(record.cost_price, dec!(115.25));
        assert_eq!(record.quantity, dec!(10));
        // (130 - 115.25) * 10 - 3
        assert_eq!(record.profit, dec!(144.5));
        assert_eq!(record.note, "");

        assert_eq!(holdings.quantity, dec!(30));
        assert_eq!(holdings.cost_basis, dec!(3457.5));
        assert_eq!(holdings.average_cost(), dec!(115.25));
    }

    #[test]
    fn test_full_sell_flattens_position() {
        let engine = engine();
        let mut holdings = StockHoldings::new(dec!(3), dec!(100));
        let records = engine
            .apply_trade(&mut holdings, &trade(TradeSide::Sell, dec!(3), dec!(40), dec!(0)))
            .unwrap();
        assert_eq!(records.len(), 1);
        // cost price is the rounded average, profit uses the exact one
        assert_eq!(records[0].cost_price, dec!(33.3333));
        assert_eq!(records[0].profit, dec!(20));
        assert_eq!(holdings, StockHoldings::default());
    }

    #[test]
    fn test_sell_without_position_is_flagged() {
        let engine = engine();
        let mut holdings = StockHoldings::default();
        let records = engine
            .apply_trade(&mut holdings, &trade(TradeSide::Sell, dec!(10), dec!(55), dec!(1)))
            .unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.kind, RealizedKind::SellWithoutPosition);
        assert!(record.needs_review());
        assert_eq!(record.profit, Decimal::ZERO);
        assert_eq!(record.cost_price, Decimal::ZERO);
        assert_eq!(record.quantity, dec!(10));
        assert!(record.note.contains("manual review"));
        assert_eq!(holdings, StockHoldings::default());
    }

    #[test]
    fn test_oversell_closes_held_and_flags_excess() {
        let engine = engine();
        let mut holdings = StockHoldings::new(dec!(5), dec!(50));
        let records = engine
            .apply_trade(&mut holdings, &trade(TradeSide::Sell, dec!(8), dec!(12), dec!(2)))
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, RealizedKind::LongClose);
        assert_eq!(records[0].quantity, dec!(5));
        assert_eq!(records[0].profit, dec!(8));

        assert_eq!(records[1].kind, RealizedKind::Oversold);
        assert_eq!(records[1].quantity, dec!(3));
        assert_eq!(records[1].profit, Decimal::ZERO);
        assert_eq!(records[1].sale_price, dec!(12));
        assert!(records[1].note.contains("oversold"));

        assert_eq!(holdings, StockHoldings::default());
    }

    #[test]
    fn test_rejects_contract_violations() {
        let engine = engine();
        let mut holdings = StockHoldings::default();
        assert!(engine
            .apply_trade(&mut holdings, &trade(TradeSide::Buy, dec!(0), dec!(1), dec!(0)))
            .is_err());
        assert!(engine
            .apply_trade(&mut holdings, &trade(TradeSide::Buy, dec!(1), dec!(-1), dec!(0)))
            .is_err());
        assert!(engine
            .apply_trade(&mut holdings, &trade(TradeSide::Buy, dec!(1), dec!(1), dec!(-0.5)))
            .is_err());
        assert_eq!(holdings, StockHoldings::default());
    }

    #[test]
    fn test_custom_remarks_are_used() {
        let remarks = Remarks {
            sell_without_position: "check me".to_string(),
            ..Remarks::default()
        };
        let engine = StockEngine::new(Arc::new(remarks));
        let mut holdings = StockHoldings::default();
        let records = engine
            .apply_trade(&mut holdings, &trade(TradeSide::Sell, dec!(1), dec!(1), dec!(0)))
            .unwrap();
        assert_eq!(records[0].note, "check me");
    }

    #[test]
    fn test_residue_shortfall_is_not_an_oversell() {
        let engine = engine();
        let mut holdings = StockHoldings::new(dec!(99.99999999999999999999999999), dec!(3000));
        let records = engine
            .apply_trade(&mut holdings, &trade(TradeSide::Sell, dec!(100), dec!(33), dec!(0)))
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, RealizedKind::LongClose);
        assert_eq!(records[0].quantity, dec!(100));
        assert!(!records[0].needs_review());
        assert_eq!(holdings, StockHoldings::default());
    }

    #[test]
    fn test_sell_against_dust_position_clears_it() {
        let engine = engine();
        let mut holdings = StockHoldings::new(dec!(0.000000001), dec!(0.01));
        let records = engine
            .apply_trade(&mut holdings, &trade(TradeSide::Sell, dec!(5), dec!(10), dec!(0)))
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, RealizedKind::SellWithoutPosition);
        assert_eq!(holdings, StockHoldings::default());
    }
}
