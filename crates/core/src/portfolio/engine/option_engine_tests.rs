#[cfg(test)]
mod tests {
    use crate::portfolio::engine::{OptionEngine, PositionEngine, SettlementContext};
    use crate::portfolio::holdings::OptionHoldings;
    use crate::portfolio::realized::RealizedKind;
    use crate::settings::Remarks;
    use crate::trades::{TradeRecord, TradeSide};
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    const CALL: &str = "US.TSLA240419C200000";

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    fn trade(side: TradeSide, quantity: Decimal, price: Decimal, fee: Decimal) -> TradeRecord {
        TradeRecord::new(CALL, side, quantity, price, fee, at(2024, 3, 1), "USD")
    }

    fn engine() -> OptionEngine {
        OptionEngine::new(Arc::new(Remarks::default()))
    }

    fn holdings(quantity: Decimal, cost_basis: Decimal, short_proceeds: Decimal) -> OptionHoldings {
        OptionHoldings {
            quantity,
            cost_basis,
            short_proceeds,
        }
    }

    #[test]
    fn test_short_then_cover_realizes_premium_difference() {
        let engine = engine();
        let mut h = OptionHoldings::default();
        let opened = engine
            .apply_trade(&mut h, &trade(TradeSide::Sell, dec!(1), dec!(2), dec!(0)))
            .unwrap();
        assert!(opened.is_empty());
        assert_eq!(h, holdings(dec!(-1), dec!(0), dec!(200)));

        let records = engine
            .apply_trade(&mut h, &trade(TradeSide::Buy, dec!(1), dec!(1), dec!(0)))
            .unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.kind, RealizedKind::ShortClose);
        assert_eq!(record.note, "short close");
        assert_eq!(record.sale_price, dec!(2));
        assert_eq!(record.cost_price, dec!(1));
        assert_eq!(record.quantity, dec!(1));
        assert_eq!(record.profit, dec!(100));
        assert_eq!(h, OptionHoldings::default());
    }

    #[test]
    fn test_long_open_and_partial_close_with_fees() {
        let engine = engine();
        let mut h = OptionHoldings::default();
        engine
            .apply_trade(&mut h, &trade(TradeSide::Buy, dec!(4), dec!(2.5), dec!(4)))
            .unwrap();
        assert_eq!(h, holdings(dec!(4), dec!(1004), dec!(0)));

        let records = engine
            .apply_trade(&mut h, &trade(TradeSide::Sell, dec!(1), dec!(3), dec!(1)))
            .unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.kind, RealizedKind::LongClose);
        assert_eq!(record.sale_price, dec!(3));
        assert_eq!(record.cost_price, dec!(2.51));
        // 1 * 3 * 100 - 1 - 251
        assert_eq!(record.profit, dec!(48));
        assert_eq!(h, holdings(dec!(3), dec!(753), dec!(0)));
    }

    #[test]
    fn test_short_open_nets_fee_from_proceeds() {
        let engine = engine();
        let mut h = OptionHoldings::default();
        engine
            .apply_trade(&mut h, &trade(TradeSide::Sell, dec!(2), dec!(1.5), dec!(2)))
            .unwrap();
        assert_eq!(h, holdings(dec!(-2), dec!(0), dec!(298)));
        assert_eq!(h.average_short_price(), dec!(1.49));
    }

    #[test]
    fn test_sell_through_long_opens_short() {
        let engine = engine();
        let mut h = holdings(dec!(2), dec!(400), dec!(0));
        let records = engine
            .apply_trade(&mut h, &trade(TradeSide::Sell, dec!(5), dec!(3), dec!(0)))
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].quantity, dec!(2));
        assert_eq!(records[0].profit, dec!(200));
        assert_eq!(h, holdings(dec!(-3), dec!(0), dec!(900)));
    }

    #[test]
    fn test_buy_through_short_opens_long() {
        let engine = engine();
        let mut h = holdings(dec!(-2), dec!(0), dec!(600));
        let records = engine
            .apply_trade(&mut h, &trade(TradeSide::Buy, dec!(3), dec!(1), dec!(1)))
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, RealizedKind::ShortClose);
        assert_eq!(records[0].quantity, dec!(2));
        // 600 - (2 * 1 * 100 + 1)
        assert_eq!(records[0].profit, dec!(399));
        assert_eq!(h, holdings(dec!(1), dec!(100), dec!(0)));
    }

    #[test]
    fn test_long_past_expiry_expires_worthless() {
        let engine = engine();
        let mut h = holdings(dec!(5), dec!(500), dec!(0));
        let last = trade(TradeSide::Buy, dec!(5), dec!(1), dec!(0));
        let context = SettlementContext {
            code: CALL,
            evaluation_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            last_trade: &last,
        };
        let mut warnings = Vec::new();
        let records = engine.settle(&mut h, &context, &mut warnings);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.kind, RealizedKind::ExpiredWorthless);
        assert_eq!(record.sale_price, Decimal::ZERO);
        assert_eq!(record.cost_price, dec!(1));
        assert_eq!(record.quantity, dec!(5));
        assert_eq!(record.profit, dec!(-500));
        assert_eq!(record.note, "expired worthless");
        assert_eq!(
            record.timestamp,
            NaiveDate::from_ymd_opt(2024, 4, 19)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert!(warnings.is_empty());
        assert_eq!(h, OptionHoldings::default());
    }

    #[test]
    fn test_short_past_expiry_keeps_premium() {
        let engine = engine();
        let mut h = holdings(dec!(-3), dec!(0), dec!(450));
        let last = trade(TradeSide::Sell, dec!(3), dec!(1.5), dec!(0));
        let context = SettlementContext {
            code: CALL,
            evaluation_date: NaiveDate::from_ymd_opt(2024, 4, 20).unwrap(),
            last_trade: &last,
        };
        let records = engine.settle(&mut h, &context, &mut Vec::new());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, RealizedKind::ShortExpired);
        assert_eq!(records[0].sale_price, dec!(1.5));
        assert_eq!(records[0].cost_price, Decimal::ZERO);
        assert_eq!(records[0].quantity, dec!(3));
        assert_eq!(records[0].profit, dec!(450));
        assert_eq!(h, OptionHoldings::default());
    }

    #[test]
    fn test_not_yet_expired_stays_open() {
        let engine = engine();
        let mut h = holdings(dec!(2), dec!(300), dec!(0));
        let last = trade(TradeSide::Buy, dec!(2), dec!(1.5), dec!(0));
        let context = SettlementContext {
            code: CALL,
            // expiry day itself is not past expiry
            evaluation_date: NaiveDate::from_ymd_opt(2024, 4, 19).unwrap(),
            last_trade: &last,
        };
        let records = engine.settle(&mut h, &context, &mut Vec::new());
        assert!(records.is_empty());
        assert_eq!(h, holdings(dec!(2), dec!(300), dec!(0)));
    }

    #[test]
    fn test_unparsable_expiry_falls_back_with_note() {
        let engine = engine();
        let code = "US.FOO241340C100";
        let mut h = holdings(dec!(1), dec!(80), dec!(0));
        let last = TradeRecord::new(
            code,
            TradeSide::Buy,
            dec!(1),
            dec!(0.8),
            dec!(0),
            at(2024, 5, 2),
            "USD",
        );
        let context = SettlementContext {
            code,
            evaluation_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            last_trade: &last,
        };
        let mut warnings = Vec::new();
        let records = engine.settle(&mut h, &context, &mut warnings);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].profit, dec!(-80));
        assert_eq!(records[0].timestamp, at(2024, 5, 2));
        assert_eq!(
            records[0].note,
            "expired worthless; expiration date unparsable, last trade date used"
        );
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, code);
    }

    #[test]
    fn test_flat_position_needs_no_settlement() {
        let engine = engine();
        let mut h = OptionHoldings::default();
        let last = trade(TradeSide::Buy, dec!(1), dec!(1), dec!(0));
        let context = SettlementContext {
            code: CALL,
            evaluation_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            last_trade: &last,
        };
        assert!(engine.settle(&mut h, &context, &mut Vec::new()).is_empty());
    }
}
