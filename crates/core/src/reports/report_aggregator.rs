use log::debug;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::{AnnualCurrencySummary, ReportRow, YearReport};
use crate::assets::classify_asset;
use crate::constants::FEE_DISPLAY_PRECISION;
use crate::portfolio::realized::RealizedRecord;
use crate::settings::Remarks;
use crate::utils::time_utils::{year_end_instant, year_of};

/// Splits a realized-record stream into yearly tables and appends one
/// summary row per currency traded in that year.
#[derive(Debug, Clone, Default)]
pub struct ReportAggregator {
    remarks: Remarks,
}

impl ReportAggregator {
    pub fn new(remarks: &Remarks) -> Self {
        ReportAggregator {
            remarks: remarks.clone(),
        }
    }

    /// Builds one report per calendar year that has at least one record,
    /// ascending by year.
    pub fn aggregate(&self, records: &[RealizedRecord]) -> Vec<YearReport> {
        let mut by_year: BTreeMap<i32, BTreeMap<&str, Vec<&RealizedRecord>>> = BTreeMap::new();
        for record in records {
            by_year
                .entry(year_of(&record.timestamp))
                .or_default()
                .entry(record.currency.as_str())
                .or_default()
                .push(record);
        }

        by_year
            .into_iter()
            .map(|(year, by_currency)| {
                let mut rows: Vec<ReportRow> = Vec::new();
                let mut summaries = Vec::with_capacity(by_currency.len());
                for (currency, group) in by_currency {
                    rows.extend(group.iter().copied().map(ReportRow::from));
                    summaries.push(self.summarize(year, currency, &group));
                }
                rows.extend(summaries.iter().map(AnnualCurrencySummary::to_row));
                // Stable: same-instant rows keep record order, summaries last
                rows.sort_by_key(|r| r.timestamp);

                debug!(
                    "Year {}: {} rows, {} currencies",
                    year,
                    rows.len(),
                    summaries.len()
                );
                YearReport {
                    year,
                    rows,
                    summaries,
                }
            })
            .collect()
    }

    /// Totals for one (year, currency) group.
    pub fn summarize(
        &self,
        year: i32,
        currency: &str,
        records: &[&RealizedRecord],
    ) -> AnnualCurrencySummary {
        let mut net_profit = Decimal::ZERO;
        let mut total_sale_notional = Decimal::ZERO;
        let mut total_cost_notional = Decimal::ZERO;
        let mut manual_review_rows = 0;
        for record in records {
            let multiplier = classify_asset(&record.code).notional_multiplier();
            net_profit += record.profit;
            total_sale_notional += record.sale_price * record.quantity * multiplier;
            total_cost_notional += record.cost_price * record.quantity * multiplier;
            if record.needs_review() {
                manual_review_rows += 1;
            }
        }

        let implied_fee = ((total_sale_notional - total_cost_notional).abs() - net_profit.abs())
            .abs()
            .round_dp(FEE_DISPLAY_PRECISION);

        let mut note = self
            .remarks
            .summary_note
            .replace("{fee}", &format!("{:.2}", implied_fee))
            .replace("{currency}", currency);
        if manual_review_rows > 0 {
            note.push_str(
                &self
                    .remarks
                    .summary_review_suffix
                    .replace("{count}", &manual_review_rows.to_string()),
            );
        }

        AnnualCurrencySummary {
            year,
            label: self
                .remarks
                .summary_label
                .replace("{year}", &year.to_string())
                .replace("{currency}", currency),
            total_sale_notional,
            total_cost_notional,
            quantity: Decimal::ZERO,
            net_profit,
            implied_fee,
            manual_review_rows,
            record_count: records.len(),
            timestamp: year_end_instant(year),
            currency: currency.to_string(),
            note,
        }
    }
}
