use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::portfolio::realized::RealizedRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportRowKind {
    Realized,
    Summary,
}

/// One line of a yearly table. Realized records and annual summaries share
/// this column set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub code: String,
    pub sale_price: Decimal,
    pub cost_price: Decimal,
    pub quantity: Decimal,
    pub profit: Decimal,
    pub timestamp: NaiveDateTime,
    pub currency: String,
    pub note: String,
    pub kind: ReportRowKind,
}

impl From<&RealizedRecord> for ReportRow {
    fn from(record: &RealizedRecord) -> Self {
        ReportRow {
            code: record.code.clone(),
            sale_price: record.sale_price,
            cost_price: record.cost_price,
            quantity: record.quantity,
            profit: record.profit,
            timestamp: record.timestamp,
            currency: record.currency.clone(),
            note: record.note.clone(),
            kind: ReportRowKind::Realized,
        }
    }
}

/// Totals of one (year, currency) group.
///
/// `implied_fee` is backed out of the totals rather than summed from trades.
/// It is only an approximation when `manual_review_rows` is non-zero, since
/// those rows carry zero placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualCurrencySummary {
    pub year: i32,
    pub label: String,
    pub total_sale_notional: Decimal,
    pub total_cost_notional: Decimal,
    pub quantity: Decimal,
    pub net_profit: Decimal,
    pub implied_fee: Decimal,
    pub manual_review_rows: usize,
    pub record_count: usize,
    pub timestamp: NaiveDateTime,
    pub currency: String,
    pub note: String,
}

impl AnnualCurrencySummary {
    pub fn to_row(&self) -> ReportRow {
        ReportRow {
            code: self.label.clone(),
            sale_price: self.total_sale_notional,
            cost_price: self.total_cost_notional,
            quantity: self.quantity,
            profit: self.net_profit,
            timestamp: self.timestamp,
            currency: self.currency.clone(),
            note: self.note.clone(),
            kind: ReportRowKind::Summary,
        }
    }
}

/// The output table for one calendar year, rows ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearReport {
    pub year: i32,
    pub rows: Vec<ReportRow>,
    pub summaries: Vec<AnnualCurrencySummary>,
}

impl YearReport {
    pub fn realized_rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows
            .iter()
            .filter(|r| r.kind == ReportRowKind::Realized)
    }

    pub fn summary_for(&self, currency: &str) -> Option<&AnnualCurrencySummary> {
        self.summaries.iter().find(|s| s.currency == currency)
    }
}
