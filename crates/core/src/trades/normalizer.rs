//! Turns raw trade rows into canonical, per-code ordered `TradeRecord`s.
//!
//! This is the only place where broker side spellings are interpreted. Rows
//! that break the input contract fail their whole code; other codes carry on.

use chrono::NaiveDateTime;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use super::trades_constants::{DEFAULT_BUY_ALIASES, DEFAULT_SELL_ALIASES};
use super::{RawTrade, TradeRecord, TradeSide};
use crate::errors::{CodeFailure, Error, Result, ValidationError};
use crate::settings::Settings;
use crate::utils::time_utils::parse_timestamp;

/// Code used in failures for rows that have no code at all.
pub const MISSING_CODE: &str = "(missing code)";

/// Case-insensitive lookup from broker spellings to `TradeSide`.
#[derive(Debug, Clone)]
pub struct SideMapping {
    aliases: HashMap<String, TradeSide>,
}

impl Default for SideMapping {
    fn default() -> Self {
        Self::with_aliases(&HashMap::new())
    }
}

impl SideMapping {
    /// Builds the default mapping extended with `extra` (keys are matched
    /// case-insensitively and override defaults).
    pub fn with_aliases(extra: &HashMap<String, TradeSide>) -> Self {
        let mut aliases = HashMap::new();
        for alias in DEFAULT_BUY_ALIASES {
            aliases.insert(alias.to_string(), TradeSide::Buy);
        }
        for alias in DEFAULT_SELL_ALIASES {
            aliases.insert(alias.to_string(), TradeSide::Sell);
        }
        for (alias, side) in extra {
            aliases.insert(alias.trim().to_lowercase(), *side);
        }
        SideMapping { aliases }
    }

    pub fn resolve(&self, raw: &str) -> Option<TradeSide> {
        let key = raw.trim().to_lowercase();
        self.aliases
            .get(&key)
            .copied()
            .or_else(|| TradeSide::from_str(&key.to_uppercase()).ok())
    }
}

/// Output of normalization: clean trades per code plus the codes that failed.
#[derive(Debug, Clone, Default)]
pub struct NormalizedTrades {
    /// Trades per code, each list sorted ascending by timestamp (stable)
    pub by_code: BTreeMap<String, Vec<TradeRecord>>,
    pub failures: Vec<CodeFailure>,
    /// Number of fills whose fee was zeroed as a duplicate combo-order fee
    pub deduplicated_fees: usize,
}

impl NormalizedTrades {
    pub fn trade_count(&self) -> usize {
        self.by_code.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TradeNormalizer {
    side_mapping: SideMapping,
    dedupe_combo_fees: bool,
}

impl TradeNormalizer {
    pub fn new(settings: &Settings) -> Self {
        TradeNormalizer {
            side_mapping: SideMapping::with_aliases(&settings.side_aliases),
            dedupe_combo_fees: settings.dedupe_combo_fees,
        }
    }

    /// Validates one raw row.
    pub fn normalize_row(&self, row: &RawTrade) -> Result<TradeRecord> {
        let code = row
            .code()
            .ok_or_else(|| ValidationError::MissingField {
                code: MISSING_CODE.to_string(),
                field: "code".to_string(),
                row: row.row,
            })?
            .to_string();

        let raw_side = required(&code, "side", &row.side, row.row)?;
        let side =
            self.side_mapping
                .resolve(raw_side)
                .ok_or_else(|| ValidationError::UnknownSide {
                    code: code.clone(),
                    value: raw_side.to_string(),
                    row: row.row,
                })?;

        let quantity = parse_decimal_field(&code, "quantity", &row.quantity, row.row)?;
        if quantity <= Decimal::ZERO {
            return Err(invalid_field(&code, "quantity", &quantity.to_string(), row.row));
        }
        let price = parse_decimal_field(&code, "price", &row.price, row.row)?;
        if price < Decimal::ZERO {
            return Err(invalid_field(&code, "price", &price.to_string(), row.row));
        }
        let fee = parse_decimal_field(&code, "fee", &row.fee, row.row)?;
        if fee < Decimal::ZERO {
            return Err(invalid_field(&code, "fee", &fee.to_string(), row.row));
        }

        let raw_ts = required(&code, "timestamp", &row.timestamp, row.row)?;
        let timestamp = parse_timestamp(raw_ts)
            .ok_or_else(|| invalid_field(&code, "timestamp", raw_ts, row.row))?;
        let currency = required(&code, "currency", &row.currency, row.row)?.to_uppercase();

        Ok(TradeRecord {
            code,
            side,
            quantity,
            price,
            fee,
            timestamp,
            currency,
            account_id: optional(&row.account_id),
            order_id: optional(&row.order_id),
        })
    }

    /// Normalizes all rows, grouping them by code.
    ///
    /// A code with any invalid row is reported in `failures` and dropped.
    pub fn normalize(&self, rows: &[RawTrade]) -> NormalizedTrades {
        let mut grouped: BTreeMap<String, Vec<&RawTrade>> = BTreeMap::new();
        for row in rows {
            let key = row.code().unwrap_or(MISSING_CODE).to_string();
            grouped.entry(key).or_default().push(row);
        }

        let mut output = NormalizedTrades::default();
        for (code, code_rows) in grouped {
            let normalized: Result<Vec<TradeRecord>> =
                code_rows.iter().map(|row| self.normalize_row(row)).collect();
            match normalized {
                Ok(mut trades) => {
                    trades.sort_by_key(|t| t.timestamp);
                    output.by_code.insert(code, trades);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", code, e);
                    output.failures.push(CodeFailure::new(code, &e));
                }
            }
        }

        if self.dedupe_combo_fees {
            output.deduplicated_fees = dedupe_combo_fees(&mut output.by_code);
        }
        debug!(
            "Normalized {} trades across {} codes ({} codes failed)",
            output.trade_count(),
            output.by_code.len(),
            output.failures.len()
        );
        output
    }
}

/// Keeps the fee only on the earliest fill of each `(account, order)` pair.
///
/// Brokers report the full commission of a multi-leg order on every leg.
/// Returns the number of fees zeroed.
pub fn dedupe_combo_fees(by_code: &mut BTreeMap<String, Vec<TradeRecord>>) -> usize {
    type OrderKey = (Option<String>, String);
    let mut first_fill: HashMap<OrderKey, (NaiveDateTime, String, usize)> = HashMap::new();

    for (code, trades) in by_code.iter() {
        for (index, trade) in trades.iter().enumerate() {
            let Some(order_id) = &trade.order_id else {
                continue;
            };
            let candidate = (trade.timestamp, code.clone(), index);
            let current = first_fill
                .entry((trade.account_id.clone(), order_id.clone()))
                .or_insert_with(|| candidate.clone());
            if candidate < *current {
                *current = candidate;
            }
        }
    }

    let mut zeroed = 0;
    for (code, trades) in by_code.iter_mut() {
        for (index, trade) in trades.iter_mut().enumerate() {
            let Some(order_id) = &trade.order_id else {
                continue;
            };
            let key = (trade.account_id.clone(), order_id.clone());
            let is_first = first_fill
                .get(&key)
                .is_some_and(|(ts, first_code, first_index)| {
                    *ts == trade.timestamp && first_code == code && *first_index == index
                });
            if !is_first && !trade.fee.is_zero() {
                debug!(
                    "Zeroing duplicate combo fee {} on {} order {}",
                    trade.fee, code, order_id
                );
                trade.fee = Decimal::ZERO;
                zeroed += 1;
            }
        }
    }
    zeroed
}

fn required<'a>(code: &str, field: &str, value: &'a Option<String>, row: usize) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            ValidationError::MissingField {
                code: code.to_string(),
                field: field.to_string(),
                row,
            }
            .into()
        })
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_decimal_field(
    code: &str,
    field: &str,
    value: &Option<String>,
    row: usize,
) -> Result<Decimal> {
    let raw = required(code, field, value, row)?;
    let cleaned = raw.replace(',', "");
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| invalid_field(code, field, raw, row))
}

fn invalid_field(code: &str, field: &str, value: &str, row: usize) -> Error {
    ValidationError::InvalidField {
        code: code.to_string(),
        field: field.to_string(),
        value: value.to_string(),
        row,
    }
    .into()
}
