//! CSV input for trade histories and split configuration.
//!
//! Headers are matched case-insensitively against the names in
//! `trades_constants`, so both English exports and the broker's localized
//! column names load without a mapping step.

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use super::trades_constants::*;
use super::RawTrade;
use crate::errors::{Error, Result, ValidationError};
use crate::portfolio::splits::SplitEvent;
use crate::utils::time_utils::parse_timestamp;

/// Column positions resolved from a header row.
#[derive(Debug, Clone, Default)]
struct TradeColumns {
    code: Option<usize>,
    side: Option<usize>,
    quantity: Option<usize>,
    price: Option<usize>,
    fee: Option<usize>,
    timestamp: Option<usize>,
    currency: Option<usize>,
    account_id: Option<usize>,
    order_id: Option<usize>,
}

impl TradeColumns {
    fn from_headers(headers: &StringRecord) -> Self {
        TradeColumns {
            code: find_column(headers, &CODE_HEADERS),
            side: find_column(headers, &SIDE_HEADERS),
            quantity: find_column(headers, &QUANTITY_HEADERS),
            price: find_column(headers, &PRICE_HEADERS),
            fee: find_column(headers, &FEE_HEADERS),
            timestamp: find_column(headers, &TIMESTAMP_HEADERS),
            currency: find_column(headers, &CURRENCY_HEADERS),
            account_id: find_column(headers, &ACCOUNT_HEADERS),
            order_id: find_column(headers, &ORDER_HEADERS),
        }
    }

    /// Canonical names of required columns absent from the header.
    fn missing_required(&self) -> Vec<&'static str> {
        [
            (self.code, CODE_HEADERS[0]),
            (self.side, SIDE_HEADERS[0]),
            (self.quantity, QUANTITY_HEADERS[0]),
            (self.price, PRICE_HEADERS[0]),
            (self.fee, FEE_HEADERS[0]),
            (self.timestamp, TIMESTAMP_HEADERS[0]),
            (self.currency, CURRENCY_HEADERS[0]),
        ]
        .into_iter()
        .filter(|(index, _)| index.is_none())
        .map(|(_, name)| name)
        .collect()
    }
}

fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let header = header.trim().trim_start_matches('\u{feff}');
        names.iter().any(|name| header.eq_ignore_ascii_case(name))
    })
}

fn cell(record: &StringRecord, index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Reads trade rows from any reader. The first row must be a header.
///
/// Fails when required columns are missing or there are no data rows; field
/// level problems are left to the normalizer.
pub fn read_trades<R: Read>(reader: R) -> Result<Vec<RawTrade>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = TradeColumns::from_headers(&headers);
    let missing = columns.missing_required();
    if !missing.is_empty() {
        return Err(ValidationError::InvalidInput(format!(
            "trade file is missing required columns: {}",
            missing.join(", ")
        ))
        .into());
    }

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        rows.push(RawTrade {
            row: index + 1,
            code: cell(&record, columns.code),
            side: cell(&record, columns.side),
            quantity: cell(&record, columns.quantity),
            price: cell(&record, columns.price),
            fee: cell(&record, columns.fee),
            timestamp: cell(&record, columns.timestamp),
            currency: cell(&record, columns.currency),
            account_id: cell(&record, columns.account_id),
            order_id: cell(&record, columns.order_id),
        });
    }

    if rows.is_empty() {
        return Err(ValidationError::InvalidInput("trade file has no data rows".to_string()).into());
    }
    debug!("Read {} trade rows", rows.len());
    Ok(rows)
}

/// Reads a trade history file.
pub fn read_trades_file(path: impl AsRef<Path>) -> Result<Vec<RawTrade>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| Error::Io(format!("cannot open {}: {}", path.display(), e)))?;
    let rows = read_trades(file)?;
    info!("Loaded {} trade rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Reads and concatenates several trade files (one per account, say).
///
/// Row numbers stay relative to each file; the normalizer re-sorts by time.
pub fn read_trade_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<RawTrade>> {
    let mut rows = Vec::new();
    for path in paths {
        rows.extend(read_trades_file(path)?);
    }
    Ok(rows)
}

/// Parses a split ratio: `"N:M"` (N new shares for every M held) or a
/// plain decimal.
pub fn parse_split_ratio(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if let Some((new_shares, old_shares)) = raw.split_once(':') {
        let new_shares = Decimal::from_str(new_shares.trim()).ok()?;
        let old_shares = Decimal::from_str(old_shares.trim()).ok()?;
        if old_shares.is_zero() {
            return None;
        }
        return Some(new_shares / old_shares);
    }
    Decimal::from_str(raw).ok()
}

/// Reads split events. Unreadable rows are skipped with a warning; ratio
/// validity is checked later by the split adjuster.
pub fn read_splits<R: Read>(reader: R) -> Result<Vec<SplitEvent>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let date_col = find_column(&headers, &SPLIT_DATE_HEADERS);
    let code_col = find_column(&headers, &SPLIT_CODE_HEADERS);
    let ratio_col = find_column(&headers, &SPLIT_RATIO_HEADERS);
    if date_col.is_none() || code_col.is_none() || ratio_col.is_none() {
        return Err(ValidationError::InvalidInput(
            "split file needs date, code and ratio columns".to_string(),
        )
        .into());
    }

    let mut events = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = index + 1;
        let (Some(date), Some(code), Some(ratio)) = (
            cell(&record, date_col),
            cell(&record, code_col),
            cell(&record, ratio_col),
        ) else {
            warn!("Split row {} is incomplete. Skipped.", row);
            continue;
        };
        let Some(effective_at) = parse_timestamp(&date) else {
            warn!("Split row {} has unreadable date '{}'. Skipped.", row, date);
            continue;
        };
        let Some(ratio) = parse_split_ratio(&ratio) else {
            warn!("Split row {} has unreadable ratio '{}'. Skipped.", row, ratio);
            continue;
        };
        events.push(SplitEvent::new(code, effective_at, ratio));
    }
    Ok(events)
}

pub fn read_splits_file(path: impl AsRef<Path>) -> Result<Vec<SplitEvent>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| Error::Io(format!("cannot open {}: {}", path.display(), e)))?;
    let events = read_splits(file)?;
    info!("Loaded {} split events from {}", events.len(), path.display());
    Ok(events)
}
