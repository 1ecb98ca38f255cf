//! CSV output for yearly reports and the open-positions snapshot.

use csv::{Writer, WriterBuilder};
use log::info;
use rust_decimal::Decimal;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{ReportRow, YearReport};
use crate::constants::OUTPUT_DECIMAL_PRECISION;
use crate::errors::{Error, Result};
use crate::portfolio::OpenPosition;

pub const REPORT_HEADERS: [&str; 8] = [
    "code",
    "sale_price",
    "cost_price",
    "quantity",
    "profit",
    "timestamp",
    "currency",
    "note",
];

pub const OPEN_POSITIONS_FILE_NAME: &str = "open_positions.csv";

const OPEN_POSITION_HEADERS: [&str; 7] = [
    "code",
    "asset_class",
    "quantity",
    "cost_basis",
    "short_proceeds",
    "average_cost",
    "currency",
];

const TIMESTAMP_OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn report_file_name(year: i32) -> String {
    format!("{}_report.csv", year)
}

fn format_decimal(value: Decimal) -> String {
    format!(
        "{:.prec$}",
        value.round_dp(OUTPUT_DECIMAL_PRECISION),
        prec = OUTPUT_DECIMAL_PRECISION as usize
    )
}

fn write_row<W: Write>(writer: &mut Writer<W>, row: &ReportRow) -> Result<()> {
    writer.write_record([
        row.code.clone(),
        format_decimal(row.sale_price),
        format_decimal(row.cost_price),
        format_decimal(row.quantity),
        format_decimal(row.profit),
        row.timestamp.format(TIMESTAMP_OUTPUT_FORMAT).to_string(),
        row.currency.clone(),
        row.note.clone(),
    ])?;
    Ok(())
}

/// Writes one yearly table, header first.
pub fn write_year_report<W: Write>(output: W, report: &YearReport) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(output);
    writer.write_record(REPORT_HEADERS)?;
    for row in &report.rows {
        write_row(&mut writer, row)?;
    }
    writer.flush()?;
    Ok(())
}

fn create_file(path: &Path) -> Result<fs::File> {
    fs::File::create(path)
        .map_err(|e| Error::Io(format!("cannot create {}: {}", path.display(), e)))
}

/// Writes `{year}_report.csv` for every report into `dir`, creating it if
/// needed. Returns the written paths in year order.
pub fn write_year_reports(dir: impl AsRef<Path>, reports: &[YearReport]) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(reports.len());
    for report in reports {
        let path = dir.join(report_file_name(report.year));
        write_year_report(create_file(&path)?, report)?;
        info!(
            "Saved {} report ({} rows) to {}",
            report.year,
            report.rows.len(),
            path.display()
        );
        written.push(path);
    }
    Ok(written)
}

pub fn write_open_positions<W: Write>(output: W, positions: &[OpenPosition]) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(output);
    writer.write_record(OPEN_POSITION_HEADERS)?;
    for position in positions {
        writer.write_record([
            position.code.clone(),
            position.asset_class.to_string(),
            format_decimal(position.quantity),
            format_decimal(position.cost_basis),
            format_decimal(position.short_proceeds),
            format_decimal(position.average_cost),
            position.currency.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `open_positions.csv` into `dir`.
pub fn write_open_positions_file(
    dir: impl AsRef<Path>,
    positions: &[OpenPosition],
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(OPEN_POSITIONS_FILE_NAME);
    write_open_positions(create_file(&path)?, positions)?;
    info!("Saved {} open positions to {}", positions.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetClass;
    use crate::reports::ReportRowKind;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn row(code: &str, profit: Decimal) -> ReportRow {
        ReportRow {
            code: code.to_string(),
            sale_price: dec!(12),
            cost_price: dec!(33.33333),
            quantity: dec!(150),
            profit,
            timestamp: NaiveDate::from_ymd_opt(2024, 4, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            currency: "USD".to_string(),
            note: "a, quoted note".to_string(),
            kind: ReportRowKind::Realized,
        }
    }

    #[test]
    fn test_decimals_are_written_with_four_places() {
        assert_eq!(format_decimal(dec!(1050)), "1050.0000");
        assert_eq!(format_decimal(dec!(-0.5)), "-0.5000");
        assert_eq!(format_decimal(dec!(33.33333)), "33.3333");
    }

    #[test]
    fn test_write_year_report() {
        let report = YearReport {
            year: 2024,
            rows: vec![row("FOO", dec!(1050))],
            summaries: Vec::new(),
        };
        let mut buffer = Vec::new();
        write_year_report(&mut buffer, &report).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "code,sale_price,cost_price,quantity,profit,timestamp,currency,note"
        );
        assert_eq!(
            lines[1],
            "FOO,12.0000,33.3333,150.0000,1050.0000,2024-04-01 09:30:00,USD,\"a, quoted note\""
        );
    }

    #[test]
    fn test_write_open_positions() {
        let positions = vec![OpenPosition {
            code: "US.TSLA251219P200000".to_string(),
            asset_class: AssetClass::Option,
            quantity: dec!(-2),
            cost_basis: Decimal::ZERO,
            short_proceeds: dec!(600),
            average_cost: dec!(3),
            currency: "USD".to_string(),
        }];
        let mut buffer = Vec::new();
        write_open_positions(&mut buffer, &positions).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("US.TSLA251219P200000,Option,-2.0000,0.0000,600.0000,3.0000,USD"));
    }
}
