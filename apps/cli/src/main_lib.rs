use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use gainbook_core::errors::CodeFailure;
use gainbook_core::reports::{write_open_positions_file, write_year_reports, ReportAggregator};
use gainbook_core::settings::Settings;
use gainbook_core::trades::{read_splits_file, read_trade_files, TradeNormalizer};
use gainbook_core::GainsCalculator;

use crate::config::Config;

pub fn init_tracing() {
    let log_format = std::env::var("GAINBOOK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// What a batch run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub report_files: Vec<PathBuf>,
    pub open_positions_file: Option<PathBuf>,
    pub realized_records: usize,
    pub failures: Vec<CodeFailure>,
}

fn load_settings(config: &Config) -> Result<Settings> {
    match &config.settings {
        Some(path) => Settings::from_json_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Ok(Settings::default()),
    }
}

/// Loads the trade files, runs the calculator and writes the reports.
pub fn run(config: &Config) -> Result<RunSummary> {
    if config.inputs.is_empty() {
        bail!("No trade files given; pass --input or set GAINBOOK_INPUT");
    }
    let settings = load_settings(config)?;

    let rows = read_trade_files(&config.inputs).context("Failed to read trade files")?;
    let splits = match &config.splits {
        Some(path) => read_splits_file(path)
            .with_context(|| format!("Failed to read splits from {}", path.display()))?,
        None => Vec::new(),
    };

    let normalized = TradeNormalizer::new(&settings).normalize(&rows);
    if normalized.deduplicated_fees > 0 {
        tracing::info!(
            "Removed {} duplicate combo-order fees",
            normalized.deduplicated_fees
        );
    }

    let evaluation_date: NaiveDate = config
        .evaluation_date
        .unwrap_or_else(|| Local::now().date_naive());
    tracing::info!(
        "Calculating {} trades across {} codes as of {}",
        normalized.trade_count(),
        normalized.by_code.len(),
        evaluation_date
    );
    let result = GainsCalculator::new(&settings, evaluation_date)
        .with_parallelism(config.parallel)
        .calculate(&normalized.by_code, &splits);

    for warning in &result.warnings {
        tracing::warn!("{}", warning);
    }
    let mut failures = normalized.failures;
    failures.extend(result.failures.iter().cloned());
    for failure in &failures {
        tracing::error!("Skipped {}", failure);
    }
    if config.fail_fast && !failures.is_empty() {
        bail!(
            "{} codes failed validation; nothing written (rerun without --fail-fast to skip them)",
            failures.len()
        );
    }

    let reports = ReportAggregator::new(&settings.remarks).aggregate(&result.records);
    let mut summary = RunSummary {
        realized_records: result.records.len(),
        failures,
        ..RunSummary::default()
    };
    if reports.is_empty() {
        tracing::info!("No realized gains or losses found; no yearly reports written");
    } else {
        summary.report_files = write_year_reports(&config.output_dir, &reports)
            .with_context(|| format!("Failed to write reports to {}", config.output_dir.display()))?;
    }
    for report in &reports {
        for year_summary in &report.summaries {
            tracing::info!(
                "{}: net profit {} across {} records ({})",
                year_summary.label,
                year_summary.net_profit,
                year_summary.record_count,
                year_summary.note
            );
        }
    }

    if !result.open_positions.is_empty() {
        summary.open_positions_file = Some(
            write_open_positions_file(&config.output_dir, &result.open_positions)
                .context("Failed to write open positions")?,
        );
    }
    if result.review_count() > 0 {
        tracing::warn!(
            "{} rows need manual review (search the notes for 'manual review')",
            result.review_count()
        );
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn config(inputs: Vec<PathBuf>, output_dir: PathBuf) -> Config {
        Config {
            inputs,
            splits: None,
            output_dir,
            settings: None,
            evaluation_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            parallel: false,
            fail_fast: false,
        }
    }

    #[test]
    fn test_run_writes_reports_and_skips_bad_codes() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("trades.csv");
        fs::write(
            &input,
            "\
code,side,quantity,price,fee,timestamp,currency
FOO,buy,10,10,1,2024-01-02 10:00:00,USD
FOO,sell,4,12,1,2024-02-02 10:00:00,USD
BAD,BUY,-1,10,0,2024-01-02 10:00:00,USD
",
        )
        .unwrap();
        let output = dir.path().join("out");

        let summary = run(&config(vec![input], output.clone())).unwrap();
        assert_eq!(summary.realized_records, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.report_files, vec![output.join("2024_report.csv")]);
        assert_eq!(
            summary.open_positions_file,
            Some(output.join("open_positions.csv"))
        );
    }

    #[test]
    fn test_fail_fast_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("trades.csv");
        fs::write(
            &input,
            "\
code,side,quantity,price,fee,timestamp,currency
FOO,HOLD,1,1,0,2024-01-02 10:00:00,USD
",
        )
        .unwrap();
        let output = dir.path().join("out");
        let mut config = config(vec![input], output.clone());
        config.fail_fast = true;

        assert!(run(&config).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_requires_input() {
        let dir = tempdir().unwrap();
        assert!(run(&config(Vec::new(), dir.path().to_path_buf())).is_err());
    }
}
