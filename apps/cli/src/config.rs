use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

const DEFAULT_OUTPUT_DIR: &str = "reports";

/// Realized gain/loss reports from broker trade exports.
#[derive(Parser, Debug)]
#[command(name = "gainbook", version, about, long_about = None)]
pub struct Args {
    /// Trade history CSV; repeat for several accounts
    #[arg(long = "input", short = 'i')]
    pub inputs: Vec<PathBuf>,

    /// Split configuration CSV (date, code, ratio)
    #[arg(long)]
    pub splits: Option<PathBuf>,

    /// Directory the yearly reports are written to
    #[arg(long = "output", short = 'o')]
    pub output_dir: Option<PathBuf>,

    /// JSON file overriding notes and side spellings
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Evaluation date for option expiry (YYYY-MM-DD, default today)
    #[arg(long = "as-of", value_parser = parse_date)]
    pub as_of: Option<NaiveDate>,

    /// Process codes in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Exit with an error if any code fails validation
    #[arg(long)]
    pub fail_fast: bool,
}

fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{}': {}", value, e))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub inputs: Vec<PathBuf>,
    pub splits: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub settings: Option<PathBuf>,
    pub evaluation_date: Option<NaiveDate>,
    pub parallel: bool,
    pub fail_fast: bool,
}

impl Config {
    /// Reads `GAINBOOK_*` variables, loading a `.env` file first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let inputs = non_empty("GAINBOOK_INPUT")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .map(PathBuf::from)
                    .collect()
            })
            .unwrap_or_default();
        let evaluation_date = non_empty("GAINBOOK_EVALUATION_DATE")
            .map(|v| parse_date(&v))
            .transpose()
            .map_err(anyhow::Error::msg)
            .context("Invalid GAINBOOK_EVALUATION_DATE")?;
        let parallel = non_empty("GAINBOOK_PARALLEL")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            inputs,
            splits: non_empty("GAINBOOK_SPLITS").map(PathBuf::from),
            output_dir: non_empty("GAINBOOK_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            settings: non_empty("GAINBOOK_SETTINGS").map(PathBuf::from),
            evaluation_date,
            parallel,
            fail_fast: false,
        })
    }

    /// Command-line flags take precedence over the environment.
    pub fn with_args(mut self, args: Args) -> Self {
        if !args.inputs.is_empty() {
            self.inputs = args.inputs;
        }
        if args.splits.is_some() {
            self.splits = args.splits;
        }
        if let Some(dir) = args.output_dir {
            self.output_dir = dir;
        }
        if args.settings.is_some() {
            self.settings = args.settings;
        }
        if args.as_of.is_some() {
            self.evaluation_date = args.as_of;
        }
        self.parallel |= args.parallel;
        self.fail_fast |= args.fail_fast;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert!(config.inputs.is_empty());
        assert_eq!(config.output_dir, PathBuf::from("reports"));
        assert_eq!(config.evaluation_date, None);
        assert!(!config.parallel);
    }

    #[test]
    fn test_reads_environment() {
        let config = Config::from_lookup(lookup(&[
            ("GAINBOOK_INPUT", "a.csv, b.csv,"),
            ("GAINBOOK_SPLITS", "splits.csv"),
            ("GAINBOOK_OUTPUT_DIR", "out"),
            ("GAINBOOK_EVALUATION_DATE", "2024-12-31"),
            ("GAINBOOK_PARALLEL", "true"),
        ]))
        .unwrap();
        assert_eq!(
            config.inputs,
            vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]
        );
        assert_eq!(config.splits, Some(PathBuf::from("splits.csv")));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.evaluation_date, NaiveDate::from_ymd_opt(2024, 12, 31));
        assert!(config.parallel);
    }

    #[test]
    fn test_invalid_evaluation_date() {
        let result = Config::from_lookup(lookup(&[("GAINBOOK_EVALUATION_DATE", "31/12/2024")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_environment() {
        let config = Config::from_lookup(lookup(&[
            ("GAINBOOK_INPUT", "env.csv"),
            ("GAINBOOK_OUTPUT_DIR", "env-out"),
        ]))
        .unwrap();
        let args = Args::parse_from([
            "gainbook",
            "--input",
            "one.csv",
            "-i",
            "two.csv",
            "--as-of",
            "2025-01-01",
            "--fail-fast",
        ]);
        let config = config.with_args(args);
        assert_eq!(
            config.inputs,
            vec![PathBuf::from("one.csv"), PathBuf::from("two.csv")]
        );
        assert_eq!(config.output_dir, PathBuf::from("env-out"));
        assert_eq!(config.evaluation_date, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert!(config.fail_fast);
        assert!(!config.parallel);
    }
}
