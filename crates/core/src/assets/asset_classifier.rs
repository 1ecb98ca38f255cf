//! Instrument classification and option code parsing.
//!
//! Option codes follow the broker layout
//! `[MARKET.]UNDERLYING YYMMDD C|P STRIKE` with no separators, for example:
//!
//! | Code                   | Market | Underlying | Expiry     | Right |
//! |------------------------|--------|------------|------------|-------|
//! | `TSLA240419C200000`    | -      | `TSLA`     | 2024-04-19 | Call  |
//! | `US.KWEB250919C36000`  | `US`   | `KWEB`     | 2025-09-19 | Call  |
//! | `HK.TCH251030P550000`  | `HK`   | `TCH`      | 2025-10-30 | Put   |
//!
//! Classification and expiry extraction both read `OPTION_CODE_REGEX`, so the
//! two can never disagree about what an option code looks like.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use log::warn;
use regex::Regex;

use super::{AssetClass, OptionCode, OptionRight};

/// Pattern source for option codes; exposed for documentation and tooling.
pub const OPTION_CODE_PATTERN: &str = r"^(?:([A-Z]{2})\.)?([A-Z0-9]+?)(\d{6})([CP])(\d+)$";

lazy_static! {
    static ref OPTION_CODE_REGEX: Regex =
        Regex::new(OPTION_CODE_PATTERN).expect("Invalid regex pattern");
}

/// Splits an option code into its components.
///
/// Returns `None` when the code does not have the option layout. A code with
/// the right layout but an impossible date (e.g. `241340`) still parses, with
/// `expiration` left empty.
pub fn parse_option_code(code: &str) -> Option<OptionCode> {
    let caps = OPTION_CODE_REGEX.captures(code.trim())?;
    let expiry_digits = caps.get(3)?.as_str().to_string();
    let right = match caps.get(4)?.as_str() {
        "C" => OptionRight::Call,
        _ => OptionRight::Put,
    };
    Some(OptionCode {
        market: caps.get(1).map(|m| m.as_str().to_string()),
        underlying: caps.get(2)?.as_str().to_string(),
        expiration: NaiveDate::parse_from_str(&expiry_digits, "%y%m%d").ok(),
        expiry_digits,
        right,
        strike_digits: caps.get(5)?.as_str().to_string(),
    })
}

/// Classifies an instrument code. Total: anything that is not an option code
/// is a stock.
pub fn classify_asset(code: &str) -> AssetClass {
    if OPTION_CODE_REGEX.is_match(code.trim()) {
        AssetClass::Option
    } else {
        AssetClass::Stock
    }
}

/// Expiration date embedded in an option code, if the code carries a valid one.
pub fn extract_expiration_date(code: &str) -> Option<NaiveDate> {
    match parse_option_code(code) {
        Some(OptionCode {
            expiration: Some(date),
            ..
        }) => Some(date),
        Some(parsed) => {
            warn!(
                "Extracted date string '{}' from '{}' is not a valid date.",
                parsed.expiry_digits, code
            );
            None
        }
        None => {
            warn!("Code '{}' does not match the option code format.", code);
            None
        }
    }
}
