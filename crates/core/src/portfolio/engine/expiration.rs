use chrono::{NaiveDate, NaiveDateTime};
use log::warn;

use crate::assets::extract_expiration_date;
use crate::utils::time_utils::start_of_day;

/// When an option code stops trading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationResolution {
    pub expiration_date: NaiveDate,
    /// Timestamp carried by a settlement record
    pub settles_at: NaiveDateTime,
    /// True when the code had no usable date and the last trade stood in
    pub fallback: bool,
}

impl ExpirationResolution {
    /// Settlement is due once the expiry is strictly before `evaluation_date`.
    /// An option expiring today is still live.
    pub fn is_due(&self, evaluation_date: NaiveDate) -> bool {
        self.expiration_date < evaluation_date
    }
}

/// Resolves the expiry of `code`, falling back to the last trade time when
/// the code carries no valid date.
pub fn resolve_expiration(code: &str, last_trade_at: NaiveDateTime) -> ExpirationResolution {
    match extract_expiration_date(code) {
        Some(date) => ExpirationResolution {
            expiration_date: date,
            settles_at: start_of_day(date),
            fallback: false,
        },
        None => {
            warn!(
                "No expiration date for {}, using last trade date {}",
                code,
                last_trade_at.date()
            );
            ExpirationResolution {
                expiration_date: last_trade_at.date(),
                settles_at: last_trade_at,
                fallback: true,
            }
        }
    }
}
