use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::constants::{DATE_FORMATS, TIMESTAMP_FORMATS};

/// Parses a trade or split timestamp.
///
/// Accepts full date-times in the formats listed in `TIMESTAMP_FORMATS` and
/// bare dates, which are taken as the start of that day.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ts);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .map(start_of_day)
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// The last instant of `date`; events dated that day are due by then.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_nano_opt(23, 59, 59, 999_999_999)
        .unwrap_or_else(|| start_of_day(date))
}

/// The last whole second of `year`; annual summary rows carry this timestamp.
pub fn year_end_instant(year: i32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .unwrap_or(NaiveDateTime::MAX)
}

pub fn year_of(ts: &NaiveDateTime) -> i32 {
    ts.date().year()
}
