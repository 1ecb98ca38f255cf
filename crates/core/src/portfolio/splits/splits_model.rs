use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A split (or reverse split) taking effect at `effective_at`.
///
/// `ratio` is new shares per old share: `2` for a 2:1 split, `0.5` for a
/// 1:2 reverse split. Only `ratio > 0` and `ratio != 1` is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitEvent {
    pub code: String,
    pub effective_at: NaiveDateTime,
    pub ratio: Decimal,
}

impl SplitEvent {
    pub fn new(code: impl Into<String>, effective_at: NaiveDateTime, ratio: Decimal) -> Self {
        SplitEvent {
            code: code.into(),
            effective_at,
            ratio,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.ratio > Decimal::ZERO && self.ratio != Decimal::ONE
    }
}
