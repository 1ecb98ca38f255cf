use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::settings::Remarks;
use crate::utils::decimal_utils::round_output;

/// What crystallized a realized record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RealizedKind {
    /// Sell against a long stock or option position
    LongClose,
    /// Buy against a short option position
    ShortClose,
    /// Long option position past expiry
    ExpiredWorthless,
    /// Short option position past expiry, premium retained
    ShortExpired,
    /// Stock sell with nothing held
    SellWithoutPosition,
    /// Portion of a stock sell beyond the shares held
    Oversold,
}

impl RealizedKind {
    /// Anomaly rows carry zero placeholders and must be checked by hand.
    pub fn needs_review(&self) -> bool {
        matches!(
            self,
            RealizedKind::SellWithoutPosition | RealizedKind::Oversold
        )
    }

    pub fn note<'a>(&self, remarks: &'a Remarks) -> &'a str {
        match self {
            RealizedKind::LongClose => "",
            RealizedKind::ShortClose => &remarks.short_close,
            RealizedKind::ExpiredWorthless => &remarks.expired_worthless,
            RealizedKind::ShortExpired => &remarks.short_expired,
            RealizedKind::SellWithoutPosition => &remarks.sell_without_position,
            RealizedKind::Oversold => &remarks.oversold_position,
        }
    }
}

/// One row of realized profit or loss.
///
/// `profit` is stored rounded to the output precision; prices are stored as
/// the engine emitted them (averages already rounded).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealizedRecord {
    pub code: String,
    pub sale_price: Decimal,
    pub cost_price: Decimal,
    pub quantity: Decimal,
    pub profit: Decimal,
    pub timestamp: NaiveDateTime,
    pub currency: String,
    pub note: String,
    pub kind: RealizedKind,
}

impl RealizedRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: RealizedKind,
        code: &str,
        sale_price: Decimal,
        cost_price: Decimal,
        quantity: Decimal,
        profit: Decimal,
        timestamp: NaiveDateTime,
        currency: &str,
        remarks: &Remarks,
    ) -> Self {
        RealizedRecord {
            code: code.to_string(),
            sale_price,
            cost_price,
            quantity,
            profit: round_output(profit),
            timestamp,
            currency: currency.to_string(),
            note: kind.note(remarks).to_string(),
            kind,
        }
    }

    /// Appends `extra` to the note, separated by "; ".
    pub fn with_extra_note(mut self, extra: &str) -> Self {
        if extra.is_empty() {
            return self;
        }
        if self.note.is_empty() {
            self.note = extra.to_string();
        } else {
            self.note = format!("{}; {}", self.note, extra);
        }
        self
    }

    pub fn needs_review(&self) -> bool {
        self.kind.needs_review()
    }
}
