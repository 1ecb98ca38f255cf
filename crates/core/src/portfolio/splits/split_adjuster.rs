use chrono::NaiveDateTime;
use log::{debug, warn};
use std::collections::{HashMap, VecDeque};

use super::SplitEvent;
use crate::portfolio::holdings::StockHoldings;
use crate::portfolio::CalculationWarning;

/// Groups split events by code, keeping file order within each code.
pub fn group_splits_by_code(events: &[SplitEvent]) -> HashMap<String, Vec<SplitEvent>> {
    let mut grouped: HashMap<String, Vec<SplitEvent>> = HashMap::new();
    for event in events {
        grouped
            .entry(event.code.clone())
            .or_default()
            .push(event.clone());
    }
    grouped
}

/// Pending splits for one stock code, applied lazily as trades arrive.
#[derive(Debug, Clone)]
pub struct SplitAdjuster {
    code: String,
    pending: VecDeque<SplitEvent>,
}

impl SplitAdjuster {
    /// Builds the adjuster for `code` from its configured events.
    ///
    /// Events for other codes are ignored. Events with an invalid ratio are
    /// dropped and reported as warnings; they are never applied.
    pub fn new(code: &str, events: &[SplitEvent]) -> (Self, Vec<CalculationWarning>) {
        let mut warnings = Vec::new();
        let mut pending: Vec<SplitEvent> = Vec::new();
        for event in events.iter().filter(|e| e.code == code) {
            if event.is_valid() {
                pending.push(event.clone());
            } else {
                let warning = CalculationWarning::new(
                    code,
                    format!(
                        "Split ratio {} effective {} is invalid (must be > 0 and != 1). Skipped.",
                        event.ratio, event.effective_at
                    ),
                );
                warn!("{}", warning);
                warnings.push(warning);
            }
        }
        pending.sort_by_key(|e| e.effective_at);

        (
            SplitAdjuster {
                code: code.to_string(),
                pending: pending.into(),
            },
            warnings,
        )
    }

    /// Applies, in order, every pending split effective at or before `at`.
    /// Returns the number of splits applied.
    pub fn apply_due(&mut self, holdings: &mut StockHoldings, at: NaiveDateTime) -> usize {
        let mut applied = 0;
        while self
            .pending
            .front()
            .is_some_and(|event| event.effective_at <= at)
        {
            let Some(event) = self.pending.pop_front() else {
                break;
            };
            let before = holdings.quantity;
            holdings.apply_split(event.ratio);
            debug!(
                "Applied split {} to {} effective {}: quantity {} -> {}, cost basis {}",
                event.ratio,
                self.code,
                event.effective_at,
                before,
                holdings.quantity,
                holdings.cost_basis
            );
            applied += 1;
        }
        applied
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
