use chrono::NaiveDate;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::assets::classify_asset;
use crate::errors::{CalculatorError, CodeFailure, Result};
use crate::portfolio::engine::{OptionEngine, PositionEngine, SettlementContext, StockEngine};
use crate::portfolio::holdings::{Holdings, OptionHoldings, StockHoldings};
use crate::portfolio::realized::RealizedRecord;
use crate::portfolio::splits::{group_splits_by_code, SplitAdjuster, SplitEvent};
use crate::portfolio::{CalculationWarning, GainsCalculationResult, OpenPosition};
use crate::settings::Settings;
use crate::trades::TradeRecord;
use crate::utils::time_utils::end_of_day;

/// Records and warnings produced for one code.
#[derive(Debug, Clone, Default)]
pub struct CodeOutcome {
    pub records: Vec<RealizedRecord>,
    pub warnings: Vec<CalculationWarning>,
}

/// Runs every code's trade stream through the engine for its asset class.
///
/// A calculator is configured once per batch; `calculate` is a pure function
/// of its inputs and the evaluation date, so repeated runs give identical
/// output.
#[derive(Debug, Clone)]
pub struct GainsCalculator {
    stock_engine: StockEngine,
    option_engine: OptionEngine,
    evaluation_date: NaiveDate,
    parallel: bool,
}

impl GainsCalculator {
    pub fn new(settings: &Settings, evaluation_date: NaiveDate) -> Self {
        let remarks = Arc::new(settings.remarks.clone());
        GainsCalculator {
            stock_engine: StockEngine::new(Arc::clone(&remarks)),
            option_engine: OptionEngine::new(remarks),
            evaluation_date,
            parallel: false,
        }
    }

    /// Processes codes on the rayon pool. Output is identical to the
    /// sequential mode.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn evaluation_date(&self) -> NaiveDate {
        self.evaluation_date
    }

    /// Calculates realized records for all codes.
    ///
    /// Codes that violate the input contract are reported in `failures`;
    /// their records are dropped and they get no holdings.
    pub fn calculate(
        &self,
        trades_by_code: &BTreeMap<String, Vec<TradeRecord>>,
        splits: &[SplitEvent],
    ) -> GainsCalculationResult {
        let splits_by_code = group_splits_by_code(splits);

        let mut result = GainsCalculationResult::default();
        if self.parallel {
            let outcomes: Vec<(&String, Holdings, Result<CodeOutcome>)> = trades_by_code
                .par_iter()
                .map(|(code, trades)| {
                    let mut holdings = Holdings::new(classify_asset(code));
                    let outcome = self.process_code(
                        code,
                        trades,
                        splits_of(&splits_by_code, code),
                        &mut holdings,
                    );
                    (code, holdings, outcome)
                })
                .collect();
            for (code, holdings, outcome) in outcomes {
                result.holdings.insert(code.clone(), holdings);
                self.merge_outcome(&mut result, code, &trades_by_code[code], outcome);
            }
        } else {
            for (code, trades) in trades_by_code {
                let holdings = result.holdings.entry(code, classify_asset(code));
                let outcome =
                    self.process_code(code, trades, splits_of(&splits_by_code, code), holdings);
                self.merge_outcome(&mut result, code, trades, outcome);
            }
        }

        info!(
            "Calculated {} realized records for {} codes as of {} ({} warnings, {} failures)",
            result.records.len(),
            trades_by_code.len(),
            self.evaluation_date,
            result.warnings.len(),
            result.failures.len()
        );
        result
    }

    fn merge_outcome(
        &self,
        result: &mut GainsCalculationResult,
        code: &str,
        trades: &[TradeRecord],
        outcome: Result<CodeOutcome>,
    ) {
        match outcome {
            Ok(outcome) => {
                result.records.extend(outcome.records);
                result.warnings.extend(outcome.warnings);
                let currency = trades.last().map(|t| t.currency.as_str()).unwrap_or("");
                if let Some(position) = result
                    .holdings
                    .get(code)
                    .and_then(|h| OpenPosition::from_holdings(code, h, currency))
                {
                    result.open_positions.push(position);
                }
            }
            Err(e) => {
                warn!("Failed to calculate gains for {}: {}", code, e);
                result.holdings.remove(code);
                result.failures.push(CodeFailure::new(code, &e));
            }
        }
    }

    /// Processes one code's trades against `holdings`.
    ///
    /// Stock trades are preceded by any split due at their timestamp; option
    /// positions left open are settled if their expiry has passed.
    pub fn process_code(
        &self,
        code: &str,
        trades: &[TradeRecord],
        splits: &[SplitEvent],
        holdings: &mut Holdings,
    ) -> Result<CodeOutcome> {
        let mut outcome = CodeOutcome::default();
        match holdings {
            Holdings::Stock(stock) => {
                let (mut adjuster, split_warnings) = SplitAdjuster::new(code, splits);
                outcome.warnings.extend(split_warnings);
                outcome.records = self.run_engine(
                    &self.stock_engine,
                    code,
                    trades,
                    &mut *stock,
                    |h: &mut StockHoldings, trade: &TradeRecord| {
                        adjuster.apply_due(h, trade.timestamp);
                    },
                    &mut outcome.warnings,
                )?;
                // Splits after the last trade still rescale what is held now
                let applied = adjuster.apply_due(stock, end_of_day(self.evaluation_date));
                if applied > 0 {
                    debug!("{}: applied {} splits to the open position", code, applied);
                }
            }
            Holdings::Option(option) => {
                if !splits.is_empty() {
                    warn!("{}: split events ignored for option contracts", code);
                }
                outcome.records = self.run_engine(
                    &self.option_engine,
                    code,
                    trades,
                    option,
                    |_: &mut OptionHoldings, _: &TradeRecord| {},
                    &mut outcome.warnings,
                )?;
            }
        }
        Ok(outcome)
    }

    fn run_engine<E, F>(
        &self,
        engine: &E,
        code: &str,
        trades: &[TradeRecord],
        holdings: &mut E::Holdings,
        mut before_trade: F,
        warnings: &mut Vec<CalculationWarning>,
    ) -> Result<Vec<RealizedRecord>>
    where
        E: PositionEngine,
        F: FnMut(&mut E::Holdings, &TradeRecord),
    {
        let Some(last_trade) = trades.last() else {
            return Err(CalculatorError::EmptyInput {
                code: code.to_string(),
            }
            .into());
        };

        let mut records = Vec::new();
        let mut previous: Option<&TradeRecord> = None;
        for trade in trades {
            if trade.code != code {
                return Err(CalculatorError::CodeMismatch {
                    code: code.to_string(),
                    trade_code: trade.code.clone(),
                }
                .into());
            }
            if let Some(prev) = previous {
                if trade.timestamp < prev.timestamp {
                    return Err(CalculatorError::OutOfOrder {
                        code: code.to_string(),
                        previous: prev.timestamp,
                        current: trade.timestamp,
                    }
                    .into());
                }
            }
            before_trade(holdings, trade);
            records.extend(engine.apply_trade(holdings, trade)?);
            previous = Some(trade);
        }

        let context = SettlementContext {
            code,
            evaluation_date: self.evaluation_date,
            last_trade,
        };
        records.extend(engine.settle(holdings, &context, warnings));

        debug!(
            "{} ({}): {} trades, {} realized records",
            code,
            engine.asset_class(),
            trades.len(),
            records.len()
        );
        Ok(records)
    }
}

fn splits_of<'a>(grouped: &'a HashMap<String, Vec<SplitEvent>>, code: &str) -> &'a [SplitEvent] {
    grouped.get(code).map(Vec::as_slice).unwrap_or(&[])
}
