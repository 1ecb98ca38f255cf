use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::assets::AssetClass;
use crate::utils::decimal_utils::{contract_multiplier, is_quantity_significant, round_quantity};

/// Weighted-average stock position for one code.
///
/// `quantity` never goes negative: oversells are flagged and flatten the
/// position instead of opening a short.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockHoldings {
    pub quantity: Decimal,
    /// Total capital invested in the shares held, fees included.
    pub cost_basis: Decimal,
}

impl StockHoldings {
    pub fn new(quantity: Decimal, cost_basis: Decimal) -> Self {
        StockHoldings {
            quantity,
            cost_basis,
        }
    }

    pub fn is_flat(&self) -> bool {
        !is_quantity_significant(&self.quantity)
    }

    /// Current unit cost, zero when flat.
    pub fn average_cost(&self) -> Decimal {
        if self.is_flat() {
            Decimal::ZERO
        } else {
            self.cost_basis / self.quantity
        }
    }

    /// Rescales the share count; invested capital is unchanged, so the unit
    /// cost moves inversely to `ratio`. The new count is rounded to the
    /// quantity grid.
    pub fn apply_split(&mut self, ratio: Decimal) {
        self.quantity = round_quantity(self.quantity * ratio);
    }

    pub fn reset(&mut self) {
        self.quantity = Decimal::ZERO;
        self.cost_basis = Decimal::ZERO;
    }
}

/// Signed net option position for one contract code.
///
/// Positive quantity is long, negative is short. The long side accumulates
/// `cost_basis`, the short side `short_proceeds`; only one side is non-zero
/// at a time.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptionHoldings {
    pub quantity: Decimal,
    pub cost_basis: Decimal,
    pub short_proceeds: Decimal,
}

impl OptionHoldings {
    pub fn is_long(&self) -> bool {
        self.quantity > Decimal::ZERO && is_quantity_significant(&self.quantity)
    }

    pub fn is_short(&self) -> bool {
        self.quantity < Decimal::ZERO && is_quantity_significant(&self.quantity)
    }

    pub fn is_flat(&self) -> bool {
        !is_quantity_significant(&self.quantity)
    }

    /// Average premium paid per unit of underlying on the long side.
    pub fn average_long_cost(&self) -> Decimal {
        if self.is_long() {
            self.cost_basis / (self.quantity * contract_multiplier())
        } else {
            Decimal::ZERO
        }
    }

    /// Average net premium received per unit of underlying on the short side.
    pub fn average_short_price(&self) -> Decimal {
        if self.is_short() {
            self.short_proceeds / (self.quantity.abs() * contract_multiplier())
        } else {
            Decimal::ZERO
        }
    }

    /// Clears accumulators left over once a side is fully closed.
    pub(crate) fn settle_flat_sides(&mut self) {
        if self.is_flat() {
            self.quantity = Decimal::ZERO;
            self.cost_basis = Decimal::ZERO;
            self.short_proceeds = Decimal::ZERO;
        } else if self.is_long() {
            self.short_proceeds = Decimal::ZERO;
        } else {
            self.cost_basis = Decimal::ZERO;
        }
    }

    pub fn reset(&mut self) {
        *self = OptionHoldings::default();
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "assetClass", rename_all = "camelCase")]
pub enum Holdings {
    Stock(StockHoldings),
    Option(OptionHoldings),
}

impl Holdings {
    pub fn new(asset_class: AssetClass) -> Self {
        match asset_class {
            AssetClass::Stock => Holdings::Stock(StockHoldings::default()),
            AssetClass::Option => Holdings::Option(OptionHoldings::default()),
        }
    }

    pub fn asset_class(&self) -> AssetClass {
        match self {
            Holdings::Stock(_) => AssetClass::Stock,
            Holdings::Option(_) => AssetClass::Option,
        }
    }

    pub fn is_flat(&self) -> bool {
        match self {
            Holdings::Stock(h) => h.is_flat(),
            Holdings::Option(h) => h.is_flat(),
        }
    }
}

/// Holdings of every code touched by one calculation run.
///
/// Owned by the run and lent to per-code processing; nothing in it outlives
/// the run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoldingsBook {
    entries: BTreeMap<String, Holdings>,
}

impl HoldingsBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, code: &str) -> Option<&Holdings> {
        self.entries.get(code)
    }

    /// Holdings for `code`, created flat on first use.
    ///
    /// If the code was previously booked under another asset class the old
    /// entry is replaced, since the classifier is a pure function of the code
    /// this only happens when callers mix classifications.
    pub fn entry(&mut self, code: &str, asset_class: AssetClass) -> &mut Holdings {
        let holdings = self
            .entries
            .entry(code.to_string())
            .or_insert_with(|| Holdings::new(asset_class));
        if holdings.asset_class() != asset_class {
            warn!(
                "Holdings for {} were booked as {}, replacing with flat {} position",
                code,
                holdings.asset_class(),
                asset_class
            );
            *holdings = Holdings::new(asset_class);
        }
        holdings
    }

    pub fn insert(&mut self, code: impl Into<String>, holdings: Holdings) {
        self.entries.insert(code.into(), holdings);
    }

    pub fn remove(&mut self, code: &str) -> Option<Holdings> {
        self.entries.remove(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Holdings)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
