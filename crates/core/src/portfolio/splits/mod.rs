//! Share-count adjustments from stock splits.

mod split_adjuster;
mod splits_model;

pub use split_adjuster::{group_splits_by_code, SplitAdjuster};
pub use splits_model::SplitEvent;
