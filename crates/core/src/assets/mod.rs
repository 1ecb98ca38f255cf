//! Assets module - instrument classification and option code parsing.

mod asset_classifier;
mod assets_model;

pub use asset_classifier::{
    classify_asset, extract_expiration_date, parse_option_code, OPTION_CODE_PATTERN,
};
pub use assets_model::{AssetClass, OptionCode, OptionRight};
