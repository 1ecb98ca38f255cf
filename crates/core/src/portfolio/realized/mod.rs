mod realized_model;

pub use realized_model::*;
