//! Core error types for Gainbook.
//!
//! Data-quality anomalies never surface here: they become flagged realized
//! records or calculation warnings. These types cover input-contract
//! violations and I/O at the crate edges.

use chrono::ParseError as ChronoParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the gains engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Gains calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Failed to read or write CSV data: {0}")]
    Csv(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Failed to load settings: {0}")]
    Settings(String),
}

/// Errors raised while running a code's trades through an engine.
///
/// Each of these aborts processing of the affected code only.
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("No trades left for {code} after cleaning")]
    EmptyInput { code: String },

    #[error("Trade for {trade_code} was routed to the engine of {code}")]
    CodeMismatch { code: String, trade_code: String },

    #[error("Trades for {code} are out of order: {current} is earlier than {previous}")]
    OutOfOrder {
        code: String,
        previous: chrono::NaiveDateTime,
        current: chrono::NaiveDateTime,
    },

    #[error("Invalid trade for {code}: {message}")]
    InvalidTrade { code: String, message: String },
}

/// Validation errors for raw input rows and configuration files.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{field}' is missing for {code} (row {row})")]
    MissingField {
        code: String,
        field: String,
        row: usize,
    },

    #[error("Field '{field}' for {code} (row {row}) has invalid value '{value}'")]
    InvalidField {
        code: String,
        field: String,
        value: String,
        row: usize,
    },

    #[error("Unknown trade side '{value}' for {code} (row {row})")]
    UnknownSide {
        code: String,
        value: String,
        row: usize,
    },

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

impl ValidationError {
    /// The instrument code the error refers to, when there is one.
    pub fn code(&self) -> Option<&str> {
        match self {
            ValidationError::MissingField { code, .. }
            | ValidationError::InvalidField { code, .. }
            | ValidationError::UnknownSide { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// A code whose processing was aborted, with the reason.
///
/// Failures are collected rather than propagated so one bad instrument does
/// not stop a whole run; the caller decides whether to abort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFailure {
    pub code: String,
    pub message: String,
}

impl CodeFailure {
    pub fn new(code: impl Into<String>, error: &Error) -> Self {
        CodeFailure {
            code: code.into(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for CodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Settings(err.to_string())
    }
}
