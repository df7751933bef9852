use chrono::NaiveDate;
use thiserror::Error;

/// Error type that captures configuration and simulation failures.
#[derive(Debug, Error)]
pub enum MiserError {
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),
    #[error("Unknown compounding period `{0}` (expected monthly, yearly, daily or continuous)")]
    UnknownCompounding(String),
    #[error("Invalid window: {to} precedes {from}")]
    InvalidWindow { from: NaiveDate, to: NaiveDate },
    #[error("Amount source for transaction `{0}` is exhausted")]
    AmountSourceExhausted(String),
    #[error("Division by zero: {0}")]
    DivisionByZero(String),
    #[error("Unknown bucket: {0}")]
    UnknownBucket(String),
    #[error("Unknown transaction: {0}")]
    UnknownTransaction(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type MiserResult<T> = Result<T, MiserError>;
