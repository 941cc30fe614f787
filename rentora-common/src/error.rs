// ================================================================
// File: rentora-common/src/error.rs
// ================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found error: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid amount: {0} (must be greater than zero)")]
    InvalidAmount(i64),

    #[error("Insufficient balance: have {balance}, requested {requested}")]
    InsufficientBalance { balance: i64, requested: i64 },

    #[error("Insufficient coins: have {balance}, need {required}")]
    InsufficientCoins { balance: i64, required: i64 },

    #[error("Withdrawal failed: insufficient balance (concurrent update)")]
    ConcurrentInsufficientBalance,

    #[error("A pending appointment already exists for this property")]
    DuplicatePending,

    #[error("Appointment is already {0}; only pending appointments can be updated")]
    AlreadyProcessed(String),

    #[error("Invalid rental plan: {0} days (must be 7, 15 or 30)")]
    InvalidPlan(i32),

    // Infrastructure variants:
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Parse(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Parse(s.to_string())
    }
}
