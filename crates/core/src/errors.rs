//! Core error types for the Coinfolio engine.
//!
//! Only failures that must reach the caller live here. Degraded results
//! (rejected ledger records, clamped positions, synthetic prices) are carried
//! as flags on the output types instead.

use thiserror::Error;

use crate::trades::{LedgerError, SubmissionError};

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Trade submission rejected: {0}")]
    SubmissionRejected(#[from] SubmissionError),

    #[error("Trade ledger unavailable: {0}")]
    Ledger(#[from] LedgerError),
}

/// Caller input that cannot be acted on at all.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field '{0}' is missing")]
    MissingField(&'static str),
}

/// Rejects a blank account id before any ledger call is made.
pub(crate) fn require_account_id(account_id: &str) -> Result<()> {
    if account_id.trim().is_empty() {
        return Err(ValidationError::MissingField("accountId").into());
    }
    Ok(())
}
