//! The module contains the errors the ledger can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when an input fails a domain rule.
//! - [`NotFound`] thrown when an item does not exist or belongs to
//!   another user.
//!
//!  [`Validation`]: LedgerError::Validation
//!  [`NotFound`]: LedgerError::NotFound
use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("\"{0}\" already present!")]
    Conflict(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl LedgerError {
    /// Returns `true` when the underlying database connection was lost or
    /// could not be acquired, which callers may treat as retryable.
    #[must_use]
    pub fn is_connection_lost(&self) -> bool {
        match self {
            Self::Database(err) => is_connection_lost(err),
            _ => false,
        }
    }
}

/// Connection-level failures, as opposed to query or constraint errors.
pub(crate) fn is_connection_lost(err: &DbErr) -> bool {
    matches!(err, DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::Internal(a), Self::Internal(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
