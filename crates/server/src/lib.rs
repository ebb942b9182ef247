use axum::{Json, http::StatusCode, response::IntoResponse};
use ledger::LedgerError;

use serde::Serialize;
pub use mailer::Mailer;
pub use server::{ServerState, router, run_with_listener, spawn_with_listener};

mod analytics;
mod auth;
mod categories;
mod dashboard;
mod expenses;
mod fixed_expenses;
mod income;
mod mailer;
mod pdf;
mod reports;
mod server;

/// Server custom errors.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("pdf rendering failed: {0}")]
    Pdf(String),
    #[error("mail delivery failed: {0}")]
    Mail(String),
    #[error("{0}")]
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_ledger_error(err: &LedgerError) -> StatusCode {
    if err.is_connection_lost() {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    match err {
        LedgerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::Conflict(_) => StatusCode::CONFLICT,
        LedgerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        LedgerError::Internal(_) | LedgerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_ledger_error(err: LedgerError) -> String {
    let connection_lost = err.is_connection_lost();
    match err {
        LedgerError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            if connection_lost {
                "service unavailable".to_string()
            } else {
                "internal server error".to_string()
            }
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Ledger(err) => {
                (status_for_ledger_error(&err), message_for_ledger_error(err))
            }
            ServerError::Pdf(detail) => {
                tracing::error!("pdf rendering failed: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to render the report".to_string(),
                )
            }
            ServerError::Mail(detail) => {
                tracing::error!("report delivery failed: {detail}");
                (
                    StatusCode::BAD_GATEWAY,
                    "failed to deliver the report email".to_string(),
                )
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}
