use sea_orm::DatabaseConnection;

use crate::{LedgerError, MoneyCents, ResultLedger};

mod analytics;
mod auth;
mod categories;
mod dashboard;
mod expenses;
mod fixed_expenses;
mod income;
mod reports;

pub use analytics::{ChartData, ChartMetric, ChartPeriod, MonthSummary};
pub use auth::{RegisterUser, SessionToken, UpdateProfile};
pub use categories::{NewCategory, UpdateCategory};
pub use dashboard::DashboardSnapshot;
pub use expenses::{ExpenseListFilter, NewExpense, UpdateExpense};
pub use fixed_expenses::{NewFixedExpense, UpdateFixedExpense};
pub use income::{NewFixedIncome, NewVariableIncome, UpdateFixedIncome, UpdateVariableIncome};
pub use reports::{ReportDocument, ReportEntry, ReportKind, ReportQuery};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

/// Run a read-only call, repeating it once when the pool handed out a dead
/// connection. Writes never go through this.
macro_rules! retry_read {
    ($call:expr) => {{
        let result = $call;
        match result {
            Err(err) if $crate::LedgerError::is_connection_lost(&err) => {
                tracing::warn!("database connection lost, retrying read once: {err}");
                $call
            }
            other => other,
        }
    }};
}

pub(crate) use retry_read;
pub(crate) use with_tx;

/// Session lifetime in minutes when the builder does not override it.
const DEFAULT_SESSION_TTL_MINUTES: i64 = 30;

#[derive(Debug)]
pub struct Ledger {
    database: DatabaseConnection,
    session_ttl: chrono::TimeDelta,
}

impl Ledger {
    /// Return a builder for `Ledger`. Help to build the struct.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }
}

fn normalize_required_text(value: &str, label: &str) -> ResultLedger<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::Validation(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_email(value: &str) -> ResultLedger<String> {
    let trimmed = value.trim().to_lowercase();
    let valid = match trimmed.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(LedgerError::Validation(format!(
            "invalid email address: {trimmed}"
        )));
    }
    Ok(trimmed)
}

fn validate_positive_amount(amount: MoneyCents) -> ResultLedger<()> {
    if !amount.is_positive() {
        return Err(LedgerError::Validation(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_day_of_month(day: u8) -> ResultLedger<()> {
    if !(1..=31).contains(&day) {
        return Err(LedgerError::Validation(
            "day_of_month must be between 1 and 31".to_string(),
        ));
    }
    Ok(())
}

/// The builder for `Ledger`
#[derive(Default)]
pub struct LedgerBuilder {
    database: DatabaseConnection,
    session_ttl: Option<chrono::TimeDelta>,
}

impl LedgerBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Override the session lifetime (default: 30 minutes).
    pub fn session_ttl(mut self, ttl: chrono::TimeDelta) -> LedgerBuilder {
        self.session_ttl = Some(ttl);
        self
    }

    /// Construct `Ledger`
    pub async fn build(self) -> ResultLedger<Ledger> {
        Ok(Ledger {
            database: self.database,
            session_ttl: self
                .session_ttl
                .unwrap_or_else(|| chrono::TimeDelta::minutes(DEFAULT_SESSION_TTL_MINUTES)),
        })
    }
}
