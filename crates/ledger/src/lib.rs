//! Core bookkeeping engine: accounts, entries, recurring templates, income
//! lines, and the aggregations built on top of them. All access goes through
//! [`Ledger`].

pub use categories::Category;
pub use error::LedgerError;
pub use expenses::Expense;
pub use fixed_expenses::FixedExpense;
pub use fixed_incomes::FixedIncome;
pub use incomes::IncomeConfig;
pub use kind::EntryKind;
pub use money::MoneyCents;
pub use ops::{
    ChartData, ChartMetric, ChartPeriod, DashboardSnapshot, ExpenseListFilter, Ledger,
    LedgerBuilder, MonthSummary, NewCategory, NewExpense, NewFixedExpense, NewFixedIncome,
    NewVariableIncome, RegisterUser, ReportDocument, ReportEntry, ReportKind, ReportQuery,
    SessionToken, UpdateCategory, UpdateExpense, UpdateFixedExpense, UpdateFixedIncome,
    UpdateProfile, UpdateVariableIncome,
};
pub use users::User;
pub use variable_incomes::VariableIncome;

mod categories;
mod error;
mod expenses;
mod fixed_expenses;
mod fixed_incomes;
mod incomes;
mod kind;
mod money;
mod ops;
mod period;
mod sessions;
mod users;
mod variable_incomes;

type ResultLedger<T> = Result<T, LedgerError>;
