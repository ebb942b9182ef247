use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Direction of an entry or category.
///
/// The server treats kinds as:
/// - `expense`: money leaving the ledger.
/// - `income`: money entering it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    #[default]
    Expense,
    Income,
}

impl EntryKind {
    /// Returns the canonical kind string used by the engine/database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }
}

/// Generic response body for operations that only confirm an outcome.
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterRequest {
        pub name: String,
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub email: String,
        pub password: String,
    }

    /// Response body for a successful login.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        /// Opaque session token; send it back as `Authorization: Bearer <token>`.
        pub access_token: String,
        /// Always `bearer`.
        pub token_type: String,
    }

    /// Request body for updating the authenticated profile.
    ///
    /// Absent fields are left unchanged.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileUpdate {
        pub name: Option<String>,
        pub email: Option<String>,
        pub password: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i32,
        pub name: String,
        pub email: String,
        /// RFC3339 timestamp (UTC).
        pub created_at: DateTime<Utc>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub kind: EntryKind,
    }

    /// Absent fields are left unchanged.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub kind: Option<EntryKind>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: i32,
        pub name: String,
        pub kind: EntryKind,
        pub created_at: DateTime<Utc>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub description: String,
        pub amount_cents: i64,
        /// Calendar day the entry belongs to (`YYYY-MM-DD`).
        pub date: NaiveDate,
        pub kind: EntryKind,
        pub category_id: i32,
    }

    /// Absent fields are left unchanged.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub description: Option<String>,
        pub amount_cents: Option<i64>,
        pub date: Option<NaiveDate>,
        pub kind: Option<EntryKind>,
        pub category_id: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: i32,
        pub description: String,
        pub amount_cents: i64,
        pub date: NaiveDate,
        pub kind: EntryKind,
        /// `None` once the category the entry was recorded under is deleted.
        pub category_id: Option<i32>,
        pub created_at: DateTime<Utc>,
    }

    /// Query parameters for listing entries.
    ///
    /// `month` requires `year`; `start_date`/`end_date` bound the range on
    /// top of whatever the other filters select.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListQuery {
        pub month: Option<u32>,
        pub year: Option<i32>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        pub kind: Option<EntryKind>,
        pub category_id: Option<i32>,
    }
}

pub mod fixed_expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FixedExpenseNew {
        pub description: String,
        pub amount_cents: i64,
        /// Day the entry materializes on, 1-31; clamped to shorter months.
        pub day_of_month: u8,
        pub category_id: i32,
    }

    /// Absent fields are left unchanged.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FixedExpenseUpdate {
        pub description: Option<String>,
        pub amount_cents: Option<i64>,
        pub day_of_month: Option<u8>,
        pub category_id: Option<i32>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FixedExpenseView {
        pub id: i32,
        pub description: String,
        pub amount_cents: i64,
        pub day_of_month: u8,
        pub category_id: Option<i32>,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
    }

    /// Query parameters for the monthly materialization run.
    ///
    /// Both default to the current month when absent.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProcessMonthlyQuery {
        pub month: Option<u32>,
        pub year: Option<i32>,
    }
}

pub mod income {
    use super::*;

    /// The per-user income configuration row.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeConfigView {
        pub id: i32,
        /// Flat monthly salary, added to every report window as-is.
        pub fixed_amount_cents: i64,
        /// Informative only; never enters any total.
        pub bonus_amount_cents: i64,
        pub created_at: DateTime<Utc>,
    }

    /// Absent fields are left unchanged.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeConfigUpdate {
        pub fixed_amount_cents: Option<i64>,
        pub bonus_amount_cents: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VariableIncomeNew {
        pub description: String,
        pub amount_cents: i64,
        /// RFC3339 timestamp (UTC). Stored and echoed back, nothing more.
        pub valid_until: Option<DateTime<Utc>>,
    }

    /// Absent fields are left unchanged.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct VariableIncomeUpdate {
        pub description: Option<String>,
        pub amount_cents: Option<i64>,
        pub valid_until: Option<DateTime<Utc>>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VariableIncomeView {
        pub id: i32,
        pub description: String,
        pub amount_cents: i64,
        pub valid_until: Option<DateTime<Utc>>,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FixedIncomeNew {
        pub description: String,
        pub amount_cents: i64,
    }

    /// Absent fields are left unchanged.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FixedIncomeUpdate {
        pub description: Option<String>,
        pub amount_cents: Option<i64>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FixedIncomeView {
        pub id: i32,
        pub description: String,
        pub amount_cents: i64,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
    }
}

pub mod dashboard {
    use super::*;

    /// Headline numbers for the landing screen.
    ///
    /// Totals cover the whole history; the `monthly_*` pair covers the
    /// current calendar month only.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardStats {
        pub total_income_cents: i64,
        pub total_expense_cents: i64,
        pub total_balance_cents: i64,
        pub monthly_income_cents: i64,
        pub monthly_expenses_cents: i64,
        pub active_categories: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecentTransactionsQuery {
        /// 1-50, defaults to 10.
        pub limit: Option<u64>,
    }
}

pub mod analytics {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryQuery {
        pub month: u32,
        pub year: i32,
    }

    /// One-off entry totals for a single calendar month.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryView {
        pub month: u32,
        pub year: i32,
        pub total_income_cents: i64,
        pub total_expenses_cents: i64,
        pub balance_cents: i64,
    }

    /// What the chart aggregates over.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ChartMetric {
        Categories,
        Income,
        Expense,
    }

    impl ChartMetric {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Categories => "categories",
                Self::Income => "income",
                Self::Expense => "expense",
            }
        }
    }

    /// Bucket granularity for the income/expense series.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ChartPeriod {
        #[default]
        Monthly,
        Annual,
    }

    impl ChartPeriod {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Monthly => "monthly",
                Self::Annual => "annual",
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChartDataQuery {
        pub metric: ChartMetric,
        pub period: Option<ChartPeriod>,
        pub month: Option<u32>,
        pub year: i32,
    }

    /// Parallel label/value arrays, ready for a chart widget.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChartDataView {
        pub labels: Vec<String>,
        pub values: Vec<i64>,
    }
}

pub mod report {
    use super::*;

    /// Shape of the requested report window.
    ///
    /// An explicit `start_date`/`end_date` pair overrides the kind-derived
    /// window; `category` additionally narrows every sum to one category.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ReportKind {
        Monthly,
        Annual,
        Category,
    }

    impl ReportKind {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Monthly => "monthly",
                Self::Annual => "annual",
                Self::Category => "category",
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReportQuery {
        pub kind: ReportKind,
        pub category_id: Option<i32>,
        pub month: Option<u32>,
        pub year: Option<i32>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
    }

    /// One line of a report: a stored entry, a projected recurring
    /// occurrence, or an income line.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReportTransactionView {
        /// Id of the source row; unique only within its source table.
        pub id: i32,
        pub description: String,
        pub amount_cents: i64,
        pub kind: EntryKind,
        pub date: NaiveDate,
        pub category_id: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReportView {
        pub kind: ReportKind,
        pub month: Option<u32>,
        pub year: Option<i32>,
        pub total_income_cents: i64,
        pub total_expense_cents: i64,
        pub balance_cents: i64,
        pub transactions: Vec<ReportTransactionView>,
    }

    /// Request body for mailing a rendered report.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct EmailReportRequest {
        pub email: String,
        pub kind: ReportKind,
        pub category_id: Option<i32>,
        pub month: Option<u32>,
        pub year: Option<i32>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
    }
}
