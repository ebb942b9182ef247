//! Report aggregation over a resolved calendar window.

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{QueryFilter, QueryOrder, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    EntryKind, LedgerError, MoneyCents, ResultLedger, expenses, fixed_expenses, fixed_incomes,
    incomes,
    period::{ReportWindow, clamped_ymd, next_month},
    variable_incomes,
};

use super::{Ledger, retry_read};

/// What kind of report to aggregate.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Monthly,
    Annual,
    Category,
}

impl ReportKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Annual => "annual",
            Self::Category => "category",
        }
    }
}

impl TryFrom<&str> for ReportKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "monthly" => Ok(Self::Monthly),
            "annual" => Ok(Self::Annual),
            "category" => Ok(Self::Category),
            other => Err(LedgerError::Validation(format!(
                "invalid report kind: {other}"
            ))),
        }
    }
}

/// Report request. Everything besides `kind` is optional; under-specified
/// combinations fall back to the current calendar month.
#[derive(Clone, Debug)]
pub struct ReportQuery {
    pub kind: ReportKind,
    pub category_id: Option<i32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// One line of a report: either a stored entry or a synthesized occurrence
/// of a recurring template or income. `id` refers to the source row and is
/// only unique within its source table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportEntry {
    pub id: i32,
    pub description: String,
    pub amount: MoneyCents,
    pub kind: EntryKind,
    pub date: NaiveDate,
    pub category_id: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportDocument {
    pub kind: ReportKind,
    /// Echo of the requested month, when one was given.
    pub month: Option<u32>,
    /// Echo of the requested year, when one was given.
    pub year: Option<i32>,
    pub total_income: MoneyCents,
    pub total_expense: MoneyCents,
    pub balance: MoneyCents,
    pub transactions: Vec<ReportEntry>,
}

/// Resolve the query to a window. An explicit date range always wins;
/// after that each kind uses its own parameters, and anything
/// under-specified covers the current month.
fn resolve_window(query: &ReportQuery) -> ResultLedger<ReportWindow> {
    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        return ReportWindow::range(start, end);
    }
    match query.kind {
        ReportKind::Monthly => {
            if let (Some(month), Some(year)) = (query.month, query.year) {
                return ReportWindow::month(year, month);
            }
        }
        ReportKind::Annual => {
            if let Some(year) = query.year {
                return ReportWindow::year(year);
            }
        }
        ReportKind::Category => {
            if query.category_id.is_some()
                && let (Some(month), Some(year)) = (query.month, query.year)
            {
                return ReportWindow::month(year, month);
            }
        }
    }
    let today = Utc::now().date_naive();
    ReportWindow::month(today.year(), today.month())
}

impl Ledger {
    /// Aggregate totals and the unified transaction list for the window the
    /// query resolves to.
    pub async fn report(&self, user_id: i32, query: &ReportQuery) -> ResultLedger<ReportDocument> {
        retry_read!(self.build_report(user_id, query).await)
    }

    async fn build_report(
        &self,
        user_id: i32,
        query: &ReportQuery,
    ) -> ResultLedger<ReportDocument> {
        let window = resolve_window(query)?;

        let mut one_off_query = expenses::Entity::find()
            .filter(expenses::Column::UserId.eq(user_id))
            .filter(expenses::Column::Date.gte(window.start))
            .filter(expenses::Column::Date.lte(window.end));
        if let Some(category_id) = query.category_id {
            one_off_query = one_off_query.filter(expenses::Column::CategoryId.eq(category_id));
        }
        let one_off = one_off_query
            .order_by_asc(expenses::Column::Id)
            .all(&self.database)
            .await?;

        let mut template_query = fixed_expenses::Entity::find()
            .filter(fixed_expenses::Column::UserId.eq(user_id))
            .filter(fixed_expenses::Column::IsActive.eq(true));
        if let Some(category_id) = query.category_id {
            template_query =
                template_query.filter(fixed_expenses::Column::CategoryId.eq(category_id));
        }
        let templates = template_query
            .order_by_asc(fixed_expenses::Column::Id)
            .all(&self.database)
            .await?;

        let config = incomes::Entity::find()
            .filter(incomes::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?;
        let variable_rows = match &config {
            Some(config) => {
                variable_incomes::Entity::find()
                    .filter(variable_incomes::Column::IncomeId.eq(config.id))
                    .filter(variable_incomes::Column::IsActive.eq(true))
                    .order_by_asc(variable_incomes::Column::Id)
                    .all(&self.database)
                    .await?
            }
            None => Vec::new(),
        };
        let fixed_income_rows = fixed_incomes::Entity::find()
            .filter(fixed_incomes::Column::UserId.eq(user_id))
            .filter(fixed_incomes::Column::IsActive.eq(true))
            .order_by_asc(fixed_incomes::Column::Id)
            .all(&self.database)
            .await?;

        // Income: flat configured amount (never prorated), active income
        // lines, and in-window entries recorded as income. The bonus amount
        // stays out of every total.
        let mut total_income = config
            .map_or(MoneyCents::ZERO, |config| {
                MoneyCents::new(config.fixed_amount_cents)
            });
        for row in &variable_rows {
            total_income += MoneyCents::new(row.amount_cents);
        }
        for row in &fixed_income_rows {
            total_income += MoneyCents::new(row.amount_cents);
        }

        let mut one_off_income = MoneyCents::ZERO;
        let mut one_off_expense = MoneyCents::ZERO;
        for row in &one_off {
            match EntryKind::try_from(row.kind.as_str())? {
                EntryKind::Income => one_off_income += MoneyCents::new(row.amount_cents),
                EntryKind::Expense => one_off_expense += MoneyCents::new(row.amount_cents),
            }
        }
        total_income += one_off_income;

        let mut template_sum = MoneyCents::ZERO;
        for template in &templates {
            template_sum += MoneyCents::new(template.amount_cents);
        }
        let recurring_expense = template_sum.checked_mul(window.months).ok_or_else(|| {
            LedgerError::Internal("amount overflow in report totals".to_string())
        })?;
        let total_expense = one_off_expense + recurring_expense;

        let mut transactions = Vec::with_capacity(one_off.len());
        for model in one_off {
            let kind = EntryKind::try_from(model.kind.as_str())?;
            transactions.push(ReportEntry {
                id: model.id,
                description: model.description,
                amount: MoneyCents::new(model.amount_cents),
                kind,
                date: model.date,
                category_id: model.category_id,
            });
        }

        // One synthetic occurrence per template per month the cursor visits.
        // The cursor walks from `start` in whole-month hops and stops once it
        // passes `end`, so a range ending mid-month can skip its final month
        // and early-month occurrences may precede `start`. They stay in.
        let mut cursor = Some(window.start);
        while let Some(position) = cursor {
            if position > window.end {
                break;
            }
            for template in &templates {
                let day = u32::try_from(template.day_of_month)
                    .map_err(|_| LedgerError::Validation("invalid day of month".to_string()))?;
                let date = clamped_ymd(position.year(), position.month(), day).ok_or_else(
                    || LedgerError::Validation("invalid posting date".to_string()),
                )?;
                transactions.push(ReportEntry {
                    id: template.id,
                    description: template.description.clone(),
                    amount: MoneyCents::new(template.amount_cents),
                    kind: EntryKind::Expense,
                    date,
                    category_id: template.category_id,
                });
            }
            cursor = next_month(position);
        }

        for row in variable_rows {
            transactions.push(ReportEntry {
                id: row.id,
                description: row.description,
                amount: MoneyCents::new(row.amount_cents),
                kind: EntryKind::Income,
                date: row.created_at.date_naive(),
                category_id: None,
            });
        }
        for row in fixed_income_rows {
            transactions.push(ReportEntry {
                id: row.id,
                description: row.description,
                amount: MoneyCents::new(row.amount_cents),
                kind: EntryKind::Income,
                date: row.created_at.date_naive(),
                category_id: None,
            });
        }

        transactions.sort_by_key(|entry| entry.date);

        Ok(ReportDocument {
            kind: query.kind,
            month: query.month,
            year: query.year,
            total_income,
            total_expense,
            balance: total_income - total_expense,
            transactions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(kind: ReportKind) -> ReportQuery {
        ReportQuery {
            kind,
            category_id: None,
            month: None,
            year: None,
            start_date: None,
            end_date: None,
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn explicit_range_wins_over_kind() {
        let mut request = query(ReportKind::Annual);
        request.start_date = Some(date(2024, 1, 15));
        request.end_date = Some(date(2024, 3, 10));

        let window = resolve_window(&request).unwrap();
        assert_eq!(window.start, date(2024, 1, 15));
        assert_eq!(window.end, date(2024, 3, 10));
        assert_eq!(window.months, 3);
    }

    #[test]
    fn annual_window_weighs_twelve_months() {
        let mut request = query(ReportKind::Annual);
        request.year = Some(2024);

        let window = resolve_window(&request).unwrap();
        assert_eq!(window.start, date(2024, 1, 1));
        assert_eq!(window.end, date(2024, 12, 31));
        assert_eq!(window.months, 12);
    }

    #[test]
    fn category_without_month_falls_back_to_current_month() {
        let mut request = query(ReportKind::Category);
        request.category_id = Some(7);

        let window = resolve_window(&request).unwrap();
        let today = Utc::now().date_naive();
        assert_eq!(window.start.year(), today.year());
        assert_eq!(window.start.month(), today.month());
        assert_eq!(window.start.day(), 1);
        assert_eq!(window.months, 1);
    }

    #[test]
    fn month_without_year_falls_back() {
        let mut request = query(ReportKind::Monthly);
        request.month = Some(2);

        let window = resolve_window(&request).unwrap();
        assert_eq!(window.months, 1);
        assert_eq!(window.start.day(), 1);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut request = query(ReportKind::Monthly);
        request.start_date = Some(date(2024, 3, 10));
        request.end_date = Some(date(2024, 1, 15));

        assert!(resolve_window(&request).is_err());
    }

    #[test]
    fn report_kind_round_trips_through_str() {
        for kind in [ReportKind::Monthly, ReportKind::Annual, ReportKind::Category] {
            assert_eq!(ReportKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(ReportKind::try_from("weekly").is_err());
    }
}
