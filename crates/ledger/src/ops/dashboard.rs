//! Dashboard figures and the transaction feeds backing them.

use chrono::{Datelike, Utc};
use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, prelude::*};

use crate::{
    EntryKind, LedgerError, MoneyCents, ResultLedger, categories, expenses, expenses::Expense,
    fixed_incomes, incomes, period::ReportWindow, variable_incomes,
};

use super::{Ledger, retry_read};

/// All-time and current-month figures for one user.
///
/// Income follows the same four-source formula as reports; expenses here
/// are entry sums only, recurring templates do not contribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DashboardSnapshot {
    pub total_income: MoneyCents,
    pub total_expense: MoneyCents,
    pub total_balance: MoneyCents,
    pub monthly_income: MoneyCents,
    pub monthly_expenses: MoneyCents,
    pub active_categories: u64,
}

impl Ledger {
    pub async fn dashboard(&self, user_id: i32) -> ResultLedger<DashboardSnapshot> {
        retry_read!(self.build_dashboard(user_id).await)
    }

    async fn build_dashboard(&self, user_id: i32) -> ResultLedger<DashboardSnapshot> {
        let today = Utc::now().date_naive();
        let this_month = ReportWindow::month(today.year(), today.month())?;

        let config = incomes::Entity::find()
            .filter(incomes::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?;
        let variable_rows = match &config {
            Some(config) => {
                variable_incomes::Entity::find()
                    .filter(variable_incomes::Column::IncomeId.eq(config.id))
                    .filter(variable_incomes::Column::IsActive.eq(true))
                    .all(&self.database)
                    .await?
            }
            None => Vec::new(),
        };

        let mut recurring_income = config.map_or(MoneyCents::ZERO, |config| {
            MoneyCents::new(config.fixed_amount_cents)
        });
        for row in variable_rows {
            recurring_income += MoneyCents::new(row.amount_cents);
        }

        let fixed_income_rows = fixed_incomes::Entity::find()
            .filter(fixed_incomes::Column::UserId.eq(user_id))
            .filter(fixed_incomes::Column::IsActive.eq(true))
            .all(&self.database)
            .await?;
        for row in fixed_income_rows {
            recurring_income += MoneyCents::new(row.amount_cents);
        }

        let entries = expenses::Entity::find()
            .filter(expenses::Column::UserId.eq(user_id))
            .all(&self.database)
            .await?;
        let mut entry_income = MoneyCents::ZERO;
        let mut entry_expense = MoneyCents::ZERO;
        let mut monthly_entry_income = MoneyCents::ZERO;
        let mut monthly_expenses = MoneyCents::ZERO;
        for row in entries {
            let amount = MoneyCents::new(row.amount_cents);
            match EntryKind::try_from(row.kind.as_str())? {
                EntryKind::Income => {
                    entry_income += amount;
                    if this_month.contains(row.date) {
                        monthly_entry_income += amount;
                    }
                }
                EntryKind::Expense => {
                    entry_expense += amount;
                    if this_month.contains(row.date) {
                        monthly_expenses += amount;
                    }
                }
            }
        }

        let active_categories = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .count(&self.database)
            .await?;

        let total_income = recurring_income + entry_income;
        Ok(DashboardSnapshot {
            total_income,
            total_expense: entry_expense,
            total_balance: total_income - entry_expense,
            monthly_income: recurring_income + monthly_entry_income,
            monthly_expenses,
            active_categories,
        })
    }

    /// Current-month entries, newest first, at most `limit` rows
    /// (1 through 50, 10 when unset).
    pub async fn recent_transactions(
        &self,
        user_id: i32,
        limit: Option<u64>,
    ) -> ResultLedger<Vec<Expense>> {
        let limit = limit.unwrap_or(10);
        if !(1..=50).contains(&limit) {
            return Err(LedgerError::Validation(
                "limit must be between 1 and 50".to_string(),
            ));
        }
        retry_read!(self.find_recent_transactions(user_id, limit).await)
    }

    async fn find_recent_transactions(
        &self,
        user_id: i32,
        limit: u64,
    ) -> ResultLedger<Vec<Expense>> {
        let today = Utc::now().date_naive();
        let window = ReportWindow::month(today.year(), today.month())?;
        let models = expenses::Entity::find()
            .filter(expenses::Column::UserId.eq(user_id))
            .filter(expenses::Column::Date.gte(window.start))
            .filter(expenses::Column::Date.lte(window.end))
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::CreatedAt)
            .limit(limit)
            .all(&self.database)
            .await?;
        models.into_iter().map(Expense::try_from).collect()
    }

    /// Every entry the user ever recorded, newest first.
    pub async fn all_transactions(&self, user_id: i32) -> ResultLedger<Vec<Expense>> {
        retry_read!(self.find_all_transactions(user_id).await)
    }

    async fn find_all_transactions(&self, user_id: i32) -> ResultLedger<Vec<Expense>> {
        let models = expenses::Entity::find()
            .filter(expenses::Column::UserId.eq(user_id))
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(Expense::try_from).collect()
    }
}
