//! Recurring templates and the monthly materializer.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    EntryKind, LedgerError, MoneyCents, ResultLedger, expenses, fixed_expenses,
    fixed_expenses::FixedExpense, period::ReportWindow,
};

use super::{
    Ledger, categories::owned_category, normalize_required_text, retry_read,
    validate_day_of_month, validate_positive_amount, with_tx,
};

/// New template payload. Templates start active.
#[derive(Clone, Debug)]
pub struct NewFixedExpense {
    pub description: String,
    pub amount: MoneyCents,
    pub day_of_month: u8,
    pub category_id: i32,
}

#[derive(Clone, Debug, Default)]
pub struct UpdateFixedExpense {
    pub description: Option<String>,
    pub amount: Option<MoneyCents>,
    pub day_of_month: Option<u8>,
    pub category_id: Option<i32>,
    pub is_active: Option<bool>,
}

impl Ledger {
    pub async fn list_fixed_expenses(&self, user_id: i32) -> ResultLedger<Vec<FixedExpense>> {
        retry_read!(self.find_fixed_expenses(user_id).await)
    }

    async fn find_fixed_expenses(&self, user_id: i32) -> ResultLedger<Vec<FixedExpense>> {
        let models = fixed_expenses::Entity::find()
            .filter(fixed_expenses::Column::UserId.eq(user_id))
            .order_by_asc(fixed_expenses::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(FixedExpense::try_from).collect()
    }

    pub async fn create_fixed_expense(
        &self,
        user_id: i32,
        cmd: NewFixedExpense,
    ) -> ResultLedger<FixedExpense> {
        let description = normalize_required_text(&cmd.description, "description")?;
        validate_positive_amount(cmd.amount)?;
        validate_day_of_month(cmd.day_of_month)?;

        with_tx!(self, |db_tx| {
            let category = owned_category(&db_tx, user_id, cmd.category_id).await?;

            let now = Utc::now();
            let model = fixed_expenses::ActiveModel {
                user_id: ActiveValue::Set(user_id),
                category_id: ActiveValue::Set(Some(category.id)),
                description: ActiveValue::Set(description),
                amount_cents: ActiveValue::Set(cmd.amount.cents()),
                day_of_month: ActiveValue::Set(i32::from(cmd.day_of_month)),
                is_active: ActiveValue::Set(true),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            FixedExpense::try_from(model)
        })
    }

    pub async fn update_fixed_expense(
        &self,
        user_id: i32,
        fixed_expense_id: i32,
        cmd: UpdateFixedExpense,
    ) -> ResultLedger<FixedExpense> {
        let description = cmd
            .description
            .as_deref()
            .map(|value| normalize_required_text(value, "description"))
            .transpose()?;
        if let Some(amount) = cmd.amount {
            validate_positive_amount(amount)?;
        }
        if let Some(day) = cmd.day_of_month {
            validate_day_of_month(day)?;
        }

        with_tx!(self, |db_tx| {
            let model = owned_fixed_expense(&db_tx, user_id, fixed_expense_id).await?;
            if let Some(category_id) = cmd.category_id {
                owned_category(&db_tx, user_id, category_id).await?;
            }

            let mut active: fixed_expenses::ActiveModel = model.into();
            if let Some(description) = description {
                active.description = ActiveValue::Set(description);
            }
            if let Some(amount) = cmd.amount {
                active.amount_cents = ActiveValue::Set(amount.cents());
            }
            if let Some(day) = cmd.day_of_month {
                active.day_of_month = ActiveValue::Set(i32::from(day));
            }
            if let Some(category_id) = cmd.category_id {
                active.category_id = ActiveValue::Set(Some(category_id));
            }
            if let Some(is_active) = cmd.is_active {
                active.is_active = ActiveValue::Set(is_active);
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            let model = active.update(&db_tx).await?;
            FixedExpense::try_from(model)
        })
    }

    pub async fn delete_fixed_expense(
        &self,
        user_id: i32,
        fixed_expense_id: i32,
    ) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = owned_fixed_expense(&db_tx, user_id, fixed_expense_id).await?;
            fixed_expenses::Entity::delete_by_id(model.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Post every active template into `expenses` for the given month,
    /// defaulting to the current one. Returns how many rows were inserted.
    ///
    /// A template is skipped when an entry with the same description already
    /// exists in that month, so re-running is safe. The scheduled day is
    /// capped at 28 to stay valid in February.
    pub async fn materialize_fixed_expenses(
        &self,
        user_id: i32,
        month: Option<u32>,
        year: Option<i32>,
    ) -> ResultLedger<u64> {
        let today = Utc::now().date_naive();
        let month = month.unwrap_or_else(|| today.month());
        let year = year.unwrap_or_else(|| today.year());
        let window = ReportWindow::month(year, month)?;

        with_tx!(self, |db_tx| {
            let templates = fixed_expenses::Entity::find()
                .filter(fixed_expenses::Column::UserId.eq(user_id))
                .filter(fixed_expenses::Column::IsActive.eq(true))
                .all(&db_tx)
                .await?;

            let posted = expenses::Entity::find()
                .filter(expenses::Column::UserId.eq(user_id))
                .filter(expenses::Column::Date.gte(window.start))
                .filter(expenses::Column::Date.lte(window.end))
                .all(&db_tx)
                .await?;
            let mut taken: HashSet<String> =
                posted.into_iter().map(|model| model.description).collect();

            let mut created = 0u64;
            for template in templates {
                if taken.contains(&template.description) {
                    continue;
                }
                let day = u32::try_from(template.day_of_month.min(28))
                    .map_err(|_| LedgerError::Validation("invalid day of month".to_string()))?;
                let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
                    LedgerError::Validation(format!("invalid posting date {year}-{month}-{day}"))
                })?;

                let now = Utc::now();
                expenses::ActiveModel {
                    user_id: ActiveValue::Set(user_id),
                    category_id: ActiveValue::Set(template.category_id),
                    description: ActiveValue::Set(template.description.clone()),
                    amount_cents: ActiveValue::Set(template.amount_cents),
                    date: ActiveValue::Set(date),
                    kind: ActiveValue::Set(EntryKind::Expense.as_str().to_string()),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                }
                .insert(&db_tx)
                .await?;

                taken.insert(template.description);
                created += 1;
            }

            tracing::debug!(user_id, year, month, created, "materialized fixed expenses");
            Ok(created)
        })
    }
}

async fn owned_fixed_expense(
    db_tx: &DatabaseTransaction,
    user_id: i32,
    fixed_expense_id: i32,
) -> ResultLedger<fixed_expenses::Model> {
    fixed_expenses::Entity::find_by_id(fixed_expense_id)
        .filter(fixed_expenses::Column::UserId.eq(user_id))
        .one(db_tx)
        .await?
        .ok_or_else(|| LedgerError::NotFound("fixed expense".to_string()))
}
