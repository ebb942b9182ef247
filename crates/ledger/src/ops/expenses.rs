//! One-off entry CRUD with windowed listing.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    EntryKind, LedgerError, MoneyCents, ResultLedger, expenses, expenses::Expense,
    period::ReportWindow,
};

use super::{
    Ledger, categories::owned_category, normalize_required_text, retry_read,
    validate_positive_amount, with_tx,
};

/// Filters for listing entries. All present filters apply cumulatively.
///
/// `month` needs `year`; `year` alone covers the whole year. The explicit
/// date bounds are each optional and inclusive.
#[derive(Clone, Debug, Default)]
pub struct ExpenseListFilter {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub kind: Option<EntryKind>,
    pub category_id: Option<i32>,
}

/// New entry payload. A category is required and must belong to the caller.
#[derive(Clone, Debug)]
pub struct NewExpense {
    pub description: String,
    pub amount: MoneyCents,
    pub date: NaiveDate,
    pub kind: EntryKind,
    pub category_id: i32,
}

/// Entry changes. Untouched fields keep their stored values.
#[derive(Clone, Debug, Default)]
pub struct UpdateExpense {
    pub description: Option<String>,
    pub amount: Option<MoneyCents>,
    pub date: Option<NaiveDate>,
    pub kind: Option<EntryKind>,
    pub category_id: Option<i32>,
}

fn validate_list_filter(filter: &ExpenseListFilter) -> ResultLedger<()> {
    if filter.month.is_some() && filter.year.is_none() {
        return Err(LedgerError::Validation(
            "month filter requires year".to_string(),
        ));
    }
    if let (Some(start), Some(end)) = (filter.start_date, filter.end_date)
        && end < start
    {
        return Err(LedgerError::Validation(
            "invalid range: start_date must be <= end_date".to_string(),
        ));
    }
    Ok(())
}

impl Ledger {
    /// List the user's entries, newest date first.
    pub async fn list_expenses(
        &self,
        user_id: i32,
        filter: &ExpenseListFilter,
    ) -> ResultLedger<Vec<Expense>> {
        validate_list_filter(filter)?;
        retry_read!(self.find_expenses(user_id, filter).await)
    }

    async fn find_expenses(
        &self,
        user_id: i32,
        filter: &ExpenseListFilter,
    ) -> ResultLedger<Vec<Expense>> {
        let mut query = expenses::Entity::find().filter(expenses::Column::UserId.eq(user_id));

        match (filter.month, filter.year) {
            (Some(month), Some(year)) => {
                let window = ReportWindow::month(year, month)?;
                query = query
                    .filter(expenses::Column::Date.gte(window.start))
                    .filter(expenses::Column::Date.lte(window.end));
            }
            (None, Some(year)) => {
                let window = ReportWindow::year(year)?;
                query = query
                    .filter(expenses::Column::Date.gte(window.start))
                    .filter(expenses::Column::Date.lte(window.end));
            }
            _ => {}
        }
        if let Some(start) = filter.start_date {
            query = query.filter(expenses::Column::Date.gte(start));
        }
        if let Some(end) = filter.end_date {
            query = query.filter(expenses::Column::Date.lte(end));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(expenses::Column::Kind.eq(kind.as_str()));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(expenses::Column::CategoryId.eq(category_id));
        }

        let models = query
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(Expense::try_from).collect()
    }

    pub async fn create_expense(&self, user_id: i32, cmd: NewExpense) -> ResultLedger<Expense> {
        let description = normalize_required_text(&cmd.description, "description")?;
        validate_positive_amount(cmd.amount)?;

        with_tx!(self, |db_tx| {
            let category = owned_category(&db_tx, user_id, cmd.category_id).await?;

            let now = Utc::now();
            let model = expenses::ActiveModel {
                user_id: ActiveValue::Set(user_id),
                category_id: ActiveValue::Set(Some(category.id)),
                description: ActiveValue::Set(description),
                amount_cents: ActiveValue::Set(cmd.amount.cents()),
                date: ActiveValue::Set(cmd.date),
                kind: ActiveValue::Set(cmd.kind.as_str().to_string()),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            Expense::try_from(model)
        })
    }

    pub async fn update_expense(
        &self,
        user_id: i32,
        expense_id: i32,
        cmd: UpdateExpense,
    ) -> ResultLedger<Expense> {
        let description = cmd
            .description
            .as_deref()
            .map(|value| normalize_required_text(value, "description"))
            .transpose()?;
        if let Some(amount) = cmd.amount {
            validate_positive_amount(amount)?;
        }

        with_tx!(self, |db_tx| {
            let model = owned_expense(&db_tx, user_id, expense_id).await?;
            if let Some(category_id) = cmd.category_id {
                owned_category(&db_tx, user_id, category_id).await?;
            }

            let mut active: expenses::ActiveModel = model.into();
            if let Some(description) = description {
                active.description = ActiveValue::Set(description);
            }
            if let Some(amount) = cmd.amount {
                active.amount_cents = ActiveValue::Set(amount.cents());
            }
            if let Some(date) = cmd.date {
                active.date = ActiveValue::Set(date);
            }
            if let Some(kind) = cmd.kind {
                active.kind = ActiveValue::Set(kind.as_str().to_string());
            }
            if let Some(category_id) = cmd.category_id {
                active.category_id = ActiveValue::Set(Some(category_id));
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            let model = active.update(&db_tx).await?;
            Expense::try_from(model)
        })
    }

    pub async fn delete_expense(&self, user_id: i32, expense_id: i32) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = owned_expense(&db_tx, user_id, expense_id).await?;
            expenses::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            Ok(())
        })
    }
}

/// The entry, or `NotFound` when it is absent or owned by someone else.
async fn owned_expense(
    db_tx: &DatabaseTransaction,
    user_id: i32,
    expense_id: i32,
) -> ResultLedger<expenses::Model> {
    expenses::Entity::find_by_id(expense_id)
        .filter(expenses::Column::UserId.eq(user_id))
        .one(db_tx)
        .await?
        .ok_or_else(|| LedgerError::NotFound("expense".to_string()))
}
