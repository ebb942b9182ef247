//! One-off entry API endpoints.

use api_types::{
    EntryKind as ApiKind, Message,
    expense::{ExpenseListQuery, ExpenseNew, ExpenseUpdate, ExpenseView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use ledger::{EntryKind, Expense, ExpenseListFilter, MoneyCents, NewExpense, UpdateExpense, User};

use crate::{ServerError, server::ServerState};

pub(crate) fn domain_kind(kind: ApiKind) -> EntryKind {
    match kind {
        ApiKind::Expense => EntryKind::Expense,
        ApiKind::Income => EntryKind::Income,
    }
}

pub(crate) fn api_kind(kind: EntryKind) -> ApiKind {
    match kind {
        EntryKind::Expense => ApiKind::Expense,
        EntryKind::Income => ApiKind::Income,
    }
}

pub(crate) fn view(expense: Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        description: expense.description,
        amount_cents: expense.amount.cents(),
        date: expense.date,
        kind: api_kind(expense.kind),
        category_id: expense.category_id,
        created_at: expense.created_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<ExpenseListQuery>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let filter = ExpenseListFilter {
        month: query.month,
        year: query.year,
        start_date: query.start_date,
        end_date: query.end_date,
        kind: query.kind.map(domain_kind),
        category_id: query.category_id,
    };
    let entries = state.ledger.list_expenses(user.id, &filter).await?;

    Ok(Json(entries.into_iter().map(view).collect()))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let expense = state
        .ledger
        .create_expense(
            user.id,
            NewExpense {
                description: payload.description,
                amount: MoneyCents::new(payload.amount_cents),
                date: payload.date,
                kind: domain_kind(payload.kind),
                category_id: payload.category_id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(view(expense))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<i32>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state
        .ledger
        .update_expense(
            user.id,
            expense_id,
            UpdateExpense {
                description: payload.description,
                amount: payload.amount_cents.map(MoneyCents::new),
                date: payload.date,
                kind: payload.kind.map(domain_kind),
                category_id: payload.category_id,
            },
        )
        .await?;

    Ok(Json(view(expense)))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<i32>,
) -> Result<Json<Message>, ServerError> {
    state.ledger.delete_expense(user.id, expense_id).await?;

    Ok(Json(Message {
        message: "expense deleted".to_string(),
    }))
}
