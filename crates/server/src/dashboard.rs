//! Dashboard API endpoints.

use api_types::{
    dashboard::{DashboardStats, RecentTransactionsQuery},
    expense::ExpenseView,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use ledger::User;

use crate::{ServerError, expenses, server::ServerState};

pub async fn stats(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<DashboardStats>, ServerError> {
    let snapshot = state.ledger.dashboard(user.id).await?;

    Ok(Json(DashboardStats {
        total_income_cents: snapshot.total_income.cents(),
        total_expense_cents: snapshot.total_expense.cents(),
        total_balance_cents: snapshot.total_balance.cents(),
        monthly_income_cents: snapshot.monthly_income.cents(),
        monthly_expenses_cents: snapshot.monthly_expenses.cents(),
        active_categories: snapshot.active_categories,
    }))
}

pub async fn recent_transactions(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<RecentTransactionsQuery>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let entries = state
        .ledger
        .recent_transactions(user.id, query.limit)
        .await?;

    Ok(Json(entries.into_iter().map(expenses::view).collect()))
}

pub async fn all_transactions(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let entries = state.ledger.all_transactions(user.id).await?;

    Ok(Json(entries.into_iter().map(expenses::view).collect()))
}
