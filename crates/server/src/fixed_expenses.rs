//! Recurring expense template API endpoints.

use api_types::{
    Message,
    fixed_expense::{FixedExpenseNew, FixedExpenseUpdate, FixedExpenseView, ProcessMonthlyQuery},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use ledger::{FixedExpense, MoneyCents, NewFixedExpense, UpdateFixedExpense, User};

use crate::{ServerError, server::ServerState};

fn view(template: FixedExpense) -> FixedExpenseView {
    FixedExpenseView {
        id: template.id,
        description: template.description,
        amount_cents: template.amount.cents(),
        day_of_month: template.day_of_month,
        category_id: template.category_id,
        is_active: template.is_active,
        created_at: template.created_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<FixedExpenseView>>, ServerError> {
    let templates = state.ledger.list_fixed_expenses(user.id).await?;

    Ok(Json(templates.into_iter().map(view).collect()))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<FixedExpenseNew>,
) -> Result<(StatusCode, Json<FixedExpenseView>), ServerError> {
    let template = state
        .ledger
        .create_fixed_expense(
            user.id,
            NewFixedExpense {
                description: payload.description,
                amount: MoneyCents::new(payload.amount_cents),
                day_of_month: payload.day_of_month,
                category_id: payload.category_id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(view(template))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(template_id): Path<i32>,
    Json(payload): Json<FixedExpenseUpdate>,
) -> Result<Json<FixedExpenseView>, ServerError> {
    let template = state
        .ledger
        .update_fixed_expense(
            user.id,
            template_id,
            UpdateFixedExpense {
                description: payload.description,
                amount: payload.amount_cents.map(MoneyCents::new),
                day_of_month: payload.day_of_month,
                category_id: payload.category_id,
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok(Json(view(template)))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(template_id): Path<i32>,
) -> Result<Json<Message>, ServerError> {
    state.ledger.delete_fixed_expense(user.id, template_id).await?;

    Ok(Json(Message {
        message: "fixed expense deleted".to_string(),
    }))
}

/// Posts every active template into the requested month, skipping the
/// ones already there.
pub async fn process_monthly(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<ProcessMonthlyQuery>,
) -> Result<Json<Message>, ServerError> {
    let created = state
        .ledger
        .materialize_fixed_expenses(user.id, query.month, query.year)
        .await?;

    Ok(Json(Message {
        message: format!("{created} fixed expenses processed"),
    }))
}
