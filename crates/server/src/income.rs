//! Income configuration and income line API endpoints.

use api_types::{
    Message,
    income::{
        FixedIncomeNew, FixedIncomeUpdate, FixedIncomeView, IncomeConfigUpdate, IncomeConfigView,
        VariableIncomeNew, VariableIncomeUpdate, VariableIncomeView,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use ledger::{
    FixedIncome, IncomeConfig, MoneyCents, NewFixedIncome, NewVariableIncome, UpdateFixedIncome,
    UpdateVariableIncome, User, VariableIncome,
};

use crate::{ServerError, server::ServerState};

fn config_view(config: IncomeConfig) -> IncomeConfigView {
    IncomeConfigView {
        id: config.id,
        fixed_amount_cents: config.fixed_amount.cents(),
        bonus_amount_cents: config.bonus_amount.cents(),
        created_at: config.created_at,
    }
}

fn variable_view(line: VariableIncome) -> VariableIncomeView {
    VariableIncomeView {
        id: line.id,
        description: line.description,
        amount_cents: line.amount.cents(),
        valid_until: line.valid_until,
        is_active: line.is_active,
        created_at: line.created_at,
    }
}

fn fixed_view(line: FixedIncome) -> FixedIncomeView {
    FixedIncomeView {
        id: line.id,
        description: line.description,
        amount_cents: line.amount.cents(),
        is_active: line.is_active,
        created_at: line.created_at,
    }
}

/// Returns the configuration row, creating it on first access.
pub async fn config(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<IncomeConfigView>, ServerError> {
    let config = state.ledger.income_config(user.id).await?;

    Ok(Json(config_view(config)))
}

pub async fn update_config(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<IncomeConfigUpdate>,
) -> Result<Json<IncomeConfigView>, ServerError> {
    let config = state
        .ledger
        .update_income_config(
            user.id,
            payload.fixed_amount_cents.map(MoneyCents::new),
            payload.bonus_amount_cents.map(MoneyCents::new),
        )
        .await?;

    Ok(Json(config_view(config)))
}

pub async fn list_variable(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<VariableIncomeView>>, ServerError> {
    let lines = state.ledger.list_variable_incomes(user.id).await?;

    Ok(Json(lines.into_iter().map(variable_view).collect()))
}

pub async fn create_variable(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<VariableIncomeNew>,
) -> Result<(StatusCode, Json<VariableIncomeView>), ServerError> {
    let line = state
        .ledger
        .create_variable_income(
            user.id,
            NewVariableIncome {
                description: payload.description,
                amount: MoneyCents::new(payload.amount_cents),
                valid_until: payload.valid_until,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(variable_view(line))))
}

pub async fn update_variable(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(line_id): Path<i32>,
    Json(payload): Json<VariableIncomeUpdate>,
) -> Result<Json<VariableIncomeView>, ServerError> {
    let line = state
        .ledger
        .update_variable_income(
            user.id,
            line_id,
            UpdateVariableIncome {
                description: payload.description,
                amount: payload.amount_cents.map(MoneyCents::new),
                valid_until: payload.valid_until,
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok(Json(variable_view(line)))
}

pub async fn remove_variable(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(line_id): Path<i32>,
) -> Result<Json<Message>, ServerError> {
    state.ledger.delete_variable_income(user.id, line_id).await?;

    Ok(Json(Message {
        message: "variable income deleted".to_string(),
    }))
}

pub async fn list_fixed(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<FixedIncomeView>>, ServerError> {
    let lines = state.ledger.list_fixed_incomes(user.id).await?;

    Ok(Json(lines.into_iter().map(fixed_view).collect()))
}

pub async fn create_fixed(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<FixedIncomeNew>,
) -> Result<(StatusCode, Json<FixedIncomeView>), ServerError> {
    let line = state
        .ledger
        .create_fixed_income(
            user.id,
            NewFixedIncome {
                description: payload.description,
                amount: MoneyCents::new(payload.amount_cents),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(fixed_view(line))))
}

pub async fn update_fixed(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(line_id): Path<i32>,
    Json(payload): Json<FixedIncomeUpdate>,
) -> Result<Json<FixedIncomeView>, ServerError> {
    let line = state
        .ledger
        .update_fixed_income(
            user.id,
            line_id,
            UpdateFixedIncome {
                description: payload.description,
                amount: payload.amount_cents.map(MoneyCents::new),
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok(Json(fixed_view(line)))
}

pub async fn remove_fixed(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(line_id): Path<i32>,
) -> Result<Json<Message>, ServerError> {
    state.ledger.delete_fixed_income(user.id, line_id).await?;

    Ok(Json(Message {
        message: "fixed income deleted".to_string(),
    }))
}
