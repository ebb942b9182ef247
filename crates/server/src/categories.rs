//! Categories API endpoints.

use api_types::{
    Message,
    category::{CategoryNew, CategoryUpdate, CategoryView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use ledger::{Category, NewCategory, UpdateCategory, User};

use crate::{ServerError, expenses, server::ServerState};

fn view(category: Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        kind: expenses::api_kind(category.kind),
        created_at: category.created_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state.ledger.list_categories(user.id).await?;

    Ok(Json(categories.into_iter().map(view).collect()))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .ledger
        .create_category(
            user.id,
            NewCategory {
                name: payload.name,
                kind: expenses::domain_kind(payload.kind),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(view(category))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(category_id): Path<i32>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state
        .ledger
        .update_category(
            user.id,
            category_id,
            UpdateCategory {
                name: payload.name,
                kind: payload.kind.map(expenses::domain_kind),
            },
        )
        .await?;

    Ok(Json(view(category)))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(category_id): Path<i32>,
) -> Result<Json<Message>, ServerError> {
    state.ledger.delete_category(user.id, category_id).await?;

    Ok(Json(Message {
        message: "category deleted".to_string(),
    }))
}
