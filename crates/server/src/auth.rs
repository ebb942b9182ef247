//! Authentication and profile API endpoints.

use api_types::{
    Message,
    auth::{LoginRequest, LoginResponse, ProfileUpdate, RegisterRequest, UserView},
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use ledger::{RegisterUser, UpdateProfile, User};

use crate::{ServerError, server::ServerState};

pub(crate) fn view(user: User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
        created_at: user.created_at,
    }
}

pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .ledger
        .register(RegisterUser {
            name: payload.name,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(view(user))))
}

pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServerError> {
    let session = state.ledger.login(&payload.email, &payload.password).await?;

    Ok(Json(LoginResponse {
        access_token: session.token,
        token_type: "bearer".to_string(),
    }))
}

/// Revokes the session named by the bearer header itself.
pub async fn logout(
    auth_header: TypedHeader<Authorization<Bearer>>,
    State(state): State<ServerState>,
) -> Result<Json<Message>, ServerError> {
    state.ledger.logout(auth_header.token()).await?;

    Ok(Json(Message {
        message: "successfully logged out".to_string(),
    }))
}

pub async fn profile(Extension(user): Extension<User>) -> Json<UserView> {
    Json(view(user))
}

pub async fn update_profile(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let updated = state
        .ledger
        .update_profile(
            user.id,
            UpdateProfile {
                name: payload.name,
                email: payload.email,
                password: payload.password,
            },
        )
        .await?;

    Ok(Json(view(updated)))
}

pub async fn delete_account(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Message>, ServerError> {
    state.ledger.delete_account(user.id).await?;

    Ok(Json(Message {
        message: "account deleted".to_string(),
    }))
}
