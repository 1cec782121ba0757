//! Admin account management route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header::LOCATION},
    response::IntoResponse,
};
use tracing::instrument;

use shoe_store_core::UserId;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::User;
use crate::services::users::{UserInput, UserService};
use crate::state::AppState;

/// List all accounts.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    Ok(Json(UserService::new(state.pool()).list().await?))
}

/// Get one account.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<User>> {
    Ok(Json(UserService::new(state.pool()).get(id).await?))
}

/// Create an account with any role.
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<UserInput>,
) -> Result<impl IntoResponse> {
    let user = UserService::new(state.pool()).create(&input).await?;

    let location = format!("/api/user/{}", user.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(user)))
}

/// Update an account.
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
    Json(input): Json<UserInput>,
) -> Result<Json<User>> {
    Ok(Json(UserService::new(state.pool()).update(id, &input).await?))
}

/// Delete an account and everything it owns.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<StatusCode> {
    UserService::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
