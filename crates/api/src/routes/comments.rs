//! Product comment route handlers.
//!
//! Anyone can read comments. Writing needs a token, and only the author may
//! edit or delete their comment.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header::LOCATION},
    response::IntoResponse,
};
use tracing::instrument;

use shoe_store_core::{CommentId, ProductId};

use crate::db::{CommentRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::{AuthUser, RequireAuth};
use crate::models::Comment;
use crate::models::comment::CommentInput;
use crate::state::AppState;

fn not_found(id: CommentId) -> AppError {
    AppError::NotFound(format!("Comment {id} not found"))
}

/// Fail unless `user` wrote comment `id`.
async fn ensure_author(comments: &CommentRepository<'_>, id: CommentId, user: &AuthUser) -> Result<()> {
    let author = comments.author(id).await?.ok_or_else(|| not_found(id))?;
    if author != user.id {
        return Err(AppError::Forbidden(
            "Only the author can change this comment".to_owned(),
        ));
    }
    Ok(())
}

/// Comment on a product.
#[instrument(skip(state, user, input), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
    Json(input): Json<CommentInput>,
) -> Result<impl IntoResponse> {
    let content = input
        .content()
        .map_err(|msg| AppError::BadRequest(msg.to_owned()))?;

    let comment = CommentRepository::new(state.pool())
        .create(user.id, product_id, content)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound(format!("Product {product_id} not found"))
            }
            other => other.into(),
        })?;

    let location = format!("/api/comments/{}", comment.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(comment)))
}

/// Get one comment.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CommentId>,
) -> Result<Json<Comment>> {
    let comment = CommentRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(comment))
}

/// Comments on a product, oldest first.
#[instrument(skip(state))]
pub async fn for_product(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<Comment>>> {
    let comments = CommentRepository::new(state.pool())
        .list_for_product(product_id)
        .await?;
    Ok(Json(comments))
}

/// Edit the caller's own comment.
#[instrument(skip(state, user, input), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CommentId>,
    Json(input): Json<CommentInput>,
) -> Result<Json<Comment>> {
    let content = input
        .content()
        .map_err(|msg| AppError::BadRequest(msg.to_owned()))?;

    let comments = CommentRepository::new(state.pool());
    ensure_author(&comments, id, &user).await?;

    let comment = comments
        .update(id, content)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(comment))
}

/// Delete the caller's own comment.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CommentId>,
) -> Result<StatusCode> {
    let comments = CommentRepository::new(state.pool());
    ensure_author(&comments, id, &user).await?;

    if !comments.delete(id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
