//! Category catalog route handlers.
//!
//! Same shape as the product CRUD: public reads, gated writes. Deleting a
//! category does not touch the products that embed it; their snapshot of
//! the category stays as written.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use tienda_core::CategoryId;

use crate::error::{ApiError, Result};
use crate::models::Category;
use crate::state::AppState;
use crate::store::bounded;

/// Create/update request body for a category.
#[derive(Debug, Deserialize)]
pub struct CategoryPayload {
    pub name: String,
    pub description: Option<String>,
}

/// List all categories.
///
/// GET /categories
///
/// # Errors
///
/// Returns 503 if the store is unavailable.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = bounded(
        state.config().store_timeout,
        state.stores().categories.list(),
    )
    .await?;
    Ok(Json(categories))
}

/// Fetch one category.
///
/// GET /categories/{id}
///
/// # Errors
///
/// Returns 404 when the category does not exist.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>> {
    let category = bounded(
        state.config().store_timeout,
        state.stores().categories.find_by_id(&id),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("category".to_string()))?;

    Ok(Json(category))
}

/// Create a category.
///
/// POST /categories
///
/// # Errors
///
/// Returns 503 if the store is unavailable.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CategoryPayload>,
) -> Result<(StatusCode, Json<Category>)> {
    let category = Category {
        id: CategoryId::generate(),
        name: body.name,
        description: body.description,
    };

    let category = bounded(
        state.config().store_timeout,
        state.stores().categories.save(category),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// Replace a category's fields.
///
/// PUT /categories/{id}
///
/// # Errors
///
/// Returns 404 when the category does not exist.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(body): Json<CategoryPayload>,
) -> Result<Json<Category>> {
    let timeout = state.config().store_timeout;

    bounded(timeout, state.stores().categories.find_by_id(&id))
        .await?
        .ok_or_else(|| ApiError::NotFound("category".to_string()))?;

    let category = Category {
        id,
        name: body.name,
        description: body.description,
    };

    let category = bounded(timeout, state.stores().categories.save(category)).await?;
    Ok(Json(category))
}

/// Delete a category.
///
/// DELETE /categories/{id}
///
/// # Errors
///
/// Returns 404 when the category does not exist.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    let removed = bounded(
        state.config().store_timeout,
        state.stores().categories.delete_by_id(&id),
    )
    .await?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("category".to_string()))
    }
}
