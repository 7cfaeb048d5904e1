//! Role administration route handlers.
//!
//! Roles are plain labels. Deleting one does not cascade: users that embed
//! the deleted role keep their copy of it.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use tienda_core::RoleId;

use crate::error::{ApiError, Result};
use crate::models::Role;
use crate::state::AppState;
use crate::store::bounded;

/// Create/update request body for a role.
#[derive(Debug, Deserialize)]
pub struct RolePayload {
    pub name: String,
}

/// List all roles.
///
/// GET /roles
///
/// # Errors
///
/// Returns 503 if the store is unavailable.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Role>>> {
    let roles = bounded(state.config().store_timeout, state.stores().roles.list()).await?;
    Ok(Json(roles))
}

/// Fetch one role.
///
/// GET /roles/{id}
///
/// # Errors
///
/// Returns 404 when the role does not exist.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<RoleId>) -> Result<Json<Role>> {
    let role = bounded(
        state.config().store_timeout,
        state.stores().roles.find_by_id(&id),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("role".to_string()))?;

    Ok(Json(role))
}

/// Create a role.
///
/// POST /roles
///
/// # Errors
///
/// Returns 503 if the store is unavailable.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<RolePayload>,
) -> Result<(StatusCode, Json<Role>)> {
    let role = Role {
        id: RoleId::generate(),
        name: body.name,
    };

    let role = bounded(state.config().store_timeout, state.stores().roles.save(role)).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

/// Rename a role.
///
/// PUT /roles/{id}
///
/// # Errors
///
/// Returns 404 when the role does not exist.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<RoleId>,
    Json(body): Json<RolePayload>,
) -> Result<Json<Role>> {
    let timeout = state.config().store_timeout;

    bounded(timeout, state.stores().roles.find_by_id(&id))
        .await?
        .ok_or_else(|| ApiError::NotFound("role".to_string()))?;

    let role = Role {
        id,
        name: body.name,
    };

    let role = bounded(timeout, state.stores().roles.save(role)).await?;
    Ok(Json(role))
}

/// Delete a role.
///
/// DELETE /roles/{id}
///
/// # Errors
///
/// Returns 404 when the role does not exist.
#[instrument(skip(state))]
pub async fn remove(State(state): State<AppState>, Path(id): Path<RoleId>) -> Result<StatusCode> {
    let removed = bounded(
        state.config().store_timeout,
        state.stores().roles.delete_by_id(&id),
    )
    .await?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("role".to_string()))
    }
}
