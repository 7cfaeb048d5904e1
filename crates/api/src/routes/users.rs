//! User administration route handlers.
//!
//! All endpoints sit behind the request gate. Passwords arrive in plaintext
//! bodies, are validated and hashed here, and never leave again: the
//! `User` serializer skips the hash field.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use tienda_core::{Email, RoleId, UserId};

use crate::error::{ApiError, Result};
use crate::models::{Role, User};
use crate::services::auth::{self, AuthError};
use crate::state::AppState;
use crate::store::bounded;

/// Create request body for a user.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: Option<String>,
    /// Defaults to `true`.
    pub enabled: Option<bool>,
    /// Defaults to the built-in `customer` role.
    pub role_id: Option<RoleId>,
}

/// Update request body for a user.
///
/// Omitted `password`, `enabled`, and `role_id` keep their stored values;
/// `address` is replaced as given.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub address: Option<String>,
    pub enabled: Option<bool>,
    pub role_id: Option<RoleId>,
}

/// List all users.
///
/// GET /users
///
/// # Errors
///
/// Returns 503 if the store is unavailable.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let users = bounded(state.config().store_timeout, state.stores().users.list()).await?;
    Ok(Json(users))
}

/// Fetch one user.
///
/// GET /users/{id}
///
/// # Errors
///
/// Returns 404 when the user does not exist.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<UserId>) -> Result<Json<User>> {
    let user = bounded(
        state.config().store_timeout,
        state.stores().users.find_by_id(&id),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("user".to_string()))?;

    Ok(Json(user))
}

/// Create a user.
///
/// POST /users
///
/// # Errors
///
/// Returns 400 for an invalid email or weak password, 404 for an unknown
/// `role_id`, 409 when the email is taken.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let email = Email::parse(&body.email).map_err(AuthError::from)?;
    auth::validate_password(&body.password)?;
    let password_hash = auth::hash_password(&body.password)?;
    let role = resolve_role(&state, body.role_id.as_ref()).await?;

    let now = Utc::now();
    let user = User {
        id: UserId::generate(),
        name: body.name,
        email,
        password_hash,
        address: body.address,
        enabled: body.enabled.unwrap_or(true),
        role,
        created_at: now,
        updated_at: now,
    };

    let user = bounded(state.config().store_timeout, state.stores().users.save(user)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Replace a user's fields.
///
/// PUT /users/{id}
///
/// # Errors
///
/// Returns 404 when the user or a supplied `role_id` is missing, 400 for
/// an invalid email or weak replacement password, 409 when the new email
/// belongs to another account.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<User>> {
    let timeout = state.config().store_timeout;

    let existing = bounded(timeout, state.stores().users.find_by_id(&id))
        .await?
        .ok_or_else(|| ApiError::NotFound("user".to_string()))?;

    let email = Email::parse(&body.email).map_err(AuthError::from)?;

    // Only a supplied password changes the stored hash
    let password_hash = match body.password.as_deref() {
        Some(password) => {
            auth::validate_password(password)?;
            auth::hash_password(password)?
        }
        None => existing.password_hash,
    };

    let role = match body.role_id.as_ref() {
        Some(role_id) => Some(
            bounded(timeout, state.stores().roles.find_by_id(role_id))
                .await?
                .ok_or_else(|| ApiError::NotFound("role".to_string()))?,
        ),
        None => existing.role,
    };

    let user = User {
        id,
        name: body.name,
        email,
        password_hash,
        address: body.address,
        enabled: body.enabled.unwrap_or(existing.enabled),
        role,
        created_at: existing.created_at,
        updated_at: Utc::now(),
    };

    let user = bounded(timeout, state.stores().users.save(user)).await?;
    Ok(Json(user))
}

/// Delete a user.
///
/// DELETE /users/{id}
///
/// # Errors
///
/// Returns 404 when the user does not exist.
#[instrument(skip(state))]
pub async fn remove(State(state): State<AppState>, Path(id): Path<UserId>) -> Result<StatusCode> {
    let removed = bounded(
        state.config().store_timeout,
        state.stores().users.delete_by_id(&id),
    )
    .await?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("user".to_string()))
    }
}

/// Resolve an optional role reference, falling back to `customer`.
async fn resolve_role(state: &AppState, id: Option<&RoleId>) -> Result<Option<Role>> {
    let timeout = state.config().store_timeout;

    match id {
        Some(role_id) => {
            let role = bounded(timeout, state.stores().roles.find_by_id(role_id))
                .await?
                .ok_or_else(|| ApiError::NotFound("role".to_string()))?;
            Ok(Some(role))
        }
        None => Ok(bounded(timeout, state.stores().roles.find_by_name(Role::CUSTOMER)).await?),
    }
}
