//! Authentication route handlers.
//!
//! Login and registration are the only credential-bearing endpoints; both
//! are public. `/auth/me` sits behind the request gate and echoes the
//! record the gate resolved.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{ApiError, Result, add_breadcrumb};
use crate::middleware::CurrentUser;
use crate::models::User;
use crate::services::auth::AuthError;
use crate::state::AppState;
use crate::store::bounded;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token to present on protected routes.
    pub token: String,
    /// Name to greet the account with.
    pub display_name: String,
}

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: Option<String>,
}

/// Verify credentials and issue a bearer token.
///
/// POST /auth/login
///
/// # Errors
///
/// Returns 401 for any credential failure. Wrong password, unknown email,
/// and disabled account are indistinguishable in the response.
#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let user = state.auth().login(&body.email, &body.password).await?;
    let token = state.tokens().issue(&user.id).map_err(AuthError::from)?;

    add_breadcrumb("auth", "login", Some(&[("user_id", user.id.as_str())]));

    Ok(Json(LoginResponse {
        token,
        display_name: user.name,
    }))
}

/// Create a new customer account.
///
/// POST /auth/register
///
/// # Errors
///
/// Returns 400 for an invalid email or weak password, 409 when the email
/// is already registered.
#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state
        .auth()
        .register(&body.name, &body.email, &body.password, body.address)
        .await?;

    add_breadcrumb("auth", "account registered", Some(&[("user_id", user.id.as_str())]));

    Ok((StatusCode::CREATED, Json(user)))
}

/// The caller's own account.
///
/// GET /auth/me
///
/// # Errors
///
/// Returns 404 if the account vanished between the gate pass and this
/// lookup.
#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> Result<Json<User>> {
    let user = bounded(
        state.config().store_timeout,
        state.stores().users.find_by_id(&ctx.subject_id),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("user".to_string()))?;

    Ok(Json(user))
}
