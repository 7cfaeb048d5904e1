//! Unified error handling with Sentry integration.
//!
//! Provides a unified `ApiError` type that captures server-side failures to
//! Sentry before responding. All route handlers return `Result<T, ApiError>`;
//! bodies are always `{"message": ...}` and never carry internal detail.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::services::auth::{AuthError, TokenError};
use crate::services::cart::CartError;
use crate::store::StoreError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Persistence operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Resource not found; payload is the resource noun ("order", "product").
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request gate rejection; payload is the internal reason, logged but
    /// never sent to the client.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Auth(err) => match err {
                // Issuing can only fail server-side; every other token error
                // is a rejected client credential
                AuthError::Token(TokenError::Creation(_)) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                AuthError::InvalidCredentials
                | AuthError::AccountDisabled
                | AuthError::Token(_) => StatusCode::UNAUTHORIZED,
                AuthError::EmailTaken => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::Store(err) => store_status(err),
            },
            Self::Cart(err) => match err {
                CartError::ProductNotFound | CartError::CartNotFound | CartError::ItemNotFound => {
                    StatusCode::NOT_FOUND
                }
                CartError::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
                CartError::Store(err) => store_status(err),
            },
            Self::Store(err) => store_status(err),
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Client-facing text; everything auth-shaped is deliberately uniform
    fn client_message(&self) -> String {
        match self {
            Self::Auth(err) => match err {
                AuthError::Token(TokenError::Creation(_)) | AuthError::PasswordHash => {
                    "internal server error".to_string()
                }
                AuthError::InvalidCredentials | AuthError::AccountDisabled => {
                    "invalid credentials".to_string()
                }
                AuthError::Token(_) => "authentication required".to_string(),
                AuthError::EmailTaken => "an account with this email already exists".to_string(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "invalid email address".to_string(),
                AuthError::Store(err) => store_message(err),
            },
            Self::Cart(err) => match err {
                CartError::ProductNotFound => "product not found".to_string(),
                CartError::CartNotFound => "cart not found".to_string(),
                CartError::ItemNotFound => "item not in cart".to_string(),
                CartError::InvalidQuantity(err) => err.to_string(),
                CartError::Store(err) => store_message(err),
            },
            Self::Store(err) => store_message(err),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Unauthorized(_) => "authentication required".to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Internal(_) => "internal server error".to_string(),
        }
    }
}

const fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        StoreError::Conflict(_) => StatusCode::CONFLICT,
    }
}

fn store_message(err: &StoreError) -> String {
    match err {
        StoreError::Timeout(_) => "service temporarily unavailable".to_string(),
        StoreError::Conflict(msg) => msg.clone(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server-side failures to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "message": self.client_message() }))).into_response()
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Set the Sentry user context from a subject id.
///
/// Call this once the request gate has resolved the subject so errors are
/// associated with the account that hit them.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
