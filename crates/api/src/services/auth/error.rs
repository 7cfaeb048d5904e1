//! Authentication error types.

use thiserror::Error;
use tienda_core::EmailError;

use crate::store::StoreError;

use super::token::TokenError;

/// Errors from registration, login, and subject resolution.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Identifier or secret did not match a stored credential. Covers both
    /// "no such account" and "wrong password" so callers cannot tell which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but is disabled. Clients see the same response as
    /// [`AuthError::InvalidCredentials`]; the distinction exists for logs.
    #[error("account is disabled")]
    AccountDisabled,

    /// The email failed validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The password failed the strength policy.
    #[error("{0}")]
    WeakPassword(String),

    /// Another account already uses this email.
    #[error("email already registered")]
    EmailTaken,

    /// Hashing a password failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Token issue or parse failed.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The persistence layer failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
