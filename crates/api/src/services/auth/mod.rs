//! Authentication service.
//!
//! Provides password registration and login. The request gate leans on the
//! same stores for its per-request subject lookup; issuing and parsing the
//! bearer tokens themselves is the [`token`] module's job.

mod error;
mod token;

pub use error::AuthError;
pub use token::{Claims, TokenCodec, TokenError};

use std::time::Duration;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;

use tienda_core::{Email, UserId};

use crate::models::{Role, User};
use crate::store::{StoreError, Stores, bounded};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
///
/// Handles account registration and credential verification. Reads and
/// writes go through [`bounded`] so a stalled store fails the request
/// instead of hanging it.
pub struct AuthService {
    stores: Stores,
    store_timeout: Duration,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(stores: Stores, store_timeout: Duration) -> Self {
        Self {
            stores,
            store_timeout,
        }
    }

    /// Register a new account with email and password.
    ///
    /// New accounts are enabled, carry the built-in customer role, and
    /// store the password only as an argon2id hash.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        address: Option<String>,
    ) -> Result<User, AuthError> {
        // Validate email
        let email = Email::parse(email)?;

        // Validate password
        validate_password(password)?;

        // Hash password
        let password_hash = hash_password(password)?;

        // New accounts always get the default role, never a client-chosen one
        let role = bounded(
            self.store_timeout,
            self.stores.roles.find_by_name(Role::CUSTOMER),
        )
        .await?;

        let now = Utc::now();
        let user = User {
            id: UserId::generate(),
            name: name.to_owned(),
            email,
            password_hash,
            address,
            enabled: true,
            role,
            created_at: now,
            updated_at: now,
        };

        let user = bounded(self.store_timeout, self.stores.users.save(user))
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Store(other),
            })?;

        Ok(user)
    }

    /// Verify a login and return the account it belongs to.
    ///
    /// Missing account, wrong password, and unparseable identifier all
    /// collapse into `InvalidCredentials`; a disabled account is reported
    /// as `AccountDisabled`, which clients see as the same rejection.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` or `AuthError::AccountDisabled`
    /// as above, or `AuthError::Store` if the lookup failed.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        // An unparseable identifier can never match a stored credential
        let Ok(email) = Email::parse(email) else {
            return Err(AuthError::InvalidCredentials);
        };

        let user = bounded(self.store_timeout, self.stores.users.find_by_email(&email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // Verify password
        verify_password(password, &user.password_hash)?;

        if !user.enabled {
            return Err(AuthError::AccountDisabled);
        }

        Ok(user)
    }
}

/// Validate password meets requirements.
pub(crate) fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
pub(crate) fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
