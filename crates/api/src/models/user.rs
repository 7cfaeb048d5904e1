//! User and role records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tienda_core::{Email, RoleId, UserId};

/// A named role attached to users.
///
/// Roles are plain labels; the built-in ones (`admin`, `customer`) are
/// seeded at startup and new accounts default to `customer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

impl Role {
    /// Name of the built-in administrator role.
    pub const ADMIN: &'static str = "admin";
    /// Name of the built-in default role for new accounts.
    pub const CUSTOMER: &'static str = "customer";
}

/// A user account.
///
/// The password hash never leaves the process: it is skipped during
/// serialization, so every response built from a `User` is already the
/// safe projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub address: Option<String>,
    pub enabled: bool,
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
