//! Application state shared across handlers.

use std::sync::Arc;

use chrono::Utc;
use secrecy::ExposeSecret;
use tienda_core::{RoleId, UserId};

use crate::config::ApiConfig;
use crate::error::Result;
use crate::models::{Role, User};
use crate::services::auth::{self, AuthService, TokenCodec};
use crate::services::cart::CartService;
use crate::store::{Stores, bounded};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the document store, the token codec, and the
/// domain services.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    stores: Stores,
    tokens: TokenCodec,
    auth: AuthService,
    carts: CartService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The token codec and services are built here, once, from the config;
    /// after this point the signing key is immutable.
    #[must_use]
    pub fn new(config: ApiConfig, stores: Stores) -> Self {
        let tokens = TokenCodec::new(&config.token_secret, config.token_ttl_hours);
        let auth = AuthService::new(stores.clone(), config.store_timeout);
        let carts = CartService::new(stores.clone(), config.store_timeout);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                stores,
                tokens,
                auth,
                carts,
            }),
        }
    }

    /// Seed the built-in roles and the optional bootstrap admin account.
    ///
    /// Idempotent: runs on every startup, writes only what is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if a store call fails or the bootstrap password
    /// cannot be hashed.
    pub async fn bootstrap(&self) -> Result<()> {
        let timeout = self.config().store_timeout;

        for name in [Role::ADMIN, Role::CUSTOMER] {
            let existing = bounded(timeout, self.stores().roles.find_by_name(name)).await?;
            if existing.is_none() {
                let role = Role {
                    id: RoleId::generate(),
                    name: name.to_string(),
                };
                bounded(timeout, self.stores().roles.save(role)).await?;
                tracing::info!(role = name, "Seeded built-in role");
            }
        }

        if let Some(admin) = &self.config().bootstrap_admin {
            let existing =
                bounded(timeout, self.stores().users.find_by_email(&admin.email)).await?;
            if existing.is_none() {
                let role = bounded(timeout, self.stores().roles.find_by_name(Role::ADMIN)).await?;
                let password_hash = auth::hash_password(admin.password.expose_secret())?;
                let now = Utc::now();
                let user = User {
                    id: UserId::generate(),
                    name: "Administrator".to_string(),
                    email: admin.email.clone(),
                    password_hash,
                    address: None,
                    enabled: true,
                    role,
                    created_at: now,
                    updated_at: now,
                };
                bounded(timeout, self.stores().users.save(user)).await?;
                tracing::info!("Created bootstrap admin account");
            }
        }

        Ok(())
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the store handles.
    #[must_use]
    pub fn stores(&self) -> &Stores {
        &self.inner.stores
    }

    /// Get a reference to the token codec.
    #[must_use]
    pub fn tokens(&self) -> &TokenCodec {
        &self.inner.tokens
    }

    /// Get a reference to the authentication service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Get a reference to the cart service.
    #[must_use]
    pub fn carts(&self) -> &CartService {
        &self.inner.carts
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    use secrecy::SecretString;
    use tienda_core::Email;

    use crate::config::BootstrapAdmin;

    use super::*;

    fn test_config(bootstrap_admin: Option<BootstrapAdmin>) -> ApiConfig {
        ApiConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            token_secret: SecretString::from("0123456789abcdef0123456789abcdef"),
            token_ttl_hours: 10,
            store_timeout: Duration::from_secs(2),
            allowed_origins: vec![],
            bootstrap_admin,
            sentry_dsn: None,
        }
    }

    #[tokio::test]
    async fn test_bootstrap_seeds_roles_once() {
        let state = AppState::new(test_config(None), Stores::in_memory());

        state.bootstrap().await.unwrap();
        state.bootstrap().await.unwrap();

        let roles = state.stores().roles.list().await.unwrap();
        assert_eq!(roles.len(), 2);
        let mut names: Vec<_> = roles.into_iter().map(|r| r.name).collect();
        names.sort();
        assert_eq!(names, vec!["admin", "customer"]);
    }

    #[tokio::test]
    async fn test_bootstrap_creates_admin_account() {
        let admin = BootstrapAdmin {
            email: Email::parse("root@tienda.test").unwrap(),
            password: SecretString::from("super-secret-password"),
        };
        let state = AppState::new(test_config(Some(admin)), Stores::in_memory());

        state.bootstrap().await.unwrap();
        state.bootstrap().await.unwrap();

        let users = state.stores().users.list().await.unwrap();
        assert_eq!(users.len(), 1);
        let user = users.first().unwrap();
        assert!(user.enabled);
        assert_eq!(user.role.as_ref().unwrap().name, Role::ADMIN);
        assert_ne!(user.password_hash, "super-secret-password");
    }
}
