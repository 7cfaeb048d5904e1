//! Persistence contract and backends.
//!
//! Collections:
//! - `users` - accounts (unique email)
//! - `roles` - role labels
//! - `products` - catalog products
//! - `categories` - catalog categories
//! - `carts` - cart documents, keyed by owner id (one per owner)
//! - `orders` - placed orders
//!
//! The traits are the collaborator surface the services consume;
//! [`MemoryStore`] is the in-process backend. Calls on the hot auth and
//! cart paths are wrapped in [`bounded`] so a stalled backend degrades
//! into a retryable failure instead of hanging the request.

mod memory;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tienda_core::{CategoryId, Email, OrderId, ProductId, RoleId, UserId};

use crate::models::{Cart, Category, Order, Product, Role, User};

pub use memory::MemoryStore;

/// Failures a store backend can report.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The call did not complete within its time budget.
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    /// A unique constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Run a store future under a time budget.
///
/// # Errors
///
/// Returns `StoreError::Timeout` if the future does not complete in time,
/// otherwise whatever the future itself returned.
pub async fn bounded<T, F>(limit: Duration, fut: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>> + Send,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}

/// User collection.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Upsert by id. Fails with `Conflict` if another user holds the email.
    async fn save(&self, user: User) -> StoreResult<User>;
    async fn find_by_id(&self, id: &UserId) -> StoreResult<Option<User>>;
    async fn find_by_email(&self, email: &Email) -> StoreResult<Option<User>>;
    async fn list(&self) -> StoreResult<Vec<User>>;
    /// Returns whether a record was removed.
    async fn delete_by_id(&self, id: &UserId) -> StoreResult<bool>;
}

/// Role collection.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn save(&self, role: Role) -> StoreResult<Role>;
    async fn find_by_id(&self, id: &RoleId) -> StoreResult<Option<Role>>;
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Role>>;
    async fn list(&self) -> StoreResult<Vec<Role>>;
    async fn delete_by_id(&self, id: &RoleId) -> StoreResult<bool>;
}

/// Product collection.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn save(&self, product: Product) -> StoreResult<Product>;
    async fn find_by_id(&self, id: &ProductId) -> StoreResult<Option<Product>>;
    async fn list(&self) -> StoreResult<Vec<Product>>;
    async fn delete_by_id(&self, id: &ProductId) -> StoreResult<bool>;
}

/// Category collection.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn save(&self, category: Category) -> StoreResult<Category>;
    async fn find_by_id(&self, id: &CategoryId) -> StoreResult<Option<Category>>;
    async fn list(&self) -> StoreResult<Vec<Category>>;
    async fn delete_by_id(&self, id: &CategoryId) -> StoreResult<bool>;
}

/// Cart collection, keyed by owner.
///
/// Keying by owner makes "at most one cart per owner" structural: a second
/// save for the same owner replaces the first document.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn save(&self, cart: Cart) -> StoreResult<Cart>;
    async fn find_by_owner(&self, owner: &UserId) -> StoreResult<Option<Cart>>;
    /// Returns whether a document was removed.
    async fn delete_by_owner(&self, owner: &UserId) -> StoreResult<bool>;
}

/// Order collection.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn save(&self, order: Order) -> StoreResult<Order>;
    async fn find_by_id(&self, id: &OrderId) -> StoreResult<Option<Order>>;
    /// All orders placed by one user, oldest first.
    async fn find_by_owner(&self, owner: &UserId) -> StoreResult<Vec<Order>>;
    async fn list(&self) -> StoreResult<Vec<Order>>;
    async fn delete_by_id(&self, id: &OrderId) -> StoreResult<bool>;
}

/// The full set of collections handed to services and handlers.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub roles: Arc<dyn RoleStore>,
    pub products: Arc<dyn ProductStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub carts: Arc<dyn CartStore>,
    pub orders: Arc<dyn OrderStore>,
}

impl Stores {
    /// Build all collections on one shared in-process backend.
    #[must_use]
    pub fn in_memory() -> Self {
        let backend = MemoryStore::default();
        Self {
            users: Arc::new(backend.clone()),
            roles: Arc::new(backend.clone()),
            products: Arc::new(backend.clone()),
            categories: Arc::new(backend.clone()),
            carts: Arc::new(backend.clone()),
            orders: Arc::new(backend),
        }
    }
}
