//! In-process document store.
//!
//! One `BTreeMap` per collection behind an async `RwLock`, so reads run
//! concurrently and iteration order is deterministic. Carts are keyed by
//! the owner's id rather than their own.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tienda_core::{CategoryId, Email, OrderId, ProductId, RoleId, UserId};
use tokio::sync::RwLock;

use crate::models::{Cart, Category, Order, Product, Role, User};

use super::{
    CartStore, CategoryStore, OrderStore, ProductStore, RoleStore, StoreError, StoreResult,
    UserStore,
};

/// Shared in-memory backend for all collections.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Collections>,
}

#[derive(Default)]
struct Collections {
    users: RwLock<BTreeMap<String, User>>,
    roles: RwLock<BTreeMap<String, Role>>,
    products: RwLock<BTreeMap<String, Product>>,
    categories: RwLock<BTreeMap<String, Category>>,
    carts: RwLock<BTreeMap<String, Cart>>,
    orders: RwLock<BTreeMap<String, Order>>,
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn save(&self, user: User) -> StoreResult<User> {
        let mut users = self.inner.users.write().await;
        let email_taken = users
            .values()
            .any(|existing| existing.email == user.email && existing.id != user.id);
        if email_taken {
            return Err(StoreError::Conflict(format!(
                "email {} already registered",
                user.email
            )));
        }
        users.insert(user.id.as_str().to_owned(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> StoreResult<Option<User>> {
        Ok(self.inner.users.read().await.get(id.as_str()).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> StoreResult<Option<User>> {
        Ok(self
            .inner
            .users
            .read()
            .await
            .values()
            .find(|user| user.email == *email)
            .cloned())
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        Ok(self.inner.users.read().await.values().cloned().collect())
    }

    async fn delete_by_id(&self, id: &UserId) -> StoreResult<bool> {
        Ok(self.inner.users.write().await.remove(id.as_str()).is_some())
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn save(&self, role: Role) -> StoreResult<Role> {
        self.inner
            .roles
            .write()
            .await
            .insert(role.id.as_str().to_owned(), role.clone());
        Ok(role)
    }

    async fn find_by_id(&self, id: &RoleId) -> StoreResult<Option<Role>> {
        Ok(self.inner.roles.read().await.get(id.as_str()).cloned())
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        Ok(self
            .inner
            .roles
            .read()
            .await
            .values()
            .find(|role| role.name == name)
            .cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Role>> {
        Ok(self.inner.roles.read().await.values().cloned().collect())
    }

    async fn delete_by_id(&self, id: &RoleId) -> StoreResult<bool> {
        Ok(self.inner.roles.write().await.remove(id.as_str()).is_some())
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn save(&self, product: Product) -> StoreResult<Product> {
        self.inner
            .products
            .write()
            .await
            .insert(product.id.as_str().to_owned(), product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, id: &ProductId) -> StoreResult<Option<Product>> {
        Ok(self.inner.products.read().await.get(id.as_str()).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Product>> {
        Ok(self.inner.products.read().await.values().cloned().collect())
    }

    async fn delete_by_id(&self, id: &ProductId) -> StoreResult<bool> {
        Ok(self
            .inner
            .products
            .write()
            .await
            .remove(id.as_str())
            .is_some())
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn save(&self, category: Category) -> StoreResult<Category> {
        self.inner
            .categories
            .write()
            .await
            .insert(category.id.as_str().to_owned(), category.clone());
        Ok(category)
    }

    async fn find_by_id(&self, id: &CategoryId) -> StoreResult<Option<Category>> {
        Ok(self.inner.categories.read().await.get(id.as_str()).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Category>> {
        Ok(self
            .inner
            .categories
            .read()
            .await
            .values()
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, id: &CategoryId) -> StoreResult<bool> {
        Ok(self
            .inner
            .categories
            .write()
            .await
            .remove(id.as_str())
            .is_some())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn save(&self, cart: Cart) -> StoreResult<Cart> {
        self.inner
            .carts
            .write()
            .await
            .insert(cart.owner_id.as_str().to_owned(), cart.clone());
        Ok(cart)
    }

    async fn find_by_owner(&self, owner: &UserId) -> StoreResult<Option<Cart>> {
        Ok(self.inner.carts.read().await.get(owner.as_str()).cloned())
    }

    async fn delete_by_owner(&self, owner: &UserId) -> StoreResult<bool> {
        Ok(self
            .inner
            .carts
            .write()
            .await
            .remove(owner.as_str())
            .is_some())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn save(&self, order: Order) -> StoreResult<Order> {
        self.inner
            .orders
            .write()
            .await
            .insert(order.id.as_str().to_owned(), order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: &OrderId) -> StoreResult<Option<Order>> {
        Ok(self.inner.orders.read().await.get(id.as_str()).cloned())
    }

    async fn find_by_owner(&self, owner: &UserId) -> StoreResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .inner
            .orders
            .read()
            .await
            .values()
            .filter(|order| order.user_id == *owner)
            .cloned()
            .collect();
        orders.sort_by_key(|order| order.placed_at);
        Ok(orders)
    }

    async fn list(&self) -> StoreResult<Vec<Order>> {
        Ok(self.inner.orders.read().await.values().cloned().collect())
    }

    async fn delete_by_id(&self, id: &OrderId) -> StoreResult<bool> {
        Ok(self.inner.orders.write().await.remove(id.as_str()).is_some())
    }
}
