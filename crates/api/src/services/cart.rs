//! Cart engine.
//!
//! Owns the "at most one cart per owner" invariant and the line item
//! arithmetic. Every read-modify-write runs under that owner's async lock,
//! so concurrent additions serialize and repeated adds of one product
//! always merge into a single line. The cart document itself is stored
//! keyed by owner, which closes the other half of the invariant.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tienda_core::{ProductId, Quantity, QuantityError, UserId};
use tokio::sync::Mutex;

use crate::models::{Cart, CartItem, CartView};
use crate::store::{StoreError, Stores, bounded};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product being added or referenced does not exist.
    #[error("product not found")]
    ProductNotFound,

    /// The owner has no cart document.
    #[error("cart not found")]
    CartNotFound,

    /// The cart exists but has no line for the product.
    #[error("item not in cart")]
    ItemNotFound,

    /// The requested quantity is out of range.
    #[error(transparent)]
    InvalidQuantity(#[from] QuantityError),

    /// The persistence layer failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Cart engine over the cart and product stores.
pub struct CartService {
    stores: Stores,
    store_timeout: Duration,
    /// One lock per owner that has ever touched a cart; entries live for
    /// the process.
    owner_locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl CartService {
    /// Create a new cart engine.
    #[must_use]
    pub fn new(stores: Stores, store_timeout: Duration) -> Self {
        Self {
            stores,
            store_timeout,
            owner_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The owner's cart, or the empty view if none exists.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the lookup failed.
    pub async fn get_cart(&self, owner: &UserId) -> Result<CartView, CartError> {
        let cart = bounded(self.store_timeout, self.stores.carts.find_by_owner(owner)).await?;
        Ok(cart.map_or_else(CartView::empty, CartView::from))
    }

    /// Add a product to the owner's cart, creating the cart on first use.
    ///
    /// A line for the same product is merged: its quantity grows by the
    /// requested amount and its subtotal is recomputed from the price
    /// snapshotted when the line was first added. Omitted quantity means 1.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` for a requested quantity below 1,
    /// `ProductNotFound` if the product does not exist, or `Store` on
    /// persistence failure. Nothing is persisted on any failed step.
    pub async fn add_item(
        &self,
        owner: &UserId,
        product_id: &ProductId,
        quantity: Option<i64>,
    ) -> Result<CartView, CartError> {
        let quantity = match quantity {
            Some(n) => Quantity::parse(n)?,
            None => Quantity::default(),
        };

        let lock = self.owner_lock(owner).await;
        let _guard = lock.lock().await;

        let mut cart = bounded(self.store_timeout, self.stores.carts.find_by_owner(owner))
            .await?
            .unwrap_or_else(|| Cart::new(owner.clone(), Utc::now()));

        let product = bounded(
            self.store_timeout,
            self.stores.products.find_by_id(product_id),
        )
        .await?
        .ok_or(CartError::ProductNotFound)?;

        match cart.item_mut(product_id) {
            Some(item) => item.add_quantity(quantity),
            None => cart.items.push(CartItem::snapshot(&product, quantity)),
        }

        let cart = bounded(self.store_timeout, self.stores.carts.save(cart)).await?;
        Ok(CartView::from(cart))
    }

    /// Replace the quantity of one line and recompute its subtotal.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` for a quantity below 1 before any store
    /// traffic, `CartNotFound` / `ItemNotFound` if the cart or line is
    /// missing, or `Store` on persistence failure.
    pub async fn update_quantity(
        &self,
        owner: &UserId,
        product_id: &ProductId,
        new_quantity: i64,
    ) -> Result<CartView, CartError> {
        // Reject before any store traffic; the cart must stay untouched
        let quantity = Quantity::parse(new_quantity)?;

        let lock = self.owner_lock(owner).await;
        let _guard = lock.lock().await;

        let mut cart = bounded(self.store_timeout, self.stores.carts.find_by_owner(owner))
            .await?
            .ok_or(CartError::CartNotFound)?;

        let item = cart.item_mut(product_id).ok_or(CartError::ItemNotFound)?;
        item.set_quantity(quantity);

        let cart = bounded(self.store_timeout, self.stores.carts.save(cart)).await?;
        Ok(CartView::from(cart))
    }

    /// Remove one line, leaving the cart document in place even when the
    /// last line goes.
    ///
    /// # Errors
    ///
    /// Returns `CartNotFound` / `ItemNotFound` if the cart or line is
    /// missing, or `Store` on persistence failure.
    pub async fn remove_item(
        &self,
        owner: &UserId,
        product_id: &ProductId,
    ) -> Result<CartView, CartError> {
        let lock = self.owner_lock(owner).await;
        let _guard = lock.lock().await;

        let mut cart = bounded(self.store_timeout, self.stores.carts.find_by_owner(owner))
            .await?
            .ok_or(CartError::CartNotFound)?;

        let before = cart.items.len();
        cart.items.retain(|item| item.product_id != *product_id);
        if cart.items.len() == before {
            return Err(CartError::ItemNotFound);
        }

        let cart = bounded(self.store_timeout, self.stores.carts.save(cart)).await?;
        Ok(CartView::from(cart))
    }

    /// Delete the owner's cart document entirely. A missing cart is a
    /// success, so the operation is idempotent.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the delete failed.
    pub async fn clear(&self, owner: &UserId) -> Result<CartView, CartError> {
        let lock = self.owner_lock(owner).await;
        let _guard = lock.lock().await;

        bounded(self.store_timeout, self.stores.carts.delete_by_owner(owner)).await?;
        Ok(CartView::empty())
    }

    async fn owner_lock(&self, owner: &UserId) -> Arc<Mutex<()>> {
        let mut locks = self.owner_locks.lock().await;
        locks.entry(owner.clone()).or_default().clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use tienda_core::CategoryId;

    use crate::models::{Category, Product};

    use super::*;

    async fn engine_with_product(price: &str) -> (CartService, Stores, ProductId) {
        let stores = Stores::in_memory();
        let product = Product {
            id: ProductId::generate(),
            name: "Ratón inalámbrico".to_string(),
            description: None,
            price: price.parse().unwrap(),
            stock: 50,
            image_url: None,
            category: Some(Category {
                id: CategoryId::generate(),
                name: "Periféricos".to_string(),
                description: None,
            }),
        };
        let id = product.id.clone();
        stores.products.save(product).await.unwrap();
        (
            CartService::new(stores.clone(), Duration::from_secs(2)),
            stores,
            id,
        )
    }

    #[tokio::test]
    async fn test_missing_cart_is_empty_view() {
        let (carts, _, _) = engine_with_product("5.00").await;
        let view = carts.get_cart(&UserId::generate()).await.unwrap();
        assert!(view.items.is_empty());
        assert_eq!(view.total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_add_creates_cart_with_snapshot() {
        let (carts, _, product_id) = engine_with_product("10.50").await;
        let owner = UserId::generate();

        let view = carts.add_item(&owner, &product_id, Some(2)).await.unwrap();
        assert_eq!(view.items.len(), 1);
        let item = view.items.first().unwrap();
        assert_eq!(item.product_name, "Ratón inalámbrico");
        assert_eq!(item.quantity.get(), 2);
        assert_eq!(view.total, "21.00".parse::<Decimal>().unwrap());
    }

    #[tokio::test]
    async fn test_add_defaults_to_one() {
        let (carts, _, product_id) = engine_with_product("3.00").await;
        let owner = UserId::generate();

        let view = carts.add_item(&owner, &product_id, None).await.unwrap();
        assert_eq!(view.items.first().unwrap().quantity.get(), 1);
    }

    #[tokio::test]
    async fn test_add_same_product_consolidates() {
        let (carts, _, product_id) = engine_with_product("2.00").await;
        let owner = UserId::generate();

        carts.add_item(&owner, &product_id, Some(2)).await.unwrap();
        let view = carts.add_item(&owner, &product_id, Some(3)).await.unwrap();

        // One line, never two
        assert_eq!(view.items.len(), 1);
        let item = view.items.first().unwrap();
        assert_eq!(item.quantity.get(), 5);
        assert_eq!(item.subtotal, "10.00".parse::<Decimal>().unwrap());
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let (carts, _, _) = engine_with_product("1.00").await;
        let result = carts
            .add_item(&UserId::generate(), &ProductId::generate(), Some(1))
            .await;
        assert!(matches!(result, Err(CartError::ProductNotFound)));
    }

    #[tokio::test]
    async fn test_add_zero_quantity_rejected() {
        let (carts, stores, product_id) = engine_with_product("1.00").await;
        let owner = UserId::generate();

        let result = carts.add_item(&owner, &product_id, Some(0)).await;
        assert!(matches!(result, Err(CartError::InvalidQuantity(_))));

        // Nothing was created
        assert!(stores.carts.find_by_owner(&owner).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_price_snapshot_survives_product_edits() {
        let (carts, stores, product_id) = engine_with_product("10.00").await;
        let owner = UserId::generate();
        carts.add_item(&owner, &product_id, Some(1)).await.unwrap();

        let mut product = stores.products.find_by_id(&product_id).await.unwrap().unwrap();
        product.price = "99.99".parse().unwrap();
        stores.products.save(product).await.unwrap();

        // Consolidation keeps the add-time price
        let view = carts.add_item(&owner, &product_id, Some(1)).await.unwrap();
        let item = view.items.first().unwrap();
        assert_eq!(item.unit_price, "10.00".parse::<Decimal>().unwrap());
        assert_eq!(item.subtotal, "20.00".parse::<Decimal>().unwrap());
    }

    #[tokio::test]
    async fn test_update_quantity_recomputes_one_line() {
        let (carts, stores, first) = engine_with_product("4.00").await;
        let owner = UserId::generate();

        let second = Product {
            id: ProductId::generate(),
            name: "Alfombrilla".to_string(),
            description: None,
            price: "7.50".parse().unwrap(),
            stock: 10,
            image_url: None,
            category: None,
        };
        let second_id = second.id.clone();
        stores.products.save(second).await.unwrap();

        carts.add_item(&owner, &first, Some(1)).await.unwrap();
        carts.add_item(&owner, &second_id, Some(1)).await.unwrap();

        let view = carts.update_quantity(&owner, &first, 3).await.unwrap();
        let updated = view
            .items
            .iter()
            .find(|item| item.product_id == first)
            .unwrap();
        let untouched = view
            .items
            .iter()
            .find(|item| item.product_id == second_id)
            .unwrap();

        assert_eq!(updated.subtotal, "12.00".parse::<Decimal>().unwrap());
        assert_eq!(untouched.subtotal, "7.50".parse::<Decimal>().unwrap());
    }

    #[tokio::test]
    async fn test_update_quantity_zero_leaves_cart_unchanged() {
        let (carts, stores, product_id) = engine_with_product("4.00").await;
        let owner = UserId::generate();
        carts.add_item(&owner, &product_id, Some(2)).await.unwrap();

        let result = carts.update_quantity(&owner, &product_id, 0).await;
        assert!(matches!(result, Err(CartError::InvalidQuantity(_))));

        let cart = stores.carts.find_by_owner(&owner).await.unwrap().unwrap();
        assert_eq!(cart.items.first().unwrap().quantity.get(), 2);
    }

    #[tokio::test]
    async fn test_update_quantity_missing_cart() {
        let (carts, _, product_id) = engine_with_product("4.00").await;
        let result = carts
            .update_quantity(&UserId::generate(), &product_id, 2)
            .await;
        assert!(matches!(result, Err(CartError::CartNotFound)));
    }

    #[tokio::test]
    async fn test_update_quantity_missing_item() {
        let (carts, _, product_id) = engine_with_product("4.00").await;
        let owner = UserId::generate();
        carts.add_item(&owner, &product_id, Some(1)).await.unwrap();

        let result = carts
            .update_quantity(&owner, &ProductId::generate(), 2)
            .await;
        assert!(matches!(result, Err(CartError::ItemNotFound)));
    }

    #[tokio::test]
    async fn test_remove_leaves_empty_cart_document() {
        let (carts, stores, product_id) = engine_with_product("4.00").await;
        let owner = UserId::generate();
        carts.add_item(&owner, &product_id, Some(1)).await.unwrap();

        let view = carts.remove_item(&owner, &product_id).await.unwrap();
        assert!(view.items.is_empty());

        // The document survives with zero lines
        let cart = stores.carts.find_by_owner(&owner).await.unwrap().unwrap();
        assert!(cart.items.is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_cart() {
        let (carts, _, product_id) = engine_with_product("4.00").await;
        let result = carts.remove_item(&UserId::generate(), &product_id).await;
        assert!(matches!(result, Err(CartError::CartNotFound)));
    }

    #[tokio::test]
    async fn test_remove_missing_item() {
        let (carts, _, product_id) = engine_with_product("4.00").await;
        let owner = UserId::generate();
        carts.add_item(&owner, &product_id, Some(1)).await.unwrap();

        let result = carts.remove_item(&owner, &ProductId::generate()).await;
        assert!(matches!(result, Err(CartError::ItemNotFound)));
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let (carts, stores, product_id) = engine_with_product("4.00").await;
        let owner = UserId::generate();
        carts.add_item(&owner, &product_id, Some(1)).await.unwrap();

        carts.clear(&owner).await.unwrap();
        assert!(stores.carts.find_by_owner(&owner).await.unwrap().is_none());

        // Second clear still succeeds
        let view = carts.clear(&owner).await.unwrap();
        assert!(view.items.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_consolidate() {
        let (carts, stores, product_id) = engine_with_product("1.00").await;
        let carts = Arc::new(carts);
        let owner = UserId::generate();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let carts = Arc::clone(&carts);
            let owner = owner.clone();
            let product_id = product_id.clone();
            handles.push(tokio::spawn(async move {
                carts.add_item(&owner, &product_id, Some(1)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let cart = stores.carts.find_by_owner(&owner).await.unwrap().unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items.first().unwrap().quantity.get(), 10);
        assert_eq!(cart.total(), "10.00".parse::<Decimal>().unwrap());
    }
}
