//! Cart document and line item arithmetic.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tienda_core::{CartId, ProductId, Quantity, UserId};

use super::product::Product;

/// One line of a cart.
///
/// Name and unit price are snapshots taken when the product was added;
/// `subtotal` is always `unit_price * quantity` and is recomputed on every
/// quantity change, never accepted from outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: Quantity,
    pub subtotal: Decimal,
}

impl CartItem {
    /// Build a line from the current state of a product.
    #[must_use]
    pub fn snapshot(product: &Product, quantity: Quantity) -> Self {
        let mut item = Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            unit_price: product.price,
            quantity,
            subtotal: Decimal::ZERO,
        };
        item.recompute();
        item
    }

    /// Replace the quantity and recompute the subtotal.
    pub fn set_quantity(&mut self, quantity: Quantity) {
        self.quantity = quantity;
        self.recompute();
    }

    /// Increase the quantity and recompute the subtotal.
    pub fn add_quantity(&mut self, quantity: Quantity) {
        self.quantity = self.quantity.saturating_add(quantity);
        self.recompute();
    }

    fn recompute(&mut self) {
        self.subtotal = self.unit_price * Decimal::from(self.quantity.get());
    }
}

/// The cart document, keyed in the store by its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart for an owner.
    #[must_use]
    pub fn new(owner_id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            id: CartId::generate(),
            owner_id,
            created_at,
            items: Vec::new(),
        }
    }

    /// Sum of all line subtotals; zero when empty.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(|item| item.subtotal).sum()
    }

    /// Find the line for a product, if present.
    pub fn item_mut(&mut self, product_id: &ProductId) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|item| &item.product_id == product_id)
    }
}

/// The client-facing cart projection.
///
/// An owner without a cart document sees the empty view, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total: Decimal,
}

impl CartView {
    /// The view of a missing cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Decimal::ZERO,
        }
    }
}

impl From<Cart> for CartView {
    fn from(cart: Cart) -> Self {
        let total = cart.total();
        Self {
            items: cart.items,
            total,
        }
    }
}
