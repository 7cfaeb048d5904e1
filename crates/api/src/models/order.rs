//! Order records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tienda_core::{OrderId, OrderStatus, ProductId, Quantity, UserId};

use super::product::Product;

/// One line of an order; same snapshot rules as a cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: Quantity,
    pub subtotal: Decimal,
}

impl OrderItem {
    /// Build a line from the current state of a product.
    #[must_use]
    pub fn snapshot(product: &Product, quantity: Quantity) -> Self {
        let unit_price = product.price;
        Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            unit_price,
            quantity,
            subtotal: unit_price * Decimal::from(quantity.get()),
        }
    }
}

/// An order document.
///
/// Holds the owner by id only; the owning user record is never embedded,
/// so order payloads cannot leak account fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub placed_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub status: OrderStatus,
}

impl Order {
    /// Sum of all line subtotals.
    #[must_use]
    pub fn compute_total(items: &[OrderItem]) -> Decimal {
        items.iter().map(|item| item.subtotal).sum()
    }
}
