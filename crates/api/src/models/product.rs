//! Product and category records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tienda_core::{CategoryId, ProductId};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

/// A catalog product.
///
/// The category is embedded as a snapshot resolved at write time from its
/// id; cart and order lines snapshot `name` and `price` again at add time,
/// so later product edits never rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: u32,
    pub image_url: Option<String>,
    pub category: Option<Category>,
}
