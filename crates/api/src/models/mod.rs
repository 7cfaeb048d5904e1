//! Persisted domain records and their serializable projections.
//!
//! These are the documents the stores hold. Request/response DTOs that
//! exist only at the HTTP boundary live next to their handlers instead.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartItem, CartView};
pub use order::{Order, OrderItem};
pub use product::{Category, Product};
pub use user::{Role, User};
