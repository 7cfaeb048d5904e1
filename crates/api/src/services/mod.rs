//! Business logic services.
//!
//! - [`auth`] - registration, login, and bearer token codec
//! - [`cart`] - the cart engine and its per-owner serialization
//! - [`stats`] - pure order statistics aggregation

pub mod auth;
pub mod cart;
pub mod stats;
