//! Tienda Core - Shared domain types.
//!
//! This crate provides the common types used across the Tienda backend:
//! - `api` - The HTTP service (auth, catalog, cart, orders)
//! - `integration-tests` - Black-box test suite
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no async, no HTTP. This
//! keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, quantities,
//!   and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
