//! Tienda API library.
//!
//! This crate provides the API as a library so the black-box suite in
//! `integration-tests` can build the real router in-process.
//!
//! # Layout
//!
//! - `config` - environment configuration and secret validation
//! - `error` - request-boundary error type and Sentry capture
//! - `middleware` - request gate and request-id middleware
//! - `models` - persisted records and response views
//! - `routes` - HTTP handlers and router assembly
//! - `services` - authentication, cart engine, order statistics
//! - `state` - shared application state
//! - `store` - persistence contract and the in-memory backend

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
