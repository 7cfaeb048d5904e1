//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! # Public
//! POST /auth/login             - Verify credentials, issue bearer token
//! POST /auth/register          - Create a customer account
//! GET  /products               - Product listing
//! GET  /products/{id}          - Product detail
//! GET  /categories             - Category listing
//! GET  /categories/{id}        - Category detail
//! GET  /health                 - Liveness probe
//! GET  /health/ready           - Readiness probe (store round-trip)
//!
//! # Protected (bearer token)
//! GET    /auth/me              - Caller's account
//! POST   /products             - Create product
//! PUT    /products/{id}        - Update product
//! DELETE /products/{id}        - Delete product
//! POST   /categories           - Create category
//! PUT    /categories/{id}      - Update category
//! DELETE /categories/{id}      - Delete category
//! GET    /users                - User listing       (plus CRUD at /users/{id})
//! GET    /roles                - Role listing       (plus CRUD at /roles/{id})
//! GET    /orders               - All orders         (plus CRUD at /orders/{id})
//! GET    /orders/mine          - Caller's orders
//! GET    /orders/stats         - Aggregates (?period=week|month|year)
//! GET    /cart                 - Caller's cart view
//! POST   /cart/add             - Add product (merges repeated adds)
//! PUT    /cart/update/{product_id}   - Replace line quantity
//! DELETE /cart/remove/{product_id}   - Drop one line
//! DELETE /cart/clear           - Delete the cart document
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod roles;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::store::bounded;

/// Create the router for routes reachable without a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/categories", get(categories::index))
        .route("/categories/{id}", get(categories::show))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
}

/// Create the router for routes that require an authenticated subject.
///
/// The request gate itself is layered on in [`router`]; keeping it out of
/// this function lets tests exercise handlers without minting tokens.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(auth::me))
        // Catalog writes
        .route("/products", post(products::create))
        .route(
            "/products/{id}",
            put(products::update).delete(products::remove),
        )
        .route("/categories", post(categories::create))
        .route(
            "/categories/{id}",
            put(categories::update).delete(categories::remove),
        )
        // Accounts
        .route("/users", get(users::index).post(users::create))
        .route(
            "/users/{id}",
            get(users::show).put(users::update).delete(users::remove),
        )
        .route("/roles", get(roles::index).post(roles::create))
        .route(
            "/roles/{id}",
            get(roles::show).put(roles::update).delete(roles::remove),
        )
        // Orders; static segments win over {id}
        .route("/orders", get(orders::index).post(orders::create))
        .route("/orders/mine", get(orders::mine))
        .route("/orders/stats", get(orders::stats))
        .route(
            "/orders/{id}",
            get(orders::show).put(orders::update).delete(orders::remove),
        )
        // Cart
        .route("/cart", get(cart::show))
        .route("/cart/add", post(cart::add))
        .route("/cart/update/{product_id}", put(cart::update))
        .route("/cart/remove/{product_id}", delete(cart::remove))
        .route("/cart/clear", delete(cart::clear))
}

/// Create the complete application router with the request gate applied.
pub fn router(state: AppState) -> Router {
    let protected = protected_routes().route_layer(axum::middleware::from_fn_with_state(
        state.clone(),
        require_auth,
    ));

    Router::new()
        .merge(public_routes())
        .merge(protected)
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the document store responds before returning OK.
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let probe = bounded(state.config().store_timeout, state.stores().roles.list()).await;
    match probe {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
