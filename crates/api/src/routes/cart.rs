//! Cart route handlers.
//!
//! Thin adapters over the cart engine: every handler resolves the owner
//! from the gate's context and returns the updated cart view. There is no
//! cart id in the URL; a caller can only ever touch their own cart.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use tienda_core::ProductId;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::CurrentUser;
use crate::models::CartView;
use crate::state::AppState;

/// Add request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    /// Defaults to 1.
    pub quantity: Option<i64>,
}

/// Quantity update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

/// The caller's cart, or the empty view if none exists.
///
/// GET /cart
///
/// # Errors
///
/// Returns 503 if the store is unavailable.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> Result<Json<CartView>> {
    let view = state.carts().get_cart(&ctx.subject_id).await?;
    Ok(Json(view))
}

/// Add a product to the caller's cart.
///
/// POST /cart/add
///
/// Repeated adds of the same product merge into one line.
///
/// # Errors
///
/// Returns 400 for a quantity below 1, 404 for an unknown product.
#[instrument(skip(state, body))]
pub async fn add(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let view = state
        .carts()
        .add_item(&ctx.subject_id, &body.product_id, body.quantity)
        .await?;

    add_breadcrumb(
        "cart",
        "item added",
        Some(&[("product_id", body.product_id.as_str())]),
    );

    Ok(Json(view))
}

/// Replace the quantity of one cart line.
///
/// PUT /cart/update/{product_id}
///
/// # Errors
///
/// Returns 400 for a quantity below 1, 404 when the cart or line is
/// missing.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(product_id): Path<ProductId>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let view = state
        .carts()
        .update_quantity(&ctx.subject_id, &product_id, body.quantity)
        .await?;
    Ok(Json(view))
}

/// Remove one line from the caller's cart.
///
/// DELETE /cart/remove/{product_id}
///
/// # Errors
///
/// Returns 404 when the cart or line is missing.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartView>> {
    let view = state
        .carts()
        .remove_item(&ctx.subject_id, &product_id)
        .await?;
    Ok(Json(view))
}

/// Delete the caller's cart entirely. Safe to repeat.
///
/// DELETE /cart/clear
///
/// # Errors
///
/// Returns 503 if the store is unavailable.
#[instrument(skip(state))]
pub async fn clear(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> Result<Json<CartView>> {
    let view = state.carts().clear(&ctx.subject_id).await?;

    add_breadcrumb("cart", "cart cleared", None);

    Ok(Json(view))
}
