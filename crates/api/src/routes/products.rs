//! Product catalog route handlers.
//!
//! Reads are public; writes sit behind the request gate. A product refers
//! to its category by embedding it, so create/update resolve `category_id`
//! against the category collection at write time.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use tienda_core::{CategoryId, ProductId};

use crate::error::{ApiError, Result};
use crate::models::{Category, Product};
use crate::state::AppState;
use crate::store::bounded;

/// Create/update request body for a product.
#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    pub description: Option<String>,
    /// Decimal string, e.g. `"199.90"`.
    pub price: Decimal,
    pub stock: u32,
    pub image_url: Option<String>,
    /// Resolved and embedded at write time; 404 when unknown.
    pub category_id: Option<CategoryId>,
}

/// List all products.
///
/// GET /products
///
/// # Errors
///
/// Returns 503 if the store is unavailable.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = bounded(state.config().store_timeout, state.stores().products.list()).await?;
    Ok(Json(products))
}

/// Fetch one product.
///
/// GET /products/{id}
///
/// # Errors
///
/// Returns 404 when the product does not exist.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = bounded(
        state.config().store_timeout,
        state.stores().products.find_by_id(&id),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("product".to_string()))?;

    Ok(Json(product))
}

/// Create a product.
///
/// POST /products
///
/// # Errors
///
/// Returns 404 when `category_id` names an unknown category.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<ProductPayload>,
) -> Result<(StatusCode, Json<Product>)> {
    let category = resolve_category(&state, body.category_id.as_ref()).await?;

    let product = Product {
        id: ProductId::generate(),
        name: body.name,
        description: body.description,
        price: body.price,
        stock: body.stock,
        image_url: body.image_url,
        category,
    };

    let product = bounded(
        state.config().store_timeout,
        state.stores().products.save(product),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product's fields.
///
/// PUT /products/{id}
///
/// # Errors
///
/// Returns 404 when the product or the referenced category is missing.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<ProductPayload>,
) -> Result<Json<Product>> {
    let timeout = state.config().store_timeout;

    bounded(timeout, state.stores().products.find_by_id(&id))
        .await?
        .ok_or_else(|| ApiError::NotFound("product".to_string()))?;

    let category = resolve_category(&state, body.category_id.as_ref()).await?;

    let product = Product {
        id,
        name: body.name,
        description: body.description,
        price: body.price,
        stock: body.stock,
        image_url: body.image_url,
        category,
    };

    let product = bounded(timeout, state.stores().products.save(product)).await?;
    Ok(Json(product))
}

/// Delete a product.
///
/// DELETE /products/{id}
///
/// # Errors
///
/// Returns 404 when the product does not exist.
#[instrument(skip(state))]
pub async fn remove(State(state): State<AppState>, Path(id): Path<ProductId>) -> Result<StatusCode> {
    let removed = bounded(
        state.config().store_timeout,
        state.stores().products.delete_by_id(&id),
    )
    .await?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("product".to_string()))
    }
}

/// Resolve an optional category reference to the embedded record.
async fn resolve_category(
    state: &AppState,
    id: Option<&CategoryId>,
) -> Result<Option<Category>> {
    let Some(id) = id else {
        return Ok(None);
    };

    let category = bounded(
        state.config().store_timeout,
        state.stores().categories.find_by_id(id),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("category".to_string()))?;

    Ok(Some(category))
}
