//! Order route handlers.
//!
//! Orders are immutable snapshots of the catalog at purchase time: item
//! names, prices, and subtotals are resolved server-side from the live
//! products, never taken from the request. All endpoints sit behind the
//! request gate.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use tienda_core::{OrderId, OrderStatus, ProductId, Quantity};

use crate::error::{ApiError, Result, add_breadcrumb};
use crate::middleware::CurrentUser;
use crate::models::{Order, OrderItem};
use crate::services::stats::{self, OrdersSummary, Period};
use crate::state::AppState;
use crate::store::bounded;

/// One requested line of a new order.
#[derive(Debug, Deserialize)]
pub struct OrderItemPayload {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Create request body for an order.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemPayload>,
    /// Defaults to now.
    pub placed_at: Option<DateTime<Utc>>,
    /// Defaults to `pending`.
    pub status: Option<OrderStatus>,
}

/// Update request body for an order. Omitted fields keep their values.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub status: Option<OrderStatus>,
    pub placed_at: Option<DateTime<Utc>>,
}

/// Query string for the statistics endpoint.
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// `week`, `month`, or `year`; defaults to `week`.
    pub period: Option<String>,
}

/// List all orders.
///
/// GET /orders
///
/// # Errors
///
/// Returns 503 if the store is unavailable.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Order>>> {
    let orders = bounded(state.config().store_timeout, state.stores().orders.list()).await?;
    Ok(Json(orders))
}

/// The caller's own orders, oldest first.
///
/// GET /orders/mine
///
/// # Errors
///
/// Returns 503 if the store is unavailable.
#[instrument(skip(state))]
pub async fn mine(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> Result<Json<Vec<Order>>> {
    let orders = bounded(
        state.config().store_timeout,
        state.stores().orders.find_by_owner(&ctx.subject_id),
    )
    .await?;
    Ok(Json(orders))
}

/// Aggregate order statistics for the current period.
///
/// GET /orders/stats?period=week|month|year
///
/// # Errors
///
/// Returns 400 for an unknown period.
#[instrument(skip(state))]
pub async fn stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<OrdersSummary>> {
    let period = match query.period.as_deref() {
        Some(raw) => raw.parse::<Period>().map_err(ApiError::BadRequest)?,
        None => Period::default(),
    };

    let orders = bounded(state.config().store_timeout, state.stores().orders.list()).await?;
    Ok(Json(stats::summarize(&orders, period, Utc::now())))
}

/// Fetch one order.
///
/// GET /orders/{id}
///
/// # Errors
///
/// Returns 404 when the order does not exist.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<OrderId>) -> Result<Json<Order>> {
    let order = bounded(
        state.config().store_timeout,
        state.stores().orders.find_by_id(&id),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("order".to_string()))?;

    Ok(Json(order))
}

/// Place an order for the caller.
///
/// POST /orders
///
/// # Errors
///
/// Returns 404 when a line names an unknown product, 400 for a quantity
/// below 1. Nothing is persisted on a failed line.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let timeout = state.config().store_timeout;

    let mut items = Vec::with_capacity(body.items.len());
    for line in body.items {
        let quantity =
            Quantity::parse(line.quantity).map_err(|e| ApiError::BadRequest(e.to_string()))?;
        let product = bounded(timeout, state.stores().products.find_by_id(&line.product_id))
            .await?
            .ok_or_else(|| ApiError::NotFound("product".to_string()))?;
        items.push(OrderItem::snapshot(&product, quantity));
    }

    let total = Order::compute_total(&items);
    let order = Order {
        id: OrderId::generate(),
        user_id: ctx.subject_id,
        placed_at: body.placed_at.unwrap_or_else(Utc::now),
        items,
        total,
        status: body.status.unwrap_or_default(),
    };

    let order = bounded(timeout, state.stores().orders.save(order)).await?;

    add_breadcrumb("orders", "order placed", Some(&[("order_id", order.id.as_str())]));

    Ok((StatusCode::CREATED, Json(order)))
}

/// Adjust an order's status or date; the snapshot lines never change.
///
/// PUT /orders/{id}
///
/// # Errors
///
/// Returns 404 when the order does not exist.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateOrderRequest>,
) -> Result<Json<Order>> {
    let timeout = state.config().store_timeout;

    let mut order = bounded(timeout, state.stores().orders.find_by_id(&id))
        .await?
        .ok_or_else(|| ApiError::NotFound("order".to_string()))?;

    if let Some(status) = body.status {
        order.status = status;
    }
    if let Some(placed_at) = body.placed_at {
        order.placed_at = placed_at;
    }

    let order = bounded(timeout, state.stores().orders.save(order)).await?;
    Ok(Json(order))
}

/// Delete an order.
///
/// DELETE /orders/{id}
///
/// # Errors
///
/// Returns 404 when the order does not exist.
#[instrument(skip(state))]
pub async fn remove(State(state): State<AppState>, Path(id): Path<OrderId>) -> Result<StatusCode> {
    let removed = bounded(
        state.config().store_timeout,
        state.stores().orders.delete_by_id(&id),
    )
    .await?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("order".to_string()))
    }
}
