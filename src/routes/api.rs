// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::db::SellerStore;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Channel, ChannelConnection, ConnectionStatus, Notification};
use crate::services::amazon::{AggregatedDashboard, ListingSubmission};
use crate::services::spapi::{AmazonOrder, InventorySummary};
use crate::AppState;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/connections", get(list_connections))
        .route("/api/connections/amazon/direct", post(direct_connect))
        .route("/api/connections/amazon/disconnect", post(disconnect))
        .route("/api/connections/{channel}", post(connect_channel_stub))
        .route("/api/orders", get(get_orders))
        .route("/api/orders/{order_id}", get(get_order))
        .route("/api/inventory", get(get_inventory))
        .route("/api/finances", get(get_finances))
        .route(
            "/api/listings/{sku}",
            get(get_listing)
                .put(put_listing)
                .patch(patch_listing)
                .delete(delete_listing),
        )
        .route("/api/notifications", get(get_notifications))
}

// ─── Dashboard ───────────────────────────────────────────────

/// Aggregated dashboard for the current user.
async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<AggregatedDashboard>> {
    let dashboard = state.amazon.build_dashboard(&user.user_id).await?;
    Ok(Json(dashboard))
}

// ─── Connections ─────────────────────────────────────────────

/// Connection status without the token fields.
#[derive(Serialize)]
pub struct ConnectionView {
    pub channel: Channel,
    pub connected: bool,
    pub status: ConnectionStatus,
    pub store_name: Option<String>,
    pub seller_id: Option<String>,
    pub marketplace_id: Option<String>,
    pub updated_at: String,
}

impl From<ChannelConnection> for ConnectionView {
    fn from(conn: ChannelConnection) -> Self {
        Self {
            channel: conn.channel,
            connected: conn.connected,
            status: conn.status,
            store_name: conn.store_name,
            seller_id: conn.seller_id,
            marketplace_id: conn.marketplace_id,
            updated_at: conn.updated_at,
        }
    }
}

/// List all channel connections for the current user.
async fn list_connections(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ConnectionView>>> {
    let connections = state
        .amazon
        .list_channel_connections(&user.user_id)
        .await?;
    Ok(Json(connections.into_iter().map(Into::into).collect()))
}

#[derive(Deserialize)]
struct DirectConnectRequest {
    refresh_token: String,
    #[serde(default)]
    seller_id: Option<String>,
}

/// Connect Amazon with a self-authorized refresh token.
async fn direct_connect(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<DirectConnectRequest>,
) -> Result<Json<ConnectionView>> {
    if request.refresh_token.trim().is_empty() {
        return Err(AppError::BadRequest("refresh_token is required".to_string()));
    }
    let connection = state
        .amazon
        .direct_connect(
            &user.user_id,
            request.refresh_token.trim(),
            request.seller_id.as_deref(),
        )
        .await?;
    Ok(Json(connection.into()))
}

#[derive(Serialize)]
pub struct DisconnectResponse {
    pub success: bool,
    pub message: String,
}

/// Disconnect Amazon: clear tokens, keep the record.
async fn disconnect(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DisconnectResponse>> {
    state.amazon.disconnect(&user.user_id).await?;
    Ok(Json(DisconnectResponse {
        success: true,
        message: "Amazon store disconnected.".to_string(),
    }))
}

/// Stub for channels that are not integrated yet.
async fn connect_channel_stub(Path(channel): Path<String>) -> Result<Json<Value>> {
    match Channel::from_slug(&channel) {
        Some(Channel::Amazon) => Err(AppError::BadRequest(
            "Use /auth/amazon or /api/connections/amazon/direct".to_string(),
        )),
        Some(other) => Err(AppError::UnsupportedChannel(other.to_string())),
        None => Err(AppError::NotFound(format!("channel {}", channel))),
    }
}

// ─── Orders ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct OrdersQuery {
    /// Look-back window in days
    #[serde(default = "default_days")]
    days: i64,
}

fn default_days() -> i64 {
    30
}

#[derive(Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<AmazonOrder>,
    pub count: usize,
}

/// Sync orders from Amazon and return them.
async fn get_orders(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<OrdersResponse>> {
    if query.days <= 0 {
        return Err(AppError::BadRequest(
            "'days' must be a positive number".to_string(),
        ));
    }
    let orders = state.amazon.sync_orders(&user.user_id, query.days).await?;
    let count = orders.len();
    Ok(Json(OrdersResponse { orders, count }))
}

/// A single order with its line items.
async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(order_id): Path<String>,
) -> Result<Json<Value>> {
    let details = state.amazon.order_details(&user.user_id, &order_id).await?;
    Ok(Json(details))
}

// ─── Inventory ───────────────────────────────────────────────

#[derive(Serialize)]
pub struct InventoryResponse {
    pub items: Vec<InventorySummary>,
    pub count: usize,
}

/// Sync FBA inventory from Amazon and return it.
async fn get_inventory(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<InventoryResponse>> {
    let items = state.amazon.sync_inventory(&user.user_id).await?;
    let count = items.len();
    Ok(Json(InventoryResponse { items, count }))
}

// ─── Finances ────────────────────────────────────────────────

/// Financial event groups, vendor payload verbatim.
async fn get_finances(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>> {
    let response = state
        .amazon
        .sync_financial_event_groups(&user.user_id)
        .await?;
    Ok(Json(response))
}

// ─── Listings ────────────────────────────────────────────────

async fn get_listing(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(sku): Path<String>,
) -> Result<Json<Value>> {
    let listing = state.amazon.get_listing(&user.user_id, &sku).await?;
    Ok(Json(listing))
}

async fn put_listing(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(sku): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<ListingSubmission>> {
    let submission = state.amazon.put_listing(&user.user_id, &sku, &body).await?;
    Ok(Json(submission))
}

async fn patch_listing(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(sku): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<ListingSubmission>> {
    let submission = state
        .amazon
        .patch_listing(&user.user_id, &sku, &body)
        .await?;
    Ok(Json(submission))
}

async fn delete_listing(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(sku): Path<String>,
) -> Result<Json<ListingSubmission>> {
    let submission = state.amazon.delete_listing(&user.user_id, &sku).await?;
    Ok(Json(submission))
}

// ─── Notifications ───────────────────────────────────────────

/// Recent notifications for the current user.
async fn get_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Notification>>> {
    let notifications = state.store.notifications_for_user(&user.user_id, 50).await?;
    Ok(Json(notifications))
}
