// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! High-level Amazon channel service.
//!
//! This service encapsulates:
//! - Token lifecycle: returning a valid access token, refreshing through
//!   LWA when the cached one is expired or about to expire
//! - OAuth callback handling and direct-connect
//! - Sync operations that mirror vendor data into the local store
//! - The dashboard aggregation fan-out

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, SecondsFormat, Utc};
use futures_util::{stream, StreamExt};
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::db::SellerStore;
use crate::error::AppError;
use crate::models::{
    Channel, ChannelConnection, ConnectionStatus, FinancialEventGroupRecord, InventoryItem,
    Listing, Notification, Order,
};
use crate::services::lwa::{LwaClient, LwaTokenResponse};
use crate::services::spapi::{
    listing_has_errors, AmazonOrder, InventorySummary, SpApiClient,
};

/// Margin before token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// How many freshly fetched orders a dashboard build mirrors locally.
const DASHBOARD_ORDER_CACHE_LIMIT: usize = 50;

/// Concurrent cache writes per sync.
const MAX_CONCURRENT_DB_OPS: usize = 50;

/// High-level Amazon service that manages token lifecycle and API calls.
#[derive(Clone)]
pub struct AmazonService {
    lwa: LwaClient,
    spapi: SpApiClient,
    store: Arc<dyn SellerStore>,
    default_marketplace_id: String,
    order_sync_cap: usize,
    inventory_sync_cap: usize,
}

/// Resolved per-call context: a valid token plus the seller/marketplace
/// recorded on the connection.
struct AmazonContext {
    access_token: String,
    seller_id: Option<String>,
    marketplace_id: String,
}

impl AmazonContext {
    fn marketplace_ids(&self) -> Vec<String> {
        vec![self.marketplace_id.clone()]
    }
}

impl AmazonService {
    pub fn new(config: &Config, store: Arc<dyn SellerStore>) -> Self {
        Self {
            lwa: LwaClient::new(
                config.lwa_token_url.clone(),
                config.lwa_client_id.clone(),
                config.lwa_client_secret.clone(),
            ),
            spapi: SpApiClient::new(config.spapi_endpoint.clone()),
            store,
            default_marketplace_id: config.default_marketplace_id.clone(),
            order_sync_cap: config.order_sync_cap,
            inventory_sync_cap: config.inventory_sync_cap,
        }
    }

    // ─── Token Lifecycle ─────────────────────────────────────────────────

    /// Get a valid (non-expired) access token for the given user, or
    /// `None` when the user is not connected.
    ///
    /// A cached token whose expiry is more than the 5-minute margin away
    /// is returned without any network call. Otherwise one refresh is
    /// performed and its result (including a possibly rotated refresh
    /// token) is persisted before returning. Any failure along the way is
    /// reported as `None`: callers treat it exactly like "not connected"
    /// and prompt for re-authorization.
    pub async fn get_valid_access_token(&self, user_id: &str) -> Option<String> {
        self.valid_connection(user_id).await.and_then(|c| c.access_token)
    }

    /// Load the Amazon connection and make sure its access token is valid,
    /// refreshing and persisting if necessary.
    async fn valid_connection(&self, user_id: &str) -> Option<ChannelConnection> {
        let conn = match self.store.get_connection(user_id, Channel::Amazon).await {
            Ok(Some(conn)) => conn,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Connection lookup failed");
                return None;
            }
        };

        let refresh_token = conn.refresh_token.clone()?;

        let now = Utc::now();
        let margin = Duration::seconds(TOKEN_REFRESH_MARGIN_SECS);
        if conn.access_token.is_some() {
            if let Some(expires_at) = conn.token_expiry() {
                if now + margin < expires_at {
                    return Some(conn);
                }
            }
        }

        tracing::info!(user_id, "Access token expired or expiring, refreshing");

        let refreshed = match self.lwa.refresh_access_token(&refresh_token).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Token refresh failed, treating as not connected");
                return None;
            }
        };

        let mut updated = conn;
        updated.access_token = Some(refreshed.access_token);
        // LWA may rotate the refresh token; always keep the returned one.
        updated.refresh_token = Some(refreshed.refresh_token);
        updated.token_expires_at =
            Some((now + Duration::seconds(refreshed.expires_in)).to_rfc3339());
        updated.updated_at = now.to_rfc3339();

        if let Err(e) = self.store.upsert_connection(&updated).await {
            tracing::warn!(user_id, error = %e, "Failed to persist refreshed tokens");
            return None;
        }

        Some(updated)
    }

    /// Resolve a call context, or `NotConnected` for routes that require
    /// an authorized Amazon connection.
    async fn context(&self, user_id: &str) -> Result<AmazonContext, AppError> {
        let conn = self
            .valid_connection(user_id)
            .await
            .ok_or(AppError::NotConnected)?;
        let access_token = conn.access_token.ok_or(AppError::NotConnected)?;
        Ok(AmazonContext {
            access_token,
            seller_id: conn.seller_id,
            marketplace_id: conn
                .marketplace_id
                .unwrap_or_else(|| self.default_marketplace_id.clone()),
        })
    }

    // ─── Connect / Disconnect ────────────────────────────────────────────

    /// Handle the OAuth callback: exchange the authorization code and
    /// persist the connection.
    pub async fn handle_oauth_callback(
        &self,
        user_id: &str,
        code: &str,
        redirect_uri: &str,
        selling_partner_id: Option<&str>,
    ) -> Result<ChannelConnection, AppError> {
        let tokens = self
            .lwa
            .exchange_authorization_code(code, redirect_uri)
            .await?;
        self.store_connected(user_id, tokens, selling_partner_id)
            .await
    }

    /// Connect directly with a refresh token (e.g. a self-authorized
    /// application). The token is validated by performing one refresh
    /// before anything is persisted.
    pub async fn direct_connect(
        &self,
        user_id: &str,
        refresh_token: &str,
        seller_id: Option<&str>,
    ) -> Result<ChannelConnection, AppError> {
        let tokens = self.lwa.refresh_access_token(refresh_token).await?;
        self.store_connected(user_id, tokens, seller_id).await
    }

    async fn store_connected(
        &self,
        user_id: &str,
        tokens: LwaTokenResponse,
        seller_id: Option<&str>,
    ) -> Result<ChannelConnection, AppError> {
        let now = Utc::now();

        // Seller context is best-effort: the connection is usable even if
        // the participations call fails.
        let participations = match self
            .spapi
            .get_marketplace_participations(&tokens.access_token)
            .await
        {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Could not fetch marketplace participations");
                None
            }
        };
        let (marketplace_id, store_name) = participations
            .as_ref()
            .map(extract_primary_marketplace)
            .unwrap_or((None, None));

        let existing = self
            .store
            .get_connection(user_id, Channel::Amazon)
            .await
            .ok()
            .flatten();
        let created_at = existing
            .as_ref()
            .map(|c| c.created_at.clone())
            .unwrap_or_else(|| now.to_rfc3339());
        let seller_id = seller_id
            .map(str::to_string)
            .or_else(|| existing.and_then(|c| c.seller_id));

        let connection = ChannelConnection {
            user_id: user_id.to_string(),
            channel: Channel::Amazon,
            connected: true,
            status: ConnectionStatus::Connected,
            store_name,
            seller_id,
            marketplace_id: marketplace_id
                .or_else(|| Some(self.default_marketplace_id.clone())),
            access_token: Some(tokens.access_token),
            refresh_token: Some(tokens.refresh_token),
            token_expires_at: Some((now + Duration::seconds(tokens.expires_in)).to_rfc3339()),
            credentials: participations,
            created_at,
            updated_at: now.to_rfc3339(),
        };

        self.store.upsert_connection(&connection).await?;
        self.notify(user_id, "channel_connected", "Amazon store connected".to_string())
            .await;

        tracing::info!(user_id, "Amazon connection stored");
        Ok(connection)
    }

    /// Disconnect: null the tokens, keep the row, status `disconnected`.
    pub async fn disconnect(&self, user_id: &str) -> Result<(), AppError> {
        self.store.clear_tokens(user_id, Channel::Amazon).await?;
        self.notify(
            user_id,
            "channel_disconnected",
            "Amazon store disconnected".to_string(),
        )
        .await;
        tracing::info!(user_id, "Amazon connection disconnected");
        Ok(())
    }

    /// List the user's connections with placeholders for channels never
    /// connected, so the settings UI always sees all three.
    pub async fn list_channel_connections(
        &self,
        user_id: &str,
    ) -> Result<Vec<ChannelConnection>, AppError> {
        let mut connections = self.store.list_connections(user_id).await?;
        for channel in [Channel::Amazon, Channel::Ebay, Channel::Shopify] {
            if !connections.iter().any(|c| c.channel == channel) {
                connections.push(ChannelConnection::placeholder(user_id, channel));
            }
        }
        connections.sort_by_key(|c| c.channel.slug());
        Ok(connections)
    }

    // ─── Sync Operations ─────────────────────────────────────────────────

    /// Fetch orders created in the last `days` days and refresh the local
    /// order mirrors.
    pub async fn sync_orders(
        &self,
        user_id: &str,
        days: i64,
    ) -> Result<Vec<AmazonOrder>, AppError> {
        let ctx = self.context(user_id).await?;
        let created_after = rfc3339_days_ago(days);
        let orders = self
            .spapi
            .get_all_orders(
                &ctx.access_token,
                &ctx.marketplace_ids(),
                &created_after,
                self.order_sync_cap,
            )
            .await?;
        self.cache_orders(user_id, &orders, orders.len()).await;
        Ok(orders)
    }

    /// Get one order with its line items.
    pub async fn order_details(&self, user_id: &str, order_id: &str) -> Result<Value, AppError> {
        let ctx = self.context(user_id).await?;
        let order = self.spapi.get_order(&ctx.access_token, order_id).await?;
        let items = self
            .spapi
            .get_order_items(&ctx.access_token, order_id)
            .await?;
        Ok(serde_json::json!({
            "order": order["payload"],
            "items": items["payload"],
        }))
    }

    /// Fetch all FBA inventory and refresh the local inventory mirrors.
    pub async fn sync_inventory(
        &self,
        user_id: &str,
    ) -> Result<Vec<InventorySummary>, AppError> {
        let ctx = self.context(user_id).await?;
        let summaries = self
            .spapi
            .get_all_fba_inventory(
                &ctx.access_token,
                &ctx.marketplace_id,
                self.inventory_sync_cap,
            )
            .await?;

        let now = Utc::now().to_rfc3339();
        let rows: Vec<InventoryItem> = summaries
            .iter()
            // Rows without a seller SKU have no natural key to mirror under.
            .filter_map(|s| mirror_inventory(user_id, s, &now))
            .collect();
        self.cache_writes(user_id, rows, |store, row| async move {
            store.upsert_inventory_item(&row).await
        })
        .await;

        Ok(summaries)
    }

    /// Fetch financial event groups and refresh the local mirrors.
    pub async fn sync_financial_event_groups(&self, user_id: &str) -> Result<Value, AppError> {
        let ctx = self.context(user_id).await?;
        let response = self
            .spapi
            .list_financial_event_groups(&ctx.access_token, 100)
            .await?;

        let now = Utc::now().to_rfc3339();
        let rows: Vec<FinancialEventGroupRecord> = event_groups(&response)
            .iter()
            .filter_map(|g| mirror_event_group(user_id, g, &now))
            .collect();
        self.cache_writes(user_id, rows, |store, row| async move {
            store.upsert_financial_event_group(&row).await
        })
        .await;

        Ok(response)
    }

    // ─── Listings ────────────────────────────────────────────────────────

    /// Get a listing and refresh its local mirror.
    pub async fn get_listing(&self, user_id: &str, sku: &str) -> Result<Value, AppError> {
        let (ctx, seller_id) = self.listing_context(user_id).await?;
        let response = self
            .spapi
            .get_listings_item(&ctx.access_token, &seller_id, sku, &ctx.marketplace_ids())
            .await?;

        let mirror = mirror_listing(user_id, sku, &ctx.marketplace_id, &response);
        if let Err(e) = self.store.upsert_listing(&mirror).await {
            tracing::warn!(user_id, sku, error = %e, "Listing cache write failed");
        }
        Ok(response)
    }

    /// Create or replace a listing. The vendor response is returned
    /// verbatim; `accepted` is false when it carries severity-ERROR issues.
    pub async fn put_listing(
        &self,
        user_id: &str,
        sku: &str,
        body: &Value,
    ) -> Result<ListingSubmission, AppError> {
        let (ctx, seller_id) = self.listing_context(user_id).await?;
        let response = self
            .spapi
            .put_listings_item(&ctx.access_token, &seller_id, sku, &ctx.marketplace_ids(), body)
            .await?;
        Ok(ListingSubmission::from_response(response))
    }

    /// Partially update a listing.
    pub async fn patch_listing(
        &self,
        user_id: &str,
        sku: &str,
        body: &Value,
    ) -> Result<ListingSubmission, AppError> {
        let (ctx, seller_id) = self.listing_context(user_id).await?;
        let response = self
            .spapi
            .patch_listings_item(&ctx.access_token, &seller_id, sku, &ctx.marketplace_ids(), body)
            .await?;
        Ok(ListingSubmission::from_response(response))
    }

    /// Delete a listing.
    pub async fn delete_listing(
        &self,
        user_id: &str,
        sku: &str,
    ) -> Result<ListingSubmission, AppError> {
        let (ctx, seller_id) = self.listing_context(user_id).await?;
        let response = self
            .spapi
            .delete_listings_item(&ctx.access_token, &seller_id, sku, &ctx.marketplace_ids())
            .await?;
        Ok(ListingSubmission::from_response(response))
    }

    async fn listing_context(&self, user_id: &str) -> Result<(AmazonContext, String), AppError> {
        let ctx = self.context(user_id).await?;
        let seller_id = ctx.seller_id.clone().ok_or_else(|| {
            AppError::BadRequest("No seller id recorded for this connection".to_string())
        })?;
        Ok((ctx, seller_id))
    }

    // ─── Dashboard Aggregation ───────────────────────────────────────────

    /// Build the aggregated dashboard for a user.
    ///
    /// Issues the section fetches concurrently and settles all of them:
    /// one failing endpoint contributes an `errors` entry and an empty
    /// default for its section, never a failed build.
    pub async fn build_dashboard(&self, user_id: &str) -> Result<AggregatedDashboard, AppError> {
        let Some(conn) = self.valid_connection(user_id).await else {
            return Ok(AggregatedDashboard::default());
        };
        let access_token = conn.access_token.ok_or(AppError::NotConnected)?;
        let marketplace_id = conn
            .marketplace_id
            .unwrap_or_else(|| self.default_marketplace_id.clone());
        let marketplace_ids = vec![marketplace_id.clone()];
        let created_after = rfc3339_days_ago(30);

        let (seller, orders, inventory, finances) = tokio::join!(
            self.spapi.get_marketplace_participations(&access_token),
            self.spapi.get_all_orders(
                &access_token,
                &marketplace_ids,
                &created_after,
                self.order_sync_cap
            ),
            self.spapi
                .get_all_fba_inventory(&access_token, &marketplace_id, self.inventory_sync_cap),
            self.spapi.list_financial_event_groups(&access_token, 10),
        );

        let mut errors = Vec::new();
        let seller = section("seller", seller, &mut errors);
        let orders = section("orders", orders, &mut errors).unwrap_or_default();
        let inventory = section("inventory", inventory, &mut errors).unwrap_or_default();
        let financial_event_groups = section("finances", finances, &mut errors)
            .map(|response| event_groups(&response))
            .unwrap_or_default();

        let metrics = derive_metrics(&orders, &inventory);

        // Cache-refresh side effect; never fails the build.
        self.cache_orders(user_id, &orders, DASHBOARD_ORDER_CACHE_LIMIT)
            .await;

        Ok(AggregatedDashboard {
            connected: true,
            seller,
            orders,
            inventory,
            financial_event_groups,
            metrics,
            errors,
        })
    }

    // ─── Cache writes ────────────────────────────────────────────────────

    /// Mirror up to `limit` orders into the local store, best-effort.
    async fn cache_orders(&self, user_id: &str, orders: &[AmazonOrder], limit: usize) {
        let now = Utc::now().to_rfc3339();
        let rows: Vec<Order> = orders
            .iter()
            .take(limit)
            .map(|o| mirror_order(user_id, o, &now))
            .collect();
        self.cache_writes(user_id, rows, |store, row| async move {
            store.upsert_order(&row).await
        })
        .await;
    }

    /// Run a batch of store writes with bounded concurrency, logging
    /// failures instead of propagating them.
    async fn cache_writes<R, F, Fut>(&self, user_id: &str, rows: Vec<R>, write: F)
    where
        R: Send + 'static,
        F: Fn(Arc<dyn SellerStore>, R) -> Fut,
        Fut: std::future::Future<Output = Result<(), AppError>>,
    {
        let failed = stream::iter(rows)
            .map(|row| write(self.store.clone(), row))
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .filter_map(|result| async move { result.err() })
            .collect::<Vec<_>>()
            .await;
        if !failed.is_empty() {
            tracing::warn!(user_id, failed = failed.len(), "Some cache writes failed");
        }
    }

    /// Best-effort notification write.
    async fn notify(&self, user_id: &str, kind: &str, message: String) {
        let notification = Notification::new(user_id, kind, message);
        if let Err(e) = self.store.upsert_notification(&notification).await {
            tracing::warn!(user_id, kind, error = %e, "Notification write failed");
        }
    }
}

// ─── Dashboard payload ───────────────────────────────────────────────────

/// Aggregated dashboard assembled from several SP-API calls.
#[derive(Debug, Default, Serialize)]
pub struct AggregatedDashboard {
    pub connected: bool,
    pub seller: Option<Value>,
    pub orders: Vec<AmazonOrder>,
    pub inventory: Vec<InventorySummary>,
    pub financial_event_groups: Vec<Value>,
    pub metrics: DashboardMetrics,
    pub errors: Vec<SectionError>,
}

/// Metrics derived from the fetched sections.
#[derive(Debug, Default, Serialize)]
pub struct DashboardMetrics {
    pub total_revenue: f64,
    pub currency: Option<String>,
    pub order_count: usize,
    pub shipped_count: usize,
    pub pending_count: usize,
    pub total_units: i64,
    pub distinct_skus: usize,
}

/// One failed dashboard section.
#[derive(Debug, Serialize)]
pub struct SectionError {
    pub section: String,
    pub message: String,
}

/// Result of a mutating listings call.
#[derive(Debug, Serialize)]
pub struct ListingSubmission {
    /// False when the vendor flagged the submission with a
    /// severity-ERROR issue despite the 2xx status.
    pub accepted: bool,
    /// Vendor response, verbatim.
    pub response: Value,
}

impl ListingSubmission {
    fn from_response(response: Value) -> Self {
        Self {
            accepted: !listing_has_errors(&response),
            response,
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn section<T>(name: &str, result: Result<T, AppError>, errors: &mut Vec<SectionError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(section = name, error = %e, "Dashboard section failed");
            errors.push(SectionError {
                section: name.to_string(),
                message: e.to_string(),
            });
            None
        }
    }
}

fn rfc3339_days_ago(days: i64) -> String {
    (Utc::now() - Duration::days(days)).to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn derive_metrics(orders: &[AmazonOrder], inventory: &[InventorySummary]) -> DashboardMetrics {
    let mut metrics = DashboardMetrics {
        order_count: orders.len(),
        ..Default::default()
    };

    for order in orders {
        if let Some(total) = &order.order_total {
            // Unparseable amounts are skipped, not errors.
            if let Some(amount) = total.amount.as_deref().and_then(|a| a.parse::<f64>().ok()) {
                metrics.total_revenue += amount;
                if metrics.currency.is_none() {
                    metrics.currency = total.currency_code.clone();
                }
            }
        }
        match order.order_status.as_deref() {
            Some("Shipped") => metrics.shipped_count += 1,
            Some("Unshipped") | Some("PartiallyShipped") => metrics.pending_count += 1,
            _ => {}
        }
    }

    let mut skus = HashSet::new();
    for item in inventory {
        metrics.total_units += item.total_quantity.unwrap_or(0);
        if let Some(sku) = &item.seller_sku {
            skus.insert(sku.clone());
        }
    }
    metrics.distinct_skus = skus.len();

    metrics
}

/// Pull the first participation's marketplace id and name.
fn extract_primary_marketplace(participations: &Value) -> (Option<String>, Option<String>) {
    let first = &participations["payload"][0]["marketplace"];
    (
        first["id"].as_str().map(str::to_string),
        first["name"].as_str().map(str::to_string),
    )
}

fn event_groups(response: &Value) -> Vec<Value> {
    response["payload"]["FinancialEventGroupList"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

fn mirror_order(user_id: &str, order: &AmazonOrder, synced_at: &str) -> Order {
    Order {
        user_id: user_id.to_string(),
        channel: Channel::Amazon,
        marketplace_order_id: order.amazon_order_id.clone(),
        marketplace_id: order.marketplace_id.clone(),
        status: order.order_status.clone(),
        purchase_date: order.purchase_date.clone(),
        total_amount: order.order_total.as_ref().and_then(|t| t.amount.clone()),
        currency: order
            .order_total
            .as_ref()
            .and_then(|t| t.currency_code.clone()),
        items_shipped: order.number_of_items_shipped,
        items_unshipped: order.number_of_items_unshipped,
        synced_at: synced_at.to_string(),
    }
}

fn mirror_inventory(
    user_id: &str,
    summary: &InventorySummary,
    synced_at: &str,
) -> Option<InventoryItem> {
    let sku = summary.seller_sku.clone()?;
    Some(InventoryItem {
        user_id: user_id.to_string(),
        channel: Channel::Amazon,
        sku,
        asin: summary.asin.clone(),
        fnsku: summary.fn_sku.clone(),
        condition: summary.condition.clone(),
        product_name: summary.product_name.clone(),
        quantity: summary.total_quantity.unwrap_or(0),
        synced_at: synced_at.to_string(),
    })
}

fn mirror_event_group(
    user_id: &str,
    group: &Value,
    synced_at: &str,
) -> Option<FinancialEventGroupRecord> {
    let event_group_id = group["FinancialEventGroupId"].as_str()?.to_string();
    Some(FinancialEventGroupRecord {
        user_id: user_id.to_string(),
        channel: Channel::Amazon,
        event_group_id,
        processing_status: group["ProcessingStatus"].as_str().map(str::to_string),
        start_date: group["FinancialEventGroupStart"].as_str().map(str::to_string),
        end_date: group["FinancialEventGroupEnd"].as_str().map(str::to_string),
        total_amount: group["OriginalTotal"]["CurrencyAmount"]
            .as_f64()
            .map(|a| a.to_string()),
        currency: group["OriginalTotal"]["CurrencyCode"]
            .as_str()
            .map(str::to_string),
        synced_at: synced_at.to_string(),
    })
}

fn mirror_listing(user_id: &str, sku: &str, marketplace_id: &str, response: &Value) -> Listing {
    let summary = &response["summaries"][0];
    Listing {
        user_id: user_id.to_string(),
        channel: Channel::Amazon,
        sku: sku.to_string(),
        marketplace_id: Some(marketplace_id.to_string()),
        status: summary["status"][0].as_str().map(str::to_string),
        title: summary["itemName"].as_str().map(str::to_string),
        payload: Some(response.clone()),
        synced_at: Utc::now().to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::spapi::Money;

    fn order(id: &str, status: &str, amount: Option<&str>) -> AmazonOrder {
        AmazonOrder {
            amazon_order_id: id.to_string(),
            purchase_date: Some("2025-06-01T10:00:00Z".to_string()),
            order_status: Some(status.to_string()),
            order_total: amount.map(|a| Money {
                currency_code: Some("USD".to_string()),
                amount: Some(a.to_string()),
            }),
            marketplace_id: None,
            number_of_items_shipped: None,
            number_of_items_unshipped: None,
            fulfillment_channel: None,
            sales_channel: None,
        }
    }

    fn summary(sku: Option<&str>, quantity: i64) -> InventorySummary {
        InventorySummary {
            asin: Some("B000000001".to_string()),
            fn_sku: None,
            seller_sku: sku.map(str::to_string),
            condition: None,
            product_name: None,
            total_quantity: Some(quantity),
        }
    }

    #[test]
    fn metrics_sum_revenue_and_skip_unparseable() {
        let orders = vec![
            order("1", "Shipped", Some("10.50")),
            order("2", "Unshipped", Some("5.25")),
            order("3", "PartiallyShipped", Some("not-a-number")),
            order("4", "Pending", None),
        ];
        let inventory = vec![
            summary(Some("SKU-1"), 3),
            summary(Some("SKU-2"), 4),
            summary(Some("SKU-1"), 2),
            summary(None, 9),
        ];

        let metrics = derive_metrics(&orders, &inventory);

        assert!((metrics.total_revenue - 15.75).abs() < f64::EPSILON);
        assert_eq!(metrics.currency.as_deref(), Some("USD"));
        assert_eq!(metrics.order_count, 4);
        assert_eq!(metrics.shipped_count, 1);
        assert_eq!(metrics.pending_count, 2);
        assert_eq!(metrics.total_units, 18);
        assert_eq!(metrics.distinct_skus, 2);
    }

    #[test]
    fn primary_marketplace_is_extracted() {
        let participations = serde_json::json!({
            "payload": [{
                "marketplace": {
                    "id": "ATVPDKIKX0DER",
                    "name": "Amazon.com",
                    "countryCode": "US"
                },
                "participation": {"isParticipating": true}
            }]
        });
        let (id, name) = extract_primary_marketplace(&participations);
        assert_eq!(id.as_deref(), Some("ATVPDKIKX0DER"));
        assert_eq!(name.as_deref(), Some("Amazon.com"));

        let empty = serde_json::json!({"payload": []});
        assert_eq!(extract_primary_marketplace(&empty), (None, None));
    }

    #[test]
    fn order_mirror_uses_the_vendor_order_id_key() {
        let mirrored = mirror_order("u1", &order("111-1", "Shipped", Some("9.99")), "now");
        assert_eq!(mirrored.doc_id(), "u1_111-1");
        assert_eq!(mirrored.total_amount.as_deref(), Some("9.99"));
        assert_eq!(mirrored.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn event_group_mirror_requires_a_group_id() {
        let group = serde_json::json!({
            "FinancialEventGroupId": "feg-1",
            "ProcessingStatus": "Open",
            "FinancialEventGroupStart": "2025-07-01T00:00:00Z",
            "OriginalTotal": {"CurrencyCode": "USD", "CurrencyAmount": 123.45}
        });
        let record = mirror_event_group("u1", &group, "now").unwrap();
        assert_eq!(record.doc_id(), "u1_feg-1");
        assert_eq!(record.processing_status.as_deref(), Some("Open"));
        assert_eq!(record.total_amount.as_deref(), Some("123.45"));
        assert_eq!(record.currency.as_deref(), Some("USD"));

        let without_id = serde_json::json!({"ProcessingStatus": "Open"});
        assert!(mirror_event_group("u1", &without_id, "now").is_none());
    }

    #[test]
    fn inventory_without_sku_is_not_mirrored() {
        assert!(mirror_inventory("u1", &summary(None, 5), "now").is_none());
        let item = mirror_inventory("u1", &summary(Some("SKU-9"), 5), "now").unwrap();
        assert_eq!(item.doc_id(), "u1_SKU-9_amazon");
        assert_eq!(item.quantity, 5);
    }
}
