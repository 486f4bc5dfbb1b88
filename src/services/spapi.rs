// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Amazon Selling-Partner API client.
//!
//! Handles:
//! - One parameterized request gateway (`call`) with typed errors
//! - Query-string encoding that keeps `,` and `:` literal
//! - Thin wrappers for the SP-API resources the dashboard uses
//! - Cursor pagination for full order and inventory syncs

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// User-Agent sent on every SP-API request, per Amazon's developer
/// guidelines for identifying the integration and its platform.
pub const SPAPI_USER_AGENT: &str = concat!(
    "sellerdesk/",
    env!("CARGO_PKG_VERSION"),
    " (Language=Rust; Platform=tokio)"
);

/// SP-API request gateway.
#[derive(Clone)]
pub struct SpApiClient {
    http: reqwest::Client,
    endpoint: String,
}

impl SpApiClient {
    /// Create a client against the given regional endpoint.
    pub fn new(endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Issue one SP-API request and parse the JSON response.
    ///
    /// Single-shot: no retry or backoff. Non-2xx responses become
    /// `AppError::SpApi` carrying the path, status, and raw body.
    pub async fn call<T: DeserializeOwned>(
        &self,
        access_token: &str,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<T, AppError> {
        let mut url = format!("{}{}", self.endpoint, path);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&encode_query(query));
        }

        let mut request = self
            .http
            .request(method, &url)
            .header("x-amz-access-token", access_token)
            .header(reqwest::header::USER_AGENT, SPAPI_USER_AGENT);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::SpApiRequest(format!("{}: {}", path, e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            if status == 429 {
                tracing::warn!(path, "SP-API rate limit hit (429)");
            }
            return Err(AppError::SpApi {
                path: path.to_string(),
                status,
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::SpApiRequest(format!("{}: {}", path, e)))?;
        if text.is_empty() {
            // Some mutating endpoints answer 2xx with no body.
            return serde_json::from_value(Value::Null)
                .map_err(|e| AppError::SpApiRequest(format!("{}: empty response: {}", path, e)));
        }
        serde_json::from_str(&text)
            .map_err(|e| AppError::SpApiRequest(format!("{}: JSON parse error: {}", path, e)))
    }

    // ─── Sellers ─────────────────────────────────────────────────────────

    /// Get the marketplaces this seller participates in.
    pub async fn get_marketplace_participations(
        &self,
        access_token: &str,
    ) -> Result<Value, AppError> {
        self.call(
            access_token,
            Method::GET,
            "/sellers/v1/marketplaceParticipations",
            &[],
            None,
        )
        .await
    }

    // ─── Orders ──────────────────────────────────────────────────────────

    /// Fetch one page of orders created after the given RFC 3339 instant.
    pub async fn get_orders_page(
        &self,
        access_token: &str,
        marketplace_ids: &[String],
        created_after: &str,
        next_token: Option<&str>,
    ) -> Result<OrdersPayload, AppError> {
        let mut query = vec![
            ("MarketplaceIds", marketplace_ids.join(",")),
            ("CreatedAfter", created_after.to_string()),
        ];
        if let Some(token) = next_token {
            query.push(("NextToken", token.to_string()));
        }
        let envelope: OrdersEnvelope = self
            .call(access_token, Method::GET, "/orders/v0/orders", &query, None)
            .await?;
        Ok(envelope.payload)
    }

    /// Fetch all orders since `created_after`, following continuation
    /// tokens until exhausted or `cap` rows have accumulated. The page
    /// that crosses the cap is kept whole; no further page is requested.
    pub async fn get_all_orders(
        &self,
        access_token: &str,
        marketplace_ids: &[String],
        created_after: &str,
        cap: usize,
    ) -> Result<Vec<AmazonOrder>, AppError> {
        let mut orders = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let page = self
                .get_orders_page(
                    access_token,
                    marketplace_ids,
                    created_after,
                    next_token.as_deref(),
                )
                .await?;
            orders.extend(page.orders);
            next_token = page.next_token;
            if next_token.is_none() || orders.len() >= cap {
                break;
            }
        }
        Ok(orders)
    }

    /// Get a single order.
    pub async fn get_order(&self, access_token: &str, order_id: &str) -> Result<Value, AppError> {
        let path = format!("/orders/v0/orders/{}", order_id);
        self.call(access_token, Method::GET, &path, &[], None).await
    }

    /// Get the line items for an order.
    pub async fn get_order_items(
        &self,
        access_token: &str,
        order_id: &str,
    ) -> Result<Value, AppError> {
        let path = format!("/orders/v0/orders/{}/orderItems", order_id);
        self.call(access_token, Method::GET, &path, &[], None).await
    }

    // ─── Catalog ─────────────────────────────────────────────────────────

    /// Keyword search in the catalog.
    pub async fn search_catalog_items(
        &self,
        access_token: &str,
        keywords: &str,
        marketplace_ids: &[String],
    ) -> Result<Value, AppError> {
        let query = [
            ("keywords", keywords.to_string()),
            ("marketplaceIds", marketplace_ids.join(",")),
        ];
        self.call(
            access_token,
            Method::GET,
            "/catalog/2022-04-01/items",
            &query,
            None,
        )
        .await
    }

    /// Get one catalog item by ASIN.
    pub async fn get_catalog_item(
        &self,
        access_token: &str,
        asin: &str,
        marketplace_ids: &[String],
    ) -> Result<Value, AppError> {
        let path = format!("/catalog/2022-04-01/items/{}", asin);
        let query = [("marketplaceIds", marketplace_ids.join(","))];
        self.call(access_token, Method::GET, &path, &query, None)
            .await
    }

    // ─── FBA Inventory ───────────────────────────────────────────────────

    /// Fetch one page of FBA inventory summaries.
    pub async fn get_fba_inventory_page(
        &self,
        access_token: &str,
        marketplace_id: &str,
        next_token: Option<&str>,
    ) -> Result<FbaInventoryEnvelope, AppError> {
        let mut query = vec![
            ("details", "true".to_string()),
            ("granularityType", "Marketplace".to_string()),
            ("granularityId", marketplace_id.to_string()),
            ("marketplaceIds", marketplace_id.to_string()),
        ];
        if let Some(token) = next_token {
            query.push(("nextToken", token.to_string()));
        }
        self.call(
            access_token,
            Method::GET,
            "/fba/inventory/v1/summaries",
            &query,
            None,
        )
        .await
    }

    /// Fetch all FBA inventory summaries, following continuation tokens
    /// until exhausted or `cap` rows have accumulated.
    pub async fn get_all_fba_inventory(
        &self,
        access_token: &str,
        marketplace_id: &str,
        cap: usize,
    ) -> Result<Vec<InventorySummary>, AppError> {
        let mut summaries = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let page = self
                .get_fba_inventory_page(access_token, marketplace_id, next_token.as_deref())
                .await?;
            summaries.extend(page.payload.inventory_summaries);
            next_token = page.pagination.and_then(|p| p.next_token);
            if next_token.is_none() || summaries.len() >= cap {
                break;
            }
        }
        Ok(summaries)
    }

    // ─── Pricing ─────────────────────────────────────────────────────────

    /// Competitive pricing for up to 20 ASINs.
    pub async fn get_competitive_pricing(
        &self,
        access_token: &str,
        marketplace_id: &str,
        asins: &[String],
    ) -> Result<Value, AppError> {
        let query = [
            ("MarketplaceId", marketplace_id.to_string()),
            ("Asins", asins.join(",")),
            ("ItemType", "Asin".to_string()),
        ];
        self.call(
            access_token,
            Method::GET,
            "/products/pricing/v0/competitivePrice",
            &query,
            None,
        )
        .await
    }

    /// Offer listings for one ASIN.
    pub async fn get_item_offers(
        &self,
        access_token: &str,
        marketplace_id: &str,
        asin: &str,
    ) -> Result<Value, AppError> {
        let path = format!("/products/pricing/v0/items/{}/offers", asin);
        let query = [
            ("MarketplaceId", marketplace_id.to_string()),
            ("ItemCondition", "New".to_string()),
        ];
        self.call(access_token, Method::GET, &path, &query, None)
            .await
    }

    // ─── Listings ────────────────────────────────────────────────────────
    //
    // Mutating listings calls return the vendor response verbatim; an
    // `issues` entry with severity ERROR means the submission was not
    // accepted even though the HTTP status was 2xx.

    /// Get a listings item with summaries, attributes, and issues.
    pub async fn get_listings_item(
        &self,
        access_token: &str,
        seller_id: &str,
        sku: &str,
        marketplace_ids: &[String],
    ) -> Result<Value, AppError> {
        let path = listings_path(seller_id, sku);
        let query = [
            ("marketplaceIds", marketplace_ids.join(",")),
            ("includedData", "summaries,attributes,issues".to_string()),
        ];
        self.call(access_token, Method::GET, &path, &query, None)
            .await
    }

    /// Create or fully replace a listings item.
    pub async fn put_listings_item(
        &self,
        access_token: &str,
        seller_id: &str,
        sku: &str,
        marketplace_ids: &[String],
        body: &Value,
    ) -> Result<Value, AppError> {
        let path = listings_path(seller_id, sku);
        let query = [("marketplaceIds", marketplace_ids.join(","))];
        self.call(access_token, Method::PUT, &path, &query, Some(body))
            .await
    }

    /// Partially update a listings item.
    pub async fn patch_listings_item(
        &self,
        access_token: &str,
        seller_id: &str,
        sku: &str,
        marketplace_ids: &[String],
        body: &Value,
    ) -> Result<Value, AppError> {
        let path = listings_path(seller_id, sku);
        let query = [("marketplaceIds", marketplace_ids.join(","))];
        self.call(access_token, Method::PATCH, &path, &query, Some(body))
            .await
    }

    /// Delete a listings item.
    pub async fn delete_listings_item(
        &self,
        access_token: &str,
        seller_id: &str,
        sku: &str,
        marketplace_ids: &[String],
    ) -> Result<Value, AppError> {
        let path = listings_path(seller_id, sku);
        let query = [("marketplaceIds", marketplace_ids.join(","))];
        self.call(access_token, Method::DELETE, &path, &query, None)
            .await
    }

    // ─── Finances ────────────────────────────────────────────────────────

    /// List financial event groups.
    pub async fn list_financial_event_groups(
        &self,
        access_token: &str,
        max_results: u32,
    ) -> Result<Value, AppError> {
        let query = [("MaxResultsPerPage", max_results.to_string())];
        self.call(
            access_token,
            Method::GET,
            "/finances/v0/financialEventGroups",
            &query,
            None,
        )
        .await
    }

    /// List financial events.
    pub async fn list_financial_events(
        &self,
        access_token: &str,
        max_results: u32,
    ) -> Result<Value, AppError> {
        let query = [("MaxResultsPerPage", max_results.to_string())];
        self.call(
            access_token,
            Method::GET,
            "/finances/v0/financialEvents",
            &query,
            None,
        )
        .await
    }

    // ─── Messaging ───────────────────────────────────────────────────────

    /// Actions available for messaging the buyer of an order.
    pub async fn get_messaging_actions(
        &self,
        access_token: &str,
        amazon_order_id: &str,
        marketplace_ids: &[String],
    ) -> Result<Value, AppError> {
        let path = format!("/messaging/v1/orders/{}", amazon_order_id);
        let query = [("marketplaceIds", marketplace_ids.join(","))];
        self.call(access_token, Method::GET, &path, &query, None)
            .await
    }

    /// Send a confirm-order-details message to the buyer.
    pub async fn confirm_order_details(
        &self,
        access_token: &str,
        amazon_order_id: &str,
        marketplace_ids: &[String],
        body: &Value,
    ) -> Result<Value, AppError> {
        let path = format!(
            "/messaging/v1/orders/{}/messages/confirmOrderDetails",
            amazon_order_id
        );
        let query = [("marketplaceIds", marketplace_ids.join(","))];
        self.call(access_token, Method::POST, &path, &query, Some(body))
            .await
    }

    // ─── FBA Inbound ─────────────────────────────────────────────────────

    /// Create an inbound shipment plan.
    pub async fn create_inbound_shipment_plan(
        &self,
        access_token: &str,
        body: &Value,
    ) -> Result<Value, AppError> {
        self.call(
            access_token,
            Method::POST,
            "/fba/inbound/v0/plans",
            &[],
            Some(body),
        )
        .await
    }

    /// Create an inbound shipment from a plan.
    pub async fn create_inbound_shipment(
        &self,
        access_token: &str,
        shipment_id: &str,
        body: &Value,
    ) -> Result<Value, AppError> {
        let path = format!("/fba/inbound/v0/shipments/{}", shipment_id);
        self.call(access_token, Method::POST, &path, &[], Some(body))
            .await
    }

    /// Update an inbound shipment.
    pub async fn update_inbound_shipment(
        &self,
        access_token: &str,
        shipment_id: &str,
        body: &Value,
    ) -> Result<Value, AppError> {
        let path = format!("/fba/inbound/v0/shipments/{}", shipment_id);
        self.call(access_token, Method::PUT, &path, &[], Some(body))
            .await
    }

    /// List inbound shipments by status.
    pub async fn get_inbound_shipments(
        &self,
        access_token: &str,
        marketplace_id: &str,
        shipment_statuses: &[String],
    ) -> Result<Value, AppError> {
        let query = [
            ("QueryType", "SHIPMENT".to_string()),
            ("MarketplaceId", marketplace_id.to_string()),
            ("ShipmentStatusList", shipment_statuses.join(",")),
        ];
        self.call(
            access_token,
            Method::GET,
            "/fba/inbound/v0/shipments",
            &query,
            None,
        )
        .await
    }

    /// List the items in an inbound shipment.
    pub async fn get_inbound_shipment_items(
        &self,
        access_token: &str,
        shipment_id: &str,
    ) -> Result<Value, AppError> {
        let path = format!("/fba/inbound/v0/shipments/{}/items", shipment_id);
        self.call(access_token, Method::GET, &path, &[], None).await
    }

    /// Get package labels for an inbound shipment.
    pub async fn get_shipment_labels(
        &self,
        access_token: &str,
        shipment_id: &str,
        page_type: &str,
        label_type: &str,
    ) -> Result<Value, AppError> {
        let path = format!("/fba/inbound/v0/shipments/{}/labels", shipment_id);
        let query = [
            ("PageType", page_type.to_string()),
            ("LabelType", label_type.to_string()),
        ];
        self.call(access_token, Method::GET, &path, &query, None)
            .await
    }

    /// Get transport details for an inbound shipment.
    pub async fn get_transport_details(
        &self,
        access_token: &str,
        shipment_id: &str,
    ) -> Result<Value, AppError> {
        let path = format!("/fba/inbound/v0/shipments/{}/transport", shipment_id);
        self.call(access_token, Method::GET, &path, &[], None).await
    }

    /// Submit transport details for an inbound shipment.
    pub async fn put_transport_details(
        &self,
        access_token: &str,
        shipment_id: &str,
        body: &Value,
    ) -> Result<Value, AppError> {
        let path = format!("/fba/inbound/v0/shipments/{}/transport", shipment_id);
        self.call(access_token, Method::PUT, &path, &[], Some(body))
            .await
    }

    // ─── FBA Outbound ────────────────────────────────────────────────────

    /// Preview fulfillment options for a multi-channel order.
    pub async fn get_fulfillment_preview(
        &self,
        access_token: &str,
        body: &Value,
    ) -> Result<Value, AppError> {
        self.call(
            access_token,
            Method::POST,
            "/fba/outbound/2020-07-01/fulfillmentOrders/preview",
            &[],
            Some(body),
        )
        .await
    }

    // ─── Reports ─────────────────────────────────────────────────────────

    /// Request creation of a report.
    pub async fn create_report(
        &self,
        access_token: &str,
        report_type: &str,
        marketplace_ids: &[String],
    ) -> Result<Value, AppError> {
        let body = serde_json::json!({
            "reportType": report_type,
            "marketplaceIds": marketplace_ids,
        });
        self.call(
            access_token,
            Method::POST,
            "/reports/2021-06-30/reports",
            &[],
            Some(&body),
        )
        .await
    }

    /// Poll a report's processing status.
    pub async fn get_report(&self, access_token: &str, report_id: &str) -> Result<Value, AppError> {
        let path = format!("/reports/2021-06-30/reports/{}", report_id);
        self.call(access_token, Method::GET, &path, &[], None).await
    }

    /// Fetch the download details for a finished report document.
    pub async fn get_report_document(
        &self,
        access_token: &str,
        document_id: &str,
    ) -> Result<Value, AppError> {
        let path = format!("/reports/2021-06-30/documents/{}", document_id);
        self.call(access_token, Method::GET, &path, &[], None).await
    }

    // ─── Shipping ────────────────────────────────────────────────────────

    /// Get shipping rates for a shipment request.
    pub async fn get_shipping_rates(
        &self,
        access_token: &str,
        body: &Value,
    ) -> Result<Value, AppError> {
        self.call(access_token, Method::POST, "/shipping/v1/rates", &[], Some(body))
            .await
    }

    /// Purchase a shipment.
    pub async fn purchase_shipment(
        &self,
        access_token: &str,
        body: &Value,
    ) -> Result<Value, AppError> {
        self.call(
            access_token,
            Method::POST,
            "/shipping/v1/shipments",
            &[],
            Some(body),
        )
        .await
    }

    /// Track a purchased shipment.
    pub async fn get_tracking(
        &self,
        access_token: &str,
        tracking_id: &str,
    ) -> Result<Value, AppError> {
        let path = format!("/shipping/v1/tracking/{}", tracking_id);
        self.call(access_token, Method::GET, &path, &[], None).await
    }

    // ─── Fees ────────────────────────────────────────────────────────────

    /// Estimate the fees for a listed SKU at a given price.
    pub async fn get_fees_estimate_for_sku(
        &self,
        access_token: &str,
        sku: &str,
        body: &Value,
    ) -> Result<Value, AppError> {
        let path = format!(
            "/products/fees/v0/listings/{}/feesEstimate",
            urlencoding::encode(sku)
        );
        self.call(access_token, Method::POST, &path, &[], Some(body))
            .await
    }
}

fn listings_path(seller_id: &str, sku: &str) -> String {
    format!(
        "/listings/2021-08-01/items/{}/{}",
        seller_id,
        urlencoding::encode(sku)
    )
}

/// True when a listings submission response carries an issue of severity
/// ERROR, i.e. the submission was flagged rather than fully accepted.
pub fn listing_has_errors(response: &Value) -> bool {
    response["issues"]
        .as_array()
        .map(|issues| {
            issues
                .iter()
                .any(|issue| issue["severity"].as_str() == Some("ERROR"))
        })
        .unwrap_or(false)
}

// ─── Query encoding ──────────────────────────────────────────────────────

/// Serialize query parameters for SP-API.
///
/// Commas (list-valued parameters like `MarketplaceIds`) and colons
/// (ISO-8601 timestamps like `CreatedAfter`) must stay literal; Amazon
/// rejects the `%2C`/`%3A` forms a standard form serializer produces.
/// Everything else outside the unreserved set is `%XX`-escaped.
pub fn encode_query(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, encode_query_value(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 2);
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b',' | b':' => {
                out.push(b as char);
            }
            _ => {
                out.push('%');
                out.push(HEX_UPPER[(b >> 4) as usize] as char);
                out.push(HEX_UPPER[(b & 0x0f) as usize] as char);
            }
        }
    }
    out
}

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

// ─── Typed payloads ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct OrdersEnvelope {
    payload: OrdersPayload,
}

/// One page of the orders listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrdersPayload {
    #[serde(default)]
    pub orders: Vec<AmazonOrder>,
    #[serde(default)]
    pub next_token: Option<String>,
}

/// Order summary as returned by the orders listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AmazonOrder {
    pub amazon_order_id: String,
    #[serde(default)]
    pub purchase_date: Option<String>,
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(default)]
    pub order_total: Option<Money>,
    #[serde(default)]
    pub marketplace_id: Option<String>,
    #[serde(default)]
    pub number_of_items_shipped: Option<u32>,
    #[serde(default)]
    pub number_of_items_unshipped: Option<u32>,
    #[serde(default)]
    pub fulfillment_channel: Option<String>,
    #[serde(default)]
    pub sales_channel: Option<String>,
}

/// Currency-tagged amount; the amount is a decimal string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Money {
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
}

/// Envelope for FBA inventory summaries; the continuation token rides in
/// a sibling of the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct FbaInventoryEnvelope {
    pub payload: FbaInventoryPayload,
    #[serde(default)]
    pub pagination: Option<SpPagination>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FbaInventoryPayload {
    #[serde(default)]
    pub inventory_summaries: Vec<InventorySummary>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpPagination {
    #[serde(default)]
    pub next_token: Option<String>,
}

/// One FBA inventory row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    #[serde(default)]
    pub asin: Option<String>,
    #[serde(default)]
    pub fn_sku: Option<String>,
    #[serde(default)]
    pub seller_sku: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub total_quantity: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_keeps_commas_and_colons_literal() {
        let query = encode_query(&[
            ("MarketplaceIds", "A,B".to_string()),
            ("CreatedAfter", "2025-01-01T00:00:00Z".to_string()),
        ]);
        assert_eq!(
            query,
            "MarketplaceIds=A,B&CreatedAfter=2025-01-01T00:00:00Z"
        );
        assert!(!query.contains("%2C"));
        assert!(!query.contains("%3A"));
    }

    #[test]
    fn query_escapes_everything_else() {
        let query = encode_query(&[("keywords", "blue widget&co/™".to_string())]);
        assert_eq!(query, "keywords=blue%20widget%26co%2F%E2%84%A2");
    }

    #[test]
    fn listing_issue_severity_is_detected() {
        let flagged = serde_json::json!({
            "sku": "SKU-1",
            "status": "INVALID",
            "issues": [
                {"code": "90220", "severity": "WARNING", "message": "missing attribute"},
                {"code": "4000001", "severity": "ERROR", "message": "value rejected"}
            ]
        });
        assert!(listing_has_errors(&flagged));

        let accepted = serde_json::json!({
            "sku": "SKU-1",
            "status": "ACCEPTED",
            "issues": [
                {"code": "90220", "severity": "WARNING", "message": "missing attribute"}
            ]
        });
        assert!(!listing_has_errors(&accepted));

        let no_issues = serde_json::json!({"sku": "SKU-1", "status": "ACCEPTED"});
        assert!(!listing_has_errors(&no_issues));
    }

    #[test]
    fn orders_payload_parses_vendor_casing() {
        let raw = serde_json::json!({
            "payload": {
                "Orders": [{
                    "AmazonOrderId": "111-0000000-0000001",
                    "PurchaseDate": "2025-06-01T10:00:00Z",
                    "OrderStatus": "Shipped",
                    "OrderTotal": {"CurrencyCode": "USD", "Amount": "19.99"}
                }],
                "NextToken": "tok-2"
            }
        });
        let envelope: OrdersEnvelope = serde_json::from_value(raw).unwrap();
        assert_eq!(envelope.payload.orders.len(), 1);
        assert_eq!(envelope.payload.next_token.as_deref(), Some("tok-2"));
        let order = &envelope.payload.orders[0];
        assert_eq!(order.amazon_order_id, "111-0000000-0000001");
        assert_eq!(
            order.order_total.as_ref().unwrap().amount.as_deref(),
            Some("19.99")
        );
    }

    #[test]
    fn inventory_envelope_parses_vendor_casing() {
        let raw = serde_json::json!({
            "payload": {
                "inventorySummaries": [{
                    "asin": "B000000001",
                    "fnSku": "X0000001",
                    "sellerSku": "SKU-1",
                    "totalQuantity": 42
                }]
            },
            "pagination": {"nextToken": "inv-2"}
        });
        let envelope: FbaInventoryEnvelope = serde_json::from_value(raw).unwrap();
        assert_eq!(envelope.payload.inventory_summaries.len(), 1);
        assert_eq!(
            envelope.payload.inventory_summaries[0].seller_sku.as_deref(),
            Some("SKU-1")
        );
        assert_eq!(
            envelope.pagination.unwrap().next_token.as_deref(),
            Some("inv-2")
        );
    }

    // ── HTTP integration tests (with mockito) ──────────────────────────

    #[tokio::test]
    async fn call_sends_user_agent_and_access_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/sellers/v1/marketplaceParticipations")
            .match_header("x-amz-access-token", "at-1")
            .match_header("user-agent", SPAPI_USER_AGENT)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"payload": []}"#)
            .create_async()
            .await;

        let client = SpApiClient::new(server.url());
        let value = client.get_marketplace_participations("at-1").await.unwrap();
        assert!(value["payload"].is_array());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_2xx_becomes_typed_error_with_raw_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/orders/v0/orders/111-1")
            .with_status(403)
            .with_body(r#"{"errors":[{"code":"Unauthorized"}]}"#)
            .create_async()
            .await;

        let client = SpApiClient::new(server.url());
        let err = client.get_order("at-1", "111-1").await.unwrap_err();
        match err {
            AppError::SpApi { path, status, body } => {
                assert_eq!(path, "/orders/v0/orders/111-1");
                assert_eq!(status, 403);
                assert!(body.contains("Unauthorized"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
