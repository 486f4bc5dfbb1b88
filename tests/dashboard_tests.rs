// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard aggregation tests.
//!
//! The build fans out four SP-API calls and settles all of them: one
//! failing section must not take down the others, and the fetched
//! orders are mirrored into the local store as a side effect.

use std::sync::Arc;

use mockito::Matcher;
use sellerdesk::db::{MemoryStore, SellerStore};

mod common;

fn participations_body() -> String {
    serde_json::json!({
        "payload": [{
            "marketplace": {"id": "MKTPLC1", "name": "Amazon.com"},
            "participation": {"isParticipating": true}
        }]
    })
    .to_string()
}

fn orders_body() -> String {
    serde_json::json!({
        "payload": {
            "Orders": [
                {
                    "AmazonOrderId": "111-0000001",
                    "PurchaseDate": "2025-07-20T08:00:00Z",
                    "OrderStatus": "Shipped",
                    "OrderTotal": {"CurrencyCode": "USD", "Amount": "10.50"}
                },
                {
                    "AmazonOrderId": "111-0000002",
                    "PurchaseDate": "2025-07-21T08:00:00Z",
                    "OrderStatus": "Unshipped",
                    "OrderTotal": {"CurrencyCode": "USD", "Amount": "5.25"}
                }
            ]
        }
    })
    .to_string()
}

fn inventory_body() -> String {
    serde_json::json!({
        "payload": {
            "inventorySummaries": [
                {"sellerSku": "SKU-1", "totalQuantity": 3},
                {"sellerSku": "SKU-2", "totalQuantity": 4}
            ]
        }
    })
    .to_string()
}

#[tokio::test]
async fn one_failed_section_degrades_only_that_section() {
    let mut spapi = mockito::Server::new_async().await;

    let seller = spapi
        .mock("GET", "/sellers/v1/marketplaceParticipations")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(participations_body())
        .create_async()
        .await;
    let orders = spapi
        .mock("GET", "/orders/v0/orders")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(orders_body())
        .create_async()
        .await;
    let inventory = spapi
        .mock("GET", "/fba/inventory/v1/summaries")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(inventory_body())
        .create_async()
        .await;
    let finances = spapi
        .mock("GET", "/finances/v0/financialEventGroups")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body(r#"{"errors":[{"code":"InternalFailure"}]}"#)
        .create_async()
        .await;

    let config = common::test_config("http://127.0.0.1:1", &spapi.url());
    let store = Arc::new(MemoryStore::new());
    let service = common::test_service(&config, &store);

    store
        .upsert_connection(&common::amazon_connection("u1", Some("at-1"), 3600, "rt-1"))
        .await
        .unwrap();

    let dashboard = service.build_dashboard("u1").await.unwrap();

    assert!(dashboard.connected);
    assert_eq!(dashboard.errors.len(), 1);
    assert_eq!(dashboard.errors[0].section, "finances");
    assert!(dashboard.financial_event_groups.is_empty());

    // The other three sections kept their data.
    assert!(dashboard.seller.is_some());
    assert_eq!(dashboard.orders.len(), 2);
    assert_eq!(dashboard.inventory.len(), 2);

    // Derived metrics come from the fulfilled sections.
    assert!((dashboard.metrics.total_revenue - 15.75).abs() < f64::EPSILON);
    assert_eq!(dashboard.metrics.shipped_count, 1);
    assert_eq!(dashboard.metrics.pending_count, 1);
    assert_eq!(dashboard.metrics.total_units, 7);
    assert_eq!(dashboard.metrics.distinct_skus, 2);

    // Cache-refresh side effect: fetched orders were mirrored.
    let cached = store.orders_for_user("u1", 100).await.unwrap();
    assert_eq!(cached.len(), 2);
    assert!(cached
        .iter()
        .any(|o| o.marketplace_order_id == "111-0000001"));

    seller.assert_async().await;
    orders.assert_async().await;
    inventory.assert_async().await;
    finances.assert_async().await;
}

#[tokio::test]
async fn disconnected_user_gets_a_disconnected_dashboard() {
    let config = common::test_config("http://127.0.0.1:1", "http://127.0.0.1:1");
    let store = Arc::new(MemoryStore::new());
    let service = common::test_service(&config, &store);

    let dashboard = service.build_dashboard("nobody").await.unwrap();

    assert!(!dashboard.connected);
    assert!(dashboard.orders.is_empty());
    assert!(dashboard.inventory.is_empty());
    assert!(dashboard.errors.is_empty());
}

#[tokio::test]
async fn all_sections_failing_still_returns_a_connected_dashboard() {
    let spapi = mockito::Server::new_async().await;
    // No mocks for the section endpoints: every call 501s.

    let config = common::test_config("http://127.0.0.1:1", &spapi.url());
    let store = Arc::new(MemoryStore::new());
    let service = common::test_service(&config, &store);

    store
        .upsert_connection(&common::amazon_connection("u1", Some("at-1"), 3600, "rt-1"))
        .await
        .unwrap();

    let dashboard = service.build_dashboard("u1").await.unwrap();

    assert!(dashboard.connected);
    assert_eq!(dashboard.errors.len(), 4);
    assert!(dashboard.orders.is_empty());
    assert!(dashboard.inventory.is_empty());
    assert_eq!(dashboard.metrics.order_count, 0);
}
