// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pagination tests for the full order and inventory syncs.
//!
//! The loops must follow continuation tokens to exhaustion, and stop
//! fetching once the configured cap has accumulated.

use mockito::Matcher;
use sellerdesk::services::SpApiClient;

fn orders_page(ids: &[&str], next_token: Option<&str>) -> String {
    let orders: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "AmazonOrderId": id,
                "OrderStatus": "Shipped",
                "OrderTotal": {"CurrencyCode": "USD", "Amount": "10.00"}
            })
        })
        .collect();
    let mut payload = serde_json::json!({ "Orders": orders });
    if let Some(token) = next_token {
        payload["NextToken"] = serde_json::json!(token);
    }
    serde_json::json!({ "payload": payload }).to_string()
}

fn inventory_page(skus: &[&str], next_token: Option<&str>) -> String {
    let summaries: Vec<serde_json::Value> = skus
        .iter()
        .map(|sku| serde_json::json!({"sellerSku": sku, "totalQuantity": 1}))
        .collect();
    let mut body = serde_json::json!({
        "payload": { "inventorySummaries": summaries }
    });
    if let Some(token) = next_token {
        body["pagination"] = serde_json::json!({ "nextToken": token });
    }
    body.to_string()
}

#[tokio::test]
async fn orders_follow_three_pages_then_stop() {
    let mut server = mockito::Server::new_async().await;

    // The NextToken parameter is appended last, so anchoring on the
    // query tail keeps the three page mocks mutually exclusive.
    let page1 = server
        .mock("GET", "/orders/v0/orders")
        .match_query(Matcher::Regex("CreatedAfter=2025-01-01T00:00:00Z$".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(orders_page(&["o-1", "o-2"], Some("t2")))
        .expect(1)
        .create_async()
        .await;
    let page2 = server
        .mock("GET", "/orders/v0/orders")
        .match_query(Matcher::Regex("NextToken=t2$".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(orders_page(&["o-3", "o-4"], Some("t3")))
        .expect(1)
        .create_async()
        .await;
    let page3 = server
        .mock("GET", "/orders/v0/orders")
        .match_query(Matcher::Regex("NextToken=t3$".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(orders_page(&["o-5", "o-6"], None))
        .expect(1)
        .create_async()
        .await;

    let client = SpApiClient::new(server.url());
    let orders = client
        .get_all_orders(
            "at-1",
            &["MKTPLC1".to_string()],
            "2025-01-01T00:00:00Z",
            2000,
        )
        .await
        .unwrap();

    let ids: Vec<&str> = orders.iter().map(|o| o.amazon_order_id.as_str()).collect();
    assert_eq!(ids, vec!["o-1", "o-2", "o-3", "o-4", "o-5", "o-6"]);

    page1.assert_async().await;
    page2.assert_async().await;
    page3.assert_async().await;
}

#[tokio::test]
async fn order_cap_stops_the_continuation_chain() {
    let mut server = mockito::Server::new_async().await;

    let page1 = server
        .mock("GET", "/orders/v0/orders")
        .match_query(Matcher::Regex("CreatedAfter=2025-01-01T00:00:00Z$".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(orders_page(&["o-1", "o-2"], Some("t2")))
        .expect(1)
        .create_async()
        .await;
    let page2 = server
        .mock("GET", "/orders/v0/orders")
        .match_query(Matcher::Regex("NextToken=t2$".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(orders_page(&["o-3", "o-4"], Some("t3")))
        .expect(1)
        .create_async()
        .await;
    // A buggy or runaway chain would keep going; the cap must not.
    let page3 = server
        .mock("GET", "/orders/v0/orders")
        .match_query(Matcher::Regex("NextToken=t3$".to_string()))
        .expect(0)
        .create_async()
        .await;

    let client = SpApiClient::new(server.url());
    let orders = client
        .get_all_orders(
            "at-1",
            &["MKTPLC1".to_string()],
            "2025-01-01T00:00:00Z",
            4,
        )
        .await
        .unwrap();

    assert_eq!(orders.len(), 4);
    page1.assert_async().await;
    page2.assert_async().await;
    page3.assert_async().await;
}

#[tokio::test]
async fn inventory_follows_three_pages_then_stops() {
    let mut server = mockito::Server::new_async().await;

    let page1 = server
        .mock("GET", "/fba/inventory/v1/summaries")
        .match_query(Matcher::Regex("marketplaceIds=MKTPLC1$".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(inventory_page(&["SKU-1", "SKU-2"], Some("i2")))
        .expect(1)
        .create_async()
        .await;
    let page2 = server
        .mock("GET", "/fba/inventory/v1/summaries")
        .match_query(Matcher::Regex("nextToken=i2$".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(inventory_page(&["SKU-3"], Some("i3")))
        .expect(1)
        .create_async()
        .await;
    let page3 = server
        .mock("GET", "/fba/inventory/v1/summaries")
        .match_query(Matcher::Regex("nextToken=i3$".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(inventory_page(&["SKU-4"], None))
        .expect(1)
        .create_async()
        .await;

    let client = SpApiClient::new(server.url());
    let summaries = client
        .get_all_fba_inventory("at-1", "MKTPLC1", 500)
        .await
        .unwrap();

    let skus: Vec<&str> = summaries
        .iter()
        .filter_map(|s| s.seller_sku.as_deref())
        .collect();
    assert_eq!(skus, vec!["SKU-1", "SKU-2", "SKU-3", "SKU-4"]);

    page1.assert_async().await;
    page2.assert_async().await;
    page3.assert_async().await;
}

#[tokio::test]
async fn inventory_cap_stops_the_continuation_chain() {
    let mut server = mockito::Server::new_async().await;

    let page1 = server
        .mock("GET", "/fba/inventory/v1/summaries")
        .match_query(Matcher::Regex("marketplaceIds=MKTPLC1$".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(inventory_page(&["SKU-1", "SKU-2", "SKU-3"], Some("i2")))
        .expect(1)
        .create_async()
        .await;
    let page2 = server
        .mock("GET", "/fba/inventory/v1/summaries")
        .match_query(Matcher::Regex("nextToken=i2$".to_string()))
        .expect(0)
        .create_async()
        .await;

    let client = SpApiClient::new(server.url());
    let summaries = client
        .get_all_fba_inventory("at-1", "MKTPLC1", 3)
        .await
        .unwrap();

    assert_eq!(summaries.len(), 3);
    page1.assert_async().await;
    page2.assert_async().await;
}
