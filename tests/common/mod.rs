// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for integration tests: a config pointed at mock
//! servers, an in-memory store, and connection fixtures.

use std::sync::Arc;

use chrono::{Duration, Utc};
use sellerdesk::config::Config;
use sellerdesk::db::{MemoryStore, SellerStore};
use sellerdesk::middleware::auth::create_jwt;
use sellerdesk::models::{Channel, ChannelConnection, ConnectionStatus};
use sellerdesk::routes::create_router;
use sellerdesk::services::AmazonService;
use sellerdesk::AppState;

/// Test config with LWA and SP-API pointed at mock servers.
#[allow(dead_code)]
pub fn test_config(lwa_url: &str, spapi_url: &str) -> Config {
    let mut config = Config::test_default();
    config.lwa_token_url = format!("{}/auth/o2/token", lwa_url);
    config.spapi_endpoint = spapi_url.to_string();
    config
}

/// Amazon service over an in-memory store.
#[allow(dead_code)]
pub fn test_service(config: &Config, store: &Arc<MemoryStore>) -> AmazonService {
    let store: Arc<dyn SellerStore> = store.clone();
    AmazonService::new(config, store)
}

/// A connected Amazon row with the given cached token state.
#[allow(dead_code)]
pub fn amazon_connection(
    user_id: &str,
    access_token: Option<&str>,
    expires_in_secs: i64,
    refresh_token: &str,
) -> ChannelConnection {
    let now = Utc::now();
    let mut conn = ChannelConnection::placeholder(user_id, Channel::Amazon);
    conn.connected = true;
    conn.status = ConnectionStatus::Connected;
    conn.seller_id = Some("SELLER1".to_string());
    conn.marketplace_id = Some("MKTPLC1".to_string());
    conn.access_token = access_token.map(str::to_string);
    conn.refresh_token = Some(refresh_token.to_string());
    conn.token_expires_at = Some((now + Duration::seconds(expires_in_secs)).to_rfc3339());
    conn
}

/// Build the full app router over an in-memory store.
#[allow(dead_code)]
pub fn create_test_app(config: Config, store: &Arc<MemoryStore>) -> (axum::Router, Arc<AppState>) {
    let amazon = test_service(&config, store);
    let store_dyn: Arc<dyn SellerStore> = store.clone();
    let state = Arc::new(AppState {
        config,
        store: store_dyn,
        amazon,
    });
    (create_router(state.clone()), state)
}

/// Bearer token for an authenticated test request.
#[allow(dead_code)]
pub fn bearer(config: &Config, user_id: &str) -> String {
    format!(
        "Bearer {}",
        create_jwt(user_id, &config.jwt_signing_key).expect("JWT creation failed")
    )
}
