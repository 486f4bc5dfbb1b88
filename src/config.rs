// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! All external endpoints are configurable so tests can point the
//! clients at a local mock server.

use std::env;

/// Default SP-API endpoint (North America region).
pub const DEFAULT_SPAPI_ENDPOINT: &str = "https://sellingpartnerapi-na.amazon.com";
/// Default LWA token endpoint.
pub const DEFAULT_LWA_TOKEN_URL: &str = "https://api.amazon.com/auth/o2/token";
/// Default marketplace (Amazon.com) used until a connection reports its own.
pub const DEFAULT_MARKETPLACE_ID: &str = "ATVPDKIKX0DER";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// SP-API application id (used in the Seller Central consent URL)
    pub lwa_app_id: String,
    /// LWA OAuth client id
    pub lwa_client_id: String,
    /// LWA OAuth client secret
    pub lwa_client_secret: String,
    /// LWA token endpoint
    pub lwa_token_url: String,
    /// SP-API endpoint base URL
    pub spapi_endpoint: String,
    /// Marketplace id used when a connection has none recorded
    pub default_marketplace_id: String,
    /// Frontend URL for OAuth redirects
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Store backend: "firestore" (default) or "memory" for local dev
    pub store_backend: String,
    /// Server port
    pub port: u16,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// HMAC key for signing the OAuth state parameter
    pub oauth_state_key: Vec<u8>,
    /// Pagination safety cap for full order syncs
    pub order_sync_cap: usize,
    /// Pagination safety cap for full inventory syncs
    pub inventory_sync_cap: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            lwa_app_id: env::var("LWA_APP_ID").map_err(|_| ConfigError::Missing("LWA_APP_ID"))?,
            lwa_client_id: env::var("LWA_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("LWA_CLIENT_ID"))?,
            lwa_client_secret: env::var("LWA_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("LWA_CLIENT_SECRET"))?,
            lwa_token_url: env::var("LWA_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_LWA_TOKEN_URL.to_string()),
            spapi_endpoint: env::var("SPAPI_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_SPAPI_ENDPOINT.to_string()),
            default_marketplace_id: env::var("SPAPI_MARKETPLACE_ID")
                .unwrap_or_else(|_| DEFAULT_MARKETPLACE_ID.to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            store_backend: env::var("STORE_BACKEND").unwrap_or_else(|_| "firestore".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            oauth_state_key: env::var("OAUTH_STATE_KEY")
                .map_err(|_| ConfigError::Missing("OAUTH_STATE_KEY"))?
                .into_bytes(),
            order_sync_cap: env_cap("ORDER_SYNC_CAP", 2000),
            inventory_sync_cap: env_cap("INVENTORY_SYNC_CAP", 500),
        })
    }

    /// Default config for tests.
    pub fn test_default() -> Self {
        Self {
            lwa_app_id: "amzn1.sp.solution.test-app".to_string(),
            lwa_client_id: "amzn1.application-oa2-client.test".to_string(),
            lwa_client_secret: "test_secret".to_string(),
            lwa_token_url: DEFAULT_LWA_TOKEN_URL.to_string(),
            spapi_endpoint: DEFAULT_SPAPI_ENDPOINT.to_string(),
            default_marketplace_id: DEFAULT_MARKETPLACE_ID.to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            store_backend: "memory".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            oauth_state_key: b"test_state_key".to_vec(),
            order_sync_cap: 2000,
            inventory_sync_cap: 500,
        }
    }
}

fn env_cap(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
