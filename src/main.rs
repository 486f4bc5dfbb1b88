// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sellerdesk API Server
//!
//! Backend for a multi-channel seller dashboard: connects Amazon seller
//! accounts over LWA/SP-API and aggregates orders, inventory, and
//! finances for the frontend.

use sellerdesk::{
    config::Config,
    db::{FirestoreStore, MemoryStore, SellerStore},
    services::AmazonService,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Sellerdesk API");

    // Initialize the store backend
    let store: Arc<dyn SellerStore> = if config.store_backend == "memory" {
        tracing::warn!("Using in-memory store; data will not survive restarts");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(
            FirestoreStore::new(&config.gcp_project_id)
                .await
                .expect("Failed to connect to Firestore"),
        )
    };

    // Initialize the Amazon service
    let amazon = AmazonService::new(&config, store.clone());
    tracing::info!(
        endpoint = %config.spapi_endpoint,
        marketplace = %config.default_marketplace_id,
        "Amazon service initialized"
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        amazon,
    });

    // Build router
    let app = sellerdesk::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sellerdesk=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
