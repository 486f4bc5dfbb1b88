// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sellerdesk: multi-channel e-commerce seller dashboard backend.
//!
//! This crate provides the backend API for an Amazon-first seller
//! dashboard: LWA token lifecycle, SP-API access, and aggregation of
//! orders, inventory, and finances into a single dashboard payload.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use config::Config;
use db::SellerStore;
use services::AmazonService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn SellerStore>,
    pub amazon: AmazonService,
}
