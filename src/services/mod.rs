// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod amazon;
pub mod lwa;
pub mod spapi;

pub use amazon::{AggregatedDashboard, AmazonService, DashboardMetrics, ListingSubmission};
pub use lwa::{LwaClient, LwaTokenResponse};
pub use spapi::SpApiClient;
