// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local mirror of vendor inventory rows.

use serde::{Deserialize, Serialize};

use super::Channel;

/// Inventory mirror, keyed by (user, sku, channel).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub user_id: String,
    pub channel: Channel,
    pub sku: String,
    pub asin: Option<String>,
    pub fnsku: Option<String>,
    pub condition: Option<String>,
    pub product_name: Option<String>,
    pub quantity: i64,
    /// When this mirror row was last refreshed (RFC 3339)
    pub synced_at: String,
}

impl InventoryItem {
    pub fn doc_id(&self) -> String {
        format!(
            "{}_{}_{}",
            urlencoding::encode(&self.user_id),
            urlencoding::encode(&self.sku),
            self.channel.slug()
        )
    }
}
