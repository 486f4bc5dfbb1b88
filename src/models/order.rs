// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local mirrors of vendor order and finance resources.
//!
//! These are best-effort caches refreshed on each sync; the marketplace
//! API remains the source of truth.

use serde::{Deserialize, Serialize};

use super::Channel;

/// Order mirror, keyed by (user, vendor order id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub user_id: String,
    pub channel: Channel,
    /// Vendor order id (e.g. Amazon order id `xxx-xxxxxxx-xxxxxxx`)
    pub marketplace_order_id: String,
    pub marketplace_id: Option<String>,
    pub status: Option<String>,
    pub purchase_date: Option<String>,
    /// Order total as reported by the vendor (decimal string)
    pub total_amount: Option<String>,
    pub currency: Option<String>,
    pub items_shipped: Option<u32>,
    pub items_unshipped: Option<u32>,
    /// When this mirror row was last refreshed (RFC 3339)
    pub synced_at: String,
}

impl Order {
    pub fn doc_id(&self) -> String {
        format!(
            "{}_{}",
            urlencoding::encode(&self.user_id),
            self.marketplace_order_id
        )
    }
}

/// Financial event group mirror, keyed by (user, event group id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialEventGroupRecord {
    pub user_id: String,
    pub channel: Channel,
    pub event_group_id: String,
    pub processing_status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub total_amount: Option<String>,
    pub currency: Option<String>,
    pub synced_at: String,
}

impl FinancialEventGroupRecord {
    pub fn doc_id(&self) -> String {
        format!(
            "{}_{}",
            urlencoding::encode(&self.user_id),
            self.event_group_id
        )
    }
}
