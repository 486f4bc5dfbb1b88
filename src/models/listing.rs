// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local mirror of vendor listings.

use serde::{Deserialize, Serialize};

use super::Channel;

/// Listing mirror, keyed by (user, sku, channel).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub user_id: String,
    pub channel: Channel,
    pub sku: String,
    pub marketplace_id: Option<String>,
    /// Vendor-reported listing status (e.g. `ACTIVE`, `SUBMITTED`)
    pub status: Option<String>,
    pub title: Option<String>,
    /// Raw vendor payload for the listing (summaries, attributes)
    pub payload: Option<serde_json::Value>,
    /// When this mirror row was last refreshed (RFC 3339)
    pub synced_at: String,
}

impl Listing {
    pub fn doc_id(&self) -> String {
        format!(
            "{}_{}_{}",
            urlencoding::encode(&self.user_id),
            urlencoding::encode(&self.sku),
            self.channel.slug()
        )
    }
}
