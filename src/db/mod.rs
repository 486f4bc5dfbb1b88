// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistence layer.
//!
//! `SellerStore` is the seam between the application and the row store:
//! upsert-by-natural-key writes and filtered selects, nothing more.
//! Production uses [`FirestoreStore`]; tests and local development use
//! [`MemoryStore`].

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::AppError;
use crate::models::{
    Channel, ChannelConnection, ConnectionStatus, FinancialEventGroupRecord, InventoryItem,
    Listing, Notification, Order,
};

/// Collection names as constants.
pub mod collections {
    pub const CONNECTIONS: &str = "channel_connections";
    pub const ORDERS: &str = "orders";
    pub const INVENTORY: &str = "inventory_items";
    pub const LISTINGS: &str = "listings";
    pub const FINANCIAL_EVENT_GROUPS: &str = "financial_event_groups";
    pub const NOTIFICATIONS: &str = "notifications";
}

/// Row-store operations used by the application.
///
/// Every upsert is keyed by the model's composite natural key (its
/// `doc_id()`), so writing twice for the same key can never produce two
/// rows. Absent is `Ok(None)`, never an error.
#[async_trait]
pub trait SellerStore: Send + Sync {
    async fn get_connection(
        &self,
        user_id: &str,
        channel: Channel,
    ) -> Result<Option<ChannelConnection>, AppError>;

    async fn upsert_connection(&self, conn: &ChannelConnection) -> Result<(), AppError>;

    async fn list_connections(&self, user_id: &str) -> Result<Vec<ChannelConnection>, AppError>;

    /// Null out the token fields and mark the connection disconnected.
    /// The row itself is kept; connections are never hard-deleted.
    async fn clear_tokens(&self, user_id: &str, channel: Channel) -> Result<(), AppError> {
        if let Some(mut conn) = self.get_connection(user_id, channel).await? {
            conn.access_token = None;
            conn.refresh_token = None;
            conn.token_expires_at = None;
            conn.connected = false;
            conn.status = ConnectionStatus::Disconnected;
            conn.updated_at = Utc::now().to_rfc3339();
            self.upsert_connection(&conn).await?;
        }
        Ok(())
    }

    async fn upsert_order(&self, order: &Order) -> Result<(), AppError>;

    async fn orders_for_user(&self, user_id: &str, limit: u32) -> Result<Vec<Order>, AppError>;

    async fn upsert_inventory_item(&self, item: &InventoryItem) -> Result<(), AppError>;

    async fn inventory_for_user(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<InventoryItem>, AppError>;

    async fn upsert_listing(&self, listing: &Listing) -> Result<(), AppError>;

    async fn listings_for_user(&self, user_id: &str) -> Result<Vec<Listing>, AppError>;

    async fn upsert_financial_event_group(
        &self,
        record: &FinancialEventGroupRecord,
    ) -> Result<(), AppError>;

    async fn upsert_notification(&self, notification: &Notification) -> Result<(), AppError>;

    async fn notifications_for_user(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<Notification>, AppError>;
}
