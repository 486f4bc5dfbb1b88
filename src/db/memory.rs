// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store implementation.
//!
//! Backed by `DashMap`s keyed by the same composite document IDs as the
//! Firestore backend, so upsert/select semantics match. Used by tests
//! and local development without GCP credentials.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::db::SellerStore;
use crate::error::AppError;
use crate::models::{
    Channel, ChannelConnection, FinancialEventGroupRecord, InventoryItem, Listing, Notification,
    Order,
};

#[derive(Default)]
pub struct MemoryStore {
    connections: DashMap<String, ChannelConnection>,
    orders: DashMap<String, Order>,
    inventory: DashMap<String, InventoryItem>,
    listings: DashMap<String, Listing>,
    financial_event_groups: DashMap<String, FinancialEventGroupRecord>,
    notifications: DashMap<String, Notification>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_where<T: Clone>(
        map: &DashMap<String, T>,
        matches: impl Fn(&T) -> bool,
        mut sort: impl FnMut(&T, &T) -> std::cmp::Ordering,
        limit: u32,
    ) -> Vec<T> {
        let mut rows: Vec<T> = map
            .iter()
            .filter(|entry| matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by(|a, b| sort(a, b));
        rows.truncate(limit as usize);
        rows
    }
}

#[async_trait]
impl SellerStore for MemoryStore {
    async fn get_connection(
        &self,
        user_id: &str,
        channel: Channel,
    ) -> Result<Option<ChannelConnection>, AppError> {
        Ok(self
            .connections
            .get(&ChannelConnection::doc_id_for(user_id, channel))
            .map(|entry| entry.value().clone()))
    }

    async fn upsert_connection(&self, conn: &ChannelConnection) -> Result<(), AppError> {
        self.connections.insert(conn.doc_id(), conn.clone());
        Ok(())
    }

    async fn list_connections(&self, user_id: &str) -> Result<Vec<ChannelConnection>, AppError> {
        let mut rows: Vec<ChannelConnection> = self
            .connections
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|c| c.channel.slug());
        Ok(rows)
    }

    async fn upsert_order(&self, order: &Order) -> Result<(), AppError> {
        self.orders.insert(order.doc_id(), order.clone());
        Ok(())
    }

    async fn orders_for_user(&self, user_id: &str, limit: u32) -> Result<Vec<Order>, AppError> {
        Ok(Self::collect_where(
            &self.orders,
            |o| o.user_id == user_id,
            |a, b| b.purchase_date.cmp(&a.purchase_date),
            limit,
        ))
    }

    async fn upsert_inventory_item(&self, item: &InventoryItem) -> Result<(), AppError> {
        self.inventory.insert(item.doc_id(), item.clone());
        Ok(())
    }

    async fn inventory_for_user(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<InventoryItem>, AppError> {
        Ok(Self::collect_where(
            &self.inventory,
            |i| i.user_id == user_id,
            |a, b| a.sku.cmp(&b.sku),
            limit,
        ))
    }

    async fn upsert_listing(&self, listing: &Listing) -> Result<(), AppError> {
        self.listings.insert(listing.doc_id(), listing.clone());
        Ok(())
    }

    async fn listings_for_user(&self, user_id: &str) -> Result<Vec<Listing>, AppError> {
        Ok(Self::collect_where(
            &self.listings,
            |l| l.user_id == user_id,
            |a, b| a.sku.cmp(&b.sku),
            u32::MAX,
        ))
    }

    async fn upsert_financial_event_group(
        &self,
        record: &FinancialEventGroupRecord,
    ) -> Result<(), AppError> {
        self.financial_event_groups
            .insert(record.doc_id(), record.clone());
        Ok(())
    }

    async fn upsert_notification(&self, notification: &Notification) -> Result<(), AppError> {
        self.notifications
            .insert(notification.doc_id(), notification.clone());
        Ok(())
    }

    async fn notifications_for_user(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<Notification>, AppError> {
        Ok(Self::collect_where(
            &self.notifications,
            |n| n.user_id == user_id,
            |a, b| b.created_at.cmp(&a.created_at),
            limit,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConnectionStatus;

    fn connection(user_id: &str) -> ChannelConnection {
        let mut conn = ChannelConnection::placeholder(user_id, Channel::Amazon);
        conn.connected = true;
        conn.status = ConnectionStatus::Connected;
        conn.refresh_token = Some("rt".to_string());
        conn
    }

    #[tokio::test]
    async fn upsert_twice_keeps_one_row() {
        let store = MemoryStore::new();
        let mut conn = connection("u1");
        store.upsert_connection(&conn).await.unwrap();

        conn.store_name = Some("My Store".to_string());
        store.upsert_connection(&conn).await.unwrap();

        let rows = store.list_connections("u1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].store_name.as_deref(), Some("My Store"));
    }

    #[tokio::test]
    async fn clear_tokens_keeps_the_row() {
        let store = MemoryStore::new();
        let mut conn = connection("u1");
        conn.access_token = Some("at".to_string());
        store.upsert_connection(&conn).await.unwrap();

        store.clear_tokens("u1", Channel::Amazon).await.unwrap();

        let row = store
            .get_connection("u1", Channel::Amazon)
            .await
            .unwrap()
            .expect("row survives disconnect");
        assert!(!row.connected);
        assert_eq!(row.status, ConnectionStatus::Disconnected);
        assert!(row.access_token.is_none());
        assert!(row.refresh_token.is_none());
    }
}
