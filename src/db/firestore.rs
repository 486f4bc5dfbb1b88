// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore-backed store implementation.
//!
//! Documents are keyed by each model's composite natural key, so a
//! Firestore `update` (upsert) gives us upsert-on-conflict semantics
//! without transactions.

use async_trait::async_trait;

use crate::db::{collections, SellerStore};
use crate::error::AppError;
use crate::models::{
    Channel, ChannelConnection, FinancialEventGroupRecord, InventoryItem, Listing, Notification,
    Order,
};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreStore {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a disconnected client (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    async fn upsert_by_id<T: serde::Serialize + for<'de> serde::Deserialize<'de> + Send + Sync>(
        &self,
        collection: &str,
        doc_id: &str,
        value: &T,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(doc_id)
            .object(value)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn for_user<T>(
        &self,
        collection: &str,
        user_id: &str,
        order_field: &str,
        limit: u32,
    ) -> Result<Vec<T>, AppError>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(move |q| q.for_all([q.field("user_id").eq(user_id.clone())]))
            .order_by([(
                order_field,
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl SellerStore for FirestoreStore {
    async fn get_connection(
        &self,
        user_id: &str,
        channel: Channel,
    ) -> Result<Option<ChannelConnection>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CONNECTIONS)
            .obj()
            .one(&ChannelConnection::doc_id_for(user_id, channel))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert_connection(&self, conn: &ChannelConnection) -> Result<(), AppError> {
        self.upsert_by_id(collections::CONNECTIONS, &conn.doc_id(), conn)
            .await
    }

    async fn list_connections(&self, user_id: &str) -> Result<Vec<ChannelConnection>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CONNECTIONS)
            .filter(move |q| q.for_all([q.field("user_id").eq(user_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert_order(&self, order: &Order) -> Result<(), AppError> {
        self.upsert_by_id(collections::ORDERS, &order.doc_id(), order)
            .await
    }

    async fn orders_for_user(&self, user_id: &str, limit: u32) -> Result<Vec<Order>, AppError> {
        self.for_user(collections::ORDERS, user_id, "purchase_date", limit)
            .await
    }

    async fn upsert_inventory_item(&self, item: &InventoryItem) -> Result<(), AppError> {
        self.upsert_by_id(collections::INVENTORY, &item.doc_id(), item)
            .await
    }

    async fn inventory_for_user(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<InventoryItem>, AppError> {
        self.for_user(collections::INVENTORY, user_id, "sku", limit)
            .await
    }

    async fn upsert_listing(&self, listing: &Listing) -> Result<(), AppError> {
        self.upsert_by_id(collections::LISTINGS, &listing.doc_id(), listing)
            .await
    }

    async fn listings_for_user(&self, user_id: &str) -> Result<Vec<Listing>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::LISTINGS)
            .filter(move |q| q.for_all([q.field("user_id").eq(user_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert_financial_event_group(
        &self,
        record: &FinancialEventGroupRecord,
    ) -> Result<(), AppError> {
        self.upsert_by_id(collections::FINANCIAL_EVENT_GROUPS, &record.doc_id(), record)
            .await
    }

    async fn upsert_notification(&self, notification: &Notification) -> Result<(), AppError> {
        self.upsert_by_id(collections::NOTIFICATIONS, &notification.doc_id(), notification)
            .await
    }

    async fn notifications_for_user(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<Notification>, AppError> {
        self.for_user(collections::NOTIFICATIONS, user_id, "created_at", limit)
            .await
    }
}
