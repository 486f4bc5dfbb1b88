// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User-facing notifications (connection events, sync results).

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Notification mirror, keyed by (user, notification id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: String,
    pub notification_id: String,
    /// Short machine-readable kind, e.g. `channel_connected`
    pub kind: String,
    pub message: String,
    pub read: bool,
    pub created_at: String,
}

impl Notification {
    /// Build a new unread notification with a timestamp-derived id.
    pub fn new(user_id: &str, kind: &str, message: String) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.to_string(),
            notification_id: format!("{}-{}", kind, now.timestamp_millis()),
            kind: kind.to_string(),
            message,
            read: false,
            created_at: now.to_rfc3339(),
        }
    }

    pub fn doc_id(&self) -> String {
        format!(
            "{}_{}",
            urlencoding::encode(&self.user_id),
            self.notification_id
        )
    }
}
