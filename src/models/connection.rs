// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Channel connection model: one record per (user, channel).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sales channel a user can connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Amazon,
    #[serde(rename = "eBay")]
    Ebay,
    Shopify,
}

impl Channel {
    /// Stable lowercase identifier used in document IDs and routes.
    pub fn slug(self) -> &'static str {
        match self {
            Channel::Amazon => "amazon",
            Channel::Ebay => "ebay",
            Channel::Shopify => "shopify",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "amazon" => Some(Channel::Amazon),
            "ebay" => Some(Channel::Ebay),
            "shopify" => Some(Channel::Shopify),
            _ => None,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Channel::Amazon => "Amazon",
            Channel::Ebay => "eBay",
            Channel::Shopify => "Shopify",
        };
        f.write_str(name)
    }
}

/// Connection status string, kept alongside the `connected` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

/// A user's connection to a sales channel, stored one document per
/// (user, channel). The document ID is `{user_id}_{channel_slug}` so a
/// repeated upsert can never produce a second row for the same pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConnection {
    pub user_id: String,
    pub channel: Channel,
    pub connected: bool,
    pub status: ConnectionStatus,
    /// Store/display name reported by the channel
    pub store_name: Option<String>,
    /// Seller identifier on the channel (e.g. selling partner id)
    pub seller_id: Option<String>,
    /// Marketplace identifier used for API calls
    pub marketplace_id: Option<String>,
    /// Short-lived access token (opaque, secret)
    pub access_token: Option<String>,
    /// Long-lived refresh token (opaque, secret)
    pub refresh_token: Option<String>,
    /// Access token expiry (RFC 3339)
    pub token_expires_at: Option<String>,
    /// Free-form credentials blob (e.g. raw marketplace participations)
    pub credentials: Option<serde_json::Value>,
    /// When the connection was first created (RFC 3339)
    pub created_at: String,
    /// Last mutation timestamp (RFC 3339)
    pub updated_at: String,
}

impl ChannelConnection {
    pub fn doc_id(&self) -> String {
        Self::doc_id_for(&self.user_id, self.channel)
    }

    pub fn doc_id_for(user_id: &str, channel: Channel) -> String {
        format!("{}_{}", urlencoding::encode(user_id), channel.slug())
    }

    /// Parsed access-token expiry, if one is recorded.
    pub fn token_expiry(&self) -> Option<DateTime<Utc>> {
        self.token_expires_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// A disconnected placeholder row, used when listing channels a user
    /// has never connected.
    pub fn placeholder(user_id: &str, channel: Channel) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            user_id: user_id.to_string(),
            channel,
            connected: false,
            status: ConnectionStatus::Disconnected,
            store_name: None,
            seller_id: None,
            marketplace_id: None,
            access_token: None,
            refresh_token: None,
            token_expires_at: None,
            credentials: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_id_is_stable_per_user_and_channel() {
        assert_eq!(
            ChannelConnection::doc_id_for("user-1", Channel::Amazon),
            "user-1_amazon"
        );
        // User ids with separators are encoded rather than colliding.
        assert_eq!(
            ChannelConnection::doc_id_for("a_b", Channel::Amazon),
            "a_b_amazon"
        );
        assert_eq!(
            ChannelConnection::doc_id_for("a/b", Channel::Amazon),
            "a%2Fb_amazon"
        );
    }

    #[test]
    fn channel_slug_round_trips() {
        for channel in [Channel::Amazon, Channel::Ebay, Channel::Shopify] {
            assert_eq!(Channel::from_slug(channel.slug()), Some(channel));
        }
        assert_eq!(Channel::from_slug("etsy"), None);
    }

    #[test]
    fn token_expiry_parses_rfc3339() {
        let mut conn = ChannelConnection::placeholder("u", Channel::Amazon);
        conn.token_expires_at = Some("2026-01-01T00:00:00+00:00".to_string());
        assert!(conn.token_expiry().is_some());

        conn.token_expires_at = Some("not-a-date".to_string());
        assert!(conn.token_expiry().is_none());
    }
}
