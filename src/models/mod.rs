// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod connection;
pub mod inventory;
pub mod listing;
pub mod notification;
pub mod order;

pub use connection::{Channel, ChannelConnection, ConnectionStatus};
pub use inventory::InventoryItem;
pub use listing::Listing;
pub use notification::Notification;
pub use order::{FinancialEventGroupRecord, Order};
