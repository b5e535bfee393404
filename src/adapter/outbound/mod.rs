//! Outbound adapters (driven side).

pub mod hyperliquid;
pub mod notifier;
pub mod sqlite;
