//! perpwatch - Hyperliquid position monitor with Telegram notifications.
//!
//! Watches perpetuals accounts on Hyperliquid and tells every subscribed
//! chat when a tracked account opens, closes or resizes a position.
//!
//! # Architecture
//!
//! The crate follows a ports-and-adapters layout:
//!
//! - [`domain`] - Exchange-agnostic types plus the pure change detection
//!   ([`domain::diff`]) and message rendering ([`domain::render`])
//! - [`port`] - Traits at the seams: snapshot fetching, messaging, storage
//!   and inbound chat commands
//! - [`adapter`] - Hyperliquid HTTP client, Telegram bot, SQLite store
//! - [`app`] - Configuration, shared monitor state, command control and
//!   the poll loop
//! - [`cli`] - Command-line front end
//!
//! # Example
//!
//! ```
//! use perpwatch::domain::{detect, AccountSnapshot, AccountState, DetectionPolicy, Position};
//!
//! let current = AccountSnapshot::new(vec![Position::new("BTC", "0.5")], 1000.0);
//! let report = detect(&AccountState::baseline(), &current, &DetectionPolicy::default());
//! assert_eq!(report.opened(), 1);
//! ```

pub mod adapter;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
