//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`exchange`] — [`ScriptedFetcher`](exchange::ScriptedFetcher), a
//!   per-address scripted snapshot source that counts calls.
//! - [`notifier`] — [`RecordingMessenger`](notifier::RecordingMessenger),
//!   captures sent messages and can fail chosen recipients.
//! - [`store`] — [`MemoryStore`](store::MemoryStore), an in-memory `Store`
//!   with read/write failure injection.
//! - [`domain`] — Builders for addresses, positions and snapshots.
//! - [`config`] — Canonical configuration text.

pub mod config;
pub mod domain;
pub mod exchange;
pub mod notifier;
pub mod store;
