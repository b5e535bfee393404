//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits that adapters implement to integrate with external
//! systems.
//!
//! # Layout
//!
//! ```text
//!   Telegram listener ──► CommandHandler (inbound)
//!                               │
//!                               ▼
//!                      app::Control / app::Monitor
//!                               │
//!          ┌────────────────────┼────────────────────┐
//!          ▼                    ▼                    ▼
//!   SnapshotFetcher           Store              Messenger     (outbound)
//!   Hyperliquid HTTP         SQLite              Telegram
//! ```

pub mod inbound;
pub mod outbound;

pub use inbound::command::{command_help, Command, CommandHandler};
pub use outbound::exchange::SnapshotFetcher;
pub use outbound::notifier::Messenger;
pub use outbound::store::Store;
