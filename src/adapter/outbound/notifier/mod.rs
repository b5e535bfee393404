//! Chat adapters.
//!
//! Implements the `port::Messenger` trait and drives the `CommandHandler`
//! port from inbound chat messages.

pub mod telegram;
