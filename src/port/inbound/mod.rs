//! Inbound (driving) ports consumed by inbound adapters.
//!
//! Inbound ports expose application capabilities to external drivers such
//! as the Telegram bot control surface.
//!
//! # Modules
//!
//! - [`command`]: Chat commands and the handler that executes them

pub mod command;
