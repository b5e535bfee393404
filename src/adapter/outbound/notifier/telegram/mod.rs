//! Telegram delivery and command handling.
//!
//! Sends change notifications to subscribers and listens for bot commands
//! that manage subscriptions and authorization.

mod command;

pub mod notifier;

pub use command::{bot_commands, parse_command, CommandParseError};
pub use notifier::{run_command_listener, TelegramMessenger};
