//! Chat command port.
//!
//! Keeps chat transports decoupled from the application that executes
//! commands. Arguments are carried as raw text; validation happens in the
//! handler so that authorization is always checked first.

use async_trait::async_trait;

use crate::domain::RecipientId;

/// Commands a chat recipient can issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Reply with the sender's own chat ID.
    MyId,
    /// Show command help.
    Help,
    /// List the sender's subscriptions.
    List,
    /// Watch an address. Requires authorization.
    Subscribe {
        address: String,
        name: Option<String>,
    },
    /// Stop watching an address.
    Unsubscribe { address: String },
    /// Grant subscribe rights. Super-admin only.
    ///
    /// A missing target is rejected by the handler after the admin check.
    Authorize { target: Option<String> },
    /// Revoke subscribe rights. Super-admin only.
    Deauthorize { target: Option<String> },
}

/// Executes commands on behalf of a recipient.
///
/// Replies are delivered by the handler itself, so a command may produce
/// messages to several recipients (e.g. the target of `/authorize`).
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, from: RecipientId, command: Command);
}

/// Help text returned by `/start` and `/help`.
#[must_use]
pub const fn command_help() -> &'static str {
    "📋 Position monitor commands\n\n\
    /myid - 🆔 Show your chat ID\n\
    /subscribe <address> [name] - 🔔 Watch an address (requires authorization)\n\
    /unsubscribe <address> - 🔕 Stop watching an address\n\
    /list - 📋 Show your subscriptions\n\n\
    Administrator commands:\n\
    /authorize <chat_id> - ✅ Allow a chat to subscribe\n\
    /deauthorize <chat_id> - ❌ Revoke a chat's access"
}
