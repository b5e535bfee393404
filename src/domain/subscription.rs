//! Subscriptions linking chat recipients to monitored addresses.

use serde::{Deserialize, Serialize};

use super::id::{Address, RecipientId};

/// Display name used when a subscriber does not give one.
pub const DEFAULT_DISPLAY_NAME: &str = "Unnamed account";

/// One recipient watching one address.
///
/// Uniquely keyed by `(recipient, address)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub recipient: RecipientId,
    pub address: Address,
    pub name: String,
}

impl Subscription {
    /// Create a subscription, falling back to the default display name
    /// when `name` is blank.
    pub fn new(recipient: RecipientId, address: Address, name: impl Into<String>) -> Self {
        let name = name.into();
        let name = if name.trim().is_empty() {
            DEFAULT_DISPLAY_NAME.to_string()
        } else {
            name.trim().to_string()
        };
        Self {
            recipient,
            address,
            name,
        }
    }

    #[must_use]
    pub fn key(&self) -> (RecipientId, Address) {
        (self.recipient, self.address.clone())
    }
}
