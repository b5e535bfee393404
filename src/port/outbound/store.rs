//! Persistence port for subscriptions, account states and authorizations.

use crate::domain::{AccountState, Address, RecipientId, Subscription};
use crate::error::Result;

/// Durable record sets backing the monitor.
///
/// All writes are upserts or idempotent deletes. Everything is reloaded
/// at startup before polling resumes.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - Calls are synchronous and expected to be short
pub trait Store: Send + Sync {
    /// Load every stored subscription.
    fn load_subscriptions(&self) -> Result<Vec<Subscription>>;

    /// Insert or replace a subscription.
    fn save_subscription(&self, subscription: &Subscription) -> Result<()>;

    /// Delete a subscription. Returns true if it existed.
    fn delete_subscription(&self, recipient: RecipientId, address: &Address) -> Result<bool>;

    /// Load the stored state of one address.
    fn load_account_state(&self, address: &Address) -> Result<Option<AccountState>>;

    /// Insert or replace the state of an address.
    fn save_account_state(&self, address: &Address, state: &AccountState) -> Result<()>;

    /// Delete the state of an address. Returns true if it existed.
    fn delete_account_state(&self, address: &Address) -> Result<bool>;

    /// Load every authorized recipient.
    fn load_authorized(&self) -> Result<Vec<RecipientId>>;

    /// Add an authorized recipient. Adding twice is not an error.
    fn save_authorized(&self, recipient: RecipientId) -> Result<()>;

    /// Remove an authorized recipient. Returns true if it existed.
    fn delete_authorized(&self, recipient: RecipientId) -> Result<bool>;
}
