//! Messenger port for chat delivery.

use async_trait::async_trait;

use crate::domain::RecipientId;
use crate::error::Result;

/// Sends plain text to a chat recipient.
///
/// Delivery is best effort; callers log failures and move on.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, recipient: RecipientId, text: &str) -> Result<()>;
}
