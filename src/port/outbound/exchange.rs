//! Exchange port for account snapshots.

use async_trait::async_trait;

use crate::domain::{AccountSnapshot, Address};
use crate::error::Result;

/// Fetches the current position set and equity of one address.
///
/// One call is one upstream request. Implementations do not retry and
/// hold no state; callers decide what to do with a failure.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    /// Fetch the live snapshot for `address`.
    async fn fetch(&self, address: &Address) -> Result<AccountSnapshot>;
}
