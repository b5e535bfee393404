//! Hyperliquid REST API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::{debug, warn};

use super::dto::{ClearinghouseRequest, ClearinghouseState};
use crate::domain::{AccountSnapshot, Address};
use crate::error::Result;
use crate::port::outbound::exchange::SnapshotFetcher;

/// HTTP client for the Hyperliquid info API.
pub struct HyperliquidClient {
    http: HttpClient,
    info_url: String,
}

impl HyperliquidClient {
    /// Create a client for `info_url` with a per-request timeout.
    #[must_use]
    pub fn new(info_url: String, timeout: Duration) -> Self {
        let http = HttpClient::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self { http, info_url }
    }

    /// Query the raw clearinghouse state for an address.
    pub async fn clearinghouse_state(&self, address: &Address) -> Result<ClearinghouseState> {
        let response = self
            .http
            .post(&self.info_url)
            .json(&ClearinghouseRequest::new(address.as_str()))
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<ClearinghouseState>().await?)
    }
}

#[async_trait]
impl SnapshotFetcher for HyperliquidClient {
    async fn fetch(&self, address: &Address) -> Result<AccountSnapshot> {
        let state = self.clearinghouse_state(address).await?;
        let snapshot = AccountSnapshot::from(state);
        debug!(
            address = %address,
            positions = snapshot.len(),
            account_value = snapshot.account_value,
            "Fetched account snapshot"
        );
        Ok(snapshot)
    }
}
