//! Poll orchestrator.
//!
//! Each cycle copies the registry, fetches every watched address exactly
//! once, diffs against the last committed state, fans the rendered change
//! out to every subscriber and then commits the new state. Addresses are
//! processed sequentially; a failing address never affects the others.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::state::MonitorState;
use crate::domain::render::{render_changes, Header};
use crate::domain::{detect, AccountSnapshot, AccountState, Address, DetectionPolicy, Subscription};
use crate::error::{FetchError, Result};
use crate::port::outbound::exchange::SnapshotFetcher;
use crate::port::outbound::notifier::Messenger;

/// Counters for one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Unique addresses polled.
    pub addresses: usize,
    /// Addresses whose fetch failed or timed out.
    pub fetch_failures: usize,
    /// Addresses with a non-empty diff.
    pub changed: usize,
    pub delivered: usize,
    pub delivery_failures: usize,
}

/// Fixed-interval polling loop.
pub struct Monitor {
    state: Arc<MonitorState>,
    fetcher: Arc<dyn SnapshotFetcher>,
    messenger: Arc<dyn Messenger>,
    policy: DetectionPolicy,
    interval: Duration,
    fetch_timeout: Duration,
}

impl Monitor {
    #[must_use]
    pub fn new(
        state: Arc<MonitorState>,
        fetcher: Arc<dyn SnapshotFetcher>,
        messenger: Arc<dyn Messenger>,
        policy: DetectionPolicy,
        interval: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            state,
            fetcher,
            messenger,
            policy,
            interval,
            fetch_timeout,
        }
    }

    /// Poll forever. The first cycle runs one interval after start.
    pub async fn run(&self) {
        info!(interval_secs = self.interval.as_secs(), "Position monitor started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let summary = self.run_cycle().await;
            if summary.changed > 0 || summary.fetch_failures > 0 {
                info!(
                    addresses = summary.addresses,
                    changed = summary.changed,
                    fetch_failures = summary.fetch_failures,
                    delivered = summary.delivered,
                    delivery_failures = summary.delivery_failures,
                    "Poll cycle complete"
                );
            } else {
                debug!(addresses = summary.addresses, "Poll cycle complete, no changes");
            }
        }
    }

    /// Run one poll cycle over every subscribed address.
    pub async fn run_cycle(&self) -> CycleSummary {
        // Copy under the lock; network calls happen without it.
        let grouped = self.state.subscriptions_by_address();
        let mut summary = CycleSummary {
            addresses: grouped.len(),
            ..CycleSummary::default()
        };

        for (address, subscribers) in &grouped {
            self.poll_address(address, subscribers, &mut summary).await;
        }

        summary
    }

    async fn poll_address(
        &self,
        address: &Address,
        subscribers: &[Subscription],
        summary: &mut CycleSummary,
    ) {
        let snapshot = match fetch_bounded(self.fetcher.as_ref(), address, self.fetch_timeout).await
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(address = %address, error = %e, "Fetch failed, skipping address this cycle");
                summary.fetch_failures += 1;
                return;
            }
        };

        let previous = self
            .state
            .account_state(address)
            .unwrap_or_else(AccountState::baseline);
        let report = detect(&previous, &snapshot, &self.policy);
        if report.is_empty() {
            return;
        }

        summary.changed += 1;
        info!(
            address = %address,
            events = report.len(),
            opened = report.opened(),
            closed = report.closed(),
            resized = report.resized(),
            subscribers = subscribers.len(),
            "Changes detected"
        );

        let timestamp = Utc::now();
        for subscription in subscribers {
            let header = Header::new(&subscription.name, address, timestamp);
            let text = render_changes(&header, &report);
            match self.messenger.send_text(subscription.recipient, &text).await {
                Ok(()) => summary.delivered += 1,
                Err(e) => {
                    warn!(
                        address = %address,
                        recipient = %subscription.recipient,
                        error = %e,
                        "Failed to deliver change notification"
                    );
                    summary.delivery_failures += 1;
                }
            }
        }

        // Notify then commit, even after partial delivery failure.
        if !self
            .state
            .commit_account_state(address, AccountState::from(snapshot))
        {
            debug!(address = %address, "Address unsubscribed during cycle, state not kept");
        }
    }
}

/// Fetch one snapshot, failing with [`FetchError::Timeout`] once `timeout`
/// elapses.
pub(super) async fn fetch_bounded(
    fetcher: &dyn SnapshotFetcher,
    address: &Address,
    timeout: Duration,
) -> Result<AccountSnapshot> {
    tokio::time::timeout(timeout, fetcher.fetch(address))
        .await
        .map_err(|_| FetchError::Timeout {
            secs: timeout.as_secs(),
        })?
}
