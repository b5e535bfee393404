//! Scripted [`SnapshotFetcher`] for tests.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{AccountSnapshot, Address};
use crate::error::{Error, FetchError, Result};
use crate::port::outbound::exchange::SnapshotFetcher;

#[derive(Debug, Clone)]
enum Response {
    Snapshot(AccountSnapshot),
    Fail,
    Hang,
}

#[derive(Default)]
struct Script {
    queued: VecDeque<Response>,
    standing: Option<Response>,
    calls: usize,
}

/// Fetcher answering from a per-address script.
///
/// Queued responses are consumed first; afterwards the standing response
/// repeats. Unknown addresses fail like a server error.
#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<Address, Script>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every fetch of `address` with `snapshot`.
    pub fn set(&self, address: &Address, snapshot: AccountSnapshot) {
        self.script(address).standing = Some(Response::Snapshot(snapshot));
    }

    /// Fail every fetch of `address`.
    pub fn fail(&self, address: &Address) {
        self.script(address).standing = Some(Response::Fail);
    }

    /// Never answer fetches of `address`.
    pub fn hang(&self, address: &Address) {
        self.script(address).standing = Some(Response::Hang);
    }

    /// Answer the next fetch of `address` with `snapshot`.
    pub fn push(&self, address: &Address, snapshot: AccountSnapshot) {
        self.script(address)
            .queued
            .push_back(Response::Snapshot(snapshot));
    }

    /// Fail the next fetch of `address`.
    pub fn push_failure(&self, address: &Address) {
        self.script(address).queued.push_back(Response::Fail);
    }

    /// Number of fetches issued for `address`.
    pub fn calls(&self, address: &Address) -> usize {
        self.scripts.lock().get(address).map_or(0, |s| s.calls)
    }

    pub fn total_calls(&self) -> usize {
        self.scripts.lock().values().map(|s| s.calls).sum()
    }

    fn script(&self, address: &Address) -> parking_lot::MappedMutexGuard<'_, Script> {
        parking_lot::MutexGuard::map(self.scripts.lock(), |scripts| {
            scripts.entry(address.clone()).or_default()
        })
    }

    fn next_response(&self, address: &Address) -> Option<Response> {
        let mut script = self.script(address);
        script.calls += 1;
        if let Some(response) = script.queued.pop_front() {
            return Some(response);
        }
        script.standing.clone()
    }
}

#[async_trait]
impl SnapshotFetcher for ScriptedFetcher {
    async fn fetch(&self, address: &Address) -> Result<AccountSnapshot> {
        match self.next_response(address) {
            Some(Response::Snapshot(snapshot)) => Ok(snapshot),
            Some(Response::Hang) => std::future::pending().await,
            Some(Response::Fail) | None => {
                Err(Error::Fetch(FetchError::Status { status: 503 }))
            }
        }
    }
}
