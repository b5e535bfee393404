//! In-memory [`Store`] for tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::domain::{AccountState, Address, RecipientId, Subscription};
use crate::error::{Error, Result};
use crate::port::outbound::store::Store;

#[derive(Default)]
struct Tables {
    subscriptions: BTreeMap<(RecipientId, Address), Subscription>,
    states: HashMap<Address, AccountState>,
    authorized: BTreeSet<RecipientId>,
}

/// Store keeping all three record sets in memory.
///
/// Reads and writes can be made to fail independently to exercise the
/// error paths of callers.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Stored subscriptions ordered by `(recipient, address)`.
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.tables.lock().subscriptions.values().cloned().collect()
    }

    pub fn account_state(&self, address: &Address) -> Option<AccountState> {
        self.tables.lock().states.get(address).cloned()
    }

    pub fn authorized(&self) -> Vec<RecipientId> {
        self.tables.lock().authorized.iter().copied().collect()
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Database("injected read failure".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Database("injected write failure".into()));
        }
        Ok(())
    }
}

impl Store for MemoryStore {
    fn load_subscriptions(&self) -> Result<Vec<Subscription>> {
        self.check_read()?;
        Ok(self.subscriptions())
    }

    fn save_subscription(&self, subscription: &Subscription) -> Result<()> {
        self.check_write()?;
        self.tables
            .lock()
            .subscriptions
            .insert(subscription.key(), subscription.clone());
        Ok(())
    }

    fn delete_subscription(&self, recipient: RecipientId, address: &Address) -> Result<bool> {
        self.check_write()?;
        Ok(self
            .tables
            .lock()
            .subscriptions
            .remove(&(recipient, address.clone()))
            .is_some())
    }

    fn load_account_state(&self, address: &Address) -> Result<Option<AccountState>> {
        self.check_read()?;
        Ok(self.account_state(address))
    }

    fn save_account_state(&self, address: &Address, state: &AccountState) -> Result<()> {
        self.check_write()?;
        self.tables
            .lock()
            .states
            .insert(address.clone(), state.clone());
        Ok(())
    }

    fn delete_account_state(&self, address: &Address) -> Result<bool> {
        self.check_write()?;
        Ok(self.tables.lock().states.remove(address).is_some())
    }

    fn load_authorized(&self) -> Result<Vec<RecipientId>> {
        self.check_read()?;
        Ok(self.authorized())
    }

    fn save_authorized(&self, recipient: RecipientId) -> Result<()> {
        self.check_write()?;
        self.tables.lock().authorized.insert(recipient);
        Ok(())
    }

    fn delete_authorized(&self, recipient: RecipientId) -> Result<bool> {
        self.check_write()?;
        Ok(self.tables.lock().authorized.remove(&recipient))
    }
}
