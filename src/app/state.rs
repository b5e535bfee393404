//! Shared monitor state.
//!
//! The subscription registry, the per-address account states and the
//! authorized set live behind one coarse lock. Every mutation is mirrored
//! to the durable [`Store`] while the lock is held; store failures are
//! logged and the in-memory value stays authoritative.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::domain::{AccountState, Address, RecipientId, Subscription};
use crate::error::Result;
use crate::port::outbound::store::Store;

/// Result of adding a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    /// Added. `first_for_address` is true when nobody watched the address before.
    Created { first_for_address: bool },
    /// The recipient already watches this address; nothing changed.
    AlreadySubscribed,
}

/// Result of removing a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsubscribeOutcome {
    /// Removed. `address_released` is true when it was the last subscriber.
    Removed { address_released: bool },
    /// No such subscription.
    NotSubscribed,
}

#[derive(Default)]
struct Registry {
    subscriptions: BTreeMap<(RecipientId, Address), Subscription>,
    accounts: HashMap<Address, AccountState>,
    /// Addresses whose state is still the empty placeholder.
    unestablished: HashSet<Address>,
    authorized: BTreeSet<RecipientId>,
}

impl Registry {
    fn has_subscribers(&self, address: &Address) -> bool {
        self.subscriptions.values().any(|s| &s.address == address)
    }

    fn insert_placeholder(&mut self, address: &Address) {
        if !self.accounts.contains_key(address) {
            self.accounts.insert(address.clone(), AccountState::baseline());
            self.unestablished.insert(address.clone());
        }
    }
}

/// Registry, account states and access control for the running monitor.
pub struct MonitorState {
    registry: Mutex<Registry>,
    super_admin: RecipientId,
    store: Arc<dyn Store>,
}

impl MonitorState {
    /// Create empty state backed by `store`.
    #[must_use]
    pub fn new(super_admin: RecipientId, store: Arc<dyn Store>) -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
            super_admin,
            store,
        }
    }

    /// Reload everything from `store`.
    ///
    /// Account states are only restored for addresses that still have a
    /// subscriber.
    ///
    /// # Errors
    /// Returns the first store error; startup should abort.
    pub fn load(super_admin: RecipientId, store: Arc<dyn Store>) -> Result<Self> {
        let mut registry = Registry::default();

        registry.authorized.extend(store.load_authorized()?);

        for subscription in store.load_subscriptions()? {
            registry
                .subscriptions
                .insert(subscription.key(), subscription);
        }

        let addresses: BTreeSet<Address> = registry
            .subscriptions
            .values()
            .map(|s| s.address.clone())
            .collect();
        for address in addresses {
            match store.load_account_state(&address)? {
                Some(state) => {
                    registry.accounts.insert(address, state);
                }
                None => registry.insert_placeholder(&address),
            }
        }

        info!(
            authorized = registry.authorized.len(),
            subscriptions = registry.subscriptions.len(),
            accounts = registry.accounts.len(),
            "Monitor state loaded"
        );

        Ok(Self {
            registry: Mutex::new(registry),
            super_admin,
            store,
        })
    }

    #[must_use]
    pub const fn super_admin(&self) -> RecipientId {
        self.super_admin
    }

    #[must_use]
    pub fn is_super_admin(&self, recipient: RecipientId) -> bool {
        recipient == self.super_admin
    }

    /// The super-admin is always authorized.
    #[must_use]
    pub fn is_authorized(&self, recipient: RecipientId) -> bool {
        self.is_super_admin(recipient) || self.registry.lock().authorized.contains(&recipient)
    }

    /// Grant subscribe rights. Returns false if already granted.
    pub fn authorize(&self, recipient: RecipientId) -> bool {
        if self.is_super_admin(recipient) {
            return false;
        }
        let mut registry = self.registry.lock();
        if !registry.authorized.insert(recipient) {
            return false;
        }
        if let Err(e) = self.store.save_authorized(recipient) {
            warn!(recipient = %recipient, error = %e, "Failed to persist authorization");
        }
        true
    }

    /// Revoke subscribe rights. Returns false if not granted.
    ///
    /// Existing subscriptions of the recipient are kept.
    pub fn deauthorize(&self, recipient: RecipientId) -> bool {
        let mut registry = self.registry.lock();
        if !registry.authorized.remove(&recipient) {
            return false;
        }
        if let Err(e) = self.store.delete_authorized(recipient) {
            warn!(recipient = %recipient, error = %e, "Failed to persist deauthorization");
        }
        true
    }

    /// Authorized recipients, excluding the implicit super-admin.
    #[must_use]
    pub fn authorized(&self) -> Vec<RecipientId> {
        self.registry.lock().authorized.iter().copied().collect()
    }

    /// Add a subscription.
    ///
    /// A previously untracked address gets an empty baseline so the first
    /// poll reports every open position.
    pub fn subscribe(&self, subscription: Subscription) -> SubscribeOutcome {
        let mut registry = self.registry.lock();
        let key = subscription.key();
        if registry.subscriptions.contains_key(&key) {
            return SubscribeOutcome::AlreadySubscribed;
        }

        if let Err(e) = self.store.save_subscription(&subscription) {
            warn!(
                recipient = %subscription.recipient,
                address = %subscription.address,
                error = %e,
                "Failed to persist subscription"
            );
        }

        let first_for_address = !registry.has_subscribers(&subscription.address);
        registry.insert_placeholder(&subscription.address);
        registry.subscriptions.insert(key, subscription);

        SubscribeOutcome::Created { first_for_address }
    }

    /// Remove a subscription, dropping the account state with the last one.
    pub fn unsubscribe(&self, recipient: RecipientId, address: &Address) -> UnsubscribeOutcome {
        let mut registry = self.registry.lock();
        if registry
            .subscriptions
            .remove(&(recipient, address.clone()))
            .is_none()
        {
            return UnsubscribeOutcome::NotSubscribed;
        }

        if let Err(e) = self.store.delete_subscription(recipient, address) {
            warn!(recipient = %recipient, address = %address, error = %e, "Failed to delete subscription");
        }

        let address_released = !registry.has_subscribers(address);
        if address_released {
            registry.accounts.remove(address);
            registry.unestablished.remove(address);
            if let Err(e) = self.store.delete_account_state(address) {
                warn!(address = %address, error = %e, "Failed to delete account state");
            }
        }

        UnsubscribeOutcome::Removed { address_released }
    }

    /// Subscriptions of one recipient, ordered by address.
    #[must_use]
    pub fn subscriptions_for(&self, recipient: RecipientId) -> Vec<Subscription> {
        self.registry
            .lock()
            .subscriptions
            .values()
            .filter(|s| s.recipient == recipient)
            .cloned()
            .collect()
    }

    /// Copy of the registry grouped by address.
    ///
    /// Each address appears once no matter how many subscribers it has.
    #[must_use]
    pub fn subscriptions_by_address(&self) -> BTreeMap<Address, Vec<Subscription>> {
        let registry = self.registry.lock();
        let mut grouped: BTreeMap<Address, Vec<Subscription>> = BTreeMap::new();
        for subscription in registry.subscriptions.values() {
            grouped
                .entry(subscription.address.clone())
                .or_default()
                .push(subscription.clone());
        }
        grouped
    }

    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.registry.lock().subscriptions.len()
    }

    /// Last observed state of an address.
    #[must_use]
    pub fn account_state(&self, address: &Address) -> Option<AccountState> {
        self.registry.lock().accounts.get(address).cloned()
    }

    /// Record the state notifications were just sent for.
    ///
    /// Skipped (returns false) if the address lost all subscribers while
    /// the cycle was running.
    pub fn commit_account_state(&self, address: &Address, state: AccountState) -> bool {
        let mut registry = self.registry.lock();
        if !registry.has_subscribers(address) {
            return false;
        }
        self.persist_account_state(address, &state);
        registry.unestablished.remove(address);
        registry.accounts.insert(address.clone(), state);
        true
    }

    /// Store the initial snapshot fetched for a new subscription.
    ///
    /// Only applies while `recipient` is still subscribed and the address
    /// state is still the placeholder created at subscribe time. The first
    /// initial fetch to complete wins; later ones, and fetches that finish
    /// after a poll cycle committed, are ignored.
    pub fn establish_baseline(
        &self,
        recipient: RecipientId,
        address: &Address,
        state: AccountState,
    ) -> bool {
        let mut registry = self.registry.lock();
        if !registry
            .subscriptions
            .contains_key(&(recipient, address.clone()))
            || !registry.unestablished.remove(address)
        {
            return false;
        }
        self.persist_account_state(address, &state);
        registry.accounts.insert(address.clone(), state);
        true
    }

    fn persist_account_state(&self, address: &Address, state: &AccountState) {
        if let Err(e) = self.store.save_account_state(address, state) {
            warn!(address = %address, error = %e, "Failed to persist account state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountSnapshot, Position};
    use crate::testkit::domain::address;
    use crate::testkit::store::MemoryStore;

    const ADMIN: RecipientId = RecipientId::new(1);

    fn state_with(store: &Arc<MemoryStore>) -> MonitorState {
        MonitorState::new(ADMIN, store.clone())
    }

    fn snapshot_state(value: f64) -> AccountState {
        AccountState::from(AccountSnapshot::new(vec![Position::new("BTC", "1")], value))
    }

    // -------------------------------------------------------------------------
    // Access control
    // -------------------------------------------------------------------------

    #[test]
    fn super_admin_is_always_authorized() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(&store);

        assert!(state.is_authorized(ADMIN));
        assert!(!state.authorize(ADMIN));
        assert!(!state.deauthorize(ADMIN));
        assert!(state.is_authorized(ADMIN));
    }

    #[test]
    fn authorize_and_deauthorize_persist() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(&store);
        let user = RecipientId::new(7);

        assert!(!state.is_authorized(user));
        assert!(state.authorize(user));
        assert!(!state.authorize(user));
        assert!(state.is_authorized(user));
        assert_eq!(store.authorized(), vec![user]);

        assert!(state.deauthorize(user));
        assert!(!state.deauthorize(user));
        assert!(!state.is_authorized(user));
        assert!(store.authorized().is_empty());
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    #[test]
    fn subscribe_creates_baseline_for_new_address() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(&store);
        let sub = Subscription::new(RecipientId::new(7), address(1), "Whale");

        assert_eq!(
            state.subscribe(sub.clone()),
            SubscribeOutcome::Created {
                first_for_address: true
            }
        );
        assert_eq!(state.account_state(&address(1)), Some(AccountState::baseline()));
        assert_eq!(store.subscriptions(), vec![sub]);
        // Empty baseline lives in memory only.
        assert!(store.account_state(&address(1)).is_none());
    }

    #[test]
    fn duplicate_subscribe_changes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(&store);
        state.subscribe(Subscription::new(RecipientId::new(7), address(1), "Old"));

        assert_eq!(
            state.subscribe(Subscription::new(RecipientId::new(7), address(1), "New")),
            SubscribeOutcome::AlreadySubscribed
        );
        assert_eq!(state.subscriptions_for(RecipientId::new(7))[0].name, "Old");
    }

    #[test]
    fn second_subscriber_is_not_first_for_address() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(&store);
        state.subscribe(Subscription::new(RecipientId::new(7), address(1), "a"));
        state.commit_account_state(&address(1), snapshot_state(10.0));

        assert_eq!(
            state.subscribe(Subscription::new(RecipientId::new(8), address(1), "b")),
            SubscribeOutcome::Created {
                first_for_address: false
            }
        );
        assert_eq!(state.account_state(&address(1)), Some(snapshot_state(10.0)));
    }

    #[test]
    fn unsubscribe_last_subscriber_drops_state() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(&store);
        state.subscribe(Subscription::new(RecipientId::new(7), address(1), "a"));
        state.subscribe(Subscription::new(RecipientId::new(8), address(1), "b"));
        state.commit_account_state(&address(1), snapshot_state(10.0));

        assert_eq!(
            state.unsubscribe(RecipientId::new(7), &address(1)),
            UnsubscribeOutcome::Removed {
                address_released: false
            }
        );
        assert!(state.account_state(&address(1)).is_some());

        assert_eq!(
            state.unsubscribe(RecipientId::new(8), &address(1)),
            UnsubscribeOutcome::Removed {
                address_released: true
            }
        );
        assert!(state.account_state(&address(1)).is_none());
        assert!(store.account_state(&address(1)).is_none());
        assert!(store.subscriptions().is_empty());
    }

    #[test]
    fn unsubscribe_unknown_pair() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(&store);

        assert_eq!(
            state.unsubscribe(RecipientId::new(7), &address(1)),
            UnsubscribeOutcome::NotSubscribed
        );
    }

    #[test]
    fn grouping_deduplicates_addresses() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(&store);
        for recipient in [3, 2, 1] {
            state.subscribe(Subscription::new(RecipientId::new(recipient), address(5), "x"));
        }
        state.subscribe(Subscription::new(RecipientId::new(1), address(4), "y"));

        let grouped = state.subscriptions_by_address();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&address(5)].len(), 3);
        assert_eq!(grouped[&address(4)].len(), 1);
        assert_eq!(state.subscription_count(), 4);
    }

    // -------------------------------------------------------------------------
    // Account states
    // -------------------------------------------------------------------------

    #[test]
    fn commit_is_skipped_without_subscribers() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(&store);

        assert!(!state.commit_account_state(&address(1), snapshot_state(10.0)));
        assert!(state.account_state(&address(1)).is_none());
        assert!(store.account_state(&address(1)).is_none());
    }

    #[test]
    fn first_initial_fetch_sets_baseline() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(&store);
        let first = RecipientId::new(7);
        let second = RecipientId::new(8);
        state.subscribe(Subscription::new(first, address(1), "a"));
        state.subscribe(Subscription::new(second, address(1), "b"));

        assert!(state.establish_baseline(second, &address(1), snapshot_state(20.0)));
        assert!(!state.establish_baseline(first, &address(1), snapshot_state(10.0)));
        assert_eq!(state.account_state(&address(1)), Some(snapshot_state(20.0)));
        assert_eq!(store.account_state(&address(1)), Some(snapshot_state(20.0)));
    }

    #[test]
    fn late_initial_fetch_does_not_replace_committed_state() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(&store);
        let user = RecipientId::new(7);
        state.subscribe(Subscription::new(user, address(1), "a"));

        assert!(state.commit_account_state(&address(1), snapshot_state(30.0)));
        assert!(!state.establish_baseline(user, &address(1), snapshot_state(10.0)));
        assert_eq!(state.account_state(&address(1)), Some(snapshot_state(30.0)));
    }

    #[test]
    fn resubscribe_after_release_allows_new_baseline() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(&store);
        let user = RecipientId::new(7);
        state.subscribe(Subscription::new(user, address(1), "a"));
        assert!(state.establish_baseline(user, &address(1), snapshot_state(10.0)));
        state.unsubscribe(user, &address(1));

        state.subscribe(Subscription::new(user, address(1), "a"));
        assert_eq!(state.account_state(&address(1)), Some(AccountState::baseline()));
        assert!(state.establish_baseline(user, &address(1), snapshot_state(12.0)));
    }

    #[test]
    fn later_subscriber_keeps_established_baseline() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(&store);
        let first = RecipientId::new(7);
        let second = RecipientId::new(8);
        state.subscribe(Subscription::new(first, address(1), "a"));

        assert!(state.establish_baseline(first, &address(1), snapshot_state(10.0)));
        assert_eq!(store.account_state(&address(1)), Some(snapshot_state(10.0)));

        state.subscribe(Subscription::new(second, address(1), "b"));
        assert!(!state.establish_baseline(second, &address(1), snapshot_state(99.0)));
        assert_eq!(state.account_state(&address(1)), Some(snapshot_state(10.0)));
    }

    #[test]
    fn baseline_skipped_after_unsubscribe() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(&store);
        let user = RecipientId::new(7);
        state.subscribe(Subscription::new(user, address(1), "a"));
        state.unsubscribe(user, &address(1));

        assert!(!state.establish_baseline(user, &address(1), snapshot_state(10.0)));
        assert!(state.account_state(&address(1)).is_none());
    }

    #[test]
    fn store_failures_keep_memory_authoritative() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(&store);
        store.set_fail_writes(true);

        let user = RecipientId::new(7);
        assert!(state.authorize(user));
        state.subscribe(Subscription::new(user, address(1), "a"));
        assert!(state.commit_account_state(&address(1), snapshot_state(3.0)));

        assert!(state.is_authorized(user));
        assert_eq!(state.subscriptions_for(user).len(), 1);
        assert_eq!(state.account_state(&address(1)), Some(snapshot_state(3.0)));
        assert!(store.subscriptions().is_empty());
    }

    // -------------------------------------------------------------------------
    // Reload
    // -------------------------------------------------------------------------

    #[test]
    fn load_restores_everything_but_orphans() {
        let store = Arc::new(MemoryStore::new());
        {
            let state = state_with(&store);
            state.authorize(RecipientId::new(7));
            state.subscribe(Subscription::new(RecipientId::new(7), address(1), "a"));
            state.commit_account_state(&address(1), snapshot_state(10.0));
        }
        store
            .save_account_state(&address(2), &snapshot_state(5.0))
            .unwrap();

        let state = MonitorState::load(ADMIN, store.clone()).unwrap();
        assert!(state.is_authorized(RecipientId::new(7)));
        assert_eq!(state.subscriptions_for(RecipientId::new(7)).len(), 1);
        assert_eq!(state.account_state(&address(1)), Some(snapshot_state(10.0)));
        assert!(state.account_state(&address(2)).is_none());
    }

    #[test]
    fn load_keeps_unbaselined_address_establishable() {
        let store = Arc::new(MemoryStore::new());
        let user = RecipientId::new(7);
        {
            let state = state_with(&store);
            state.subscribe(Subscription::new(user, address(1), "a"));
        }

        let state = MonitorState::load(ADMIN, store.clone()).unwrap();
        assert_eq!(state.account_state(&address(1)), Some(AccountState::baseline()));
        assert!(state.establish_baseline(user, &address(1), snapshot_state(10.0)));
    }

    #[test]
    fn load_fails_on_store_error() {
        let store = Arc::new(MemoryStore::new());
        store.set_fail_reads(true);

        assert!(MonitorState::load(ADMIN, store).is_err());
    }
}
