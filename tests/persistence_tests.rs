use std::sync::Arc;
use std::time::Duration;

use perpwatch::adapter::outbound::sqlite::database::connection;
use perpwatch::adapter::outbound::sqlite::SqliteStore;
use perpwatch::app::{Monitor, MonitorState};
use perpwatch::domain::{AccountState, DetectionPolicy, RecipientId, Subscription};
use perpwatch::port::Store;
use perpwatch::testkit::domain::{address, snapshot};
use perpwatch::testkit::exchange::ScriptedFetcher;
use perpwatch::testkit::notifier::RecordingMessenger;

const ADMIN: RecipientId = RecipientId::new(1);
const ALICE: RecipientId = RecipientId::new(10);

fn open_store(path: &str) -> Arc<dyn Store> {
    Arc::new(SqliteStore::new(connection::open(path).expect("open database")))
}

fn monitor(
    state: Arc<MonitorState>,
    fetcher: Arc<ScriptedFetcher>,
    messenger: Arc<RecordingMessenger>,
) -> Monitor {
    Monitor::new(
        state,
        fetcher,
        messenger,
        DetectionPolicy::default(),
        Duration::from_secs(30),
        Duration::from_secs(1),
    )
}

#[tokio::test]
async fn restart_resumes_from_committed_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("monitor.db").display().to_string();
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher.set(&address(1), snapshot(&[("BTC", "1"), ("ETH", "-2")], 500.0));

    {
        let state = Arc::new(MonitorState::new(ADMIN, open_store(&path)));
        state.authorize(ALICE);
        state.subscribe(Subscription::new(ALICE, address(1), "Whale"));
        let messenger = Arc::new(RecordingMessenger::new());
        monitor(state, fetcher.clone(), messenger.clone()).run_cycle().await;
        assert_eq!(messenger.len(), 1);
    }

    let state = Arc::new(MonitorState::load(ADMIN, open_store(&path)).unwrap());
    assert!(state.is_authorized(ALICE));
    assert_eq!(state.subscriptions_for(ALICE)[0].name, "Whale");
    assert_eq!(
        state.account_state(&address(1)),
        Some(AccountState::from(snapshot(&[("BTC", "1"), ("ETH", "-2")], 500.0)))
    );

    // Same snapshot after restart: nothing is re-reported.
    let messenger = Arc::new(RecordingMessenger::new());
    let summary = monitor(state, fetcher, messenger.clone()).run_cycle().await;
    assert_eq!(summary.changed, 0);
    assert!(messenger.is_empty());
}

#[tokio::test]
async fn unsubscribed_address_is_gone_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("monitor.db").display().to_string();

    {
        let state = MonitorState::new(ADMIN, open_store(&path));
        state.subscribe(Subscription::new(ALICE, address(1), "a"));
        state.commit_account_state(
            &address(1),
            AccountState::from(snapshot(&[("BTC", "1")], 1.0)),
        );
        state.unsubscribe(ALICE, &address(1));
    }

    let store = open_store(&path);
    assert!(store.load_subscriptions().unwrap().is_empty());
    assert!(store.load_account_state(&address(1)).unwrap().is_none());
}

#[test]
fn positions_survive_as_json_with_all_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("monitor.db").display().to_string();
    let store = open_store(&path);

    let mut position = perpwatch::domain::Position::new("BTC", "-0.25");
    position.entry_price = "64000.5".into();
    position.unrealized_pnl = "-12.75".into();
    position.leverage.kind = "cross".into();
    position.leverage.value = 20;
    let state = AccountState::from(perpwatch::domain::AccountSnapshot::new(
        vec![position],
        1234.56,
    ));

    store.save_account_state(&address(3), &state).unwrap();

    let reopened = open_store(&path);
    let loaded = reopened.load_account_state(&address(3)).unwrap().unwrap();
    let btc = &loaded.last_positions["BTC"];
    assert!((btc.size() + 0.25).abs() < 1e-12);
    assert!((btc.entry_price() - 64000.5).abs() < 1e-9);
    assert_eq!(btc.leverage.kind, "cross");
    assert_eq!(btc.leverage.value, 20);
    assert!((loaded.last_account_value - 1234.56).abs() < 1e-9);
}
