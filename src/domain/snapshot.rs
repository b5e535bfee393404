//! Account snapshots and the persisted last-observed state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::position::Position;

/// Full position set and equity of one address at one point in time.
///
/// Positions are keyed by symbol in sorted order, so iterating a snapshot
/// is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub positions: BTreeMap<String, Position>,
    pub account_value: f64,
}

impl AccountSnapshot {
    /// Build a snapshot from a position list.
    ///
    /// A later position with a duplicate symbol replaces an earlier one.
    pub fn new(positions: impl IntoIterator<Item = Position>, account_value: f64) -> Self {
        Self {
            positions: positions
                .into_iter()
                .map(|p| (p.symbol.clone(), p))
                .collect(),
            account_value,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }
}

/// The last snapshot the monitor has already reacted to for one address.
///
/// Starts as an empty baseline, so the first comparison against a live
/// snapshot reports every open position as opened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
    pub last_positions: BTreeMap<String, Position>,
    pub last_account_value: f64,
}

impl AccountState {
    /// Zero-valued baseline for a newly tracked address.
    #[must_use]
    pub fn baseline() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_baseline(&self) -> bool {
        self.last_positions.is_empty() && self.last_account_value == 0.0
    }
}

impl From<AccountSnapshot> for AccountState {
    fn from(snapshot: AccountSnapshot) -> Self {
        Self {
            last_positions: snapshot.positions,
            last_account_value: snapshot.account_value,
        }
    }
}

impl From<&AccountSnapshot> for AccountState {
    fn from(snapshot: &AccountSnapshot) -> Self {
        snapshot.clone().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_orders_symbols() {
        let snapshot = AccountSnapshot::new(
            vec![
                Position::new("SOL", "1"),
                Position::new("BTC", "1"),
                Position::new("ETH", "1"),
            ],
            10.0,
        );
        let symbols: Vec<_> = snapshot.positions.keys().cloned().collect();
        assert_eq!(symbols, vec!["BTC", "ETH", "SOL"]);
    }

    #[test]
    fn snapshot_duplicate_symbol_keeps_last() {
        let snapshot = AccountSnapshot::new(
            vec![Position::new("BTC", "1"), Position::new("BTC", "2")],
            0.0,
        );
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.positions["BTC"].size(), 2.0);
    }

    #[test]
    fn state_from_snapshot() {
        let snapshot = AccountSnapshot::new(vec![Position::new("BTC", "1")], 500.0);
        let state = AccountState::from(&snapshot);
        assert_eq!(state.last_account_value, 500.0);
        assert!(state.last_positions.contains_key("BTC"));
        assert!(!state.is_baseline());
        assert!(AccountState::baseline().is_baseline());
    }
}
