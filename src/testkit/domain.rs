//! Builders for domain primitives used across tests.
//!
//! Provides concise factory functions for [`Address`], [`Position`] and
//! [`AccountSnapshot`] so tests focus on assertions rather than
//! construction boilerplate.

use crate::domain::{AccountSnapshot, Address, Position};

/// Deterministic valid address ending in `n`, e.g. `0x00…01`.
pub fn address(n: u8) -> Address {
    Address::parse(&format!("0x{n:040x}")).expect("valid test address")
}

/// Position with only symbol and signed size set.
pub fn position(symbol: &str, size: &str) -> Position {
    Position::new(symbol, size)
}

/// Snapshot from `(symbol, size)` pairs.
pub fn snapshot(positions: &[(&str, &str)], account_value: f64) -> AccountSnapshot {
    AccountSnapshot::new(
        positions
            .iter()
            .map(|(symbol, size)| Position::new(*symbol, *size)),
        account_value,
    )
}
