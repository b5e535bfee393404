//! Change detection between the last observed state and a fresh snapshot.
//!
//! [`detect`] is a pure function: the same `(previous, current)` pair always
//! yields the same events in the same order. Events for symbols present in
//! the current snapshot come first in symbol order, then closed symbols in
//! symbol order, then the optional account-value summary.

use serde::Deserialize;

use super::position::Position;
use super::snapshot::{AccountSnapshot, AccountState};

/// Absorbs binary float error so a change of exactly the threshold counts.
const THRESHOLD_EPSILON: f64 = 1e-9;

/// Thresholds and switches for change detection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectionPolicy {
    /// Minimum relative size change, in percent, reported as a resize.
    #[serde(default = "default_threshold_pct")]
    pub resize_threshold_pct: f64,

    /// Minimum relative equity change, in percent, reported on its own.
    #[serde(default = "default_threshold_pct")]
    pub account_value_threshold_pct: f64,

    /// Report standalone account value changes when no position changed.
    #[serde(default)]
    pub report_account_value_changes: bool,
}

const fn default_threshold_pct() -> f64 {
    1.0
}

impl Default for DetectionPolicy {
    fn default() -> Self {
        Self {
            resize_threshold_pct: default_threshold_pct(),
            account_value_threshold_pct: default_threshold_pct(),
            report_account_value_changes: false,
        }
    }
}

/// Whether a resized position grew or shrank in absolute terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeDirection {
    Increased,
    Decreased,
}

impl SizeDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Increased => "increased",
            Self::Decreased => "decreased",
        }
    }
}

/// One notable change between two snapshots.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// Symbol present now but not before.
    Opened { position: Position },
    /// Symbol present before but not now.
    Closed { symbol: String, previous: Position },
    /// Symbol present in both with a size change at or above the threshold.
    Resized {
        symbol: String,
        previous_size: f64,
        current_size: f64,
        change_pct: f64,
        direction: SizeDirection,
        current: Position,
    },
    /// Equity moved past the threshold while no position changed.
    AccountValueChanged {
        previous: f64,
        current: f64,
        change_pct: f64,
    },
}

impl ChangeEvent {
    #[must_use]
    pub fn is_position_change(&self) -> bool {
        !matches!(self, Self::AccountValueChanged { .. })
    }
}

/// Structured result of [`detect`]. Empty means nothing notable changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffReport {
    events: Vec<ChangeEvent>,
}

impl DiffReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn events(&self) -> &[ChangeEvent] {
        &self.events
    }

    #[must_use]
    pub fn has_position_changes(&self) -> bool {
        self.events.iter().any(ChangeEvent::is_position_change)
    }

    #[must_use]
    pub fn opened(&self) -> usize {
        self.count(|e| matches!(e, ChangeEvent::Opened { .. }))
    }

    #[must_use]
    pub fn closed(&self) -> usize {
        self.count(|e| matches!(e, ChangeEvent::Closed { .. }))
    }

    #[must_use]
    pub fn resized(&self) -> usize {
        self.count(|e| matches!(e, ChangeEvent::Resized { .. }))
    }

    fn count(&self, pred: impl Fn(&ChangeEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

/// Relative size change in percent; zero when the previous size is zero.
#[must_use]
pub fn size_change_pct(previous: f64, current: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous).abs() / previous.abs() * 100.0
}

/// Signed relative equity change in percent; zero when previous is not positive.
#[must_use]
pub fn account_value_change_pct(previous: f64, current: f64) -> f64 {
    if previous <= 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

fn meets(value_pct: f64, threshold_pct: f64) -> bool {
    value_pct + THRESHOLD_EPSILON >= threshold_pct
}

/// Compare the stored state for an address against a fresh snapshot.
#[must_use]
pub fn detect(
    previous: &AccountState,
    current: &AccountSnapshot,
    policy: &DetectionPolicy,
) -> DiffReport {
    let mut events = Vec::new();

    for (symbol, position) in &current.positions {
        let Some(last) = previous.last_positions.get(symbol) else {
            events.push(ChangeEvent::Opened {
                position: position.clone(),
            });
            continue;
        };

        let previous_size = last.size();
        let current_size = position.size();
        let change_pct = size_change_pct(previous_size, current_size);

        if meets(change_pct, policy.resize_threshold_pct) {
            let direction = if current_size.abs() > previous_size.abs() {
                SizeDirection::Increased
            } else {
                SizeDirection::Decreased
            };
            events.push(ChangeEvent::Resized {
                symbol: symbol.clone(),
                previous_size,
                current_size,
                change_pct,
                direction,
                current: position.clone(),
            });
        }
    }

    for (symbol, last) in &previous.last_positions {
        if !current.positions.contains_key(symbol) {
            events.push(ChangeEvent::Closed {
                symbol: symbol.clone(),
                previous: last.clone(),
            });
        }
    }

    if policy.report_account_value_changes && events.is_empty() {
        let change_pct =
            account_value_change_pct(previous.last_account_value, current.account_value);
        if meets(change_pct.abs(), policy.account_value_threshold_pct) {
            events.push(ChangeEvent::AccountValueChanged {
                previous: previous.last_account_value,
                current: current.account_value,
                change_pct,
            });
        }
    }

    DiffReport { events }
}
