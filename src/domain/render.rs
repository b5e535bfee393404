//! Human-readable notification text.
//!
//! Money is shown to 2 decimals, sizes to 5 decimals and percentages to
//! 2 decimals. Sizes are shown as magnitudes next to a long/short label.
//! Addresses only ever appear in their shortened form.

use chrono::{DateTime, Utc};

use super::diff::{ChangeEvent, DiffReport, SizeDirection};
use super::id::Address;
use super::position::{Position, Side};
use super::snapshot::AccountSnapshot;

/// Per-recipient header shared by both templates.
#[derive(Debug, Clone, Copy)]
pub struct Header<'a> {
    /// Subscriber's display name for the address.
    pub name: &'a str,
    pub address: &'a Address,
    pub timestamp: DateTime<Utc>,
}

impl<'a> Header<'a> {
    #[must_use]
    pub fn new(name: &'a str, address: &'a Address, timestamp: DateTime<Utc>) -> Self {
        Self {
            name,
            address,
            timestamp,
        }
    }

    fn timestamp_text(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}

fn pnl_marker(pnl: f64) -> &'static str {
    if pnl >= 0.0 {
        "🟢"
    } else {
        "🔴"
    }
}

fn side_label(size: f64) -> &'static str {
    if size < 0.0 {
        Side::Short.as_str()
    } else {
        Side::Long.as_str()
    }
}

/// Full snapshot dump sent once to a new subscriber.
#[must_use]
pub fn render_initial_status(header: &Header<'_>, snapshot: &AccountSnapshot) -> String {
    let mut msg = format!(
        "🔄 Initial positions - {} ({})\n\n",
        header.name,
        header.timestamp_text()
    );
    msg.push_str(&format!("💼 Account: {}\n", header.address.short()));
    msg.push_str(&format!(
        "💰 Account value: ${:.2}\n\n",
        snapshot.account_value
    ));

    if snapshot.is_empty() {
        msg.push_str("No open positions.\n");
    } else {
        msg.push_str("📊 Open positions:\n\n");
        for position in snapshot.positions.values() {
            msg.push_str(&format_full_position(position));
        }
    }

    msg.push_str("🔔 Monitoring started, you will be notified when positions change.");
    msg
}

/// Change notification for one detected report.
#[must_use]
pub fn render_changes(header: &Header<'_>, report: &DiffReport) -> String {
    let mut msg = format!(
        "🔄 Position update - {} ({})\n\n",
        header.name,
        header.timestamp_text()
    );
    msg.push_str(&format!("💼 Account: {}\n\n", header.address.short()));

    for event in report.events() {
        msg.push_str(&format_event(event));
    }

    msg.trim_end().to_string()
}

fn format_event(event: &ChangeEvent) -> String {
    match event {
        ChangeEvent::Opened { position } => {
            format!(
                "🆕 Opened: {}\n{}",
                position.symbol,
                format_position_summary(position)
            )
        }
        ChangeEvent::Resized {
            symbol,
            previous_size,
            current_size,
            change_pct,
            direction,
            ..
        } => {
            let (marker, label) = match direction {
                SizeDirection::Increased => ("📈", "Increased"),
                SizeDirection::Decreased => ("📉", "Decreased"),
            };
            format!(
                "{marker} {label}: {symbol}\n   From: {:.5} ({})\n   To: {:.5} ({})\n   Change: {change_pct:.2}%\n\n",
                previous_size.abs(),
                side_label(*previous_size),
                current_size.abs(),
                side_label(*current_size)
            )
        }
        ChangeEvent::Closed { symbol, .. } => format!("❌ Closed: {symbol}\n\n"),
        ChangeEvent::AccountValueChanged {
            previous,
            current,
            change_pct,
        } => {
            let marker = if *change_pct >= 0.0 { "📈" } else { "📉" };
            format!(
                "{marker} Account value: ${current:.2}\n   From: ${previous:.2}\n   Change: {change_pct:+.2}%\n\n"
            )
        }
    }
}

fn format_full_position(position: &Position) -> String {
    let size = position.size();
    let pnl = position.unrealized_pnl();
    let mut msg = format!("🪙 {} ({})\n", position.symbol, side_label(size));
    msg.push_str(&format!(
        "📈 Size: {:.5} (${:.2})\n",
        size.abs(),
        position.position_value()
    ));
    msg.push_str(&format!("🏷️ Entry price: ${:.2}\n", position.entry_price()));
    msg.push_str(&format!(
        "📊 Leverage: {}x ({})\n",
        position.leverage.value, position.leverage.kind
    ));
    msg.push_str(&format!(
        "{} PnL: ${:.2} ({:.2}%)\n",
        pnl_marker(pnl),
        pnl,
        position.return_on_equity() * 100.0
    ));
    msg.push_str(&format!(
        "⚠️ Liquidation price: ${:.2}\n",
        position.liquidation_price()
    ));
    msg.push_str(&format!("💸 Margin used: ${:.2}\n", position.margin_used()));
    msg.push_str(&format!(
        "💵 Funding: ${:.2} since open (${:.2} all time)\n\n",
        position.funding_since_open(),
        position.funding_all_time()
    ));
    msg
}

fn format_position_summary(position: &Position) -> String {
    let size = position.size();
    let pnl = position.unrealized_pnl();
    let mut msg = format!("   {} ({})\n", position.symbol, side_label(size));
    msg.push_str(&format!(
        "   📈 Size: {:.5} (${:.2})\n",
        size.abs(),
        position.position_value()
    ));
    msg.push_str(&format!("   🏷️ Entry price: ${:.2}\n", position.entry_price()));
    msg.push_str(&format!("   📊 Leverage: {}x\n", position.leverage.value));
    msg.push_str(&format!(
        "   {} PnL: ${:.2} ({:.2}%)\n",
        pnl_marker(pnl),
        pnl,
        position.return_on_equity() * 100.0
    ));
    msg.push_str(&format!(
        "   ⚠️ Liquidation price: ${:.2}\n\n",
        position.liquidation_price()
    ));
    msg
}
