//! Offline listing of stored subscriptions.

use std::path::Path;

use tabled::{Table, Tabled};

use crate::adapter::outbound::sqlite::database::connection;
use crate::adapter::outbound::sqlite::SqliteStore;
use crate::app::Config;
use crate::domain::Subscription;
use crate::error::Result;
use crate::port::outbound::store::Store;

#[derive(Tabled)]
struct SubscriptionRow {
    #[tabled(rename = "Chat ID")]
    recipient: i64,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<Subscription> for SubscriptionRow {
    fn from(subscription: Subscription) -> Self {
        Self {
            recipient: subscription.recipient.get(),
            address: subscription.address.to_string(),
            name: subscription.name,
        }
    }
}

/// Render subscriptions as a table, or a notice when there are none.
#[must_use]
pub fn render(subscriptions: Vec<Subscription>) -> String {
    if subscriptions.is_empty() {
        return "No subscriptions stored.".to_string();
    }
    let rows: Vec<SubscriptionRow> = subscriptions.into_iter().map(Into::into).collect();
    Table::new(rows).to_string()
}

/// Print the subscriptions stored in the configured database.
///
/// Only the `[database]` section is needed; credentials are not checked.
///
/// # Errors
/// Returns an error if the config or the database cannot be opened.
pub fn execute<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let config = Config::read(config_path)?;
    let pool = connection::open(&config.database.path)?;
    let store = SqliteStore::new(pool);

    let subscriptions = store.load_subscriptions()?;
    let count = subscriptions.len();

    println!("Database: {}", config.database.path);
    println!();
    for line in render(subscriptions).lines() {
        println!("  {line}");
    }
    println!();
    println!("{count} subscription(s)");
    Ok(())
}
