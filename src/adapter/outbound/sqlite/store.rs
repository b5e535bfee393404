//! SQLite store implementation.
//!
//! Provides persistent storage for subscriptions, account states and
//! authorized recipients using SQLite and Diesel ORM.

use std::collections::BTreeMap;

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::SqliteConnection;

use super::database::connection::DbPool;
use super::database::model::{AccountStateRow, AuthorizedRecipientRow, SubscriptionRow};
use super::database::schema::{account_states, authorized_recipients, subscriptions};
use crate::domain::{AccountState, Address, Position, RecipientId, Subscription};
use crate::error::{Error, Result};
use crate::port::outbound::store::Store;

/// SQLite-backed store.
///
/// Implements the [`Store`] trait for the three monitor record sets.
pub struct SqliteStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteStore {
    /// Create a new SQLite store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>> {
        self.pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))
    }

    fn subscription_from_row(row: SubscriptionRow) -> Result<Subscription> {
        let address = Address::parse(&row.address)?;
        Ok(Subscription::new(
            RecipientId::new(row.recipient_id),
            address,
            row.name,
        ))
    }

    fn state_to_row(address: &Address, state: &AccountState) -> Result<AccountStateRow> {
        Ok(AccountStateRow {
            address: address.to_string(),
            account_value: state.last_account_value,
            positions: serde_json::to_string(&state.last_positions)?,
        })
    }

    fn state_from_row(row: AccountStateRow) -> Result<AccountState> {
        let last_positions: BTreeMap<String, Position> = if row.positions.is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&row.positions).map_err(|e| Error::Parse(e.to_string()))?
        };
        Ok(AccountState {
            last_positions,
            last_account_value: row.account_value,
        })
    }
}

impl Store for SqliteStore {
    fn load_subscriptions(&self) -> Result<Vec<Subscription>> {
        let mut conn = self.conn()?;
        let rows: Vec<SubscriptionRow> = subscriptions::table
            .order((subscriptions::recipient_id, subscriptions::address))
            .select(SubscriptionRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        rows.into_iter().map(Self::subscription_from_row).collect()
    }

    fn save_subscription(&self, subscription: &Subscription) -> Result<()> {
        let row = SubscriptionRow {
            recipient_id: subscription.recipient.get(),
            address: subscription.address.to_string(),
            name: subscription.name.clone(),
        };
        let mut conn = self.conn()?;

        diesel::replace_into(subscriptions::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    fn delete_subscription(&self, recipient: RecipientId, address: &Address) -> Result<bool> {
        let mut conn = self.conn()?;

        let deleted = diesel::delete(
            subscriptions::table
                .filter(subscriptions::recipient_id.eq(recipient.get()))
                .filter(subscriptions::address.eq(address.as_str())),
        )
        .execute(&mut conn)
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(deleted > 0)
    }

    fn load_account_state(&self, address: &Address) -> Result<Option<AccountState>> {
        let mut conn = self.conn()?;

        let row: Option<AccountStateRow> = account_states::table
            .find(address.as_str())
            .select(AccountStateRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        row.map(Self::state_from_row).transpose()
    }

    fn save_account_state(&self, address: &Address, state: &AccountState) -> Result<()> {
        let row = Self::state_to_row(address, state)?;
        let mut conn = self.conn()?;

        diesel::replace_into(account_states::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    fn delete_account_state(&self, address: &Address) -> Result<bool> {
        let mut conn = self.conn()?;

        let deleted = diesel::delete(account_states::table.find(address.as_str()))
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(deleted > 0)
    }

    fn load_authorized(&self) -> Result<Vec<RecipientId>> {
        let mut conn = self.conn()?;

        let ids: Vec<i64> = authorized_recipients::table
            .select(authorized_recipients::recipient_id)
            .order(authorized_recipients::recipient_id)
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(ids.into_iter().map(RecipientId::new).collect())
    }

    fn save_authorized(&self, recipient: RecipientId) -> Result<()> {
        let row = AuthorizedRecipientRow {
            recipient_id: recipient.get(),
        };
        let mut conn = self.conn()?;

        diesel::insert_or_ignore_into(authorized_recipients::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    fn delete_authorized(&self, recipient: RecipientId) -> Result<bool> {
        let mut conn = self.conn()?;

        let deleted = diesel::delete(authorized_recipients::table.find(recipient.get()))
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(deleted > 0)
    }
}
