//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{account_states, authorized_recipients, subscriptions};

/// Database row for a subscription.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = subscriptions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SubscriptionRow {
    pub recipient_id: i64,
    pub address: String,
    pub name: String,
}

/// Database row for an account state. `positions` is a JSON object keyed
/// by symbol.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = account_states)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountStateRow {
    pub address: String,
    pub account_value: f64,
    pub positions: String,
}

/// Database row for an authorized recipient.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = authorized_recipients)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AuthorizedRecipientRow {
    pub recipient_id: i64,
}
