//! App orchestration module.
//!
//! Wires the store, the market data client, the Telegram bot and the
//! poll loop together and runs until the command listener stops.

use std::sync::Arc;

use teloxide::Bot;
use tracing::{error, info, warn};

use super::config::Config;
use super::control::Control;
use super::monitor::Monitor;
use super::state::MonitorState;
use crate::adapter::outbound::hyperliquid::HyperliquidClient;
use crate::adapter::outbound::notifier::telegram::{run_command_listener, TelegramMessenger};
use crate::adapter::outbound::sqlite::database::connection;
use crate::adapter::outbound::sqlite::SqliteStore;
use crate::error::{ConfigError, Result};
use crate::port::outbound::exchange::SnapshotFetcher;
use crate::port::outbound::notifier::Messenger;
use crate::port::outbound::store::Store;

/// Main application entry point.
pub struct App;

impl App {
    /// Start the monitor.
    ///
    /// Store, config and bot token problems are fatal and returned before
    /// any polling starts.
    ///
    /// # Errors
    /// Returns an error if startup fails.
    pub async fn run(config: Config) -> Result<()> {
        let super_admin = config.super_admin().ok_or(ConfigError::MissingField {
            field: "telegram.super_admin_id",
        })?;

        let pool = connection::open(&config.database.path)?;
        info!(path = %config.database.path, "Database opened");
        let store: Arc<dyn Store> = Arc::new(SqliteStore::new(pool));
        let state = Arc::new(MonitorState::load(super_admin, store)?);

        let fetcher: Arc<dyn SnapshotFetcher> = Arc::new(HyperliquidClient::new(
            config.network.api_url.clone(),
            config.request_timeout(),
        ));

        let bot = Bot::new(config.telegram.bot_token.clone());
        let telegram = TelegramMessenger::new(bot.clone());
        telegram.verify().await?;
        let messenger: Arc<dyn Messenger> = Arc::new(telegram);

        let control = Control::new(
            state.clone(),
            fetcher.clone(),
            messenger.clone(),
            config.request_timeout(),
        );
        let listener = tokio::spawn(run_command_listener(bot, Arc::new(control)));

        let monitor = Monitor::new(
            state,
            fetcher,
            messenger,
            config.monitor.detection.clone(),
            config.polling_interval(),
            config.request_timeout(),
        );

        info!(
            super_admin = %super_admin,
            api_url = %config.network.api_url,
            polling_interval_secs = config.polling_interval().as_secs(),
            report_account_value_changes = config.monitor.detection.report_account_value_changes,
            "perpwatch running"
        );

        tokio::select! {
            () = monitor.run() => {}
            result = listener => {
                match result {
                    Ok(()) => warn!("Command listener stopped"),
                    Err(e) => error!(error = %e, "Command listener task failed"),
                }
            }
        }

        Ok(())
    }
}
