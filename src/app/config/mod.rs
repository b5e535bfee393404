//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file with environment variable overrides
//! for sensitive values like `TELEGRAM_BOT_TOKEN`.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::{DetectionPolicy, RecipientId};
use crate::error::{ConfigError, Result};

mod logging;

pub use logging::{LogFormat, LoggingConfig};

/// Public Hyperliquid info endpoint.
pub const DEFAULT_API_URL: &str = "https://api.hyperliquid.xyz/info";

/// Polling interval used when none (or a non-positive one) is configured.
pub const DEFAULT_POLLING_INTERVAL_SECS: u64 = 30;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DATABASE_PATH: &str = "position-monitor.db";

/// Market data endpoint settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub api_url: String,
    /// Upper bound on one snapshot fetch.
    pub request_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Telegram bot credentials and the fixed super-admin.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Prefer the `TELEGRAM_BOT_TOKEN` env var over the file.
    pub bot_token: String,
    pub super_admin_id: Option<i64>,
}

/// Polling cadence and change detection policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between poll cycles; `<= 0` means the default.
    pub polling_interval_secs: i64,
    #[serde(flatten)]
    pub detection: DetectionPolicy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            polling_interval_secs: DEFAULT_POLLING_INTERVAL_SECS as i64,
            detection: DetectionPolicy::default(),
        }
    }
}

/// SQLite database location.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_DATABASE_PATH.to_string(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub telegram: TelegramConfig,
    pub monitor: MonitorConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Read, override from the environment, and validate.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if the file is unreadable, unparseable or
    /// incomplete.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and apply environment overrides without validating.
    ///
    /// Used by offline commands that only need part of the file.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if the file is unreadable or unparseable.
    #[allow(clippy::result_large_err)]
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let mut config = Self::parse(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse TOML text. No environment overrides, no validation.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed TOML.
    #[allow(clippy::result_large_err)]
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content).map_err(ConfigError::Parse)?)
    }

    /// Apply `TELEGRAM_BOT_TOKEN` and `SUPER_ADMIN_ID` from `lookup`.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] if `SUPER_ADMIN_ID` is not an
    /// integer chat ID.
    #[allow(clippy::result_large_err)]
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN").filter(|t| !t.trim().is_empty()) {
            self.telegram.bot_token = token.trim().to_string();
        }
        if let Some(raw) = lookup("SUPER_ADMIN_ID").filter(|v| !v.trim().is_empty()) {
            let id = raw
                .trim()
                .parse::<i64>()
                .map_err(|e| ConfigError::InvalidValue {
                    field: "SUPER_ADMIN_ID",
                    reason: e.to_string(),
                })?;
            self.telegram.super_admin_id = Some(id);
        }
        Ok(())
    }

    /// Check everything `run` needs.
    ///
    /// # Errors
    /// Returns the first missing or invalid field.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        let api_url = url::Url::parse(&self.network.api_url).map_err(|e| {
            ConfigError::InvalidValue {
                field: "network.api_url",
                reason: e.to_string(),
            }
        })?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "network.api_url",
                reason: format!("unsupported scheme `{}`", api_url.scheme()),
            }
            .into());
        }
        if self.network.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "network.request_timeout_secs",
                reason: "must be greater than 0".into(),
            }
            .into());
        }
        if self.telegram.bot_token.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "telegram.bot_token",
            }
            .into());
        }
        if self.telegram.super_admin_id.is_none() {
            return Err(ConfigError::MissingField {
                field: "telegram.super_admin_id",
            }
            .into());
        }

        let detection = &self.monitor.detection;
        for (field, value) in [
            ("monitor.resize_threshold_pct", detection.resize_threshold_pct),
            (
                "monitor.account_value_threshold_pct",
                detection.account_value_threshold_pct,
            ),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be a non-negative number, got {value}"),
                }
                .into());
            }
        }

        if self.database.path.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "database.path",
            }
            .into());
        }
        Ok(())
    }

    /// Interval between poll cycles, normalized to the default when unset
    /// or non-positive.
    #[must_use]
    pub fn polling_interval(&self) -> Duration {
        let secs = u64::try_from(self.monitor.polling_interval_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_POLLING_INTERVAL_SECS);
        Duration::from_secs(secs)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.network.request_timeout_secs)
    }

    /// The super-admin, if configured.
    #[must_use]
    pub fn super_admin(&self) -> Option<RecipientId> {
        self.telegram.super_admin_id.map(RecipientId::new)
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
