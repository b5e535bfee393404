//! Application layer - configuration, shared state, command control and
//! the poll loop.

mod config;
mod control;
mod monitor;
mod orchestrator;
mod state;

pub use config::{
    Config, DatabaseConfig, LogFormat, LoggingConfig, MonitorConfig, NetworkConfig, TelegramConfig,
    DEFAULT_API_URL, DEFAULT_POLLING_INTERVAL_SECS,
};
pub use control::{Control, ControlError, Effects};
pub use monitor::{CycleSummary, Monitor};
pub use orchestrator::App;
pub use state::{MonitorState, SubscribeOutcome, UnsubscribeOutcome};
