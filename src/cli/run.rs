//! Handler for the `run` command.

use tokio::signal;
use tracing::{error, info};

use crate::app::{App, Config, LogFormat};
use crate::cli::RunArgs;
use crate::error::Result;

/// Execute the run command.
///
/// # Errors
/// Returns configuration errors before logging is initialized.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = Config::load(&args.config)?;

    // Apply CLI overrides
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = LogFormat::Json;
    }

    config.init_logging();
    info!(config = %args.config.display(), "perpwatch starting");

    tokio::select! {
        result = App::run(config) => {
            if let Err(e) = result {
                error!(error = %e, "Fatal error");
                return Err(e);
            }
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!("perpwatch stopped");
    Ok(())
}
