use std::path::Path;

use crate::app::Config;
use crate::error::Result;

/// Validate configuration file without starting the bot.
///
/// # Errors
/// Returns the first configuration error found.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    println!("Checking configuration: {}", path.display());
    println!();

    let config = Config::load(path)?;

    println!("✓ Configuration file is valid");
    println!();
    println!("Summary:");
    println!("  API URL: {}", config.network.api_url);
    println!("  Request timeout: {}s", config.network.request_timeout_secs);
    println!("  Polling interval: {}s", config.polling_interval().as_secs());
    println!(
        "  Resize threshold: {:.2}%",
        config.monitor.detection.resize_threshold_pct
    );
    if config.monitor.detection.report_account_value_changes {
        println!(
            "  Account value changes: reported above {:.2}%",
            config.monitor.detection.account_value_threshold_pct
        );
    } else {
        println!("  Account value changes: not reported");
    }
    println!("  Database: {}", config.database.path);
    if let Some(admin) = config.super_admin() {
        println!("  Super-admin: {admin}");
    }
    println!();

    if std::env::var("TELEGRAM_BOT_TOKEN").is_ok() {
        println!("✓ Telegram bot token found (from TELEGRAM_BOT_TOKEN env var)");
    } else {
        println!("⚠ Telegram bot token read from the config file");
        println!("  Prefer the TELEGRAM_BOT_TOKEN environment variable for secrets");
    }

    println!();
    println!("Configuration is ready to use.");
    Ok(())
}
