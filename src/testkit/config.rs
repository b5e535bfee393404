//! Canonical test configurations.
//!
//! Single source of truth for config text used across tests.

use std::path::{Path, PathBuf};

/// Minimal valid configuration.
pub const VALID_CONFIG: &str = r#"
[telegram]
bot_token = "123456:test-token"
super_admin_id = 1

[monitor]
polling_interval_secs = 30
"#;

/// Valid configuration pointing at the given database file.
pub fn with_database(path: &Path) -> String {
    format!(
        "{VALID_CONFIG}\n[database]\npath = \"{}\"\n",
        path.display().to_string().replace('\\', "/")
    )
}

/// Write `contents` as `config.toml` inside `dir`.
pub fn write(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, contents).expect("write test config");
    path
}
