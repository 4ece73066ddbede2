//! Gift wheel server: webhook ingress, gift pipeline and overlay API.

pub mod app;
pub mod config;
pub mod events;
pub mod pipeline;
pub mod server;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use wheel_db::Database;

use config::{AppConfig, SettingsManager};

/// Determine the data directory for the application.
/// Priority: GIFT_WHEEL_DATA_DIR env var > ~/.gift-wheel
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("GIFT_WHEEL_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".gift-wheel")
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Open the database, seed settings and load the runtime config.
pub fn init_foundation() -> Result<(Database, AppConfig, PathBuf), anyhow::Error> {
    load_dotenv();

    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;
    let db_path = dir.join("wheel.db");

    tracing::info!("Opening database at {}", db_path.display());
    let db = Database::open(&db_path)?;

    let sm = SettingsManager::new(db.clone());
    if let Err(e) = sm.migrate_from_env() {
        tracing::error!("Failed to migrate from env: {e}");
    }
    sm.initialize_defaults()?;

    let config = AppConfig::load(&sm)?;
    tracing::info!(
        port = config.server_port,
        threshold = config.combo_value_threshold,
        combo_delay_ms = config.combo_delay_ms,
        target_gift = %config.target_gift,
        "Config loaded"
    );

    Ok((db, config, dir))
}
