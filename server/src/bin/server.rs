//! Headless server binary.
//!
//! Starts the gift pipeline and the axum web server, then waits for Ctrl+C.

use tracing_subscriber::EnvFilter;

use gift_wheel_lib::app::SharedState;
use gift_wheel_lib::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting gift wheel server");

    let (db, config, dir) = gift_wheel_lib::init_foundation()?;
    let state = SharedState::new(db, config, dir)?;

    let server_state = state.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(server_state).await {
            tracing::error!("Server failed: {e}");
        }
    });

    tracing::info!(
        port = state.server_port(),
        data_dir = %state.data_dir().display(),
        "Server running. Press Ctrl+C to stop."
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    state.shutdown_token().cancel();
    if let Err(e) = server_handle.await {
        tracing::warn!("Server task ended abnormally: {e}");
    }
    Ok(())
}
