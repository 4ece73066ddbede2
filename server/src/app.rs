use std::path::PathBuf;
use std::sync::Arc;

use gift_engine::GiftWheel;
use tokio::sync::{RwLock, broadcast};
use tokio_util::sync::CancellationToken;
use wheel_db::Database;

use crate::config::{AppConfig, SettingsManager};
use crate::pipeline::{self, PipelineHandle};

/// Application shared state accessible from axum handlers and background tasks.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Broadcast channel for WebSocket/SSE messages
    ws_tx: broadcast::Sender<String>,
    /// Application configuration (reloadable)
    config: RwLock<AppConfig>,
    /// Database handle
    db: Database,
    /// Data directory path
    data_dir: PathBuf,
    /// Sender side of the gift pipeline worker
    pipeline: PipelineHandle,
    /// Cancelled on Ctrl+C
    shutdown_token: CancellationToken,
}

impl SharedState {
    /// Load the wheel from `db` and start the pipeline worker. Must be called
    /// inside a tokio runtime.
    pub fn new(db: Database, config: AppConfig, data_dir: PathBuf) -> Result<Self, anyhow::Error> {
        let (ws_tx, _) = broadcast::channel(2048);
        let shutdown_token = CancellationToken::new();

        let mut wheel = GiftWheel::load(db.clone(), config.resolver_config())?;
        wheel.set_target_gift(config.target_gift.clone());
        let pipeline = pipeline::spawn(wheel, ws_tx.clone(), shutdown_token.clone());

        Ok(Self {
            inner: Arc::new(SharedStateInner {
                ws_tx,
                config: RwLock::new(config),
                db,
                data_dir,
                pipeline,
                shutdown_token,
            }),
        })
    }

    pub fn server_port(&self) -> u16 {
        self.inner
            .config
            .try_read()
            .map(|c| c.server_port)
            .unwrap_or(3000)
    }

    pub fn ws_sender(&self) -> &broadcast::Sender<String> {
        &self.inner.ws_tx
    }

    pub fn subscribe_ws(&self) -> broadcast::Receiver<String> {
        self.inner.ws_tx.subscribe()
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.inner.data_dir
    }

    pub fn pipeline(&self) -> &PipelineHandle {
        &self.inner.pipeline
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown_token
    }

    /// Get a read lock on the current config.
    pub async fn config(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.config.read().await
    }

    /// Reload config from the database and push the gift tuning to the worker.
    pub async fn reload_config(&self) -> Result<(), anyhow::Error> {
        let sm = SettingsManager::new(self.inner.db.clone());
        let (resolver_config, target_gift) = {
            let mut config = self.inner.config.write().await;
            config.reload(&sm)?;
            (config.resolver_config(), config.target_gift.clone())
        };

        self.inner
            .pipeline
            .call(move |wheel| {
                wheel.set_resolver_config(resolver_config);
                wheel.set_target_gift(target_gift);
            })
            .await?;
        Ok(())
    }
}
