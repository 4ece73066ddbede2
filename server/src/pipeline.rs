//! Gift pipeline worker.
//!
//! A single task owns the [`GiftWheel`]. Webhook ingress and API handlers talk
//! to it through an mpsc queue, so every gift, timer and roster edit is applied
//! in arrival order without locking. Deferred combos are fired by sleeping
//! until the wheel's next deadline.

use std::time::Duration;

use chrono::{DateTime, Utc};
use gift_engine::leaderboard::{LeaderboardView, TOP_N};
use gift_engine::{GiftEvent, GiftWheel, IngestOutcome};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::events;

/// Maximum number of queued commands.
const QUEUE_CAPACITY: usize = 1024;

type Job = Box<dyn FnOnce(&mut GiftWheel) + Send>;

enum Command {
    Ingest(GiftEvent),
    Run(Job),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("gift pipeline is not running")]
    Closed,
    #[error("gift pipeline queue is full")]
    Full,
}

/// Cloneable sender side of the pipeline.
#[derive(Clone)]
pub struct PipelineHandle {
    tx: mpsc::Sender<Command>,
}

impl PipelineHandle {
    /// Hand a normalized gift to the worker. Does not wait for it to be resolved.
    pub fn submit(&self, event: GiftEvent) -> Result<(), PipelineError> {
        self.tx.try_send(Command::Ingest(event)).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => PipelineError::Full,
            mpsc::error::TrySendError::Closed(_) => PipelineError::Closed,
        })
    }

    /// Run `f` against the wheel on the worker and wait for its result.
    pub async fn call<F, R>(&self, f: F) -> Result<R, PipelineError>
    where
        F: FnOnce(&mut GiftWheel) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |wheel| {
            let _ = reply_tx.send(f(wheel));
        });
        self.tx
            .send(Command::Run(job))
            .await
            .map_err(|_| PipelineError::Closed)?;
        reply_rx.await.map_err(|_| PipelineError::Closed)
    }
}

/// Start the worker task and return its handle.
pub fn spawn(
    wheel: GiftWheel,
    ws_tx: broadcast::Sender<String>,
    shutdown: CancellationToken,
) -> PipelineHandle {
    let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
    tokio::spawn(worker_loop(wheel, rx, ws_tx, shutdown));
    tracing::info!("Gift pipeline worker started (capacity={QUEUE_CAPACITY})");
    PipelineHandle { tx }
}

async fn worker_loop(
    mut wheel: GiftWheel,
    mut rx: mpsc::Receiver<Command>,
    ws_tx: broadcast::Sender<String>,
    shutdown: CancellationToken,
) {
    loop {
        let deadline = wheel.next_deadline();

        tokio::select! {
            _ = shutdown.cancelled() => break,
            command = rx.recv() => {
                let Some(command) = command else { break };
                match command {
                    Command::Ingest(event) => ingest(&mut wheel, event, &ws_tx),
                    Command::Run(job) => job(&mut wheel),
                }
            }
            _ = sleep_until(deadline) => {}
        }

        fire_due(&mut wheel, &ws_tx, Utc::now());
    }

    let pending = wheel.pending_combos();
    if pending > 0 {
        tracing::warn!(pending, "Gift pipeline stopped with unallocated combos");
    }
    tracing::info!("Gift pipeline worker stopped");
}

fn ingest(wheel: &mut GiftWheel, event: GiftEvent, ws_tx: &broadcast::Sender<String>) {
    let outcome = wheel.ingest(event.clone(), Utc::now());
    match outcome {
        IngestOutcome::Filtered => {
            events::broadcast_gift_ignored(ws_tx, &event, wheel.target_gift());
        }
        IngestOutcome::Dropped(_) => {}
        IngestOutcome::Deferred { due_at } => {
            events::broadcast_combo_pending(ws_tx, &event, due_at);
        }
        IngestOutcome::Allocated(report) => {
            events::broadcast_gift(ws_tx, &report);
            publish_state(wheel, ws_tx);
        }
    }
}

fn fire_due(wheel: &mut GiftWheel, ws_tx: &broadcast::Sender<String>, now: DateTime<Utc>) {
    let reports = wheel.fire_due(now);
    if reports.is_empty() {
        return;
    }
    for report in &reports {
        events::broadcast_gift(ws_tx, report);
    }
    publish_state(wheel, ws_tx);
}

/// Push the roster and the top of the leaderboard after a change.
pub fn publish_state(wheel: &GiftWheel, ws_tx: &broadcast::Sender<String>) {
    events::broadcast_roster(ws_tx, &wheel.snapshot());
    events::broadcast_leaderboard(ws_tx, &wheel.leaderboard(LeaderboardView::Top(TOP_N)));
}

async fn sleep_until(deadline: Option<DateTime<Utc>>) {
    match deadline {
        Some(deadline) => {
            let wait = (deadline - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            tokio::time::sleep(wait).await;
        }
        None => std::future::pending::<()>().await,
    }
}
