//! Gift deduplication, combo resolution and entry allocation for the wheel.
//!
//! Upstream platforms deliver each gift combo as a burst of notifications with
//! increasing repeat counts plus trailing duplicates. [`resolver::ComboResolver`]
//! collapses such a burst into one canonical event, [`allocation`] turns that
//! event into roster entries, and [`wheel::GiftWheel`] ties both to durable
//! storage.

pub mod account;
pub mod allocation;
pub mod draw;
pub mod event;
pub mod leaderboard;
pub mod normalizer;
pub mod resolver;
pub mod roster;
pub mod scheduler;
pub mod wheel;

pub use event::{ComboKey, Fingerprint, GiftEvent};
pub use wheel::{GiftWheel, IngestOutcome, WheelConfig};

/// Engine error type.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Db(#[from] wheel_db::DbError),
}
