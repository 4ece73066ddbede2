//! Uniform winner draw and the spin plan handed to the wheel animation.
//!
//! The winner is always chosen first. The rotation is then derived from the
//! winning index so the animation can only ever land on that slice.

use std::f64::consts::TAU;

use rand::Rng;
use rand::rngs::OsRng;
use serde::Serialize;

const MIN_FULL_TURNS: u32 = 5;
const MAX_FULL_TURNS: u32 = 7;
/// Fraction of a slice the pointer may stray from its centre.
const LANDING_JITTER: f64 = 0.4;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DrawError {
    #[error("no participants")]
    NoParticipants,
}

pub fn draw_index(len: usize) -> Result<usize, DrawError> {
    let mut rng = OsRng;
    draw_index_with_rng(len, &mut rng)
}

pub fn draw_index_with_rng<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Result<usize, DrawError> {
    if len == 0 {
        return Err(DrawError::NoParticipants);
    }
    Ok(rng.gen_range(0..len))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinPlan {
    pub winner_index: usize,
    pub winner: String,
    pub total_entries: usize,
    /// Clockwise wheel rotation in radians. Slice 0 starts under the pointer.
    pub rotation: f64,
    pub duration_ms: u64,
    /// Winner's share of the roster, in percent.
    pub chance: f64,
}

pub fn plan_spin(entries: &[String], duration_ms: u64) -> Result<SpinPlan, DrawError> {
    let mut rng = OsRng;
    plan_spin_with_rng(entries, duration_ms, &mut rng)
}

pub fn plan_spin_with_rng<R: Rng + ?Sized>(
    entries: &[String],
    duration_ms: u64,
    rng: &mut R,
) -> Result<SpinPlan, DrawError> {
    let winner_index = draw_index_with_rng(entries.len(), rng)?;
    let total_entries = entries.len();
    let slice = TAU / total_entries as f64;

    let turns = rng.gen_range(MIN_FULL_TURNS..=MAX_FULL_TURNS);
    let jitter = rng.gen_range(-LANDING_JITTER..LANDING_JITTER) * slice;
    let winner_angle = (winner_index as f64 + 0.5) * slice + jitter;
    let rotation = f64::from(turns) * TAU + (TAU - winner_angle);

    let winner = entries[winner_index].clone();
    let wins = entries.iter().filter(|entry| **entry == winner).count();

    Ok(SpinPlan {
        winner_index,
        winner,
        total_entries,
        rotation,
        duration_ms,
        chance: wins as f64 * 100.0 / total_entries as f64,
    })
}

/// Index of the slice under the pointer after rotating by `rotation`.
pub fn landing_index(rotation: f64, total_entries: usize) -> Option<usize> {
    if total_entries == 0 {
        return None;
    }
    let slice = TAU / total_entries as f64;
    let angle = (TAU - rotation.rem_euclid(TAU)).rem_euclid(TAU);
    Some(((angle / slice).floor() as usize).min(total_entries - 1))
}
