//! Wave strategies
//!
//! A strategy decides which enemies turn hostile. A wave starts every
//! `WAVE_INTERVAL_TICKS`; between waves every strategy activates nothing.
//!
//! - `column` sweeps week columns left to right, one wave per week, then stops.
//! - `row` sweeps weekday rows 0..=6 once. Seven waves regardless of how many
//!   weeks the grid has, so on a full-year grid it finishes far sooner than
//!   `column`.
//! - `random` picks a non-empty subset of the live enemies each wave from a
//!   seeded `Pcg32`, for `max(weeks, 1)` waves.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{Enemy, EnemyId};
use crate::config::StrategyKind;
use crate::consts::{NUM_DAYS, WAVE_INTERVAL_TICKS};

/// Chance that a live enemy joins a random wave
const RANDOM_PICK_PROBABILITY: f64 = 0.2;

/// Read-only view the strategy decides from
#[derive(Debug, Clone, Copy)]
pub struct Roster<'a> {
    pub weeks: usize,
    /// Sorted by id
    pub enemies: &'a [Enemy],
}

impl Roster<'_> {
    fn select(&self, pred: impl Fn(&Enemy) -> bool) -> Vec<EnemyId> {
        self.enemies
            .iter()
            .filter(|e| e.alive && pred(e))
            .map(|e| e.id)
            .collect()
    }
}

/// Wave index starting at `tick`, if a wave starts there
pub fn wave_at(tick: u64) -> Option<u32> {
    (tick % WAVE_INTERVAL_TICKS == 0).then(|| (tick / WAVE_INTERVAL_TICKS) as u32)
}

/// Enemy activation policy, fixed for a whole run
pub trait Strategy {
    fn name(&self) -> &'static str;

    /// Number of waves in the schedule for a grid of `weeks` columns
    fn wave_count(&self, weeks: usize) -> u32;

    /// Enemies that become active at `tick`, ascending by id
    fn activate(&mut self, tick: u64, roster: &Roster<'_>) -> Vec<EnemyId>;
}

/// One week column per wave
#[derive(Debug, Clone, Default)]
pub struct ColumnStrategy;

impl Strategy for ColumnStrategy {
    fn name(&self) -> &'static str {
        "column"
    }

    fn wave_count(&self, weeks: usize) -> u32 {
        weeks as u32
    }

    fn activate(&mut self, tick: u64, roster: &Roster<'_>) -> Vec<EnemyId> {
        match wave_at(tick) {
            Some(wave) if (wave as usize) < roster.weeks => {
                roster.select(|e| e.week == wave as usize)
            }
            _ => Vec::new(),
        }
    }
}

/// One weekday row per wave, a single sweep
#[derive(Debug, Clone, Default)]
pub struct RowStrategy;

impl Strategy for RowStrategy {
    fn name(&self) -> &'static str {
        "row"
    }

    fn wave_count(&self, _weeks: usize) -> u32 {
        NUM_DAYS as u32
    }

    fn activate(&mut self, tick: u64, roster: &Roster<'_>) -> Vec<EnemyId> {
        match wave_at(tick) {
            Some(wave) if (wave as usize) < NUM_DAYS => {
                roster.select(|e| e.weekday == wave as usize)
            }
            _ => Vec::new(),
        }
    }
}

/// Seeded random subsets of live enemies
#[derive(Debug, Clone)]
pub struct RandomStrategy {
    rng: Pcg32,
}

impl RandomStrategy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl Strategy for RandomStrategy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn wave_count(&self, weeks: usize) -> u32 {
        weeks.max(1) as u32
    }

    fn activate(&mut self, tick: u64, roster: &Roster<'_>) -> Vec<EnemyId> {
        let Some(wave) = wave_at(tick) else {
            return Vec::new();
        };
        if wave >= self.wave_count(roster.weeks) {
            return Vec::new();
        }

        let alive = roster.select(|_| true);
        if alive.is_empty() {
            return alive;
        }

        // One draw per live enemy, in id order, keeps the sequence stable
        let mut picked: Vec<EnemyId> = alive
            .iter()
            .copied()
            .filter(|_| self.rng.random_bool(RANDOM_PICK_PROBABILITY))
            .collect();
        if picked.is_empty() {
            let idx = self.rng.random_range(0..alive.len());
            picked.push(alive[idx]);
        }
        picked
    }
}

/// Build the strategy for a configured kind
pub fn strategy_for(kind: StrategyKind, seed: u64) -> Box<dyn Strategy> {
    match kind {
        StrategyKind::Column => Box::new(ColumnStrategy),
        StrategyKind::Row => Box::new(RowStrategy),
        StrategyKind::Random => Box::new(RandomStrategy::new(seed)),
    }
}
