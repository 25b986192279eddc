//! Deterministic simulation module
//!
//! All battle logic lives here. This module must be pure and deterministic:
//! - One fixed step per frame
//! - Seeded RNG only
//! - Stable iteration order (by entity ID, which is grid order for enemies)
//! - No rendering or I/O

pub mod collision;
pub mod engine;
pub mod snapshot;
pub mod state;
pub mod strategy;
pub mod tick;

pub use engine::Simulation;
pub use snapshot::Snapshot;
pub use state::{
    Activation, Enemy, EnemyId, Outcome, Owner, Particle, ParticleStyle, Projectile, Ship,
    SimState,
};
pub use strategy::{ColumnStrategy, RandomStrategy, Roster, RowStrategy, Strategy, strategy_for};
pub use tick::{tick, time_limit_ticks};
