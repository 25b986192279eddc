//! Immutable per-tick view of the battle, the renderer's only input

use serde::Serialize;

use super::state::{Enemy, Outcome, Particle, Projectile, Ship, SimState};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub ship: Ship,
    /// Live enemies, ascending (week, weekday)
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub particles: Vec<Particle>,
    pub score: u64,
    pub enemies_remaining: usize,
    pub outcome: Outcome,
}

impl Snapshot {
    pub fn capture(state: &SimState) -> Self {
        let enemies: Vec<Enemy> = state.enemies.iter().filter(|e| e.alive).cloned().collect();
        Self {
            tick: state.tick,
            ship: state.ship.clone(),
            enemies_remaining: enemies.len(),
            enemies,
            projectiles: state.projectiles.iter().filter(|p| p.alive).cloned().collect(),
            particles: state.particles.clone(),
            score: state.score,
            outcome: state.outcome,
        }
    }
}
