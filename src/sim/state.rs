//! Simulation state and entity types
//!
//! All entities are plain data owned by `SimState`. Renderers only ever see
//! clones of them through a `Snapshot`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::grid::ContributionGrid;

/// Stream tag mixed into the seed for cosmetic randomness, so that particle
/// draws never shift the strategy's sequence.
const FX_STREAM: u64 = 0xF0F0_1234_ABCD_0001;

/// Stable enemy identifier; ascending ids follow (week, weekday) order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

/// Who fired a projectile (relation only, never ownership)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Ship,
    Enemy(EnemyId),
}

/// Whether an enemy has been activated by a wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Dormant,
    /// Ticks left until the next shot
    Armed { countdown: u32 },
}

/// One contribution day turned hostile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub week: usize,
    pub weekday: usize,
    pub level: u8,
    pub hp: u8,
    pub max_hp: u8,
    pub pos: Vec2,
    pub alive: bool,
    /// Animation phase in ticks, offset per enemy
    pub phase: u32,
    pub activation: Activation,
    pub fire_interval: u32,
    /// Shots that hit the ship
    pub hits_landed: u32,
}

impl Enemy {
    pub fn new(id: EnemyId, week: usize, weekday: usize, level: u8) -> Self {
        Self {
            id,
            week,
            weekday,
            level,
            hp: level,
            max_hp: level,
            pos: Vec2::new(week as f32, weekday as f32),
            alive: true,
            phase: id.0.wrapping_mul(7) % 32,
            activation: Activation::Dormant,
            fire_interval: fire_interval_for(level),
            hits_landed: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.activation, Activation::Armed { .. })
    }

    /// Arm a dormant enemy. Returns false if it was dead or already armed.
    pub fn activate(&mut self) -> bool {
        if !self.alive || self.is_active() {
            return false;
        }
        let first_shot = self.fire_interval / 2 + self.weekday as u32 * FIRE_STAGGER_TICKS;
        self.activation = Activation::Armed {
            countdown: first_shot.max(1),
        };
        true
    }
}

/// Higher levels reload faster
pub fn fire_interval_for(level: u8) -> u32 {
    FIRE_INTERVAL_BASE_TICKS.saturating_sub(u32::from(level) * FIRE_INTERVAL_STEP_TICKS)
}

/// The player's ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Where the autopilot is heading
    pub target_x: f32,
    pub health: i32,
    /// Ticks until the ship may fire again
    pub cooldown: u32,
}

impl Ship {
    pub fn new(x: f32) -> Self {
        Self {
            pos: Vec2::new(x, SHIP_ROW),
            vel: Vec2::ZERO,
            target_x: x,
            health: SHIP_HEALTH,
            cooldown: 0,
        }
    }

    pub fn can_fire(&self) -> bool {
        self.cooldown == 0
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0
    }
}

/// A bullet, from either side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub owner: Owner,
    pub pos: Vec2,
    pub vel: Vec2,
    pub alive: bool,
}

impl Projectile {
    pub fn is_player(&self) -> bool {
        self.owner == Owner::Ship
    }
}

/// Visual style of a particle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleStyle {
    /// Bullet impact on an enemy
    Spark,
    /// Enemy destroyed
    Debris,
    /// Ship hit
    Flame,
}

/// A particle for visual effects (never affects the outcome)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining lifetime in ticks
    pub life: u32,
    pub max_life: u32,
    pub style: ParticleStyle,
}

impl Particle {
    /// 1.0 when fresh, approaching 0.0 as it expires
    pub fn remaining_fraction(&self) -> f32 {
        if self.max_life == 0 {
            0.0
        } else {
            self.life as f32 / self.max_life as f32
        }
    }
}

/// How the run ended (or that it has not)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Running,
    /// Ship health reached zero
    ShipDestroyed,
    /// Every enemy destroyed and the screen has settled
    Cleared,
    /// The wave schedule elapsed `ENDGAME_WAVE_MULTIPLE` times over
    TimeUp,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Running)
    }
}

/// Complete simulation state (deterministic)
#[derive(Debug, Clone)]
pub struct SimState {
    pub seed: u64,
    /// Cosmetic RNG (particles only)
    fx_rng: Pcg32,
    /// Ticks simulated so far
    pub tick: u64,
    /// Grid columns
    pub weeks: usize,
    /// Waves in the strategy's schedule
    pub wave_count: u32,
    /// Enemies spawned at setup
    pub initial_enemies: usize,
    pub ship: Ship,
    /// Sorted by id
    pub enemies: Vec<Enemy>,
    /// Sorted by id
    pub projectiles: Vec<Projectile>,
    pub particles: Vec<Particle>,
    pub score: u64,
    pub outcome: Outcome,
    next_id: u32,
}

impl SimState {
    /// Spawn one enemy per day with level >= 1, in grid order, and park the
    /// ship under the middle of the grid.
    pub fn new(grid: &ContributionGrid, wave_count: u32, seed: u64) -> Self {
        let mut next_id = 0;
        let mut enemies = Vec::with_capacity(grid.active_day_count());
        for (week, weekday, day) in grid.cells() {
            if day.level == 0 {
                continue;
            }
            enemies.push(Enemy::new(EnemyId(next_id), week, weekday, day.level));
            next_id += 1;
        }

        let weeks = grid.num_weeks();
        let center = (weeks.max(1) - 1) as f32 / 2.0;

        Self {
            seed,
            fx_rng: Pcg32::seed_from_u64(seed ^ FX_STREAM),
            tick: 0,
            weeks,
            wave_count,
            initial_enemies: enemies.len(),
            ship: Ship::new(center.round()),
            enemies,
            projectiles: Vec::new(),
            particles: Vec::new(),
            score: 0,
            outcome: Outcome::Running,
            next_id,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|idx| &self.enemies[idx])
    }

    pub fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(move |idx| &mut self.enemies[idx])
    }

    pub fn alive_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.alive).count()
    }

    pub fn spawn_projectile(&mut self, owner: Owner, pos: Vec2, vel: Vec2) {
        let id = self.next_entity_id();
        self.projectiles.push(Projectile {
            id,
            owner,
            pos,
            vel,
            alive: true,
        });
    }

    /// Radial burst of particles around `center`
    pub fn spawn_burst(&mut self, center: Vec2, count: u32, life: u32, style: ParticleStyle) {
        let reach = match style {
            ParticleStyle::Debris => 1.6,
            ParticleStyle::Spark => 0.8,
            ParticleStyle::Flame => 1.0,
        };
        for i in 0..count {
            if self.particles.len() >= MAX_PARTICLES {
                break;
            }
            let base = std::f32::consts::TAU * (i as f32 / count as f32);
            let jitter: f32 = self.fx_rng.random_range(-0.3..0.3);
            let speed_scale: f32 = self.fx_rng.random_range(0.6..1.0);
            let dir = Vec2::from_angle(base + jitter);
            self.particles.push(Particle {
                pos: center,
                vel: dir * (reach / life.max(1) as f32) * speed_scale,
                life,
                max_life: life,
                style,
            });
        }
    }

    /// Keep entity lists sorted by id for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.projectiles.sort_by_key(|p| p.id);
    }
}
