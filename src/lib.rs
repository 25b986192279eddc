//! gh-space-shooter - a contribution graph turned space battle
//!
//! Core modules:
//! - `grid`: Contribution calendar model (load, validate, levels)
//! - `sim`: Deterministic simulation (entities, strategies, tick loop)
//! - `renderer`: Software rasterizer turning snapshots into frames
//! - `sequencer`: Lazy, capped frame sequence over engine + renderer
//! - `output`: GIF/WebP encoding, data URLs, README section splicing
//! - `config`: Validated pipeline options

pub mod config;
pub mod error;
pub mod grid;
pub mod output;
pub mod renderer;
pub mod sequencer;
pub mod sim;

pub use config::{Config, OutputFormat, StrategyKind};
pub use error::{ConfigError, Error, MalformedDataError, OutputError};
pub use grid::{ContributionDay, ContributionGrid, ContributionWeek, level_of};
pub use renderer::{Frame, RenderContext, render};
pub use sequencer::{Animation, FrameSequencer, encode_animation};

use glam::Vec2;

/// Game configuration constants
///
/// Distances are in grid cells, times in ticks (one tick per frame).
pub mod consts {
    /// Rows in the contribution graph (Sun-Sat)
    pub const NUM_DAYS: usize = 7;
    /// Ship sits a few rows below the grid
    pub const SHIP_ROW: f32 = NUM_DAYS as f32 + 3.0;

    /// Default playback rate
    pub const DEFAULT_FPS: u32 = 40;
    /// Seed used when none is configured
    pub const DEFAULT_SEED: u64 = 0x5EED_CAFE;

    /// Ship movement (cells per tick)
    pub const SHIP_SPEED: f32 = 0.25;
    pub const SHIP_HEALTH: i32 = 10;
    pub const SHIP_FIRE_COOLDOWN_TICKS: u32 = 10;
    pub const SHIP_HALF_WIDTH: f32 = 0.5;
    pub const SHIP_HALF_HEIGHT: f32 = 0.5;

    /// Projectile speeds (cells per tick)
    pub const PLAYER_BULLET_SPEED: f32 = 0.5;
    pub const ENEMY_BULLET_SPEED: f32 = 0.15;
    /// Trailing segments drawn behind player bullets
    pub const BULLET_TRAIL_LENGTH: usize = 3;

    /// Enemy hit box half extent
    pub const ENEMY_HALF_EXTENT: f32 = 0.45;

    /// Ticks between waves (wave k starts at tick k * interval)
    pub const WAVE_INTERVAL_TICKS: u64 = 40;
    /// Runs with enemies end after this many wave schedules
    pub const ENDGAME_WAVE_MULTIPLE: u64 = 8;

    /// Fire interval = BASE - level * STEP
    pub const FIRE_INTERVAL_BASE_TICKS: u32 = 150;
    pub const FIRE_INTERVAL_STEP_TICKS: u32 = 15;
    /// Extra first-shot delay per weekday row, to stagger a column's volley
    pub const FIRE_STAGGER_TICKS: u32 = 4;

    /// Ship autopilot threat horizon: a lane is avoided while an enemy
    /// bullet will reach the ship within this many ticks
    pub const DODGE_LOOKAHEAD_TICKS: f32 = 12.0;
    /// Bullets this close to impact veto the ship's next step
    pub const DODGE_IMMINENT_TICKS: f32 = 2.0;

    /// Visible play area, beyond which projectiles die
    pub const BOUNDS_MARGIN: f32 = 2.0;
    pub const BOUNDS_TOP: f32 = -2.0;
    pub const BOUNDS_BOTTOM: f32 = SHIP_ROW + 3.0;

    /// Explosion bursts
    pub const EXPLOSION_PARTICLES_LARGE: u32 = 8;
    pub const EXPLOSION_PARTICLES_SMALL: u32 = 4;
    pub const EXPLOSION_TICKS_LARGE: u32 = 20;
    pub const EXPLOSION_TICKS_SMALL: u32 = 6;
    pub const MAX_PARTICLES: usize = 512;

    /// Frames emitted for an enemy-less grid when no cap is configured
    pub const IDLE_FRAME_LIMIT: usize = 400;
}

/// Move `current` toward `target` by at most `max_step`
#[inline]
pub fn approach(current: f32, target: f32, max_step: f32) -> f32 {
    let delta = (target - current).clamp(-max_step, max_step);
    current + delta
}

/// Axis-aligned overlap test between two boxes given centers and half extents
#[inline]
pub fn boxes_overlap(a: Vec2, a_half: Vec2, b: Vec2, b_half: Vec2) -> bool {
    let d = (a - b).abs();
    d.x < a_half.x + b_half.x && d.y < a_half.y + b_half.y
}
