//! Software renderer
//!
//! Turns a `Snapshot` into an RGBA `Frame`. Rendering is a pure function of
//! the snapshot and an immutable `RenderContext`, so identical runs produce
//! byte-identical frames.

pub mod canvas;
pub mod palette;
mod sprites;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::{NUM_DAYS, SHIP_ROW};
use crate::grid::ContributionGrid;
use crate::sim::Snapshot;
pub use canvas::{Canvas, Rgba};

/// Cell edge in pixels
pub const CELL_SIZE: i32 = 10;
pub const CELL_GAP: i32 = 2;
pub const CELL_PITCH: i32 = CELL_SIZE + CELL_GAP;
pub const MARGIN: i32 = 12;
/// Strip under the play area holding the HUD
pub const HUD_HEIGHT: i32 = 14;
/// Narrow grids are centered on a canvas at least this wide
pub const MIN_WIDTH: i32 = 200;

const STARFIELD_SEED: u64 = 0x57A2_F1E1_D000_0001;
/// Canvas pixels per star
const STAR_DENSITY: i32 = 700;

/// Background star; `y` scrolls down with time and wraps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    /// Pixels per tick
    pub speed: f32,
    pub brightness: f32,
    pub size: i32,
}

/// Everything a frame needs besides the snapshot. Built once per run.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub width: u32,
    pub height: u32,
    /// Pixel position of cell (0, 0)'s top-left corner
    origin: Vec2,
    /// Every (week, weekday) slot of the grid
    slots: Vec<(usize, usize)>,
    stars: Vec<Star>,
    hud_label: String,
    watermark: bool,
}

impl RenderContext {
    pub fn new(grid: &ContributionGrid, watermark: bool) -> Self {
        let weeks = grid.num_weeks().max(1) as i32;
        let grid_width = weeks * CELL_PITCH - CELL_GAP;
        let width = (grid_width + 2 * MARGIN).max(MIN_WIDTH);
        let play_rows = SHIP_ROW as i32 + 1;
        let height = MARGIN + play_rows * CELL_PITCH + HUD_HEIGHT;

        let origin = Vec2::new(((width - grid_width) / 2) as f32, MARGIN as f32);
        let slots = grid.cells().map(|(week, weekday, _)| (week, weekday)).collect();

        let mut rng = Pcg32::seed_from_u64(STARFIELD_SEED);
        let star_count = (width * height / STAR_DENSITY).max(1);
        let stars = (0..star_count)
            .map(|_| {
                let brightness: f32 = rng.random_range(0.2..1.0);
                Star {
                    x: rng.random_range(0.0..width as f32),
                    y: rng.random_range(0.0..height as f32),
                    speed: 0.05 + brightness * 0.25,
                    brightness,
                    size: if brightness > 0.85 { 2 } else { 1 },
                }
            })
            .collect();

        Self {
            width: width as u32,
            height: height as u32,
            origin,
            slots,
            stars,
            hud_label: format!("{} {} contributions", grid.username, grid.total_contributions),
            watermark,
        }
    }

    /// Pixel center of a point given in cell coordinates
    pub fn to_pixels(&self, cell: Vec2) -> Vec2 {
        self.origin + cell * CELL_PITCH as f32 + Vec2::splat(CELL_SIZE as f32 / 2.0)
    }

    /// Top-left pixel of a grid slot
    pub fn slot_origin(&self, week: usize, weekday: usize) -> (i32, i32) {
        (
            self.origin.x as i32 + week as i32 * CELL_PITCH,
            self.origin.y as i32 + weekday as i32 * CELL_PITCH,
        )
    }

    pub fn slots(&self) -> &[(usize, usize)] {
        &self.slots
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn hud_label(&self) -> &str {
        &self.hud_label
    }

    pub fn watermark(&self) -> bool {
        self.watermark
    }

    /// Top of the HUD strip
    pub fn hud_top(&self) -> i32 {
        self.height as i32 - HUD_HEIGHT
    }

    /// Bottom edge of the grid rows
    pub fn grid_bottom(&self) -> i32 {
        self.origin.y as i32 + NUM_DAYS as i32 * CELL_PITCH
    }
}

/// One rendered animation frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Tick this frame shows
    pub index: u64,
    pub width: u32,
    pub height: u32,
    pixels: Vec<Rgba>,
}

impl Frame {
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Raw RGBA bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// Draw one snapshot
pub fn render(snapshot: &Snapshot, ctx: &RenderContext) -> Frame {
    let mut canvas = Canvas::new(ctx.width, ctx.height, palette::BACKGROUND);

    sprites::draw_starfield(&mut canvas, ctx, snapshot.tick);
    sprites::draw_empty_cells(&mut canvas, ctx);
    for enemy in &snapshot.enemies {
        sprites::draw_enemy(&mut canvas, ctx, enemy, snapshot.tick);
    }
    for projectile in &snapshot.projectiles {
        sprites::draw_projectile(&mut canvas, ctx, projectile);
    }
    for particle in &snapshot.particles {
        sprites::draw_particle(&mut canvas, ctx, particle);
    }
    if !snapshot.ship.is_destroyed() {
        sprites::draw_ship(&mut canvas, ctx, &snapshot.ship, snapshot.tick);
    }
    sprites::draw_hud(&mut canvas, ctx, snapshot);

    Frame {
        index: snapshot.tick,
        width: ctx.width,
        height: ctx.height,
        pixels: canvas.into_pixels(),
    }
}
