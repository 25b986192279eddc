//! Per-entity drawing routines, one per render layer

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::FONT_4X6;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Triangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use glam::Vec2;

use super::canvas::{Canvas, Rgba, alpha, to_point};
use super::{CELL_GAP, CELL_SIZE, HUD_HEIGHT, MARGIN, RenderContext, palette};
use crate::consts::BULLET_TRAIL_LENGTH;
use crate::sim::{Enemy, Outcome, Particle, ParticleStyle, Projectile, Ship, Snapshot};

const WATERMARK: &str = "gh-space-shooter";
/// Glyph box of the HUD font
const TEXT_HEIGHT: i32 = FONT_4X6.character_size.height as i32;
/// Ticks per enemy pulse cycle
const PULSE_PERIOD: u64 = 32;

/// Triangle wave in 0..=1
fn pulse(tick: u64, phase: u32) -> f32 {
    let t = ((tick + u64::from(phase)) % PULSE_PERIOD) as f32 / PULSE_PERIOD as f32;
    1.0 - (2.0 * t - 1.0).abs()
}

pub fn draw_starfield(canvas: &mut Canvas, ctx: &RenderContext, tick: u64) {
    let span = f64::from(ctx.height);
    for star in ctx.stars() {
        let y = (f64::from(star.y) + f64::from(star.speed) * tick as f64).rem_euclid(span);
        canvas.fill_rect(
            star.x as i32,
            y as i32,
            star.size,
            star.size,
            palette::STAR,
            alpha(star.brightness * 0.6),
        );
    }
}

pub fn draw_empty_cells(canvas: &mut Canvas, ctx: &RenderContext) {
    for &(week, weekday) in ctx.slots() {
        let (x, y) = ctx.slot_origin(week, weekday);
        canvas.fill_rect(x, y, CELL_SIZE, CELL_SIZE, palette::EMPTY_CELL, 255);
    }
}

/// Dimmed cell with a bright core that shrinks as the enemy takes damage
pub fn draw_enemy(canvas: &mut Canvas, ctx: &RenderContext, enemy: &Enemy, tick: u64) {
    let (x, y) = ctx.slot_origin(enemy.week, enemy.weekday);
    let color = palette::level_color(enemy.level);
    canvas.fill_rect(x, y, CELL_SIZE, CELL_SIZE, color.dim(0.45), 255);

    let health = f32::from(enemy.hp) / f32::from(enemy.max_hp.max(1));
    let core = ((CELL_SIZE - 2) as f32 * health).round().max(1.0) as i32;
    let inset = (CELL_SIZE - core) / 2;
    canvas.fill_rect(x + inset, y + inset, core, core, color, 255);

    if enemy.is_active() {
        let a = alpha(0.3 + 0.7 * pulse(tick, enemy.phase));
        let (ox, oy, side) = (x - 1, y - 1, CELL_SIZE + CELL_GAP);
        canvas.fill_rect(ox, oy, side, 1, palette::ACTIVE_OUTLINE, a);
        canvas.fill_rect(ox, oy + side - 1, side, 1, palette::ACTIVE_OUTLINE, a);
        canvas.fill_rect(ox, oy + 1, 1, side - 2, palette::ACTIVE_OUTLINE, a);
        canvas.fill_rect(ox + side - 1, oy + 1, 1, side - 2, palette::ACTIVE_OUTLINE, a);
    }
}

pub fn draw_projectile(canvas: &mut Canvas, ctx: &RenderContext, projectile: &Projectile) {
    let center = ctx.to_pixels(projectile.pos);
    if projectile.is_player() {
        for k in (1..=BULLET_TRAIL_LENGTH).rev() {
            let fade = 1.0 - k as f32 / (BULLET_TRAIL_LENGTH + 1) as f32;
            let p = ctx.to_pixels(projectile.pos - projectile.vel * k as f32);
            canvas.fill_rect(
                p.x as i32 - 1,
                p.y as i32 - 2,
                2,
                4,
                palette::PLAYER_BULLET,
                alpha(fade * 0.6),
            );
        }
        canvas.fill_rect(
            center.x as i32 - 1,
            center.y as i32 - 3,
            2,
            6,
            palette::PLAYER_BULLET,
            255,
        );
    } else {
        let center = to_point(center);
        canvas.fill_shape(&Circle::with_center(center, 7), palette::ENEMY_BULLET, 70);
        canvas.fill_shape(&Circle::with_center(center, 4), palette::ENEMY_BULLET, 255);
    }
}

pub fn draw_particle(canvas: &mut Canvas, ctx: &RenderContext, particle: &Particle) {
    let (color, size) = match particle.style {
        ParticleStyle::Spark => (palette::SPARK, 2),
        ParticleStyle::Debris => (palette::DEBRIS, 3),
        ParticleStyle::Flame => (palette::FLAME, 3),
    };
    let p = ctx.to_pixels(particle.pos);
    canvas.fill_rect(
        p.x as i32 - size / 2,
        p.y as i32 - size / 2,
        size,
        size,
        color,
        alpha(particle.remaining_fraction()),
    );
}

/// Arrow-shaped fighter centered on the ship's cell
pub fn draw_ship(canvas: &mut Canvas, ctx: &RenderContext, ship: &Ship, tick: u64) {
    let c = ctx.to_pixels(ship.pos);
    let at = |dx: f32, dy: f32| to_point(c + Vec2::new(dx, dy));

    let glow = if (tick / 2) % 2 == 0 { 5 } else { 6 };
    canvas.fill_shape(&Circle::with_center(at(0.0, 5.0), glow), palette::ENGINE_GLOW, 200);

    let wing = palette::SHIP.shade(-40, -40, -40);
    canvas.fill_shape(&Triangle::new(at(-6.0, 4.0), at(0.0, -1.0), at(6.0, 4.0)), wing, 255);

    let nose = Triangle::new(at(0.0, -6.0), at(-2.5, 0.0), at(2.5, 0.0));
    canvas.fill_shape(&nose, palette::SHIP, 255);
    // Hull quad as two triangles
    canvas.fill_shape(&Triangle::new(at(-2.5, 0.0), at(2.5, 0.0), at(2.0, 4.0)), palette::SHIP, 255);
    canvas.fill_shape(&Triangle::new(at(-2.5, 0.0), at(2.0, 4.0), at(-2.0, 4.0)), palette::SHIP, 255);
    canvas.fill_shape(&Circle::with_center(at(0.0, -1.0), 3), palette::SHIP_COCKPIT, 255);
}

/// One line of HUD text, top-aligned at `at`
fn draw_text(canvas: &mut Canvas, text: &str, at: Point, alignment: Alignment, color: Rgba, alpha: u8) {
    let character_style = MonoTextStyle::new(&FONT_4X6, color.into());
    let text_style = TextStyleBuilder::new()
        .alignment(alignment)
        .baseline(Baseline::Top)
        .build();
    let Ok(_) = Text::with_text_style(text, at, character_style, text_style)
        .draw(&mut canvas.translucent(alpha));
}

pub fn draw_hud(canvas: &mut Canvas, ctx: &RenderContext, snapshot: &Snapshot) {
    let right = ctx.width as i32 - MARGIN;
    let top = ctx.hud_top() + (HUD_HEIGHT - TEXT_HEIGHT) / 2;
    let label = ctx.hud_label();
    draw_text(canvas, label, Point::new(MARGIN, top), Alignment::Left, palette::HUD_TEXT, 255);

    let status = format!("score {}  hp {}", snapshot.score, snapshot.ship.health.max(0));
    draw_text(canvas, &status, Point::new(right, top), Alignment::Right, palette::HUD_ACCENT, 255);

    if ctx.watermark() {
        let at = Point::new(right, (MARGIN - TEXT_HEIGHT) / 2);
        draw_text(canvas, WATERMARK, at, Alignment::Right, palette::HUD_TEXT, 140);
    }

    let banner = match snapshot.outcome {
        Outcome::Running => return,
        Outcome::ShipDestroyed => "game over",
        Outcome::Cleared => "cleared",
        Outcome::TimeUp => "time up",
    };
    let color = match snapshot.outcome {
        Outcome::ShipDestroyed => palette::HEALTH,
        _ => palette::HUD_ACCENT,
    };
    let at = Point::new(ctx.width as i32 / 2, ctx.grid_bottom() + CELL_SIZE);
    draw_text(canvas, banner, at, Alignment::Center, color, 255);
}
