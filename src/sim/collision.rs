//! Hit tests between projectiles and combatants
//!
//! Everything is an axis-aligned box in cell units. Bullets move at most half
//! a cell per tick, well under the smallest box height, so they cannot tunnel.

use glam::Vec2;

use crate::boxes_overlap;
use crate::consts::{ENEMY_HALF_EXTENT, SHIP_HALF_HEIGHT, SHIP_HALF_WIDTH};

/// Bullet half extents (thin and tall)
pub const BULLET_HALF: Vec2 = Vec2::new(0.1, 0.25);

#[inline]
pub fn bullet_hits_enemy(bullet: Vec2, enemy: Vec2) -> bool {
    boxes_overlap(bullet, BULLET_HALF, enemy, Vec2::splat(ENEMY_HALF_EXTENT))
}

#[inline]
pub fn bullet_hits_ship(bullet: Vec2, ship: Vec2) -> bool {
    boxes_overlap(
        bullet,
        BULLET_HALF,
        ship,
        Vec2::new(SHIP_HALF_WIDTH, SHIP_HALF_HEIGHT),
    )
}
