//! Colors for game elements (GitHub dark theme)

use super::canvas::Rgba;

pub const BACKGROUND: Rgba = Rgba::rgb(13, 17, 23);
pub const EMPTY_CELL: Rgba = Rgba::rgb(22, 27, 34);

/// Contribution level colors, index = level (0 is the empty cell)
pub const LEVELS: [Rgba; 5] = [
    EMPTY_CELL,
    Rgba::rgb(14, 68, 41),
    Rgba::rgb(0, 109, 50),
    Rgba::rgb(38, 166, 65),
    Rgba::rgb(57, 211, 83),
];

pub const STAR: Rgba = Rgba::rgb(201, 209, 217);
pub const SHIP: Rgba = Rgba::rgb(88, 166, 255);
pub const SHIP_COCKPIT: Rgba = Rgba::rgb(200, 230, 255);
pub const ENGINE_GLOW: Rgba = Rgba::rgb(255, 170, 60);
pub const PLAYER_BULLET: Rgba = Rgba::rgb(255, 223, 93);
pub const ENEMY_BULLET: Rgba = Rgba::rgb(248, 81, 73);
pub const ACTIVE_OUTLINE: Rgba = Rgba::rgb(126, 231, 135);
pub const SPARK: Rgba = Rgba::rgb(255, 240, 180);
pub const DEBRIS: Rgba = Rgba::rgb(86, 211, 100);
pub const FLAME: Rgba = Rgba::rgb(255, 123, 44);
pub const HUD_TEXT: Rgba = Rgba::rgb(139, 148, 158);
pub const HUD_ACCENT: Rgba = Rgba::rgb(240, 246, 252);
pub const HEALTH: Rgba = Rgba::rgb(248, 81, 73);

/// Cell color for a level, clamped to the top level
pub fn level_color(level: u8) -> Rgba {
    LEVELS[usize::from(level).min(LEVELS.len() - 1)]
}
