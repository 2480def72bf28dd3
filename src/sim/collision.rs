//! Collision detection and response for the square board
//!
//! The board is the axis-aligned unit box. Walls reflect per axis; targets
//! are plain circle overlap tests.

use glam::Vec2;

use super::state::Circle;
use crate::distance;

/// Result of resolving a ball against the board walls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallBounce {
    pub pos: Vec2,
    pub vel: Vec2,
    pub hit_x: bool,
    pub hit_y: bool,
}

/// Reflect a projected ball position back inside `[radius, 1 - radius]`.
///
/// Each axis is handled on its own, so a corner hit flips both velocity
/// components. The overshoot is mirrored back inside the wall, then the
/// result is clamped so the center always ends up within bounds.
pub fn reflect_in_bounds(pos: Vec2, vel: Vec2, radius: f32) -> WallBounce {
    let (x, vx, hit_x) = reflect_axis(pos.x, vel.x, radius);
    let (y, vy, hit_y) = reflect_axis(pos.y, vel.y, radius);
    WallBounce {
        pos: Vec2::new(x, y),
        vel: Vec2::new(vx, vy),
        hit_x,
        hit_y,
    }
}

fn reflect_axis(p: f32, v: f32, radius: f32) -> (f32, f32, bool) {
    let lo = radius;
    let hi = 1.0 - radius;
    if lo > hi {
        // Ball wider than the board: pin it to the middle
        return (0.5, 0.0, true);
    }

    // Velocity always ends up pointing away from the wall that was hit
    let (p, v, hit) = if p < lo {
        (lo + (p - lo).abs(), v.abs(), true)
    } else if p > hi {
        (hi - (p - hi), -v.abs(), true)
    } else {
        (p, v, false)
    };

    (p.clamp(lo, hi), v, hit)
}

/// Strict circle overlap: touching edges do not count
#[inline]
pub fn circles_overlap(a: &Circle, b: &Circle) -> bool {
    distance(a.pos, b.pos) < a.radius + b.radius
}
