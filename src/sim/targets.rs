//! Procedural target placement
//!
//! Rejection sampling over the inner board `[2r, 1-2r]²`. A candidate is
//! rejected when it sits too close to the ball or to the previous target.

use glam::Vec2;
use rand::Rng;

use super::state::{Ball, TARGET_COLOR, Target};
use crate::distance;
use crate::tuning::Tuning;

/// Place the next target.
///
/// The random source is injected so sessions and tests can be replayed from
/// a seed. Sampling gives up after `tuning.max_target_attempts` draws and
/// falls back to the best of a fixed set of on-board positions.
pub fn generate_target<R: Rng + ?Sized>(
    ball: &Ball,
    previous: Option<&Target>,
    tuning: &Tuning,
    rng: &mut R,
) -> Target {
    let radius = tuning.target_radius;
    let margin = radius * 2.0;
    let span = (1.0 - radius * 4.0).max(0.0);

    let min_from_ball = tuning.min_dist_from_ball(ball.radius);
    let min_from_prev = tuning.min_dist_from_prev_target();

    let too_close = |p: Vec2| {
        distance(p, ball.pos) < min_from_ball
            || previous.is_some_and(|prev| distance(p, prev.pos) < min_from_prev)
    };

    for _ in 0..tuning.max_target_attempts {
        let candidate = Vec2::new(
            margin + rng.random::<f32>() * span,
            margin + rng.random::<f32>() * span,
        );
        if !too_close(candidate) {
            return Target {
                pos: candidate,
                radius,
                color: TARGET_COLOR,
            };
        }
    }

    let pos = fallback_position(ball.pos, previous.map(|t| t.pos), margin);
    log::warn!(
        "Target placement stalled after {} attempts, using fallback ({:.2}, {:.2})",
        tuning.max_target_attempts,
        pos.x,
        pos.y
    );
    Target {
        pos,
        radius,
        color: TARGET_COLOR,
    }
}

/// Best-effort spot when sampling stalls: of the inner-board corners, edge
/// midpoints and center, the one furthest from both the ball and the
/// previous target.
fn fallback_position(ball: Vec2, previous: Option<Vec2>, margin: f32) -> Vec2 {
    let lo = margin.min(0.5);
    let hi = 1.0 - lo;
    let candidates = [
        Vec2::new(lo, lo),
        Vec2::new(hi, lo),
        Vec2::new(lo, hi),
        Vec2::new(hi, hi),
        Vec2::new(0.5, lo),
        Vec2::new(0.5, hi),
        Vec2::new(lo, 0.5),
        Vec2::new(hi, 0.5),
        Vec2::splat(0.5),
    ];

    let clearance = |p: Vec2| {
        let from_ball = distance(p, ball);
        previous.map_or(from_ball, |prev| from_ball.min(distance(p, prev)))
    };

    candidates
        .into_iter()
        .max_by(|a, b| clearance(*a).total_cmp(&clearance(*b)))
        .unwrap_or(Vec2::splat(0.5))
}
