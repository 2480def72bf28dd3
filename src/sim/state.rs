//! Game state and core simulation types
//!
//! Positions and radii are board-space ([0,1] on both axes) unless a field
//! says otherwise. Pointer-derived positions stay in pixel-space until a
//! launch divides them by `vmin`.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::targets::generate_target;
use crate::tuning::Tuning;

/// Straight RGBA, components in [0, 1]
pub type Color = [f32; 4];

pub const BALL_COLOR: Color = [0.0, 0.0, 1.0, 1.0];
pub const TARGET_COLOR: Color = [0.0, 1.0, 1.0, 1.0];

/// Swipes kept per gesture (oldest dropped first)
pub const MAX_SWIPE_HISTORY: usize = 8;

/// Base shape shared by the ball and targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub pos: Vec2,
    pub radius: f32,
    pub color: Color,
}

/// A scoring zone. Consumed and regenerated on hit.
pub type Target = Circle;

/// The ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    /// Board widths per second
    pub vel: Vec2,
    pub radius: f32,
    pub color: Color,
}

impl Ball {
    pub fn as_circle(&self) -> Circle {
        Circle {
            pos: self.pos,
            radius: self.radius,
            color: self.color,
        }
    }
}

/// One pointer-down-to-pointer-up stroke. Pixel-space, timestamps in ms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Swipe {
    /// Pointer still down
    pub active: bool,
    pub start: Vec2,
    pub start_time: f64,
    /// Latest sample while active, release sample once completed
    pub end: Vec2,
    pub end_time: f64,
}

impl Swipe {
    pub fn is_completed(&self) -> bool {
        !self.active
    }
}

/// An aim gesture in progress or awaiting launch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameInput {
    /// Start of the most recent swipe
    pub start_time: f64,
    pub start: Vec2,
    pub end: Vec2,
    /// Chronological swipe history for this gesture (never empty)
    pub swipes: Vec<Swipe>,
}

impl GameInput {
    pub fn from_swipe(swipe: Swipe) -> Self {
        Self {
            start_time: swipe.start_time,
            start: swipe.start,
            end: swipe.end,
            swipes: vec![swipe],
        }
    }

    pub fn latest(&self) -> Option<&Swipe> {
        self.swipes.last()
    }

    /// The swipe currently being dragged, if any
    pub fn active_swipe(&self) -> Option<&Swipe> {
        self.swipes.last().filter(|s| s.active)
    }

    pub fn is_charging(&self) -> bool {
        self.active_swipe().is_some()
    }

    /// The most recent swipe if it has been released
    pub fn completed_swipe(&self) -> Option<&Swipe> {
        self.swipes.last().filter(|s| s.is_completed())
    }

    /// Record a swipe: update the latest entry if it is the same stroke,
    /// otherwise close the latest entry and append.
    pub fn record(&mut self, swipe: Swipe) {
        match self.swipes.last_mut() {
            Some(last) if last.start_time == swipe.start_time => *last = swipe,
            Some(last) => {
                last.active = false;
                self.swipes.push(swipe);
            }
            None => self.swipes.push(swipe),
        }
        if self.swipes.len() > MAX_SWIPE_HISTORY {
            let excess = self.swipes.len() - MAX_SWIPE_HISTORY;
            self.swipes.drain(..excess);
        }
        self.start_time = swipe.start_time;
        self.start = swipe.start;
        self.end = swipe.end;
    }
}

/// Complete game state (single source of truth)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Shorter viewport dimension (px), board-space to pixel-space scale
    pub vmin: f32,
    /// Playfield width (px), equal to `vmin`
    pub vx: f32,
    /// Playfield height (px), equal to `vmin`
    pub vy: f32,
    pub is_paused: bool,
    pub input: Option<GameInput>,
    pub ball: Ball,
    /// Current target first, then "next up"
    pub targets: Vec<Target>,
    pub score: u64,
}

impl GameState {
    /// Fresh session: ball centered with a random heading, targets spawned
    /// around it.
    pub fn new<R: Rng + ?Sized>(
        viewport_width: f32,
        viewport_height: f32,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Self {
        let vmin = viewport_width.min(viewport_height).max(0.0);

        let theta = rng.random::<f32>() * std::f32::consts::TAU;
        let ball = Ball {
            pos: Vec2::splat(0.5),
            vel: Vec2::new(theta.cos(), theta.sin()) * tuning.ball_start_speed,
            radius: tuning.ball_radius,
            color: BALL_COLOR,
        };

        let mut targets: Vec<Target> = Vec::with_capacity(tuning.target_count);
        for _ in 0..tuning.target_count {
            let target = generate_target(&ball, targets.last(), tuning, rng);
            targets.push(target);
        }

        Self {
            vmin,
            vx: vmin,
            vy: vmin,
            is_paused: false,
            input: None,
            ball,
            targets,
            score: 0,
        }
    }
}
