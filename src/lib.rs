//! Bounce Shot - pull back, let go, and bounce the ball into the targets
//!
//! Core modules:
//! - `sim`: Pure simulation (integration, wall reflection, target scoring)
//! - `clock`: Animation-frame timestamps to elapsed-time deltas
//! - `input`: Pointer/keyboard events folded into drag state
//! - `store`: Single-writer game state cell with subscribers
//! - `runtime`: Per-frame join of clock, input and store
//! - `renderer`: Draw-call adapter over a 2D pixel surface
//! - `tuning`: Data-driven simulation parameters

pub mod clock;
pub mod debug;
pub mod error;
pub mod input;
pub mod renderer;
pub mod runtime;
pub mod settings;
pub mod sim;
pub mod store;
pub mod tuning;

pub use error::{StartupError, TuningError};
pub use runtime::Runtime;
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Reference values for the simulation. `Tuning::default()` is built from these.
pub mod consts {
    /// Largest frame delta handed to the simulation (seconds)
    pub const MAX_ELAPSED: f32 = 1.0 / 30.0;

    /// Ball defaults (board-space)
    pub const BALL_RADIUS: f32 = 0.08;
    /// Initial ball speed in board widths per second
    pub const BALL_START_SPEED: f32 = 0.5;

    /// Target defaults (board-space)
    pub const TARGET_RADIUS: f32 = 0.04;
    /// Number of targets on the board (current + next up)
    pub const TARGET_COUNT: usize = 2;
    /// New targets keep `(ball.radius + target.radius) * this` from the ball
    pub const BALL_CLEARANCE_FACTOR: f32 = 2.0;
    /// New targets keep `target.radius * this` from the previous target
    pub const TARGET_SPACING_FACTOR: f32 = 8.0;
    /// Rejection sampling cap before falling back to a fixed position
    pub const MAX_TARGET_ATTEMPTS: u32 = 10_000;

    /// A released swipe waits this long before it launches (ms)
    pub const RELEASE_GRACE_MS: f64 = 200.0;
    /// Aim held longer than this slows the ball down (ms)
    pub const CHARGE_THRESHOLD_MS: f64 = 250.0;
    /// Velocity scale applied to integration while charging
    pub const CHARGE_DAMPING: f32 = 0.25;

    /// Key that toggles pause (`KeyboardEvent.key`)
    pub const PAUSE_KEY: &str = " ";
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Scale a board-space point or length into pixel-space
#[inline]
pub fn to_pixels(board: Vec2, vmin: f32) -> Vec2 {
    board * vmin
}

/// Catapult launch: the reverse of the drag vector, normalized by board scale.
///
/// `start` and `end` are pixel-space pointer positions; the result is in
/// board widths per second.
#[inline]
pub fn launch_velocity(start: Vec2, end: Vec2, vmin: f32) -> Vec2 {
    if vmin <= 0.0 {
        return Vec2::ZERO;
    }
    (start - end) / vmin
}
