//! Data-driven simulation parameters
//!
//! Every value the simulation reads lives here so hosts can swap a JSON
//! file in without recompiling. Missing fields fall back to `consts`.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::TuningError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Ball radius (board-space)
    pub ball_radius: f32,
    /// Initial ball speed (boards/s, random heading)
    pub ball_start_speed: f32,
    /// Target radius (board-space)
    pub target_radius: f32,
    /// Targets on the board: 1 (single) or 2 (current + next up)
    pub target_count: usize,
    pub ball_clearance_factor: f32,
    pub target_spacing_factor: f32,
    pub max_target_attempts: u32,
    pub release_grace_ms: f64,
    pub charge_threshold_ms: f64,
    pub charge_damping: f32,
    /// Upper clamp for frame deltas (seconds)
    pub max_elapsed: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ball_radius: BALL_RADIUS,
            ball_start_speed: BALL_START_SPEED,
            target_radius: TARGET_RADIUS,
            target_count: TARGET_COUNT,
            ball_clearance_factor: BALL_CLEARANCE_FACTOR,
            target_spacing_factor: TARGET_SPACING_FACTOR,
            max_target_attempts: MAX_TARGET_ATTEMPTS,
            release_grace_ms: RELEASE_GRACE_MS,
            charge_threshold_ms: CHARGE_THRESHOLD_MS,
            charge_damping: CHARGE_DAMPING,
            max_elapsed: MAX_ELAPSED,
        }
    }
}

impl Tuning {
    /// Parse and validate a tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), TuningError> {
            Err(TuningError::Invalid { field, reason })
        }

        if !(self.ball_radius > 0.0 && self.ball_radius < 0.25) {
            return invalid("ball_radius", "must be in (0, 0.25)");
        }
        if !(self.target_radius > 0.0 && self.target_radius < 0.25) {
            return invalid("target_radius", "must be in (0, 0.25)");
        }
        if !(1..=2).contains(&self.target_count) {
            return invalid("target_count", "must be 1 or 2");
        }
        if !(self.ball_start_speed >= 0.0 && self.ball_start_speed.is_finite()) {
            return invalid("ball_start_speed", "must be a finite non-negative speed");
        }
        if self.ball_clearance_factor < 0.0 || self.target_spacing_factor < 0.0 {
            return invalid("ball_clearance_factor", "spacing factors must be non-negative");
        }
        if self.max_target_attempts == 0 {
            return invalid("max_target_attempts", "must be at least 1");
        }
        if self.release_grace_ms < 0.0 || self.charge_threshold_ms < 0.0 {
            return invalid("release_grace_ms", "durations must be non-negative");
        }
        if !(0.0..=1.0).contains(&self.charge_damping) {
            return invalid("charge_damping", "must be in [0, 1]");
        }
        if !(self.max_elapsed > 0.0 && self.max_elapsed.is_finite()) {
            return invalid("max_elapsed", "must be a positive number of seconds");
        }
        Ok(())
    }

    /// Minimum spawn distance between a new target and the ball
    pub fn min_dist_from_ball(&self, ball_radius: f32) -> f32 {
        (ball_radius + self.target_radius) * self.ball_clearance_factor
    }

    /// Minimum spawn distance between a new target and the previous one
    pub fn min_dist_from_prev_target(&self) -> f32 {
        self.target_radius * self.target_spacing_factor
    }
}
