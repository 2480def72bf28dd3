//! Frame clock
//!
//! Turns animation-frame timestamps (ms) into per-frame deltas (seconds).
//! The first frame reports `elapsed = 0`. Deltas are clamped to
//! `[0, max_elapsed]` so a backgrounded tab resuming with a large timestamp
//! jump does not blow up the integration step.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_ELAPSED;

/// One display refresh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameData {
    /// Monotonic frame timestamp (ms)
    pub timestamp: f64,
    /// Seconds since the previous frame, clamped
    pub elapsed: f32,
}

#[derive(Debug, Clone)]
pub struct FrameClock {
    previous: Option<f64>,
    max_elapsed: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_ELAPSED)
    }
}

impl FrameClock {
    pub fn new(max_elapsed: f32) -> Self {
        Self {
            previous: None,
            max_elapsed,
        }
    }

    pub fn max_elapsed(&self) -> f32 {
        self.max_elapsed
    }

    /// Register a frame callback and compute its delta
    pub fn advance(&mut self, timestamp: f64) -> FrameData {
        let elapsed = match self.previous {
            None => 0.0,
            Some(prev) => ((timestamp - prev) / 1000.0) as f32,
        };
        let elapsed = if elapsed.is_finite() {
            elapsed.clamp(0.0, self.max_elapsed)
        } else {
            0.0
        };

        // Never step backwards if the host hands us an out-of-order stamp
        self.previous = Some(self.previous.map_or(timestamp, |prev| prev.max(timestamp)));

        FrameData { timestamp, elapsed }
    }

    /// Consume the clock into a lazy frame stream over host timestamps.
    /// The stream ends when the host stops producing timestamps.
    pub fn frames<I>(self, timestamps: I) -> Frames<I::IntoIter>
    where
        I: IntoIterator<Item = f64>,
    {
        Frames {
            clock: self,
            timestamps: timestamps.into_iter(),
        }
    }
}

/// Iterator of `FrameData`, one per host timestamp
#[derive(Debug)]
pub struct Frames<I> {
    clock: FrameClock,
    timestamps: I,
}

impl<I: Iterator<Item = f64>> Iterator for Frames<I> {
    type Item = FrameData;

    fn next(&mut self) -> Option<FrameData> {
        let timestamp = self.timestamps.next()?;
        Some(self.clock.advance(timestamp))
    }
}
