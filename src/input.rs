//! Pointer and keyboard input aggregation
//!
//! Raw pointer events fold into an `InputState`:
//! - Idle: `down = false`, no live gesture
//! - Dragging: `down = true`, `drag` holds every sample since pointer-down
//! - Released: `down = false`, `drag` still holds the whole gesture
//!   including the up sample, until the next pointer-down resets it

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::PAUSE_KEY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// The host took the pointer away (`pointercancel`)
    Cancel,
}

/// One raw pointer event. Position is pixel-space (client coordinates),
/// timestamp is the event's monotonic `timeStamp` in ms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub phase: PointerPhase,
    pub pointer_id: i32,
    pub pos: Vec2,
    pub timestamp: f64,
}

impl PointerSample {
    pub fn new(phase: PointerPhase, pos: Vec2, timestamp: f64) -> Self {
        Self {
            phase,
            pointer_id: 0,
            pos,
            timestamp,
        }
    }

    pub fn down(x: f32, y: f32, timestamp: f64) -> Self {
        Self::new(PointerPhase::Down, Vec2::new(x, y), timestamp)
    }

    pub fn moved(x: f32, y: f32, timestamp: f64) -> Self {
        Self::new(PointerPhase::Move, Vec2::new(x, y), timestamp)
    }

    pub fn up(x: f32, y: f32, timestamp: f64) -> Self {
        Self::new(PointerPhase::Up, Vec2::new(x, y), timestamp)
    }
}

/// Logical aggregator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Dragging,
    Released,
}

/// Aggregated drag state, sampled once per frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pub down: bool,
    /// Samples in order of receipt. Reset only by pointer-down.
    pub drag: Vec<PointerSample>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a whole event sequence from Idle
    pub fn fold<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = PointerSample>,
    {
        let mut state = Self::new();
        for sample in samples {
            state.apply(sample);
        }
        state
    }

    /// Apply one pointer event
    pub fn apply(&mut self, sample: PointerSample) {
        match sample.phase {
            PointerPhase::Down => {
                // Always restarts, even over a stroke whose up never arrived
                self.down = true;
                self.drag.clear();
                self.drag.push(sample);
            }
            PointerPhase::Move => {
                if self.down && self.pointer_id() == Some(sample.pointer_id) {
                    self.drag.push(sample);
                }
            }
            PointerPhase::Up => {
                // A stray up with no gesture in progress has nothing to end
                if self.down && self.pointer_id() == Some(sample.pointer_id) {
                    self.down = false;
                    self.drag.push(sample);
                }
            }
            PointerPhase::Cancel => {
                if self.down && self.pointer_id() == Some(sample.pointer_id) {
                    log::debug!("Pointer {} cancelled, dropping drag", sample.pointer_id);
                    self.down = false;
                    self.drag.clear();
                }
            }
        }
    }

    pub fn phase(&self) -> GesturePhase {
        match (self.down, self.drag.is_empty()) {
            (true, _) => GesturePhase::Dragging,
            (false, true) => GesturePhase::Idle,
            (false, false) => GesturePhase::Released,
        }
    }

    pub fn first(&self) -> Option<&PointerSample> {
        self.drag.first()
    }

    pub fn last(&self) -> Option<&PointerSample> {
        self.drag.last()
    }

    fn pointer_id(&self) -> Option<i32> {
        self.drag.first().map(|s| s.pointer_id)
    }
}

/// Distinct keys pressed during one frame window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeysDown(BTreeSet<String>);

impl KeysDown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a `KeyboardEvent.key`. Repeats within the window collapse.
    pub fn press(&mut self, key: &str) {
        self.0.insert(key.to_owned());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    /// Keys the game consumes; hosts suppress their default action
    pub fn is_game_key(key: &str) -> bool {
        key == PAUSE_KEY
    }

    pub fn pause_pressed(&self) -> bool {
        self.contains(PAUSE_KEY)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hand the current window over and start a new one
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

impl<S: AsRef<str>> FromIterator<S> for KeysDown {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(|k| k.as_ref().to_owned()).collect())
    }
}
