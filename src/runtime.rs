//! Frame-driven session runtime
//!
//! Pointer, keyboard and animation-frame sources arrive independently. Input
//! events only update the aggregators; each animation frame samples the
//! latest pointer aggregate and the keys seen since the previous frame, runs
//! one simulation step and commits it to the store. Hosts call `dispose` to
//! detach all three sources at once.

use rand::Rng;

use crate::clock::{FrameClock, FrameData};
use crate::input::{InputState, KeysDown, PointerSample};
use crate::sim::{GameState, update_game_state};
use crate::store::GameStore;
use crate::tuning::Tuning;

pub struct Runtime<R: Rng> {
    clock: FrameClock,
    pointer: InputState,
    keys: KeysDown,
    store: GameStore,
    tuning: Tuning,
    rng: R,
    disposed: bool,
}

impl<R: Rng> Runtime<R> {
    /// Start a session for a viewport of the given pixel size
    pub fn new(viewport_width: f32, viewport_height: f32, tuning: Tuning, mut rng: R) -> Self {
        let state = GameState::new(viewport_width, viewport_height, &tuning, &mut rng);
        log::info!(
            "Session started: vmin={:.0}, targets={}",
            state.vmin,
            state.targets.len()
        );
        Self::with_state(state, tuning, rng)
    }

    /// Resume from an existing state (tests, replays)
    pub fn with_state(state: GameState, tuning: Tuning, rng: R) -> Self {
        Self {
            clock: FrameClock::new(tuning.max_elapsed),
            pointer: InputState::new(),
            keys: KeysDown::new(),
            store: GameStore::new(state),
            tuning,
            rng,
            disposed: false,
        }
    }

    pub fn pointer_event(&mut self, sample: PointerSample) {
        if self.disposed {
            return;
        }
        self.pointer.apply(sample);
    }

    pub fn key_down(&mut self, key: &str) {
        if self.disposed {
            return;
        }
        self.keys.press(key);
    }

    /// Run one tick for an animation-frame callback.
    /// Returns `None` once the runtime has been disposed.
    pub fn animation_frame(&mut self, timestamp: f64) -> Option<FrameData> {
        if self.disposed {
            return None;
        }

        let frame = self.clock.advance(timestamp);
        let keys = self.keys.take();
        let previous_score = self.store.state().score;

        let next = update_game_state(
            frame,
            self.store.state(),
            &keys,
            &self.pointer,
            &self.tuning,
            &mut self.rng,
        );
        if next.score != previous_score {
            log::info!("Score: {}", next.score);
        }
        if next.is_paused != self.store.state().is_paused {
            log::info!("{}", if next.is_paused { "Paused" } else { "Resumed" });
        }
        self.store.commit(next);

        Some(frame)
    }

    pub fn state(&self) -> &GameState {
        self.store.state()
    }

    pub fn store(&self) -> &GameStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut GameStore {
        &mut self.store
    }

    /// Latest pointer aggregate
    pub fn pointer(&self) -> &InputState {
        &self.pointer
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Stop reacting to frames and input. Subscribers are dropped.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.keys = KeysDown::new();
        self.pointer = InputState::new();
        self.store.clear_subscribers();
        log::info!("Session disposed at score {}", self.store.state().score);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::cell::Cell;
    use std::rc::Rc;

    fn runtime() -> Runtime<Pcg32> {
        Runtime::new(800.0, 600.0, Tuning::default(), Pcg32::seed_from_u64(21))
    }

    #[test]
    fn test_first_frame_does_not_move() {
        let mut rt = runtime();
        let start = rt.state().ball.pos;
        let frame = rt.animation_frame(5000.0).unwrap();
        assert_eq!(frame.elapsed, 0.0);
        assert_eq!(rt.state().ball.pos, start);
        assert_eq!(rt.store().revision(), 1);
    }

    #[test]
    fn test_keys_apply_to_one_frame_only() {
        let mut rt = runtime();
        rt.animation_frame(0.0);
        rt.key_down(" ");
        rt.key_down(" ");
        rt.animation_frame(16.0);
        assert!(rt.state().is_paused);

        // No key this frame: stays paused
        rt.animation_frame(32.0);
        assert!(rt.state().is_paused);

        rt.key_down(" ");
        rt.animation_frame(48.0);
        assert!(!rt.state().is_paused);
    }

    #[test]
    fn test_moves_between_frames_are_all_visible() {
        let mut rt = runtime();
        rt.animation_frame(0.0);
        rt.pointer_event(PointerSample::down(100.0, 100.0, 1.0));
        rt.pointer_event(PointerSample::moved(110.0, 100.0, 5.0));
        rt.pointer_event(PointerSample::moved(150.0, 130.0, 9.0));
        rt.animation_frame(16.0);

        let input = rt.state().input.as_ref().expect("aim captured");
        assert_eq!(input.start, Vec2::new(100.0, 100.0));
        assert_eq!(input.end, Vec2::new(150.0, 130.0));
        assert_eq!(rt.pointer().drag.len(), 3);
    }

    #[test]
    fn test_subscribers_see_each_commit() {
        let mut rt = runtime();
        let seen = Rc::new(Cell::new(0u32));
        let counter = seen.clone();
        rt.store_mut().subscribe(move |_| counter.set(counter.get() + 1));

        for i in 0..5 {
            rt.animation_frame(i as f64 * 16.0);
        }
        assert_eq!(seen.get(), 5);
    }

    #[test]
    fn test_dispose_stops_everything() {
        let mut rt = runtime();
        rt.animation_frame(0.0);
        rt.dispose();
        assert!(rt.is_disposed());

        let revision = rt.store().revision();
        rt.key_down(" ");
        rt.pointer_event(PointerSample::down(1.0, 1.0, 20.0));
        assert!(rt.animation_frame(16.0).is_none());
        assert_eq!(rt.store().revision(), revision);
        assert!(!rt.pointer().down);
    }
}
