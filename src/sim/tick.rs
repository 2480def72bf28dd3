//! Per-frame simulation update
//!
//! `update_game_state` is the only thing that advances a session. It is pure
//! apart from the injected RNG used to place new targets.

use glam::Vec2;
use rand::Rng;

use super::collision::{circles_overlap, reflect_in_bounds};
use super::state::{GameInput, GameState, Swipe};
use super::targets::generate_target;
use crate::clock::FrameData;
use crate::input::{GesturePhase, InputState, KeysDown, PointerSample};
use crate::launch_velocity;
use crate::tuning::Tuning;

/// What the pointer did to the aim this frame
#[derive(Debug, Clone, PartialEq)]
struct Gesture {
    input: Option<GameInput>,
    /// Pixel-space (start, end) of the swipe to launch from
    launch: Option<(Vec2, Vec2)>,
}

impl Gesture {
    fn none() -> Self {
        Self {
            input: None,
            launch: None,
        }
    }
}

/// Advance the game by one frame.
///
/// Order: pause toggle, gesture capture/launch, charge damping,
/// integration, wall reflection, target scoring. While paused nothing moves
/// and any pending aim is dropped.
pub fn update_game_state<R: Rng + ?Sized>(
    frame: FrameData,
    state: &GameState,
    keys: &KeysDown,
    pointer: &InputState,
    tuning: &Tuning,
    rng: &mut R,
) -> GameState {
    debug_assert!(frame.elapsed >= 0.0, "negative frame delta");

    let mut is_paused = state.is_paused;
    if keys.pause_pressed() {
        is_paused = !is_paused;
    } else if is_paused && pointer.down {
        // Touching the board resumes play
        is_paused = false;
    }
    if is_paused {
        return GameState {
            is_paused,
            input: None,
            ..state.clone()
        };
    }

    let Gesture { input, launch } = capture_gesture(
        frame.timestamp,
        state.input.as_ref(),
        pointer,
        tuning.release_grace_ms,
    );

    let mut vel = state.ball.vel;
    if let Some((start, end)) = launch {
        vel = launch_velocity(start, end, state.vmin);
        log::debug!("Launch: vel=({:.2}, {:.2})", vel.x, vel.y);
    }

    // Holding an aim slows the ball without touching its stored velocity
    let charging = input.as_ref().is_some_and(|i| {
        i.is_charging() && frame.timestamp - i.start_time > tuning.charge_threshold_ms
    });
    let step_scale = if charging { tuning.charge_damping } else { 1.0 };

    let projected = state.ball.pos + vel * step_scale * frame.elapsed;
    let bounce = reflect_in_bounds(projected, vel, state.ball.radius);

    let mut ball = state.ball;
    ball.pos = bounce.pos;
    ball.vel = bounce.vel;
    debug_assert!(ball.pos.x >= ball.radius.min(0.5) && ball.pos.x <= 1.0 - ball.radius.min(0.5));

    let mut targets = state.targets.clone();
    let mut score = state.score;
    let hit = targets
        .first()
        .is_some_and(|target| circles_overlap(&ball.as_circle(), target));
    if hit {
        let consumed = targets.remove(0);
        let previous = targets.last().copied().unwrap_or(consumed);
        targets.push(generate_target(&ball, Some(&previous), tuning, rng));
        score += 1;
        log::debug!("Target hit, score {}", score);
    }

    GameState {
        input,
        is_paused,
        ball,
        targets,
        score,
        ..state.clone()
    }
}

/// Fold the pointer aggregate into the aim snapshot.
///
/// Returns the aim to keep and, when a released swipe has aged past the
/// grace window, the (start, end) pair to launch from.
fn capture_gesture(
    now: f64,
    previous: Option<&GameInput>,
    pointer: &InputState,
    release_grace_ms: f64,
) -> Gesture {
    match pointer.phase() {
        GesturePhase::Dragging => {
            let Some(swipe) = swipe_from_drag(&pointer.drag, true) else {
                // Just pressed: a pending release stays on hold until the
                // new stroke has a direction
                return Gesture {
                    input: previous.cloned(),
                    launch: None,
                };
            };
            let input = match previous {
                Some(prev) => {
                    let mut input = prev.clone();
                    input.record(swipe);
                    input
                }
                None => GameInput::from_swipe(swipe),
            };
            Gesture {
                input: Some(input),
                launch: None,
            }
        }
        GesturePhase::Released => {
            let Some(prev) = previous else {
                return Gesture::none();
            };
            let Some(released) = swipe_from_drag(&pointer.drag, false) else {
                log::debug!("Released drag too short, dropping aim");
                return Gesture::none();
            };

            let mut input = prev.clone();
            input.record(released);
            if now - released.end_time >= release_grace_ms {
                // A tap during the grace window has no direction of its own
                let source = input
                    .swipes
                    .iter()
                    .rev()
                    .find(|s| s.start != s.end)
                    .copied()
                    .unwrap_or(released);
                Gesture {
                    input: None,
                    launch: Some((source.start, source.end)),
                }
            } else {
                Gesture {
                    input: Some(input),
                    launch: None,
                }
            }
        }
        GesturePhase::Idle => Gesture::none(),
    }
}

fn swipe_from_drag(drag: &[PointerSample], active: bool) -> Option<Swipe> {
    if drag.len() < 2 {
        return None;
    }
    let first = drag.first()?;
    let last = drag.last()?;
    Some(Swipe {
        active,
        start: first.pos,
        start_time: first.timestamp,
        end: last.pos,
        end_time: last.timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance;
    use crate::input::PointerSample;
    use crate::sim::state::{BALL_COLOR, Ball, TARGET_COLOR, Target};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const VMIN: f32 = 400.0;

    fn target(x: f32, y: f32) -> Target {
        Target {
            pos: Vec2::new(x, y),
            radius: 0.04,
            color: TARGET_COLOR,
        }
    }

    fn state_with(pos: Vec2, vel: Vec2, targets: Vec<Target>) -> GameState {
        GameState {
            vmin: VMIN,
            vx: VMIN,
            vy: VMIN,
            is_paused: false,
            input: None,
            ball: Ball {
                pos,
                vel,
                radius: 0.08,
                color: BALL_COLOR,
            },
            targets,
            score: 0,
        }
    }

    fn frame(timestamp: f64, elapsed: f32) -> FrameData {
        FrameData { timestamp, elapsed }
    }

    fn step(state: &GameState, f: FrameData, keys: &KeysDown, pointer: &InputState) -> GameState {
        let mut rng = Pcg32::seed_from_u64(1234);
        update_game_state(f, state, keys, pointer, &Tuning::default(), &mut rng)
    }

    #[test]
    fn test_still_ball_does_not_move() {
        let state = state_with(Vec2::splat(0.5), Vec2::ZERO, vec![target(0.25, 0.25)]);
        let next = step(&state, frame(1000.0, 1.0), &KeysDown::new(), &InputState::new());

        assert_eq!(next.ball.pos, Vec2::splat(0.5));
        assert_eq!(next.score, 0);
        assert_eq!(next.targets, state.targets);
    }

    #[test]
    fn test_integrates_velocity() {
        let state = state_with(Vec2::splat(0.5), Vec2::new(0.3, -0.6), vec![target(0.9, 0.9)]);
        let next = step(&state, frame(16.0, 0.5), &KeysDown::new(), &InputState::new());
        assert!((next.ball.pos.x - 0.65).abs() < 1e-6);
        assert!((next.ball.pos.y - 0.2).abs() < 1e-6);
        assert_eq!(next.ball.vel, Vec2::new(0.3, -0.6));
    }

    #[test]
    fn test_wall_reflection() {
        let state = state_with(Vec2::new(0.08, 0.5), Vec2::new(-1.0, 0.0), vec![target(0.9, 0.9)]);
        let next = step(&state, frame(16.0, 1.0 / 60.0), &KeysDown::new(), &InputState::new());
        assert!(next.ball.vel.x > 0.0);
        assert!(next.ball.pos.x >= 0.08);
    }

    #[test]
    fn test_space_toggles_pause() {
        let state = state_with(Vec2::splat(0.5), Vec2::new(0.5, 0.0), vec![target(0.9, 0.9)]);
        let space: KeysDown = [" "].into_iter().collect();
        let none = KeysDown::new();
        let idle = InputState::new();

        let paused = step(&state, frame(16.0, 0.016), &space, &idle);
        assert!(paused.is_paused);
        assert_eq!(paused.ball, state.ball);

        let still_paused = step(&paused, frame(32.0, 0.016), &none, &idle);
        assert!(still_paused.is_paused);
        assert_eq!(still_paused.ball, state.ball);

        let resumed = step(&still_paused, frame(48.0, 0.016), &space, &idle);
        assert!(!resumed.is_paused);
        assert!(resumed.ball.pos.x > 0.5);
    }

    #[test]
    fn test_pointer_down_resumes() {
        let mut state = state_with(Vec2::splat(0.5), Vec2::ZERO, vec![target(0.9, 0.9)]);
        state.is_paused = true;
        let pointer = InputState::fold([PointerSample::down(100.0, 100.0, 10.0)]);
        let next = step(&state, frame(16.0, 0.016), &KeysDown::new(), &pointer);
        assert!(!next.is_paused);
    }

    #[test]
    fn test_space_while_holding_aim_resumes_next_frame() {
        let state = state_with(Vec2::splat(0.5), Vec2::new(0.2, 0.0), vec![target(0.9, 0.9)]);
        let space: KeysDown = [" "].into_iter().collect();
        let held = InputState::fold([
            PointerSample::down(100.0, 100.0, 0.0),
            PointerSample::moved(140.0, 120.0, 8.0),
        ]);

        // The key wins on its own frame
        let paused = step(&state, frame(16.0, 0.016), &space, &held);
        assert!(paused.is_paused);
        assert!(paused.input.is_none());

        // A pointer that is still down counts as touching the board
        let resumed = step(&paused, frame(32.0, 0.016), &KeysDown::new(), &held);
        assert!(!resumed.is_paused);
        assert!(resumed.input.is_some());
    }

    #[test]
    fn test_pause_drops_aim() {
        let mut state = state_with(Vec2::splat(0.5), Vec2::ZERO, vec![target(0.9, 0.9)]);
        state.input = Some(GameInput::from_swipe(Swipe {
            active: true,
            start: Vec2::ZERO,
            start_time: 0.0,
            end: Vec2::ONE,
            end_time: 10.0,
        }));
        let space: KeysDown = [" "].into_iter().collect();
        let next = step(&state, frame(16.0, 0.016), &space, &InputState::new());
        assert!(next.is_paused);
        assert!(next.input.is_none());
    }

    #[test]
    fn test_drag_builds_aim_without_changing_velocity() {
        let state = state_with(Vec2::splat(0.5), Vec2::new(0.1, 0.0), vec![target(0.9, 0.9)]);
        let pointer = InputState::fold([
            PointerSample::down(200.0, 200.0, 100.0),
            PointerSample::moved(220.0, 210.0, 116.0),
            PointerSample::moved(260.0, 240.0, 132.0),
        ]);
        let next = step(&state, frame(140.0, 0.016), &KeysDown::new(), &pointer);

        let input = next.input.expect("aim should be captured");
        assert_eq!(input.start, Vec2::new(200.0, 200.0));
        assert_eq!(input.end, Vec2::new(260.0, 240.0));
        assert_eq!(input.start_time, 100.0);
        assert_eq!(input.swipes.len(), 1);
        assert!(input.is_charging());
        assert_eq!(next.ball.vel, Vec2::new(0.1, 0.0));
    }

    #[test]
    fn test_single_press_is_not_an_aim() {
        let state = state_with(Vec2::splat(0.5), Vec2::ZERO, vec![target(0.9, 0.9)]);
        let pointer = InputState::fold([PointerSample::down(200.0, 200.0, 100.0)]);
        let next = step(&state, frame(140.0, 0.016), &KeysDown::new(), &pointer);
        assert!(next.input.is_none());
    }

    #[test]
    fn test_release_launches_after_grace() {
        let state = state_with(Vec2::splat(0.5), Vec2::ZERO, vec![target(0.9, 0.9)]);
        let keys = KeysDown::new();
        let mut pointer = InputState::fold([
            PointerSample::down(200.0, 200.0, 0.0),
            PointerSample::moved(260.0, 200.0, 50.0),
        ]);

        let aiming = step(&state, frame(60.0, 0.016), &keys, &pointer);
        assert!(aiming.input.is_some());

        pointer.apply(PointerSample::up(300.0, 200.0, 100.0));

        // Inside the grace window: aim kept, nothing launched yet
        let waiting = step(&aiming, frame(116.0, 0.016), &keys, &pointer);
        let input = waiting.input.as_ref().expect("aim held during grace");
        assert!(input.completed_swipe().is_some());
        assert_eq!(waiting.ball.vel, Vec2::ZERO);

        // Grace elapsed: pull-back of 100px right launches left at 0.25/s
        let launched = step(&waiting, frame(300.0, 0.0), &keys, &pointer);
        assert!(launched.input.is_none());
        assert!((launched.ball.vel.x + 0.25).abs() < 1e-6);
        assert!(launched.ball.vel.y.abs() < 1e-6);

        // The stale release does not launch twice
        let mut coasting = launched.clone();
        coasting.ball.vel = Vec2::new(0.0, 0.1);
        let after = step(&coasting, frame(316.0, 0.0), &keys, &pointer);
        assert_eq!(after.ball.vel, Vec2::new(0.0, 0.1));
    }

    #[test]
    fn test_launch_moves_ball_same_frame() {
        let mut state = state_with(Vec2::splat(0.5), Vec2::ZERO, vec![target(0.9, 0.9)]);
        state.input = Some(GameInput::from_swipe(Swipe {
            active: true,
            start: Vec2::new(200.0, 200.0),
            start_time: 0.0,
            end: Vec2::new(200.0, 240.0),
            end_time: 30.0,
        }));
        let pointer = InputState::fold([
            PointerSample::down(200.0, 200.0, 0.0),
            PointerSample::moved(200.0, 240.0, 30.0),
            PointerSample::up(200.0, 240.0, 40.0),
        ]);
        let next = step(&state, frame(500.0, 0.5), &KeysDown::new(), &pointer);
        assert!((next.ball.vel.y + 0.1).abs() < 1e-6);
        assert!((next.ball.pos.y - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_repress_during_grace_cancels_launch() {
        let state = state_with(Vec2::splat(0.5), Vec2::ZERO, vec![target(0.9, 0.9)]);
        let keys = KeysDown::new();
        let mut pointer = InputState::fold([
            PointerSample::down(200.0, 200.0, 0.0),
            PointerSample::moved(260.0, 200.0, 50.0),
        ]);
        let aiming = step(&state, frame(60.0, 0.016), &keys, &pointer);
        pointer.apply(PointerSample::up(260.0, 200.0, 70.0));
        let released = step(&aiming, frame(80.0, 0.016), &keys, &pointer);

        // Touch again within the window
        pointer.apply(PointerSample::down(250.0, 250.0, 120.0));
        let pressed = step(&released, frame(400.0, 0.016), &keys, &pointer);
        assert!(pressed.input.is_some());
        assert_eq!(pressed.ball.vel, Vec2::ZERO);

        pointer.apply(PointerSample::moved(250.0, 330.0, 420.0));
        let second = step(&pressed, frame(430.0, 0.016), &keys, &pointer);
        let input = second.input.as_ref().expect("continued gesture");
        assert_eq!(input.swipes.len(), 2);
        assert!(input.swipes[0].is_completed());
        assert!(input.swipes[1].active);

        // Releasing the second stroke launches from it, not the first
        pointer.apply(PointerSample::up(250.0, 330.0, 440.0));
        let launched = step(&second, frame(700.0, 0.0), &keys, &pointer);
        assert!(launched.input.is_none());
        assert!(launched.ball.vel.x.abs() < 1e-6);
        assert!((launched.ball.vel.y + 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_tap_during_grace_keeps_swipe_direction() {
        let state = state_with(Vec2::splat(0.5), Vec2::ZERO, vec![target(0.9, 0.9)]);
        let keys = KeysDown::new();
        let mut pointer = InputState::fold([
            PointerSample::down(200.0, 200.0, 0.0),
            PointerSample::moved(200.0, 280.0, 50.0),
        ]);
        let aiming = step(&state, frame(60.0, 0.016), &keys, &pointer);
        pointer.apply(PointerSample::up(200.0, 280.0, 70.0));
        let released = step(&aiming, frame(80.0, 0.016), &keys, &pointer);

        pointer.apply(PointerSample::down(300.0, 300.0, 100.0));
        pointer.apply(PointerSample::up(300.0, 300.0, 110.0));
        let tapped = step(&released, frame(120.0, 0.016), &keys, &pointer);
        assert!(tapped.input.is_some());

        let launched = step(&tapped, frame(400.0, 0.0), &keys, &pointer);
        assert!(launched.input.is_none());
        assert!((launched.ball.vel.y + 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_short_released_drag_is_no_gesture() {
        let mut state = state_with(Vec2::splat(0.5), Vec2::new(0.1, 0.1), vec![target(0.9, 0.9)]);
        state.input = Some(GameInput::from_swipe(Swipe {
            active: true,
            start: Vec2::ZERO,
            start_time: 0.0,
            end: Vec2::ONE,
            end_time: 10.0,
        }));
        let malformed = InputState {
            down: false,
            drag: vec![PointerSample::up(5.0, 5.0, 20.0)],
        };
        let next = step(&state, frame(500.0, 0.0), &KeysDown::new(), &malformed);
        assert!(next.input.is_none());
        assert_eq!(next.ball.vel, Vec2::new(0.1, 0.1));

        let empty = InputState {
            down: true,
            drag: Vec::new(),
        };
        let next = step(&state, frame(500.0, 0.0), &KeysDown::new(), &empty);
        assert_eq!(next.ball.vel, Vec2::new(0.1, 0.1));
    }

    #[test]
    fn test_long_aim_damps_motion() {
        let state = state_with(Vec2::splat(0.5), Vec2::new(0.4, 0.0), vec![target(0.9, 0.9)]);
        let pointer = InputState::fold([
            PointerSample::down(200.0, 200.0, 0.0),
            PointerSample::moved(210.0, 200.0, 100.0),
        ]);

        let early = step(&state, frame(200.0, 0.1), &KeysDown::new(), &pointer);
        assert!((early.ball.pos.x - 0.54).abs() < 1e-6);

        let late = step(&state, frame(300.0, 0.1), &KeysDown::new(), &pointer);
        assert!((late.ball.pos.x - 0.51).abs() < 1e-6);
        // Stored velocity untouched
        assert_eq!(late.ball.vel, Vec2::new(0.4, 0.0));
    }

    #[test]
    fn test_hit_promotes_next_target() {
        let state = state_with(
            Vec2::new(0.5, 0.5),
            Vec2::new(0.1, 0.0),
            vec![target(0.6, 0.5), target(0.2, 0.8)],
        );
        let next = step(&state, frame(16.0, 0.1), &KeysDown::new(), &InputState::new());

        assert_eq!(next.score, 1);
        assert_eq!(next.targets.len(), 2);
        assert_eq!(next.targets[0], state.targets[1]);

        let spawned = next.targets[1];
        let tuning = Tuning::default();
        assert!(distance(spawned.pos, next.ball.pos) >= tuning.min_dist_from_ball(0.08));
        assert!(distance(spawned.pos, next.targets[0].pos) >= tuning.min_dist_from_prev_target());
    }

    #[test]
    fn test_hit_single_target() {
        let state = state_with(Vec2::new(0.5, 0.5), Vec2::ZERO, vec![target(0.55, 0.5)]);
        let next = step(&state, frame(16.0, 0.016), &KeysDown::new(), &InputState::new());

        assert_eq!(next.score, 1);
        assert_eq!(next.targets.len(), 1);
        let tuning = Tuning::default();
        assert!(distance(next.targets[0].pos, next.ball.pos) >= tuning.min_dist_from_ball(0.08));
        assert!(
            distance(next.targets[0].pos, state.targets[0].pos) >= tuning.min_dist_from_prev_target()
        );
    }

    #[test]
    fn test_only_first_target_scores() {
        // Overlapping the second target only
        let state = state_with(
            Vec2::new(0.5, 0.5),
            Vec2::ZERO,
            vec![target(0.1, 0.1), target(0.52, 0.5)],
        );
        let next = step(&state, frame(16.0, 0.016), &KeysDown::new(), &InputState::new());
        assert_eq!(next.score, 0);
        assert_eq!(next.targets, state.targets);
    }

    #[test]
    fn test_near_miss_does_not_score() {
        let state = state_with(Vec2::new(0.5, 0.5), Vec2::ZERO, vec![target(0.5, 0.63)]);
        let next = step(&state, frame(16.0, 0.016), &KeysDown::new(), &InputState::new());
        assert_eq!(next.score, 0);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let state = state_with(
            Vec2::new(0.5, 0.5),
            Vec2::ZERO,
            vec![target(0.55, 0.5), target(0.2, 0.2)],
        );
        let a = step(&state, frame(16.0, 0.016), &KeysDown::new(), &InputState::new());
        let b = step(&state, frame(16.0, 0.016), &KeysDown::new(), &InputState::new());
        assert_eq!(a, b);
    }

    fn arb_state() -> impl Strategy<Value = GameState> {
        (0.08f32..=0.92, 0.08f32..=0.92, -3.0f32..3.0, -3.0f32..3.0, any::<bool>()).prop_map(
            |(x, y, vx, vy, paused)| {
                let mut state = state_with(
                    Vec2::new(x, y),
                    Vec2::new(vx, vy),
                    vec![target(0.15, 0.15), target(0.85, 0.85)],
                );
                state.is_paused = paused;
                state
            },
        )
    }

    proptest! {
        #[test]
        fn prop_paused_is_frozen(mut state in arb_state(), elapsed in 0.0f32..10.0, ts in 0.0f64..1e7) {
            state.is_paused = true;
            let next = step(&state, frame(ts, elapsed), &KeysDown::new(), &InputState::new());
            let expected = GameState { input: None, ..state };
            prop_assert_eq!(next, expected);
        }

        #[test]
        fn prop_ball_stays_on_board(
            state in arb_state(),
            elapsed in 0.0f32..(1.0 / 30.0),
            ticks in 1usize..120,
        ) {
            let mut rng = Pcg32::seed_from_u64(99);
            let tuning = Tuning::default();
            let keys = KeysDown::new();
            let pointer = InputState::new();
            let mut current = state;
            let mut last_score = current.score;
            for i in 0..ticks {
                current = update_game_state(
                    frame(i as f64 * 16.0, elapsed),
                    &current,
                    &keys,
                    &pointer,
                    &tuning,
                    &mut rng,
                );
                let r = current.ball.radius;
                prop_assert!(current.ball.pos.x >= r && current.ball.pos.x <= 1.0 - r);
                prop_assert!(current.ball.pos.y >= r && current.ball.pos.y <= 1.0 - r);
                prop_assert!(current.score >= last_score);
                last_score = current.score;
            }
        }
    }
}
