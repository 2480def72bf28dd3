//! Simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Board-space only (pixel scale enters through `vmin` at launch)
//! - Injected RNG only
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod targets;
pub mod tick;

pub use collision::{WallBounce, circles_overlap, reflect_in_bounds};
pub use state::{
    BALL_COLOR, Ball, Circle, Color, GameInput, GameState, MAX_SWIPE_HISTORY, Swipe, TARGET_COLOR,
    Target,
};
pub use targets::generate_target;
pub use tick::update_game_state;
