//! Render adapter
//!
//! Turns a `GameState` snapshot into draw calls against a `Surface`. Board-
//! space geometry is scaled by `vmin` here and nowhere else. Rendering never
//! mutates state, so frames can be skipped or repeated freely.

pub mod commands;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use commands::{CommandBuffer, DrawCommand};

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;

use glam::Vec2;

use crate::sim::{Color, GameState};
use crate::to_pixels;

pub const BACKGROUND_COLOR: Color = [0.0, 0.0, 0.0, 1.0];
pub const BORDER_COLOR: Color = [1.0, 1.0, 1.0, 0.3];
pub const AIM_COLOR: Color = [1.0, 1.0, 1.0, 0.9];

/// Alpha multiplier for targets after the first ("next up")
pub const NEXT_TARGET_ALPHA: f32 = 0.3;
/// Alpha multiplier for earlier swipes in the aim history
pub const SWIPE_HISTORY_ALPHA: f32 = 0.35;

const AIM_LINE_WIDTH: f32 = 2.0;
const AIM_MARKER_RADIUS: f32 = 5.0;
const BORDER_WIDTH: f32 = 1.0;

/// A fixed-size 2D pixel canvas
pub trait Surface {
    /// Wipe the whole canvas
    fn clear(&mut self, size: Vec2);
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);
    fn stroke_rect(&mut self, origin: Vec2, size: Vec2, width: f32, color: Color);
}

#[inline]
pub fn with_alpha(color: Color, alpha: f32) -> Color {
    [color[0], color[1], color[2], color[3] * alpha]
}

/// Draw one frame
pub fn render_state<S: Surface + ?Sized>(state: &GameState, canvas_size: Vec2, surface: &mut S) {
    let vmin = state.vmin;

    surface.clear(canvas_size);
    surface.fill_rect(Vec2::ZERO, canvas_size, BACKGROUND_COLOR);

    for (i, target) in state.targets.iter().enumerate() {
        let color = if i == 0 {
            target.color
        } else {
            with_alpha(target.color, NEXT_TARGET_ALPHA)
        };
        surface.fill_circle(to_pixels(target.pos, vmin), target.radius * vmin, color);
    }

    let ball = &state.ball;
    surface.fill_circle(to_pixels(ball.pos, vmin), ball.radius * vmin, ball.color);

    if let Some(input) = &state.input {
        // Earlier strokes of the same gesture, faded
        let history = input.swipes.len().saturating_sub(1);
        for swipe in &input.swipes[..history] {
            draw_aim(surface, swipe.start, swipe.end, with_alpha(AIM_COLOR, SWIPE_HISTORY_ALPHA));
        }
        draw_aim(surface, input.start, input.end, AIM_COLOR);
    }

    surface.stroke_rect(
        Vec2::ZERO,
        Vec2::new(state.vx, state.vy),
        BORDER_WIDTH,
        BORDER_COLOR,
    );
}

fn draw_aim<S: Surface + ?Sized>(surface: &mut S, start: Vec2, end: Vec2, color: Color) {
    surface.stroke_line(start, end, AIM_LINE_WIDTH, color);
    surface.fill_circle(start, AIM_MARKER_RADIUS, color);
    surface.fill_circle(end, AIM_MARKER_RADIUS, color);
}
