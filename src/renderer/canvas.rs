//! `Surface` backed by a browser 2D canvas context

use glam::Vec2;
use web_sys::CanvasRenderingContext2d;

use super::Surface;
use crate::sim::Color;

pub struct CanvasSurface {
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(context: CanvasRenderingContext2d) -> Self {
        Self { context }
    }
}

/// CSS `rgba()` string for a straight RGBA color
pub fn css_color(color: Color) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({}, {}, {}, {:.3})",
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        color[3].clamp(0.0, 1.0)
    )
}

impl Surface for CanvasSurface {
    fn clear(&mut self, size: Vec2) {
        self.context
            .clear_rect(0.0, 0.0, size.x as f64, size.y as f64);
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        self.context.set_fill_style_str(&css_color(color));
        self.context
            .fill_rect(origin.x as f64, origin.y as f64, size.x as f64, size.y as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.context.set_fill_style_str(&css_color(color));
        self.context.begin_path();
        if let Err(e) = self.context.arc(
            center.x as f64,
            center.y as f64,
            radius.max(0.0) as f64,
            0.0,
            std::f64::consts::TAU,
        ) {
            log::warn!("arc failed: {:?}", e);
            return;
        }
        self.context.fill();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.context.set_stroke_style_str(&css_color(color));
        self.context.set_line_width(width as f64);
        self.context.begin_path();
        self.context.move_to(from.x as f64, from.y as f64);
        self.context.line_to(to.x as f64, to.y as f64);
        self.context.stroke();
    }

    fn stroke_rect(&mut self, origin: Vec2, size: Vec2, width: f32, color: Color) {
        self.context.set_stroke_style_str(&css_color(color));
        self.context.set_line_width(width as f64);
        self.context
            .stroke_rect(origin.x as f64, origin.y as f64, size.x as f64, size.y as f64);
    }
}
