//! Recorded draw calls
//!
//! `CommandBuffer` is a `Surface` that keeps every call instead of drawing
//! it. Used by the headless host and in tests.

use glam::Vec2;

use super::Surface;
use crate::sim::Color;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        size: Vec2,
    },
    FillRect {
        origin: Vec2,
        size: Vec2,
        color: Color,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    StrokeLine {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Color,
    },
    StrokeRect {
        origin: Vec2,
        size: Vec2,
        width: f32,
        color: Color,
    },
}

#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    commands: Vec<DrawCommand>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Commands since the last `clear`, i.e. the most recent frame
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear { .. }))
            .unwrap_or(0);
        &self.commands[start..]
    }

    pub fn reset(&mut self) {
        self.commands.clear();
    }
}

impl Surface for CommandBuffer {
    fn clear(&mut self, size: Vec2) {
        self.commands.push(DrawCommand::Clear { size });
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        self.commands.push(DrawCommand::FillRect {
            origin,
            size,
            color,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.commands.push(DrawCommand::StrokeLine {
            from,
            to,
            width,
            color,
        });
    }

    fn stroke_rect(&mut self, origin: Vec2, size: Vec2, width: f32, color: Color) {
        self.commands.push(DrawCommand::StrokeRect {
            origin,
            size,
            width,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_frame() {
        let mut buffer = CommandBuffer::new();
        buffer.clear(Vec2::ONE);
        buffer.fill_rect(Vec2::ZERO, Vec2::ONE, [0.0; 4]);
        buffer.clear(Vec2::ONE);
        buffer.fill_circle(Vec2::ZERO, 1.0, [1.0; 4]);

        assert_eq!(buffer.commands().len(), 4);
        assert_eq!(buffer.last_frame().len(), 2);

        buffer.reset();
        assert!(buffer.last_frame().is_empty());
    }
}
