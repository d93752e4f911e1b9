use anyhow::{Result, bail};
use glam::{Affine2, Vec2};

use crate::buffer::{ColorBuffer, Rgba};
use crate::traits::draw::DrawSink;

/// Recorded draw command for testing.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    BeginFrame,
    EndFrame,
    DrawBuffer {
        width: usize,
        height: usize,
        transform: Affine2,
        tint: Rgba,
    },
    DrawText {
        text: String,
        origin: Vec2,
        scale: f32,
        rotation: f32,
        tint: Rgba,
    },
}

/// A [`DrawSink`] that records what it is asked to draw.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
    in_frame: bool,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Only the buffer draws, in order.
    pub fn draws(&self) -> impl Iterator<Item = (usize, usize, &Affine2, Rgba)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::DrawBuffer {
                width,
                height,
                transform,
                tint,
            } => Some((*width, *height, transform, *tint)),
            _ => None,
        })
    }

    /// Only the text draws: string and origin, in order.
    pub fn texts(&self) -> impl Iterator<Item = (&str, Vec2)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::DrawText { text, origin, .. } => Some((text.as_str(), *origin)),
            _ => None,
        })
    }
}

impl DrawSink for CommandRecorder {
    fn begin_frame(&mut self) -> Result<()> {
        if self.in_frame {
            bail!("begin_frame called twice without end_frame");
        }
        self.in_frame = true;
        self.commands.push(DrawCommand::BeginFrame);
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        if !self.in_frame {
            bail!("end_frame called without begin_frame");
        }
        self.in_frame = false;
        self.commands.push(DrawCommand::EndFrame);
        Ok(())
    }

    fn draw_buffer(&mut self, buffer: &ColorBuffer, transform: Affine2, tint: Rgba) -> Result<()> {
        self.commands.push(DrawCommand::DrawBuffer {
            width: buffer.width(),
            height: buffer.height(),
            transform,
            tint,
        });
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        origin: Vec2,
        scale: f32,
        rotation: f32,
        tint: Rgba,
    ) -> Result<()> {
        self.commands.push(DrawCommand::DrawText {
            text: text.to_string(),
            origin,
            scale,
            rotation,
            tint,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut rec = CommandRecorder::new();
        rec.begin_frame().unwrap();
        rec.draw_buffer(&ColorBuffer::transparent(3, 2), Affine2::IDENTITY, Rgba::WHITE)
            .unwrap();
        rec.draw_text("hi", Vec2::new(4.0, 5.0), 1.0, 0.0, Rgba::WHITE)
            .unwrap();
        rec.end_frame().unwrap();

        assert_eq!(rec.commands().len(), 4);
        assert_eq!(rec.commands()[0], DrawCommand::BeginFrame);
        let draws: Vec<_> = rec.draws().collect();
        assert_eq!(draws.len(), 1);
        assert_eq!((draws[0].0, draws[0].1), (3, 2));
        let texts: Vec<_> = rec.texts().collect();
        assert_eq!(texts, vec![("hi", Vec2::new(4.0, 5.0))]);
    }

    #[test]
    fn test_unbalanced_frames_error() {
        let mut rec = CommandRecorder::new();
        assert!(rec.end_frame().is_err());
        rec.begin_frame().unwrap();
        assert!(rec.begin_frame().is_err());
    }

    #[test]
    fn test_clear_commands() {
        let mut rec = CommandRecorder::new();
        rec.begin_frame().unwrap();
        rec.clear_commands();
        assert!(rec.commands().is_empty());
    }
}
