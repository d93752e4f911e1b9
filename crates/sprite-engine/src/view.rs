use glam::Affine2;
use sprite_geom::{Placement, RectF, bounding_rect, draw_transform, render_target_transform};

use crate::buffer::{ColorBuffer, Rgba};

/// Read-only snapshot of one placed frame, as consumed by collision and
/// compositing.
#[derive(Debug, Clone, Copy)]
pub struct SpriteView<'a> {
    pub placement: Placement,
    pub buffer: &'a ColorBuffer,
    /// Draw transform of `placement`.
    pub transform: Affine2,
    pub visible: bool,
    /// Colour multiplier with opacity folded in. White is "no change".
    pub tint: Rgba,
}

impl<'a> SpriteView<'a> {
    pub fn new(placement: Placement, buffer: &'a ColorBuffer) -> Self {
        Self {
            placement,
            buffer,
            transform: draw_transform(&placement),
            visible: true,
            tint: Rgba::WHITE,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn with_tint(mut self, tint: Rgba) -> Self {
        self.tint = tint;
        self
    }

    pub fn render_target_transform(&self) -> Affine2 {
        render_target_transform(&self.placement)
    }

    /// Axis-aligned stage-space bounds.
    pub fn bounding_rect(&self) -> RectF {
        bounding_rect(
            &self.transform,
            self.buffer.width() as f32,
            self.buffer.height() as f32,
        )
    }
}
