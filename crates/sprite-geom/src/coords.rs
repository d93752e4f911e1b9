//! Normalized stage coordinates.
//! The vertical axis always spans -100..100 regardless of resolution; the
//! horizontal extent follows the viewport aspect ratio.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Height of the normalized stage in stage units.
pub const STAGE_HEIGHT: f32 = 200.0;

/// Device viewport in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Stage units per device pixel.
    pub fn pixel_scale(&self) -> f32 {
        STAGE_HEIGHT / self.height as f32
    }

    /// Pixel centre of the viewport (integer halves, like the host viewport bounds).
    pub fn center(&self) -> Vec2 {
        Vec2::new((self.width / 2) as f32, (self.height / 2) as f32)
    }

    /// Right edge of the stage in stage units.
    pub fn max_x(&self) -> f32 {
        self.pixel_scale() * self.width as f32 / 2.0
    }

    /// Left edge of the stage in stage units.
    pub fn min_x(&self) -> f32 {
        -self.max_x()
    }

    /// Width and height of the visible stage in stage units.
    pub fn normalized_size(&self) -> Vec2 {
        Vec2::new(self.max_x() - self.min_x(), STAGE_HEIGHT)
    }

    /// Whether a stage point lies inside the visible area (edges inclusive).
    pub fn contains_normalized(&self, point: Vec2) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= -STAGE_HEIGHT / 2.0
            && point.y <= STAGE_HEIGHT / 2.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800, 480)
    }
}

/// Map a stage point to device pixels. Stage y grows upwards, pixel y downwards.
pub fn screen_position(normalized: Vec2, viewport: &Viewport) -> Vec2 {
    let center = viewport.center();
    let scale = viewport.pixel_scale();
    Vec2::new(
        center.x + normalized.x / scale,
        center.y - normalized.y / scale,
    )
}

/// Inverse of [`screen_position`].
pub fn pixel_to_normalized(pixel: Vec2, viewport: &Viewport) -> Vec2 {
    let center = viewport.center();
    let scale = viewport.pixel_scale();
    Vec2::new((pixel.x - center.x) * scale, (center.y - pixel.y) * scale)
}
