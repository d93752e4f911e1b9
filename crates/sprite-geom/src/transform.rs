//! Affine transforms for sprite placement.
//!
//! Two conventions coexist and are kept as separate functions:
//! - draw transform: frame pixels -> stage units, y up, rotation clockwise.
//!   Used by collision, cutout stamping and bounding boxes.
//! - render-target transform: frame pixels -> render-target pixels, y down,
//!   rotation positive. Used only by normal stamping.
//!
//! Compositions below are written with glam's column-vector convention, so the
//! rightmost factor is applied first.

use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};

use crate::rect::RectF;

/// Raw placement of one frame on the stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Position in stage units.
    pub position: Vec2,
    /// Rotation in degrees.
    pub rotation_degrees: f32,
    /// Uniform scale, 1.0 is natural size.
    pub scale: f32,
    /// Anchor in frame pixel coordinates.
    pub anchor: Vec2,
    /// Frame width and height in pixels.
    pub frame_size: Vec2,
}

impl Placement {
    /// Placement at the stage origin with a centred anchor.
    pub fn centered(frame_width: u32, frame_height: u32) -> Self {
        Self {
            position: Vec2::ZERO,
            rotation_degrees: 0.0,
            scale: 1.0,
            anchor: Vec2::new((frame_width / 2) as f32, (frame_height / 2) as f32),
            frame_size: Vec2::new(frame_width as f32, frame_height as f32),
        }
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, degrees: f32) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    pub fn scaled(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn rotation_radians(&self) -> f32 {
        self.rotation_degrees.to_radians()
    }
}

/// Frame pixels to stage units.
///
/// `translate(anchor - frame_size)`, then `scale`, then a clockwise rotation,
/// then `translate(position)`.
pub fn draw_transform(placement: &Placement) -> Affine2 {
    Affine2::from_translation(placement.position)
        * Affine2::from_angle(-placement.rotation_radians())
        * Affine2::from_scale(Vec2::splat(placement.scale))
        * Affine2::from_translation(placement.anchor - placement.frame_size)
}

/// Frame pixels to render-target pixels.
///
/// `translate(-anchor)`, then `scale`, then a positive rotation, then
/// `translate(position.x, -position.y)`.
pub fn render_target_transform(placement: &Placement) -> Affine2 {
    let position = Vec2::new(placement.position.x, -placement.position.y);
    Affine2::from_translation(position)
        * Affine2::from_angle(placement.rotation_radians())
        * Affine2::from_scale(Vec2::splat(placement.scale))
        * Affine2::from_translation(-placement.anchor)
}

/// Draw transform from loose parameters.
pub fn build_transform(
    position: Vec2,
    rotation_degrees: f32,
    scale: f32,
    anchor: Vec2,
    frame_size: Vec2,
) -> Affine2 {
    draw_transform(&Placement {
        position,
        rotation_degrees,
        scale,
        anchor,
        frame_size,
    })
}

/// Inverse, or `None` when the linear part is singular.
pub fn try_inverse(transform: &Affine2) -> Option<Affine2> {
    let det = transform.matrix2.determinant();
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    let inverse = transform.inverse();
    inverse.is_finite().then_some(inverse)
}

/// Maps `from`'s local space into `to`'s local space (`from` then `to⁻¹`).
pub fn relative_transform(from: &Affine2, to: &Affine2) -> Option<Affine2> {
    try_inverse(to).map(|to_inverse| to_inverse * *from)
}

/// Translation, rotation and uniform scale of a 2D affine transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposed {
    pub translation: Vec2,
    /// Radians.
    pub rotation: f32,
    pub scale: f32,
}

impl Decomposed {
    pub fn to_affine(&self) -> Affine2 {
        Affine2::from_translation(self.translation)
            * Affine2::from_angle(self.rotation)
            * Affine2::from_scale(Vec2::splat(self.scale))
    }
}

/// Split a transform into translation, rotation and uniform scale.
///
/// Scale and rotation are read from the image of the unit x axis; any shear
/// or non-uniform scale is dropped.
pub fn decompose(transform: &Affine2) -> Decomposed {
    let x_axis = transform.matrix2.x_axis;
    Decomposed {
        translation: transform.translation,
        rotation: x_axis.y.atan2(x_axis.x),
        scale: x_axis.length(),
    }
}

/// Axis-aligned bounds of a `width` x `height` frame under `transform`.
pub fn bounding_rect(transform: &Affine2, width: f32, height: f32) -> RectF {
    let corners = [
        Vec2::ZERO,
        Vec2::new(width, 0.0),
        Vec2::new(0.0, height),
        Vec2::new(width, height),
    ]
    .map(|corner| transform.transform_point2(corner));
    RectF::from_points(&corners)
}
