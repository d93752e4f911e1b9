//! Geometry for the sprite engine: the normalized stage coordinate system,
//! float rectangles and the two affine transform conventions.

pub mod coords;
pub mod rect;
pub mod transform;

pub use coords::{Viewport, pixel_to_normalized, screen_position};
pub use rect::RectF;
pub use transform::{
    Decomposed, Placement, bounding_rect, build_transform, decompose, draw_transform,
    relative_transform, render_target_transform, try_inverse,
};

pub use glam::{Affine2, Vec2};
