use anyhow::Result;
use glam::{Affine2, Vec2};
use sprite_geom::{Placement, Viewport, screen_position};

use crate::buffer::{ColorBuffer, Rgba};
use crate::config::StageContext;
use crate::store::CostumeStore;
use crate::traits::text::TextMeasure;

/// Receives finished draw calls. The engine never issues real GPU work.
/// Implementations: host renderers (production), CommandRecorder (testing).
pub trait DrawSink {
    fn begin_frame(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        Ok(())
    }

    /// Draw `buffer` with `transform` mapping frame pixels to screen pixels.
    fn draw_buffer(&mut self, buffer: &ColorBuffer, transform: Affine2, tint: Rgba) -> Result<()>;

    /// Draw `text` with its top-left corner at `origin` in screen pixels,
    /// `scale` times the font's native size, turned by `rotation` radians.
    fn draw_text(
        &mut self,
        text: &str,
        origin: Vec2,
        scale: f32,
        rotation: f32,
        tint: Rgba,
    ) -> Result<()>;
}

/// Everything a drawable needs to resolve its pixels and screen placement.
pub struct DrawContext<'a> {
    pub stage: &'a StageContext,
    pub costumes: &'a CostumeStore,
    /// Without a measure, text is skipped.
    pub text_measure: Option<&'a dyn TextMeasure>,
}

impl<'a> DrawContext<'a> {
    pub fn new(stage: &'a StageContext, costumes: &'a CostumeStore) -> Self {
        Self {
            stage,
            costumes,
            text_measure: None,
        }
    }

    pub fn with_text_measure(mut self, measure: &'a dyn TextMeasure) -> Self {
        self.text_measure = Some(measure);
        self
    }
}

/// Something that can be drawn on the stage. Lower layers are drawn first.
pub trait Drawable {
    fn layer(&self) -> f32;

    fn draw(&self, ctx: &DrawContext<'_>, sink: &mut dyn DrawSink) -> Result<()>;
}

/// Frame pixels to screen pixels, the way a sprite batch places a texture:
/// origin at the anchor, clockwise rotation on a y-down screen, and stage
/// scale converted to pixels.
pub fn screen_transform(placement: &Placement, viewport: &Viewport) -> Affine2 {
    let origin = screen_position(placement.position, viewport);
    Affine2::from_translation(origin)
        * Affine2::from_angle(placement.rotation_radians())
        * Affine2::from_scale(Vec2::splat(placement.scale / viewport.pixel_scale()))
        * Affine2::from_translation(-placement.anchor)
}

/// Draw `items` back to front. Equal layers keep their given order.
pub fn draw_in_layer_order(
    items: &[&dyn Drawable],
    ctx: &DrawContext<'_>,
    sink: &mut dyn DrawSink,
) -> Result<()> {
    let mut ordered = items.to_vec();
    ordered.sort_by(|a, b| a.layer().total_cmp(&b.layer()));
    for item in ordered {
        item.draw(ctx, sink)?;
    }
    Ok(())
}

/// One full frame: begin, every item in layer order, end.
pub fn render_frame(
    items: &[&dyn Drawable],
    ctx: &DrawContext<'_>,
    sink: &mut dyn DrawSink,
) -> Result<()> {
    sink.begin_frame()?;
    draw_in_layer_order(items, ctx, sink)?;
    sink.end_frame()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_transform_puts_anchor_at_screen_position() {
        let viewport = Viewport::new(800, 400);
        let placement = Placement::centered(10, 10).at(Vec2::new(50.0, 50.0));
        let t = screen_transform(&placement, &viewport);
        let anchor_on_screen = t.transform_point2(placement.anchor);
        assert!((anchor_on_screen - Vec2::new(500.0, 100.0)).length() < 1e-3);
    }

    #[test]
    fn test_screen_transform_scales_to_pixels() {
        let viewport = Viewport::new(800, 400);
        // Half a stage unit per pixel: a 10px frame spans 20 screen pixels.
        let placement = Placement::centered(10, 10);
        let t = screen_transform(&placement, &viewport);
        let width = t.transform_vector2(Vec2::new(10.0, 0.0)).length();
        assert!((width - 20.0).abs() < 1e-3);
    }
}
