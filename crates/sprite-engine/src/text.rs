use anyhow::Result as AnyResult;
use glam::Vec2;
use log::debug;
use sprite_geom::{Viewport, screen_position};

use crate::buffer::Rgba;
use crate::costume::{HorizontalAlign, VerticalAlign};
use crate::traits::draw::{DrawContext, DrawSink, Drawable};
use crate::traits::text::TextMeasure;
use crate::transformable::Transformable;

/// Default layer for text, above sprites.
pub const TEXT_LAYER: f32 = 100.0;

/// Line spacing that maps to a font scale of 1.
pub const REFERENCE_LINE_SPACING: f32 = 400.0;

/// A string drawn on the stage with a host-supplied font.
///
/// The position is a stage coordinate; alignment decides which corner or
/// edge of the measured text sits on it. Scale multiplies the font's native
/// size, normalized so fonts with different line spacing look alike.
#[derive(Debug, Clone)]
pub struct Text {
    value: String,
    transformable: Transformable,
    pub color: Rgba,
    pub visible: bool,
    opacity: f32,
    horizontal: HorizontalAlign,
    vertical: VerticalAlign,
    layer: f32,
}

impl Text {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            transformable: Transformable::new(),
            color: Rgba::WHITE,
            visible: true,
            opacity: 1.0,
            horizontal: HorizontalAlign::Left,
            vertical: VerticalAlign::Top,
            layer: TEXT_LAYER,
        }
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.transformable.set_position(position);
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn transformable(&self) -> &Transformable {
        &self.transformable
    }

    pub fn transformable_mut(&mut self) -> &mut Transformable {
        &mut self.transformable
    }

    pub fn position(&self) -> Vec2 {
        self.transformable.position()
    }

    pub fn go_to(&mut self, position: Vec2) {
        self.transformable.set_position(position);
    }

    pub fn scale(&self) -> f32 {
        self.transformable.scale()
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.transformable.set_scale(scale);
    }

    pub fn alignment(&self) -> (HorizontalAlign, VerticalAlign) {
        (self.horizontal, self.vertical)
    }

    pub fn set_alignment(&mut self, horizontal: HorizontalAlign, vertical: VerticalAlign) {
        self.horizontal = horizontal;
        self.vertical = vertical;
    }

    pub fn set_layer(&mut self, layer: f32) {
        self.layer = layer;
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn ghost_effect(&self) -> f32 {
        100.0 - self.opacity * 100.0
    }

    pub fn set_ghost_effect(&mut self, ghost: f32) {
        self.opacity = ((100.0 - ghost) / 100.0).clamp(0.0, 1.0);
    }

    pub fn tint(&self) -> Rgba {
        self.color.scaled(self.opacity)
    }

    /// Multiplier applied to the font's native size when drawing.
    pub fn draw_scale(&self, measure: &dyn TextMeasure) -> f32 {
        self.scale() * measure.line_spacing() / REFERENCE_LINE_SPACING
    }

    /// Drawn size in screen pixels.
    pub fn size(&self, measure: &dyn TextMeasure) -> Vec2 {
        measure.measure(&self.value) * self.draw_scale(measure)
    }

    /// Top-left corner of the drawn text in screen pixels.
    pub fn screen_origin(&self, measure: &dyn TextMeasure, viewport: &Viewport) -> Vec2 {
        let size = self.size(measure);
        let mut origin = screen_position(self.position(), viewport);
        origin.x -= match self.horizontal {
            HorizontalAlign::Left => 0.0,
            HorizontalAlign::Center => size.x / 2.0,
            HorizontalAlign::Right => size.x,
        };
        origin.y -= match self.vertical {
            VerticalAlign::Top => 0.0,
            VerticalAlign::Center => size.y / 2.0,
            VerticalAlign::Bottom => size.y,
        };
        origin
    }
}

impl Drawable for Text {
    fn layer(&self) -> f32 {
        self.layer
    }

    fn draw(&self, ctx: &DrawContext<'_>, sink: &mut dyn DrawSink) -> AnyResult<()> {
        if !self.visible || self.value.is_empty() {
            return Ok(());
        }
        let Some(measure) = ctx.text_measure else {
            debug!("no text measure, skipping {:?}", self.value);
            return Ok(());
        };
        sink.draw_text(
            &self.value,
            self.screen_origin(measure, &ctx.stage.viewport),
            self.draw_scale(measure),
            self.transformable.rotation_radians(),
            self.tint(),
        )
    }
}
