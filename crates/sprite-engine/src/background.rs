use std::sync::Arc;

use anyhow::Result as AnyResult;
use glam::Vec2;
use log::debug;
use sprite_geom::coords::STAGE_HEIGHT;
use sprite_geom::{Placement, Viewport};

use crate::buffer::{ColorBuffer, Rgba};
use crate::costume::{HorizontalAlign, VerticalAlign, anchor_for};
use crate::error::{EngineError, Result};
use crate::traits::draw::{DrawContext, DrawSink, Drawable, screen_transform};
use crate::transformable::Transformable;

/// Default layer for backgrounds, below sprites.
pub const BACKGROUND_LAYER: f32 = 1.0;

#[derive(Debug, Clone)]
pub struct BackgroundLayer {
    name: String,
    buffer: Arc<ColorBuffer>,
    transformable: Transformable,
    horizontal: HorizontalAlign,
    vertical: VerticalAlign,
    anchor: Vec2,
    /// Added to the position when drawing.
    pub scroll_offset: Vec2,
    pub visible: bool,
    pub color: Rgba,
    opacity: f32,
    layer: f32,
}

impl BackgroundLayer {
    pub fn new(name: impl Into<String>, buffer: ColorBuffer) -> Self {
        let anchor = anchor_for(
            buffer.width(),
            buffer.height(),
            HorizontalAlign::Center,
            VerticalAlign::Center,
        );
        Self {
            name: name.into(),
            buffer: Arc::new(buffer),
            transformable: Transformable::new(),
            horizontal: HorizontalAlign::Center,
            vertical: VerticalAlign::Center,
            anchor,
            scroll_offset: Vec2::ZERO,
            visible: true,
            color: Rgba::WHITE,
            opacity: 1.0,
            layer: BACKGROUND_LAYER,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn buffer(&self) -> &ColorBuffer {
        &self.buffer
    }

    pub fn transformable(&self) -> &Transformable {
        &self.transformable
    }

    pub fn transformable_mut(&mut self) -> &mut Transformable {
        &mut self.transformable
    }

    pub fn set_alignment(&mut self, horizontal: HorizontalAlign, vertical: VerticalAlign) {
        self.horizontal = horizontal;
        self.vertical = vertical;
        self.anchor = anchor_for(
            self.buffer.width(),
            self.buffer.height(),
            horizontal,
            vertical,
        );
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn set_layer(&mut self, layer: f32) {
        self.layer = layer;
    }

    pub fn scale(&self) -> f32 {
        self.transformable.scale()
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.transformable.set_scale(scale);
    }

    /// Width in stage units.
    pub fn width(&self) -> f32 {
        self.buffer.width() as f32 * self.scale()
    }

    /// Height in stage units.
    pub fn height(&self) -> f32 {
        self.buffer.height() as f32 * self.scale()
    }

    /// Scale so the image spans the stage height. Returns the new scale.
    pub fn scale_to_screen_height(&mut self) -> f32 {
        let scale = STAGE_HEIGHT / self.buffer.height().max(1) as f32;
        self.set_scale(scale);
        scale
    }

    /// Scale so the image spans the stage width. Returns the new scale.
    pub fn scale_to_screen_width(&mut self, viewport: &Viewport) -> f32 {
        let scale = viewport.normalized_size().x / self.buffer.width().max(1) as f32;
        self.set_scale(scale);
        scale
    }

    /// Scale so the image covers the whole stage. Returns the new scale.
    pub fn scale_to_screen(&mut self, viewport: &Viewport) -> f32 {
        let by_height = self.scale_to_screen_height();
        let by_width = self.scale_to_screen_width(viewport);
        let scale = by_height.max(by_width);
        self.set_scale(scale);
        scale
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

    pub fn max_scroll_x(&self, viewport: &Viewport) -> f32 {
        self.transformable.position().x + self.width() / 2.0
            - viewport.normalized_size().x / 2.0
    }

    pub fn min_scroll_x(&self, viewport: &Viewport) -> f32 {
        self.transformable.position().x - self.width() / 2.0
            + viewport.normalized_size().x / 2.0
    }

    pub fn max_scroll_y(&self) -> f32 {
        self.transformable.position().y + self.height() / 2.0 - STAGE_HEIGHT / 2.0
    }

    pub fn min_scroll_y(&self) -> f32 {
        self.transformable.position().y - self.height() / 2.0 + STAGE_HEIGHT / 2.0
    }

    /// Placement used for drawing, scroll offset included.
    pub fn placement(&self) -> Placement {
        Placement {
            position: self.transformable.position() + self.scroll_offset,
            rotation_degrees: self.transformable.rotation_degrees(),
            scale: self.transformable.scale(),
            anchor: self.anchor,
            frame_size: Vec2::new(self.buffer.width() as f32, self.buffer.height() as f32),
        }
    }
}

impl Drawable for BackgroundLayer {
    fn layer(&self) -> f32 {
        self.layer
    }

    fn draw(&self, ctx: &DrawContext<'_>, sink: &mut dyn DrawSink) -> AnyResult<()> {
        if !self.visible {
            return Ok(());
        }
        sink.draw_buffer(
            &self.buffer,
            screen_transform(&self.placement(), &ctx.stage.viewport),
            self.tint(),
        )
    }
}

/// Ordered stack of background layers. Layer numbers here are 1-based
/// positions in the stack, not draw depths.
#[derive(Debug, Clone, Default)]
pub struct Background {
    layers: Vec<BackgroundLayer>,
}

impl Background {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a layer drawn at `depth`. Returns its 1-based number.
    pub fn add_layer(&mut self, mut layer: BackgroundLayer, depth: f32) -> usize {
        layer.set_layer(depth);
        debug!("background layer {:?} added at depth {depth}", layer.name());
        self.layers.push(layer);
        self.layers.len()
    }

    pub fn layers(&self) -> &[BackgroundLayer] {
        &self.layers
    }

    /// Every layer as a drawable, for [`crate::traits::draw::draw_in_layer_order`].
    pub fn drawables(&self) -> impl Iterator<Item = &dyn Drawable> {
        self.layers.iter().map(|l| l as &dyn Drawable)
    }

    fn index(&self, number: usize) -> Result<usize> {
        if number == 0 || number > self.layers.len() {
            return Err(EngineError::LayerOutOfRange {
                number,
                count: self.layers.len(),
            });
        }
        Ok(number - 1)
    }

    pub fn layer(&self, number: usize) -> Result<&BackgroundLayer> {
        Ok(&self.layers[self.index(number)?])
    }

    pub fn layer_mut(&mut self, number: usize) -> Result<&mut BackgroundLayer> {
        let index = self.index(number)?;
        Ok(&mut self.layers[index])
    }

    fn apply_scale(&mut self, scale: f32) {
        for layer in &mut self.layers {
            layer.set_scale(scale);
        }
    }

    /// Fit layer `number` to the stage height and scale every layer to match.
    pub fn scale_to_screen_height(&mut self, number: usize) -> Result<()> {
        let scale = self.layer_mut(number)?.scale_to_screen_height();
        self.apply_scale(scale);
        Ok(())
    }

    pub fn scale_to_screen_width(&mut self, number: usize, viewport: &Viewport) -> Result<()> {
        let scale = self.layer_mut(number)?.scale_to_screen_width(viewport);
        self.apply_scale(scale);
        Ok(())
    }

    pub fn scale_to_screen(&mut self, number: usize, viewport: &Viewport) -> Result<()> {
        let scale = self.layer_mut(number)?.scale_to_screen(viewport);
        self.apply_scale(scale);
        Ok(())
    }

    /// Scroll layer `number` horizontally; the other layers follow in
    /// proportion to how much wider than the stage they are (parallax).
    pub fn set_scroll_x(&mut self, number: usize, x: f32, viewport: &Viewport) -> Result<()> {
        let index = self.index(number)?;
        let stage_width = viewport.normalized_size().x;
        let lead_excess = self.layers[index].width() - stage_width;
        self.layers[index].scroll_offset.x = x;
        for (i, layer) in self.layers.iter_mut().enumerate() {
            if i == index {
                continue;
            }
            layer.scroll_offset.x = if lead_excess == 0.0 {
                0.0
            } else {
                x * ((layer.width() - stage_width) / lead_excess)
            };
        }
        Ok(())
    }
}
