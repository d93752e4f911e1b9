use std::cell::Cell;

use anyhow::Result as AnyResult;
use glam::{Affine2, Vec2};
use sprite_geom::coords::STAGE_HEIGHT;
use sprite_geom::{Placement, RectF, Viewport, draw_transform};

use crate::buffer::Rgba;
use crate::collision;
use crate::compositing::{self, StampCropping, StampMethod};
use crate::config::StageContext;
use crate::costume::CostumeId;
use crate::error::{EngineError, Result};
use crate::motion::{Motion, MotionEvent, angle_towards, move_along};
use crate::store::CostumeStore;
use crate::traits::draw::{DrawContext, DrawSink, Drawable, screen_transform};
use crate::transformable::Transformable;
use crate::view::SpriteView;

/// Default layer for sprites; backgrounds sit below at 1.
pub const SPRITE_LAYER: f32 = 2.0;

/// Which stage edges a sprite's bounding rect reaches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeContacts {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl EdgeContacts {
    pub fn any(&self) -> bool {
        self.left || self.right || self.top || self.bottom
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedTransform {
    generation: u64,
    costume: CostumeId,
    revision: u64,
    transform: Affine2,
}

#[derive(Debug)]
pub struct Sprite {
    transformable: Transformable,
    motion: Motion,
    costumes: Vec<CostumeId>,
    current: Option<usize>,
    visible: bool,
    layer: f32,
    opacity: f32,
    color: Rgba,
    cached: Cell<Option<CachedTransform>>,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            transformable: Transformable::new(),
            motion: Motion::new(),
            costumes: Vec::new(),
            current: None,
            visible: true,
            layer: SPRITE_LAYER,
            opacity: 1.0,
            color: Rgba::WHITE,
            cached: Cell::new(None),
        }
    }
}

impl Sprite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sprite wearing `costume`.
    pub fn with_costume(costume: CostumeId) -> Self {
        let mut sprite = Self::new();
        sprite.add_costume(costume);
        sprite
    }

    // Placement

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

    pub fn set_x(&mut self, x: f32) {
        let y = self.position().y;
        self.go_to(Vec2::new(x, y));
    }

    pub fn set_y(&mut self, y: f32) {
        let x = self.position().x;
        self.go_to(Vec2::new(x, y));
    }

    pub fn rotation(&self) -> f32 {
        self.transformable.rotation_degrees()
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.transformable.set_rotation(degrees);
    }

    /// Turn so the costume's right side faces `target`, plus `adjustment` degrees.
    pub fn rotate_towards(&mut self, target: Vec2, adjustment: f32) {
        let angle = angle_towards(self.position(), target);
        self.set_rotation(-angle + adjustment);
    }

    pub fn scale(&self) -> f32 {
        self.transformable.scale()
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.transformable.set_scale(scale);
    }

    /// Size in percent, 100 is natural size.
    pub fn size(&self) -> f32 {
        self.scale() * 100.0
    }

    pub fn set_size(&mut self, percent: f32) {
        self.set_scale(percent / 100.0);
    }

    pub fn change_size(&mut self, percent: f32) {
        self.set_size(self.size() + percent);
    }

    // Movement

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn motion_mut(&mut self) -> &mut Motion {
        &mut self.motion
    }

    /// Step `distance` stage units along the current direction.
    pub fn move_steps(&mut self, distance: f32) {
        move_along(&mut self.transformable, self.motion.direction(), distance);
    }

    pub fn glide_to(&mut self, target: Vec2, seconds: f32) {
        self.motion.glide_to(target, seconds);
    }

    /// Per-tick movement update.
    pub fn update(&mut self, ctx: &StageContext, elapsed_seconds: f32) -> Option<MotionEvent> {
        self.motion
            .update(&mut self.transformable, elapsed_seconds, ctx.speed_multiplier)
    }

    // Costumes

    /// Add a costume and wear it.
    pub fn add_costume(&mut self, costume: CostumeId) {
        match self.costumes.iter().position(|c| *c == costume) {
            Some(index) => self.current = Some(index),
            None => {
                self.costumes.push(costume);
                self.current = Some(self.costumes.len() - 1);
            }
        }
    }

    pub fn costume_id(&self) -> Option<CostumeId> {
        self.current.map(|i| self.costumes[i])
    }

    pub fn costume_ids(&self) -> &[CostumeId] {
        &self.costumes
    }

    /// 1-based index of the worn costume, 0 when there is none.
    pub fn costume_number(&self) -> usize {
        self.current.map_or(0, |i| i + 1)
    }

    pub fn set_costume_number(&mut self, number: usize) -> Result<()> {
        if number == 0 || number > self.costumes.len() {
            return Err(EngineError::CostumeOutOfRange {
                number,
                count: self.costumes.len(),
            });
        }
        self.current = Some(number - 1);
        Ok(())
    }

    /// Wear the costume registered under `name` in `store`.
    pub fn set_costume_by_name(&mut self, store: &CostumeStore, name: &str) -> bool {
        match store.id_of(name) {
            Some(id) => {
                self.add_costume(id);
                true
            }
            None => false,
        }
    }

    pub fn next_costume(&mut self) {
        if let Some(i) = self.current {
            self.current = Some((i + 1) % self.costumes.len());
        }
    }

    pub fn previous_costume(&mut self) {
        if let Some(i) = self.current {
            let count = self.costumes.len();
            self.current = Some((i + count - 1) % count);
        }
    }

    // Appearance

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn layer(&self) -> f32 {
        self.layer
    }

    pub fn set_layer(&mut self, layer: f32) {
        self.layer = layer;
    }

    /// Move above every layer in `others`.
    pub fn go_to_front(&mut self, others: impl IntoIterator<Item = f32>) {
        let top = others.into_iter().fold(self.layer, f32::max);
        self.layer = top + 1.0;
    }

    /// Move below every layer in `others`.
    pub fn go_to_back(&mut self, others: impl IntoIterator<Item = f32>) {
        let bottom = others.into_iter().fold(self.layer, f32::min);
        self.layer = bottom - 1.0;
    }

    /// 0 is fully visible, 100 fully invisible.
    pub fn ghost_effect(&self) -> f32 {
        100.0 - self.opacity * 100.0
    }

    pub fn set_ghost_effect(&mut self, ghost: f32) {
        self.opacity = ((100.0 - ghost) / 100.0).clamp(0.0, 1.0);
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.color = color;
    }

    /// Colour with opacity folded in.
    pub fn tint(&self) -> Rgba {
        self.color.scaled(self.opacity)
    }

    // Derived geometry

    /// Raw placement of the current frame, or `None` without a costume.
    pub fn placement(&self, store: &CostumeStore) -> Option<Placement> {
        let costume = store.get(self.costume_id()?).ok()?;
        let frame = costume.current_frame();
        Some(Placement {
            position: self.transformable.position(),
            rotation_degrees: self.transformable.rotation_degrees(),
            scale: self.transformable.scale(),
            anchor: frame.anchor(),
            frame_size: frame.size(),
        })
    }

    /// Draw transform of the current frame, cached until the sprite moves or
    /// the costume shows different pixels.
    pub fn draw_transform(&self, store: &CostumeStore) -> Option<Affine2> {
        let id = self.costume_id()?;
        let revision = store.get(id).ok()?.revision();
        let generation = self.transformable.generation();
        let hit = self.cached.get().filter(|c| {
            c.generation == generation && c.costume == id && c.revision == revision
        });
        if let Some(c) = hit {
            return Some(c.transform);
        }
        let transform = draw_transform(&self.placement(store)?);
        self.cached.set(Some(CachedTransform {
            generation,
            costume: id,
            revision,
            transform,
        }));
        Some(transform)
    }

    /// Snapshot for collision and compositing. `None` without a costume.
    pub fn view<'a>(&self, store: &'a CostumeStore) -> Option<SpriteView<'a>> {
        let placement = self.placement(store)?;
        let transform = self.draw_transform(store)?;
        let buffer = store.get(self.costume_id()?).ok()?.current_frame().buffer();
        Some(SpriteView {
            placement,
            buffer,
            transform,
            visible: self.visible,
            tint: self.tint(),
        })
    }

    /// Stage-space bounding rect.
    pub fn rect(&self, store: &CostumeStore) -> Option<RectF> {
        self.view(store).map(|v| v.bounding_rect())
    }

    // Collision

    pub fn is_touching(&self, other: &Sprite, store: &CostumeStore) -> bool {
        match (self.view(store), other.view(store)) {
            (Some(a), Some(b)) => collision::touching(&a, &b),
            _ => false,
        }
    }

    pub fn is_touching_point(&self, point: Vec2, store: &CostumeStore) -> bool {
        self.is_touching_any_point(&[point], store)
    }

    pub fn is_touching_any_point(&self, points: &[Vec2], store: &CostumeStore) -> bool {
        self.view(store)
            .is_some_and(|v| collision::touching_any_point(&v, points))
    }

    /// Edges reached by the bounding rect. Horizontal edges follow the viewport.
    pub fn edges(&self, store: &CostumeStore, viewport: &Viewport) -> EdgeContacts {
        let Some(rect) = self.rect(store) else {
            return EdgeContacts::default();
        };
        let half = STAGE_HEIGHT / 2.0;
        EdgeContacts {
            left: rect.left() <= viewport.min_x(),
            right: rect.right() >= viewport.max_x(),
            top: rect.max_y() >= half,
            bottom: rect.min_y() <= -half,
        }
    }

    pub fn is_touching_edge(&self, store: &CostumeStore, viewport: &Viewport) -> bool {
        self.edges(store, viewport).any()
    }

    /// Whether the bounding rect lies entirely outside the visible stage.
    pub fn is_off_screen(&self, store: &CostumeStore, viewport: &Viewport) -> bool {
        let Some(rect) = self.rect(store) else {
            return true;
        };
        let half = STAGE_HEIGHT / 2.0;
        rect.right() < viewport.min_x()
            || rect.left() > viewport.max_x()
            || rect.max_y() < -half
            || rect.min_y() > half
    }

    // Stamping

    /// Merge `donor` into this sprite's current frame.
    pub fn stamp(
        &self,
        store: &mut CostumeStore,
        donor: &Sprite,
        method: StampMethod,
        cropping: StampCropping,
    ) -> Result<()> {
        let id = self
            .costume_id()
            .ok_or(EngineError::MissingBuffer { role: "subject" })?;
        let buffer = {
            let subject = self
                .view(store)
                .ok_or(EngineError::MissingBuffer { role: "subject" })?;
            let donor = donor
                .view(store)
                .ok_or(EngineError::MissingBuffer { role: "donor" })?;
            compositing::stamp(&subject, &donor, method, cropping)?
        };
        store.get_mut(id)?.replace_current_buffer(buffer);
        Ok(())
    }
}

impl Drawable for Sprite {
    fn layer(&self) -> f32 {
        self.layer
    }

    fn draw(&self, ctx: &DrawContext<'_>, sink: &mut dyn DrawSink) -> AnyResult<()> {
        if !self.visible {
            return Ok(());
        }
        let Some(id) = self.costume_id() else {
            return Ok(());
        };
        let frame = ctx.costumes.get(id)?.current_frame();
        let Some(placement) = self.placement(ctx.costumes) else {
            return Ok(());
        };
        sink.draw_buffer(
            frame.buffer(),
            screen_transform(&placement, &ctx.stage.viewport),
            self.tint(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ColorBuffer;
    use crate::costume::Costume;

    fn store_with(name: &str, w: usize, h: usize) -> (CostumeStore, CostumeId) {
        let mut store = CostumeStore::new();
        let id = store
            .insert(Costume::still(name, ColorBuffer::filled(w, h, Rgba::WHITE)))
            .unwrap();
        (store, id)
    }

    #[test]
    fn test_no_costume_means_no_view() {
        let (store, _) = store_with("ball", 4, 4);
        let sprite = Sprite::new();
        assert!(sprite.view(&store).is_none());
        assert!(!sprite.is_touching(&sprite, &store));
        assert_eq!(sprite.costume_number(), 0);
    }

    #[test]
    fn test_transform_cache_follows_moves() {
        let (store, id) = store_with("ball", 4, 4);
        let mut sprite = Sprite::with_costume(id);
        let first = sprite.draw_transform(&store).unwrap();
        assert_eq!(sprite.draw_transform(&store), Some(first));
        sprite.go_to(Vec2::new(10.0, 0.0));
        let moved = sprite.draw_transform(&store).unwrap();
        assert_ne!(first, moved);
        assert!(
            (moved.transform_point2(Vec2::new(2.0, 2.0)) - Vec2::new(10.0, 0.0)).length() < 1e-5
        );
    }

    #[test]
    fn test_replaced_transformable_invalidates_cache() {
        let mut store = CostumeStore::new();
        let id = store
            .insert(Costume::still("ball", ColorBuffer::filled(10, 10, Rgba::WHITE)))
            .unwrap();
        let a = Sprite::with_costume(id);
        let mut b = Sprite::with_costume(id);
        assert!(b.is_touching(&a, &store));

        *b.transformable_mut() = Transformable::at(Vec2::new(80.0, 80.0));
        assert!(!b.is_touching(&a, &store));
        assert!(!a.is_touching(&b, &store));
        let rect = b.rect(&store).unwrap();
        assert_eq!((rect.x, rect.y), (75.0, 75.0));
    }

    #[test]
    fn test_replaced_costume_invalidates_cache() {
        let (mut store, id) = store_with("ball", 4, 4);
        let sprite = Sprite::with_costume(id);
        assert_eq!(sprite.rect(&store).unwrap().width, 4.0);

        *store.get_mut(id).unwrap() =
            Costume::still("ball", ColorBuffer::filled(12, 12, Rgba::WHITE));
        assert_eq!(sprite.rect(&store).unwrap().width, 12.0);
    }

    #[test]
    fn test_transform_cache_follows_costume_change() {
        let mut store = CostumeStore::new();
        let small = store
            .insert(Costume::still("small", ColorBuffer::filled(2, 2, Rgba::WHITE)))
            .unwrap();
        let big = store
            .insert(Costume::still("big", ColorBuffer::filled(8, 8, Rgba::WHITE)))
            .unwrap();
        let mut sprite = Sprite::with_costume(small);
        sprite.add_costume(big);
        let r_big = sprite.rect(&store).unwrap();
        sprite.set_costume_number(1).unwrap();
        let r_small = sprite.rect(&store).unwrap();
        assert_eq!(r_big.width, 8.0);
        assert_eq!(r_small.width, 2.0);
    }

    #[test]
    fn test_costume_numbering() {
        let mut store = CostumeStore::new();
        let a = store
            .insert(Costume::still("a", ColorBuffer::transparent(1, 1)))
            .unwrap();
        let b = store
            .insert(Costume::still("b", ColorBuffer::transparent(1, 1)))
            .unwrap();
        let mut sprite = Sprite::with_costume(a);
        sprite.add_costume(b);
        assert_eq!(sprite.costume_number(), 2);
        sprite.next_costume();
        assert_eq!(sprite.costume_id(), Some(a));
        sprite.previous_costume();
        assert_eq!(sprite.costume_id(), Some(b));
        assert!(sprite.set_costume_by_name(&store, "a"));
        assert_eq!(sprite.costume_number(), 1);
        assert!(!sprite.set_costume_by_name(&store, "missing"));
        assert_eq!(
            sprite.set_costume_number(3),
            Err(EngineError::CostumeOutOfRange {
                number: 3,
                count: 2
            })
        );
    }

    #[test]
    fn test_size_percent() {
        let mut sprite = Sprite::new();
        sprite.set_size(150.0);
        assert!((sprite.scale() - 1.5).abs() < 1e-6);
        sprite.change_size(-50.0);
        assert!((sprite.size() - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_ghost_effect_folds_into_tint() {
        let mut sprite = Sprite::new();
        sprite.set_ghost_effect(50.0);
        assert_eq!(sprite.tint(), Rgba::WHITE.scaled(0.5));
        sprite.set_ghost_effect(150.0);
        assert_eq!(sprite.tint(), Rgba::TRANSPARENT);
        sprite.set_ghost_effect(-10.0);
        assert_eq!(sprite.ghost_effect(), 0.0);
    }

    #[test]
    fn test_layers() {
        let mut sprite = Sprite::new();
        sprite.go_to_front([1.0, 5.0, 3.0]);
        assert_eq!(sprite.layer(), 6.0);
        sprite.go_to_back([1.0, 5.0]);
        assert_eq!(sprite.layer(), 0.0);
    }

    #[test]
    fn test_edges() {
        let (store, id) = store_with("ball", 10, 10);
        let viewport = Viewport::new(800, 400);
        let mut sprite = Sprite::with_costume(id);
        assert!(!sprite.is_touching_edge(&store, &viewport));

        sprite.go_to(Vec2::new(-196.0, 0.0));
        let edges = sprite.edges(&store, &viewport);
        assert!(edges.left && !edges.right);

        sprite.go_to(Vec2::new(0.0, 96.0));
        assert!(sprite.edges(&store, &viewport).top);

        sprite.go_to(Vec2::new(0.0, -300.0));
        assert!(sprite.is_off_screen(&store, &viewport));
        assert!(!Sprite::with_costume(id).is_off_screen(&store, &viewport));
    }

    #[test]
    fn test_update_moves_with_context() {
        let mut sprite = Sprite::new();
        sprite.motion_mut().set_speed(0.1);
        let ctx = StageContext::default();
        sprite.update(&ctx, 1.0);
        assert!((sprite.position().x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_move_steps_and_rotate_towards() {
        let mut sprite = Sprite::new();
        sprite.motion_mut().set_direction(90.0);
        sprite.move_steps(5.0);
        assert!((sprite.position() - Vec2::new(0.0, 5.0)).length() < 1e-4);
        sprite.rotate_towards(Vec2::new(0.0, 10.0), 0.0);
        assert!((sprite.rotation() + 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_stamp_requires_costumes() {
        let (mut store, id) = store_with("ball", 4, 4);
        let subject = Sprite::new();
        let donor = Sprite::with_costume(id);
        assert_eq!(
            subject.stamp(
                &mut store,
                &donor,
                StampMethod::Normal,
                StampCropping::CropToSubject
            ),
            Err(EngineError::MissingBuffer { role: "subject" })
        );
        assert_eq!(
            donor.stamp(
                &mut store,
                &subject,
                StampMethod::Normal,
                StampCropping::CropToSubject
            ),
            Err(EngineError::MissingBuffer { role: "donor" })
        );
    }
}
