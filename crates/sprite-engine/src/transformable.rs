use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;
use serde::{Deserialize, Serialize};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Position, rotation and scale of something placed on the stage.
///
/// These raw fields are the source of truth; transforms are derived from them.
/// `generation` is drawn from a process-wide counter on construction and on
/// every write, so two values with the same generation hold the same fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawTransformable")]
pub struct Transformable {
    position: Vec2,
    rotation_degrees: f32,
    #[serde(skip_serializing)]
    rotation_radians: f32,
    scale: f32,
    #[serde(skip_serializing)]
    generation: u64,
}

/// Serialized form; derived fields are rebuilt on load.
#[derive(Deserialize)]
struct RawTransformable {
    #[serde(default)]
    position: Vec2,
    #[serde(default)]
    rotation_degrees: f32,
    #[serde(default = "natural_scale")]
    scale: f32,
}

fn natural_scale() -> f32 {
    1.0
}

impl From<RawTransformable> for Transformable {
    fn from(raw: RawTransformable) -> Self {
        let mut t = Transformable::at(raw.position);
        t.set_rotation(raw.rotation_degrees);
        t.set_scale(raw.scale);
        t
    }
}

impl PartialEq for Transformable {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
            && self.rotation_degrees == other.rotation_degrees
            && self.scale == other.scale
    }
}

impl Default for Transformable {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation_degrees: 0.0,
            rotation_radians: 0.0,
            scale: 1.0,
            generation: next_generation(),
        }
    }
}

impl Transformable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    fn bump(&mut self) {
        self.generation = next_generation();
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.bump();
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.set_position(self.position + delta);
    }

    pub fn rotation_degrees(&self) -> f32 {
        self.rotation_degrees
    }

    pub fn rotation_radians(&self) -> f32 {
        self.rotation_radians
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation_degrees = degrees;
        self.rotation_radians = degrees.to_radians();
        self.bump();
    }

    pub fn rotate(&mut self, degrees: f32) {
        self.set_rotation(self.rotation_degrees + degrees);
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Negative scales clamp to zero.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale.max(0.0);
        self.bump();
    }
}
