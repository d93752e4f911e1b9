use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::transformable::Transformable;

/// Emitted by [`Motion::update`] when something finished this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionEvent {
    GlideComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Glide {
    target: Vec2,
    remaining: f32,
}

/// Velocity state of a moving object.
///
/// Direction is in degrees counter-clockwise from the positive x axis
/// (right = 0, up = 90). Speed and velocity are kept consistent on every write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    speed: f32,
    direction: f32,
    velocity: Vec2,
    glide: Option<Glide>,
}

/// Angle in degrees from `from` towards `to`, in `-180..=180`.
pub fn angle_towards(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x).to_degrees()
}

/// Unit vector pointing along `degrees`.
pub fn heading(degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians())
}

impl Motion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
        self.velocity = heading(self.direction) * speed;
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn set_direction(&mut self, degrees: f32) {
        self.direction = degrees;
        self.velocity = heading(degrees) * self.speed;
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Set velocity directly. Direction is normalized to `0..360` and left
    /// untouched for a zero velocity.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
        self.speed = velocity.length();
        if self.speed != 0.0 {
            let degrees = velocity.y.atan2(velocity.x).to_degrees();
            self.direction = if degrees < 0.0 { degrees + 360.0 } else { degrees };
        }
    }

    pub fn point_towards(&mut self, from: Vec2, target: Vec2) {
        self.set_direction(angle_towards(from, target));
    }

    /// Move to `target` over `seconds`, then stop.
    pub fn glide_to(&mut self, target: Vec2, seconds: f32) {
        self.glide = Some(Glide {
            target,
            remaining: seconds,
        });
    }

    pub fn is_gliding(&self) -> bool {
        self.glide.is_some()
    }

    /// Abandon the glide where it is. Velocity is kept.
    pub fn stop_glide(&mut self) {
        self.glide = None;
    }

    /// Advance one tick: steer any glide, then move by
    /// `velocity * elapsed * speed_multiplier`.
    pub fn update(
        &mut self,
        transform: &mut Transformable,
        elapsed_seconds: f32,
        speed_multiplier: f32,
    ) -> Option<MotionEvent> {
        let mut event = None;
        if let Some(mut glide) = self.glide.take() {
            glide.remaining -= elapsed_seconds;
            if glide.remaining <= 0.0 {
                transform.set_position(glide.target);
                self.set_speed(0.0);
                event = Some(MotionEvent::GlideComplete);
            } else {
                let position = transform.position();
                let distance = position.distance(glide.target);
                self.point_towards(position, glide.target);
                let multiplier = if speed_multiplier == 0.0 {
                    1.0
                } else {
                    speed_multiplier
                };
                self.set_speed(distance / glide.remaining / multiplier);
                self.glide = Some(glide);
            }
        }

        if self.velocity != Vec2::ZERO {
            transform.translate(self.velocity * elapsed_seconds * speed_multiplier);
        }
        event
    }
}

/// Move `distance` stage units along `direction_degrees`.
pub fn move_along(transform: &mut Transformable, direction_degrees: f32, distance: f32) {
    transform.translate(heading(direction_degrees) * distance);
}
