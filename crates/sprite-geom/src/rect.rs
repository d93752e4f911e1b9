use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned float rectangle.
///
/// `x`/`y` hold the minimum corner. Containment is half-open
/// (`x <= p.x < x + width`), intersection is strict so rectangles that only
/// share an edge do not intersect.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    pub const EMPTY: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest rectangle enclosing all points. Returns `EMPTY` for no points.
    pub fn from_points(points: &[Vec2]) -> Self {
        let Some(first) = points.first() else {
            return Self::EMPTY;
        };
        let (min, max) = points
            .iter()
            .skip(1)
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Smaller y edge.
    pub fn min_y(&self) -> f32 {
        self.y
    }

    /// Larger y edge.
    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.x <= point.x && point.x < self.right() && self.y <= point.y && point.y < self.max_y()
    }

    pub fn contains_rect(&self, other: &RectF) -> bool {
        self.x <= other.x
            && other.right() <= self.right()
            && self.y <= other.y
            && other.max_y() <= self.max_y()
    }

    pub fn intersects(&self, other: &RectF) -> bool {
        other.x < self.right()
            && self.x < other.right()
            && other.y < self.max_y()
            && self.y < other.max_y()
    }

    pub fn offset(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Grow by `horizontal` on the left and right, `vertical` on both y edges.
    pub fn inflate(&mut self, horizontal: f32, vertical: f32) {
        self.x -= horizontal;
        self.y -= vertical;
        self.width += horizontal * 2.0;
        self.height += vertical * 2.0;
    }

    pub fn union(&self, other: &RectF) -> RectF {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        RectF::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.max_y().max(other.max_y()) - y,
        )
    }
}
