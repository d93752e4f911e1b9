//! Pixel-accurate collision between placed frames.
//!
//! Rows are addressed bottom-up (`height - 1 - y`) because draw transforms put
//! local y = 0 at the bottom of the frame.

use glam::{Affine2, Vec2};
use log::trace;
use rayon::prelude::*;
use sprite_geom::{bounding_rect, relative_transform, try_inverse};

use crate::buffer::ColorBuffer;
use crate::view::SpriteView;

/// Round a stepped coordinate onto a pixel grid, ties to even.
#[inline]
pub(crate) fn to_pixel(v: Vec2) -> (i64, i64) {
    (v.x.round_ties_even() as i64, v.y.round_ties_even() as i64)
}

/// Walk every pixel of a `width` x `height` source in its local space and
/// report where it lands in the target's local space, rounded.
///
/// `f(xa, ya, xb, yb)` is called for each source pixel; returning `true`
/// stops the walk early and makes this return `true`.
pub(crate) fn walk_pixels(
    a_to_b: &Affine2,
    width: usize,
    height: usize,
    mut f: impl FnMut(usize, usize, i64, i64) -> bool,
) -> bool {
    let step_x = a_to_b.transform_vector2(Vec2::X);
    let step_y = a_to_b.transform_vector2(Vec2::Y);
    let mut row_start = a_to_b.transform_point2(Vec2::ZERO);

    for ya in 0..height {
        let mut pos = row_start;
        for xa in 0..width {
            let (xb, yb) = to_pixel(pos);
            if f(xa, ya, xb, yb) {
                return true;
            }
            pos += step_x;
        }
        row_start += step_y;
    }
    false
}

/// Whether any non-transparent pixel of `a` overlaps one of `b`.
///
/// A non-invertible `tb` covers no pixels.
pub fn intersect_pixels(ta: &Affine2, a: &ColorBuffer, tb: &Affine2, b: &ColorBuffer) -> bool {
    let Some(a_to_b) = relative_transform(ta, tb) else {
        return false;
    };
    walk_pixels(&a_to_b, a.width(), a.height(), |xa, ya, xb, yb| {
        b.contains_pixel(xb, yb)
            && !a.sample_bottom_up(xa, ya).is_transparent()
            && !b.sample_bottom_up(xb as usize, yb as usize).is_transparent()
    })
}

/// Bounding-box fast path, then the exact pixel test.
pub fn touching(a: &SpriteView<'_>, b: &SpriteView<'_>) -> bool {
    if !a.visible || !b.visible {
        return false;
    }
    if try_inverse(&a.transform).is_none() || try_inverse(&b.transform).is_none() {
        return false;
    }
    if !a.bounding_rect().intersects(&b.bounding_rect()) {
        trace!("bounding rects apart, skipping pixel test");
        return false;
    }
    intersect_pixels(&a.transform, a.buffer, &b.transform, b.buffer)
}

/// Whether the stage point `point` lands on a non-transparent pixel.
pub fn touching_point(transform: &Affine2, buffer: &ColorBuffer, point: Vec2) -> bool {
    let rect = bounding_rect(transform, buffer.width() as f32, buffer.height() as f32);
    if !rect.contains(point) {
        return false;
    }
    let Some(inverse) = try_inverse(transform) else {
        return false;
    };
    let (x, y) = to_pixel(inverse.transform_point2(point));
    buffer.contains_pixel(x, y) && !buffer.sample_bottom_up(x as usize, y as usize).is_transparent()
}

/// Whether any of `points` touches the view.
pub fn touching_any_point(view: &SpriteView<'_>, points: &[Vec2]) -> bool {
    view.visible
        && points
            .iter()
            .any(|p| touching_point(&view.transform, view.buffer, *p))
}

/// Every touching unordered pair, as ascending `(i, j)` with `i < j`.
pub fn touching_pairs(views: &[SpriteView<'_>]) -> Vec<(usize, usize)> {
    let n = views.len();
    let candidates: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect();
    let mut hits: Vec<(usize, usize)> = candidates
        .into_par_iter()
        .filter(|&(i, j)| touching(&views[i], &views[j]))
        .collect();
    hits.sort_unstable();
    hits
}
