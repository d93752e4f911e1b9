use glam::Vec2;
use log::debug;
use serde::{Deserialize, Serialize};
use sprite_geom::{decompose, relative_transform, try_inverse};

use crate::buffer::{ColorBuffer, Rgba};
use crate::collision::walk_pixels;
use crate::error::{EngineError, Result};
use crate::view::SpriteView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StampMethod {
    /// Draw the donor on top of the subject.
    #[default]
    Normal,
    /// Erase the subject where the donor is opaque.
    Cutout,
    /// Keep the subject only where the donor is opaque.
    CutoutInverted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StampCropping {
    /// The result keeps the subject's dimensions.
    #[default]
    CropToSubject,
    /// Enlarge the subject to fit the donor. Not supported.
    GrowSubject,
}

/// Compose `donor` into `subject` and return the new subject pixels.
pub fn stamp(
    subject: &SpriteView<'_>,
    donor: &SpriteView<'_>,
    method: StampMethod,
    cropping: StampCropping,
) -> Result<ColorBuffer> {
    if cropping != StampCropping::CropToSubject {
        return Err(EngineError::UnsupportedStamp { method, cropping });
    }
    debug!(
        "stamp {:?}: {}x{} donor onto {}x{} subject",
        method,
        donor.buffer.width(),
        donor.buffer.height(),
        subject.buffer.width(),
        subject.buffer.height()
    );
    match method {
        StampMethod::Normal => stamp_normal(subject, donor),
        StampMethod::Cutout => stamp_alpha(subject, donor, false),
        StampMethod::CutoutInverted => stamp_alpha(subject, donor, true),
    }
}

/// Render-target style: the donor is drawn over a copy of the subject.
fn stamp_normal(subject: &SpriteView<'_>, donor: &SpriteView<'_>) -> Result<ColorBuffer> {
    let subject_rt = subject.render_target_transform();
    let donor_rt = donor.render_target_transform();
    let donor_to_subject =
        relative_transform(&donor_rt, &subject_rt).ok_or(EngineError::DegenerateTransform)?;

    // Only translation, rotation and uniform scale survive, as with a sprite draw.
    let parts = decompose(&donor_to_subject);
    let subject_to_donor =
        try_inverse(&parts.to_affine()).ok_or(EngineError::DegenerateTransform)?;

    let mut out = subject.buffer.clone();
    let tint = donor.tint;
    for y in 0..out.height() {
        for x in 0..out.width() {
            let centre = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let src = subject_to_donor.transform_point2(centre).floor();
            if src.x < 0.0 || src.y < 0.0 {
                continue;
            }
            let Some(sample) = donor.buffer.get(src.x as usize, src.y as usize) else {
                continue;
            };
            let color = sample.modulate(tint);
            if color.is_transparent() {
                continue;
            }
            if let Some(dst) = out.get(x, y) {
                out.set(x, y, color.over(dst));
            }
        }
    }
    Ok(out)
}

/// Subtract the donor's alpha from the subject, pixel by pixel.
fn stamp_alpha(
    subject: &SpriteView<'_>,
    donor: &SpriteView<'_>,
    invert: bool,
) -> Result<ColorBuffer> {
    if try_inverse(&subject.transform).is_none() {
        return Err(EngineError::DegenerateTransform);
    }
    let subject_to_donor = relative_transform(&subject.transform, &donor.transform)
        .ok_or(EngineError::DegenerateTransform)?;

    let src = subject.buffer;
    let dn = donor.buffer;
    let mut samples = src.samples().to_vec();
    walk_pixels(&subject_to_donor, src.width(), src.height(), |xa, ya, xb, yb| {
        let index = src.bottom_up_index(xa, ya);
        let color = samples[index];
        samples[index] = if dn.contains_pixel(xb, yb) {
            let mut donor_alpha = dn.sample_bottom_up(xb as usize, yb as usize).a;
            if invert {
                donor_alpha = 255 - donor_alpha;
            }
            let alpha = color.a.saturating_sub(donor_alpha);
            color.scaled(alpha as f32 / 255.0)
        } else if invert {
            Rgba::TRANSPARENT
        } else {
            color
        };
        false
    });
    ColorBuffer::new(src.width(), src.height(), samples)
}
