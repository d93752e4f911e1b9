use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// One RGBA sample. Channels are treated as premultiplied when blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const RED: Self = Self::new(255, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Multiply all four channels by `factor` (truncating), fading towards
    /// fully transparent black.
    pub fn scaled(self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f32 * factor) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b), scale(self.a))
    }

    /// Channel-wise product with a tint (white leaves the colour unchanged).
    pub fn modulate(self, tint: Rgba) -> Self {
        let mul = |c: u8, t: u8| ((c as u32 * t as u32 + 127) / 255) as u8;
        Self::new(
            mul(self.r, tint.r),
            mul(self.g, tint.g),
            mul(self.b, tint.b),
            mul(self.a, tint.a),
        )
    }

    /// Premultiplied source-over: `self + dst * (1 - self.a)`.
    pub fn over(self, dst: Rgba) -> Self {
        let inv = 255 - self.a as u32;
        let blend = |s: u8, d: u8| (s as u32 + (d as u32 * inv + 127) / 255).min(255) as u8;
        Self::new(
            blend(self.r, dst.r),
            blend(self.g, dst.g),
            blend(self.b, dst.b),
            blend(self.a, dst.a),
        )
    }
}

/// Rectangular pixel buffer, row-major with row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorBuffer {
    width: usize,
    height: usize,
    samples: Vec<Rgba>,
}

impl ColorBuffer {
    /// Wrap decoded samples. Fails unless `samples.len() == width * height`.
    pub fn new(width: usize, height: usize, samples: Vec<Rgba>) -> Result<Self> {
        if samples.len() != width * height {
            return Err(EngineError::BufferSize {
                width,
                height,
                len: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    pub fn filled(width: usize, height: usize, color: Rgba) -> Self {
        Self {
            width,
            height,
            samples: vec![color; width * height],
        }
    }

    pub fn transparent(width: usize, height: usize) -> Self {
        Self::filled(width, height, Rgba::TRANSPARENT)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn samples(&self) -> &[Rgba] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<Rgba> {
        self.samples
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Sample at column `x`, row `y` (row 0 at the top).
    pub fn get(&self, x: usize, y: usize) -> Option<Rgba> {
        self.index(x, y).map(|i| self.samples[i])
    }

    /// Overwrite one sample. Out-of-range coordinates are ignored.
    pub fn set(&mut self, x: usize, y: usize, color: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.samples[i] = color;
        }
    }

    /// Index for column `x` counted with row 0 at the *bottom*.
    /// Callers must have bounds-checked `x` and `y`.
    #[inline]
    pub(crate) fn bottom_up_index(&self, x: usize, y: usize) -> usize {
        x + (self.height - 1 - y) * self.width
    }

    #[inline]
    pub(crate) fn sample_bottom_up(&self, x: usize, y: usize) -> Rgba {
        self.samples[self.bottom_up_index(x, y)]
    }

    /// Bounds check for a rounded pixel coordinate.
    #[inline]
    pub(crate) fn contains_pixel(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn flipped_horizontal(&self) -> Self {
        let samples = self
            .samples
            .chunks_exact(self.width.max(1))
            .flat_map(|row| row.iter().rev().copied())
            .collect();
        Self {
            width: self.width,
            height: self.height,
            samples,
        }
    }

    pub fn flipped_vertical(&self) -> Self {
        let samples = self
            .samples
            .chunks_exact(self.width.max(1))
            .rev()
            .flat_map(|row| row.iter().copied())
            .collect();
        Self {
            width: self.width,
            height: self.height,
            samples,
        }
    }

    /// Copy a `width` x `height` region starting at (`x`, `y`).
    /// The region must lie inside the buffer.
    fn region(&self, x: usize, y: usize, width: usize, height: usize) -> Self {
        let samples = (y..y + height)
            .flat_map(|row| {
                let start = row * self.width + x;
                self.samples[start..start + width].iter().copied()
            })
            .collect();
        Self {
            width,
            height,
            samples,
        }
    }

    /// Cut a sprite sheet into equal cells, row by row from the top left.
    pub fn split(&self, columns: usize, rows: usize) -> Result<Vec<ColorBuffer>> {
        if columns == 0
            || rows == 0
            || self.width % columns != 0
            || self.height % rows != 0
        {
            return Err(EngineError::UnevenSheet {
                width: self.width,
                height: self.height,
                columns,
                rows,
            });
        }
        let cell_w = self.width / columns;
        let cell_h = self.height / rows;
        Ok((0..rows)
            .flat_map(|row| (0..columns).map(move |col| (col, row)))
            .map(|(col, row)| self.region(col * cell_w, row * cell_h, cell_w, cell_h))
            .collect())
    }

    /// Number of samples with non-zero alpha.
    pub fn opaque_count(&self) -> usize {
        self.samples.iter().filter(|s| !s.is_transparent()).count()
    }

    pub fn from_rgba_image(image: &RgbaImage) -> Self {
        let samples = image
            .pixels()
            .map(|p| Rgba::new(p[0], p[1], p[2], p[3]))
            .collect();
        Self {
            width: image.width() as usize,
            height: image.height() as usize,
            samples,
        }
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        let raw = self
            .samples
            .iter()
            .flat_map(|s| [s.r, s.g, s.b, s.a])
            .collect();
        // Length always matches because of the buffer invariant.
        RgbaImage::from_raw(self.width as u32, self.height as u32, raw)
            .unwrap_or_else(|| RgbaImage::new(self.width as u32, self.height as u32))
    }
}

impl From<&RgbaImage> for ColorBuffer {
    fn from(image: &RgbaImage) -> Self {
        Self::from_rgba_image(image)
    }
}
