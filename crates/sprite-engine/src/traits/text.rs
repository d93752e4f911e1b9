use glam::Vec2;

/// Font metrics supplied by the host, in unscaled screen pixels.
/// Implementations: host font loaders (production), FixedWidthMeasure (testing).
pub trait TextMeasure {
    /// Size of `text` drawn at the font's native size. Lines split on `\n`.
    fn measure(&self, text: &str) -> Vec2;

    /// Distance between baselines of consecutive lines.
    fn line_spacing(&self) -> f32;
}

/// Every character is `advance` pixels wide; every line is `line_spacing` tall.
#[derive(Debug, Clone, Copy)]
pub struct FixedWidthMeasure {
    pub advance: f32,
    pub line_spacing: f32,
}

impl FixedWidthMeasure {
    pub fn new(advance: f32, line_spacing: f32) -> Self {
        Self {
            advance,
            line_spacing,
        }
    }
}

impl TextMeasure for FixedWidthMeasure {
    fn measure(&self, text: &str) -> Vec2 {
        if text.is_empty() {
            return Vec2::ZERO;
        }
        let lines = text.lines().count().max(1);
        let widest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        Vec2::new(
            widest as f32 * self.advance,
            lines as f32 * self.line_spacing,
        )
    }

    fn line_spacing(&self) -> f32 {
        self.line_spacing
    }
}
