use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::animation::{Animation, AnimationClock};
use crate::buffer::ColorBuffer;
use crate::config::StageContext;
use crate::error::{EngineError, Result};

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// Handle to a costume stored in a [`crate::store::CostumeStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CostumeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HorizontalAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Anchor point in frame pixels for the given alignment.
/// Centre uses the integer half of the dimension.
pub fn anchor_for(
    width: usize,
    height: usize,
    horizontal: HorizontalAlign,
    vertical: VerticalAlign,
) -> Vec2 {
    let x = match horizontal {
        HorizontalAlign::Left => 0,
        HorizontalAlign::Center => width / 2,
        HorizontalAlign::Right => width,
    };
    let y = match vertical {
        VerticalAlign::Top => 0,
        VerticalAlign::Center => height / 2,
        VerticalAlign::Bottom => height,
    };
    Vec2::new(x as f32, y as f32)
}

/// One image of a costume.
///
/// The buffer sits behind an `Arc`: readers snapshot it cheaply and writers
/// swap in a fresh buffer instead of mutating a shared one.
#[derive(Debug, Clone)]
pub struct Frame {
    buffer: Arc<ColorBuffer>,
    seconds: f32,
    horizontal: HorizontalAlign,
    vertical: VerticalAlign,
    anchor: Vec2,
}

impl Frame {
    pub fn new(buffer: ColorBuffer, seconds: f32) -> Self {
        let anchor = anchor_for(
            buffer.width(),
            buffer.height(),
            HorizontalAlign::Center,
            VerticalAlign::Center,
        );
        Self {
            buffer: Arc::new(buffer),
            seconds,
            horizontal: HorizontalAlign::Center,
            vertical: VerticalAlign::Center,
            anchor,
        }
    }

    pub fn with_alignment(mut self, horizontal: HorizontalAlign, vertical: VerticalAlign) -> Self {
        self.set_alignment(horizontal, vertical);
        self
    }

    pub fn set_alignment(&mut self, horizontal: HorizontalAlign, vertical: VerticalAlign) {
        self.horizontal = horizontal;
        self.vertical = vertical;
        self.refresh_anchor();
    }

    fn refresh_anchor(&mut self) {
        self.anchor = anchor_for(
            self.buffer.width(),
            self.buffer.height(),
            self.horizontal,
            self.vertical,
        );
    }

    pub fn buffer(&self) -> &ColorBuffer {
        &self.buffer
    }

    pub fn shared_buffer(&self) -> Arc<ColorBuffer> {
        Arc::clone(&self.buffer)
    }

    /// Replace the pixels. The anchor follows the new dimensions.
    pub fn replace_buffer(&mut self, buffer: ColorBuffer) {
        self.buffer = Arc::new(buffer);
        self.refresh_anchor();
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn alignment(&self) -> (HorizontalAlign, VerticalAlign) {
        (self.horizontal, self.vertical)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.buffer.width() as f32, self.buffer.height() as f32)
    }

    pub fn seconds(&self) -> f32 {
        self.seconds
    }

    pub fn set_seconds(&mut self, seconds: f32) {
        self.seconds = seconds;
    }

    pub fn flip_horizontal(&mut self) {
        self.buffer = Arc::new(self.buffer.flipped_horizontal());
    }

    pub fn flip_vertical(&mut self) {
        self.buffer = Arc::new(self.buffer.flipped_vertical());
    }

    /// Copy that shares nothing with `self`.
    pub fn deep_copy(&self) -> Self {
        Self {
            buffer: Arc::new(ColorBuffer::clone(&self.buffer)),
            ..self.clone()
        }
    }
}

/// A named, ordered set of frames with its own animation clock.
#[derive(Debug, Clone)]
pub struct Costume {
    name: String,
    frames: Vec<Frame>,
    current: usize,
    clock: AnimationClock,
    /// 0-based frame indices of the playing [`Animation`], if any.
    sequence: Option<Vec<usize>>,
    revision: u64,
}

impl Costume {
    pub fn new(name: impl Into<String>, frame: Frame) -> Self {
        let clock = AnimationClock::new(vec![frame.seconds()]);
        Self {
            name: name.into(),
            frames: vec![frame],
            current: 0,
            clock,
            sequence: None,
            revision: next_revision(),
        }
    }

    /// Costume with a single still frame.
    pub fn still(name: impl Into<String>, buffer: ColorBuffer) -> Self {
        Self::new(name, Frame::new(buffer, 0.0))
    }

    pub fn from_frames(name: impl Into<String>, frames: Vec<Frame>) -> Result<Self> {
        if frames.is_empty() {
            return Err(EngineError::FrameOutOfRange {
                number: 1,
                count: 0,
            });
        }
        let clock = AnimationClock::new(frames.iter().map(Frame::seconds).collect());
        Ok(Self {
            name: name.into(),
            frames,
            current: 0,
            clock,
            sequence: None,
            revision: next_revision(),
        })
    }

    /// Cut `sheet` into `columns` x `rows` frames, each shown for `seconds`.
    pub fn from_sheet(
        name: impl Into<String>,
        sheet: &ColorBuffer,
        columns: usize,
        rows: usize,
        seconds: f32,
    ) -> Result<Self> {
        let frames = sheet
            .split(columns, rows)?
            .into_iter()
            .map(|buffer| Frame::new(buffer, seconds))
            .collect();
        Self::from_frames(name, frames)
    }

    /// [`Costume::from_sheet`] with the stage's frame time and animation speed.
    pub fn from_stage_sheet(
        name: impl Into<String>,
        sheet: &ColorBuffer,
        columns: usize,
        rows: usize,
        stage: &StageContext,
    ) -> Result<Self> {
        let mut costume = Self::from_sheet(name, sheet, columns, rows, stage.frame_seconds)?;
        costume.set_animation_speed(stage.animation_speed);
        Ok(costume)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn add_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
        if self.sequence.is_none() {
            self.clock.set_durations(self.natural_durations());
        }
    }

    fn natural_durations(&self) -> Vec<f32> {
        self.frames.iter().map(Frame::seconds).collect()
    }

    pub fn current_frame(&self) -> &Frame {
        &self.frames[self.current]
    }

    /// 1-based.
    pub fn current_frame_number(&self) -> usize {
        self.current + 1
    }

    /// Changes whenever the current frame's pixels, size or anchor may differ.
    /// Values are unique across all costumes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = next_revision();
    }

    fn show(&mut self, index: usize) {
        if index != self.current {
            self.current = index;
            self.touch();
        }
    }

    pub fn set_frame_number(&mut self, number: usize) -> Result<()> {
        self.check_number(number)?;
        if self.sequence.is_none() {
            self.clock.jump_to(number)?;
        }
        self.show(number - 1);
        Ok(())
    }

    fn check_number(&self, number: usize) -> Result<()> {
        if number == 0 || number > self.frames.len() {
            return Err(EngineError::FrameOutOfRange {
                number,
                count: self.frames.len(),
            });
        }
        Ok(())
    }

    pub fn next_frame(&mut self) {
        let number = (self.current + 1) % self.frames.len() + 1;
        // Always in range.
        let _ = self.set_frame_number(number);
    }

    pub fn previous_frame(&mut self) {
        let count = self.frames.len();
        let number = (self.current + count - 1) % count + 1;
        let _ = self.set_frame_number(number);
    }

    /// Play an explicit frame sequence instead of the natural order.
    pub fn play(&mut self, animation: &Animation) -> Result<()> {
        for step in &animation.steps {
            self.check_number(step.frame_number)?;
        }
        if animation.steps.is_empty() {
            self.stop_animation();
            return Ok(());
        }
        let sequence: Vec<usize> = animation.steps.iter().map(|s| s.frame_number - 1).collect();
        let first = sequence[0];
        let speed = self.clock.speed();
        self.clock = AnimationClock::new(animation.durations()).with_speed(speed);
        self.sequence = Some(sequence);
        self.show(first);
        Ok(())
    }

    /// Return to playing the frames in their natural order.
    pub fn stop_animation(&mut self) {
        if self.sequence.take().is_some() {
            let speed = self.clock.speed();
            self.clock = AnimationClock::new(self.natural_durations()).with_speed(speed);
            self.clock.jump_to(self.current + 1).ok();
        }
    }

    pub fn is_playing_animation(&self) -> bool {
        self.sequence.is_some()
    }

    pub fn animation_speed(&self) -> f32 {
        self.clock.speed()
    }

    pub fn set_animation_speed(&mut self, speed: f32) {
        self.clock.set_speed(speed);
    }

    /// Advance the clock and show the resulting frame. Returns its 1-based number.
    pub fn advance(&mut self, elapsed_seconds: f32) -> usize {
        let step = self.clock.advance(elapsed_seconds) - 1;
        let index = match &self.sequence {
            Some(sequence) => sequence[step],
            None => step,
        };
        self.show(index);
        self.current_frame_number()
    }

    /// Align every frame.
    pub fn set_alignment(&mut self, horizontal: HorizontalAlign, vertical: VerticalAlign) {
        for frame in &mut self.frames {
            frame.set_alignment(horizontal, vertical);
        }
        self.touch();
    }

    pub fn flip_horizontal(&mut self) {
        self.frames.iter_mut().for_each(Frame::flip_horizontal);
        self.touch();
    }

    pub fn flip_vertical(&mut self) {
        self.frames.iter_mut().for_each(Frame::flip_vertical);
        self.touch();
    }

    /// Swap the pixels of the current frame only.
    pub fn replace_current_buffer(&mut self, buffer: ColorBuffer) {
        self.frames[self.current].replace_buffer(buffer);
        self.touch();
    }

    /// Fully independent copy under a new name.
    pub fn deep_copy(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: self.frames.iter().map(Frame::deep_copy).collect(),
            current: self.current,
            clock: self.clock.clone(),
            sequence: self.sequence.clone(),
            revision: next_revision(),
        }
    }
}
