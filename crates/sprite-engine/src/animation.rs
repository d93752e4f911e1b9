use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// One entry of an explicit animation: which frame to show and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationStep {
    /// 1-based frame number within the costume.
    pub frame_number: usize,
    pub seconds: f32,
}

/// An ordered list of frames to play instead of the costume's natural order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub steps: Vec<AnimationStep>,
}

impl Animation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(mut self, frame_number: usize, seconds: f32) -> Self {
        self.steps.push(AnimationStep {
            frame_number,
            seconds,
        });
        self
    }

    pub fn durations(&self) -> Vec<f32> {
        self.steps.iter().map(|s| s.seconds).collect()
    }
}

/// Accumulates elapsed time and steps through a duration sequence.
///
/// Durations are divided by the speed multiplier at comparison time; elapsed
/// time is accumulated unscaled. A single tick may advance several frames.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClock {
    durations: Vec<f32>,
    current: usize,
    elapsed: f32,
    speed: f32,
}

impl AnimationClock {
    pub fn new(durations: Vec<f32>) -> Self {
        Self {
            durations,
            current: 0,
            elapsed: 0.0,
            speed: 1.0,
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Add `elapsed_seconds` and step forward. Returns the 1-based frame number.
    ///
    /// A paused clock (speed <= 0) or a sequence with no positive duration does
    /// not advance; a paused clock also does not accumulate time.
    pub fn advance(&mut self, elapsed_seconds: f32) -> usize {
        if self.durations.is_empty() || self.speed <= 0.0 {
            return self.current_number();
        }
        self.elapsed += elapsed_seconds;

        let cycle: f32 = self.durations.iter().map(|d| self.adjusted(*d)).sum();
        if cycle <= 0.0 || !cycle.is_finite() {
            return self.current_number();
        }

        let mut duration = self.adjusted(self.durations[self.current]);
        while self.elapsed > duration {
            self.elapsed -= duration;
            self.current = (self.current + 1) % self.durations.len();
            duration = self.adjusted(self.durations[self.current]);
        }
        self.current_number()
    }

    fn adjusted(&self, seconds: f32) -> f32 {
        seconds.max(0.0) / self.speed
    }

    /// 0-based position in the sequence.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// 1-based position in the sequence.
    pub fn current_number(&self) -> usize {
        self.current + 1
    }

    /// Time carried over towards the next advance.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    pub fn reset(&mut self) {
        self.current = 0;
        self.elapsed = 0.0;
    }

    /// Jump to a 1-based position and clear the accumulator.
    pub fn jump_to(&mut self, number: usize) -> Result<()> {
        if number == 0 || number > self.durations.len() {
            return Err(EngineError::FrameOutOfRange {
                number,
                count: self.durations.len(),
            });
        }
        self.current = number - 1;
        self.elapsed = 0.0;
        Ok(())
    }

    /// Swap in a new duration sequence, keeping the position when still valid.
    pub fn set_durations(&mut self, durations: Vec<f32>) {
        self.durations = durations;
        if self.current >= self.durations.len() {
            self.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_after_last_frame() {
        let mut clock = AnimationClock::new(vec![0.1, 0.1, 0.1]);
        assert_eq!(clock.advance(0.35), 1);
        assert!((clock.elapsed() - 0.05).abs() < 1e-4);
    }

    #[test]
    fn test_single_step() {
        let mut clock = AnimationClock::new(vec![0.1, 0.2]);
        assert_eq!(clock.advance(0.05), 1);
        assert_eq!(clock.advance(0.06), 2);
        assert_eq!(clock.advance(0.15), 2);
        assert_eq!(clock.advance(0.06), 1);
    }

    #[test]
    fn test_exact_duration_does_not_advance() {
        let mut clock = AnimationClock::new(vec![0.5, 0.5]);
        assert_eq!(clock.advance(0.5), 1);
    }

    #[test]
    fn test_speed_shortens_durations() {
        let mut clock = AnimationClock::new(vec![0.1, 0.1, 0.1, 0.1]).with_speed(2.0);
        // Each frame now lasts 0.05s.
        assert_eq!(clock.advance(0.12), 3);
    }

    #[test]
    fn test_paused_clock_holds() {
        let mut clock = AnimationClock::new(vec![0.1, 0.1]).with_speed(0.0);
        assert_eq!(clock.advance(10.0), 1);
        assert_eq!(clock.elapsed(), 0.0);
        clock.set_speed(1.0);
        assert_eq!(clock.advance(0.15), 2);
    }

    #[test]
    fn test_zero_durations_do_not_spin() {
        let mut clock = AnimationClock::new(vec![0.0, 0.0]);
        assert_eq!(clock.advance(1.0), 1);
    }

    #[test]
    fn test_zero_duration_frames_are_skipped() {
        let mut clock = AnimationClock::new(vec![0.1, 0.0, 0.1]);
        assert_eq!(clock.advance(0.15), 3);
    }

    #[test]
    fn test_empty_clock() {
        let mut clock = AnimationClock::new(Vec::new());
        assert!(clock.is_empty());
        assert_eq!(clock.advance(1.0), 1);
    }

    #[test]
    fn test_jump_to() {
        let mut clock = AnimationClock::new(vec![0.1, 0.1, 0.1]);
        clock.jump_to(3).unwrap();
        assert_eq!(clock.current_index(), 2);
        assert_eq!(
            clock.jump_to(4),
            Err(EngineError::FrameOutOfRange {
                number: 4,
                count: 3
            })
        );
        assert!(clock.jump_to(0).is_err());
    }

    #[test]
    fn test_set_durations_resets_out_of_range_position() {
        let mut clock = AnimationClock::new(vec![0.1, 0.1, 0.1]);
        clock.jump_to(3).unwrap();
        clock.set_durations(vec![0.2, 0.2]);
        assert_eq!(clock.current_number(), 1);
    }

    #[test]
    fn test_animation_builder() {
        let animation = Animation::new().frame(2, 0.25).frame(1, 0.5);
        assert_eq!(animation.steps.len(), 2);
        assert_eq!(animation.durations(), vec![0.25, 0.5]);
    }
}
