use std::cell::Cell;
use std::time::Instant;

/// Monotonic microsecond clock supplied by the host.
/// Implementations: SystemTimeProvider (production), MockTimeProvider (testing).
pub trait TimeProvider {
    fn now_us(&self) -> i64;
}

pub struct SystemTimeProvider {
    start: Instant,
}

impl SystemTimeProvider {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for SystemTimeProvider {
    fn now_us(&self) -> i64 {
        self.start.elapsed().as_micros() as i64
    }
}

/// Hand-driven clock for deterministic ticks.
#[derive(Default)]
pub struct MockTimeProvider {
    now_us: Cell<i64>,
}

impl MockTimeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time(&self, us: i64) {
        self.now_us.set(us);
    }

    pub fn advance_secs(&self, seconds: f64) {
        self.now_us
            .set(self.now_us.get() + (seconds * 1_000_000.0).round() as i64);
    }
}

impl TimeProvider for MockTimeProvider {
    fn now_us(&self) -> i64 {
        self.now_us.get()
    }
}

/// Turns a [`TimeProvider`] into per-tick elapsed seconds.
pub struct DeltaTimer<T: TimeProvider> {
    source: T,
    last_us: Option<i64>,
}

impl<T: TimeProvider> DeltaTimer<T> {
    pub fn new(source: T) -> Self {
        Self {
            source,
            last_us: None,
        }
    }

    pub fn source(&self) -> &T {
        &self.source
    }

    /// Seconds since the previous tick; the first tick reports zero.
    /// A clock that goes backwards also reports zero.
    pub fn tick(&mut self) -> f32 {
        let now = self.source.now_us();
        let elapsed = match self.last_us.replace(now) {
            Some(last) if now > last => now - last,
            _ => 0,
        };
        elapsed as f32 / 1_000_000.0
    }
}
