use std::time::Instant;

/// Per-frame timing in seconds since the clock started.
#[derive(Debug, Clone)]
pub struct FrameTiming {
    start: Instant,
    pub current: f32,
    pub last: f32,
    pub delta: f32,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTiming {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            current: 0.0,
            last: 0.0,
            delta: 0.0,
        }
    }

    /// Monotonic seconds since the clock was created.
    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Sample the clock and advance one frame.
    pub fn tick(&mut self) -> f32 {
        let now = self.elapsed();
        self.advance_to(now)
    }

    /// Advance to an explicit timestamp. A timestamp behind `last` yields a zero delta.
    pub fn advance_to(&mut self, now: f32) -> f32 {
        self.current = now;
        self.delta = (self.current - self.last).max(0.0);
        self.last = self.current;
        self.delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_difference_between_frames() {
        let mut timing = FrameTiming::new();
        assert_eq!(timing.advance_to(0.5), 0.5);
        assert!((timing.advance_to(0.75) - 0.25).abs() < 1e-6);
        assert_eq!(timing.last, 0.75);
    }

    #[test]
    fn repeated_timestamp_gives_zero_delta() {
        let mut timing = FrameTiming::new();
        timing.advance_to(2.0);
        assert_eq!(timing.advance_to(2.0), 0.0);
    }

    #[test]
    fn backwards_timestamp_is_clamped() {
        let mut timing = FrameTiming::new();
        timing.advance_to(3.0);
        assert_eq!(timing.advance_to(1.0), 0.0);
    }

    #[test]
    fn tick_never_goes_negative() {
        let mut timing = FrameTiming::new();
        let a = timing.tick();
        let b = timing.tick();
        assert!(a >= 0.0 && b >= 0.0);
        assert!(timing.current >= timing.last - f32::EPSILON);
    }
}
