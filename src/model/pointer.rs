/// Previous pointer sample, used to turn absolute positions into deltas.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerTracker {
    pub last_x: f32,
    pub last_y: f32,
    initialized: bool,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new(400.0, 300.0)
    }
}

impl PointerTracker {
    pub fn new(last_x: f32, last_y: f32) -> Self {
        Self { last_x, last_y, initialized: false }
    }

    pub fn is_initialized(&self) -> bool { self.initialized }

    /// Returns `(dx, dy)` with `dy` pointing up. The first sample after
    /// creation or [`reset`](Self::reset) is always `(0, 0)`.
    pub fn sample(&mut self, x: f32, y: f32) -> (f32, f32) {
        if !self.initialized {
            self.last_x = x;
            self.last_y = y;
            self.initialized = true;
        }
        let dx = x - self.last_x;
        let dy = self.last_y - y;
        self.last_x = x;
        self.last_y = y;
        (dx, dy)
    }

    pub fn reset(&mut self) {
        self.initialized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_is_zero_wherever_it_lands() {
        for (x, y) in [(0.0, 0.0), (400.0, 300.0), (-2500.0, 9000.0)] {
            let mut tracker = PointerTracker::default();
            assert_eq!(tracker.sample(x, y), (0.0, 0.0));
            assert!(tracker.is_initialized());
        }
    }

    #[test]
    fn screen_y_is_inverted() {
        let mut tracker = PointerTracker::default();
        tracker.sample(100.0, 100.0);
        assert_eq!(tracker.sample(110.0, 90.0), (10.0, 10.0));
        assert_eq!(tracker.sample(105.0, 95.0), (-5.0, -5.0));
    }

    #[test]
    fn reset_suppresses_the_next_jump() {
        let mut tracker = PointerTracker::default();
        tracker.sample(0.0, 0.0);
        tracker.reset();
        assert_eq!(tracker.sample(640.0, 480.0), (0.0, 0.0));
        assert_eq!(tracker.sample(641.0, 480.0), (1.0, 0.0));
    }
}
