//! Frame timing primitives.
//!
//! The core does not own a scheduler. An external frame clock fires one
//! [`FrameTick`] per display refresh or fixed tick, carrying nothing but a
//! timestamp; playback controllers derive their local time from it through
//! a [`Clock`].

/// Payload of one frame signal from the external scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Wall-clock timestamp of the tick, in milliseconds.
    pub time_ms: f64,
}

impl FrameTick {
    #[must_use]
    pub fn new(time_ms: f64) -> Self {
        Self { time_ms }
    }
}

/// A rate-scaled local clock.
///
/// Local time is integrated incrementally: each tick adds the wall-clock
/// delta multiplied by the current rate. Changing the rate therefore alters
/// how fast local time advances from now on, never the already-accumulated
/// local time, so speed changes cause no discontinuity in sampled
/// animation time.
#[derive(Debug, Clone, PartialEq)]
pub struct Clock {
    local_ms: f64,
    rate: f64,
    last_wall_ms: Option<f64>,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    /// Creates a clock at local time 0 with rate 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            local_ms: 0.0,
            rate: 1.0,
            last_wall_ms: None,
        }
    }

    /// Advances the clock to the given wall time and returns the local time.
    ///
    /// The first tick only anchors the wall time, leaving local time
    /// untouched.
    pub fn tick(&mut self, wall_ms: f64) -> f64 {
        if let Some(last) = self.last_wall_ms {
            self.local_ms += (wall_ms - last) * self.rate;
        }
        self.last_wall_ms = Some(wall_ms);
        self.local_ms
    }

    /// Current local time in milliseconds, without advancing.
    #[must_use]
    pub fn local_time(&self) -> f64 {
        self.local_ms
    }

    /// (Re-)sets the local time, e.g. when jumping within an animation.
    pub fn set(&mut self, local_ms: f64) {
        self.local_ms = local_ms;
    }

    /// Re-anchors the wall-time reference without integrating the elapsed
    /// gap. Used while a controller is inactive, so reactivating does not
    /// replay the idle period.
    pub fn anchor(&mut self, wall_ms: f64) {
        self.last_wall_ms = Some(wall_ms);
    }

    /// Sets the rate, allowing slow motion (<1) or fast forward (>1).
    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    /// Current rate.
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_change_keeps_local_time_continuous() {
        let mut clock = Clock::new();
        clock.tick(0.0);
        clock.tick(100.0);
        assert!((clock.local_time() - 100.0).abs() < 1e-9);

        clock.set_rate(2.0);
        // No jump at the moment of the change
        assert!((clock.local_time() - 100.0).abs() < 1e-9);

        clock.tick(200.0);
        assert!((clock.local_time() - 300.0).abs() < 1e-9);
    }

    #[test]
    fn first_tick_anchors_only() {
        let mut clock = Clock::new();
        let t = clock.tick(5000.0);
        assert!((t - 0.0).abs() < 1e-9);
    }
}
