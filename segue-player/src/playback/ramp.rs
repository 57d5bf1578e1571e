//! Linear ramps for volume and playback rate
//!
//! The ramp duration is the time a change across the *whole* range takes, so
//! smaller changes finish early and any in-range change completes within the
//! configured duration.

/// Full width of the volume range `[0, 1]`
pub const VOLUME_SPAN: f64 = 1.0;

/// Full width of the playback rate range `[-5, 5]`
pub const RATE_SPAN: f64 = 10.0;

/// Moves a value toward a target at a fixed rate per second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampController {
    duration_secs: f64,
    span: f64,
}

impl RampController {
    pub fn new(duration_secs: f64, span: f64) -> Self {
        Self {
            duration_secs,
            span,
        }
    }

    /// Ramp over the volume range
    pub fn volume(duration_secs: f64) -> Self {
        Self::new(duration_secs, VOLUME_SPAN)
    }

    /// Ramp over the playback rate range
    pub fn rate(duration_secs: f64) -> Self {
        Self::new(duration_secs, RATE_SPAN)
    }

    pub fn duration(&self) -> f64 {
        self.duration_secs
    }

    pub fn set_duration(&mut self, duration_secs: f64) {
        self.duration_secs = duration_secs;
    }

    /// Step `current` toward `target` for a tick of `delta_secs`.
    ///
    /// A zero or negative duration snaps straight to `target`. Never
    /// overshoots.
    pub fn advance(&self, current: f64, target: f64, delta_secs: f64) -> f64 {
        if self.duration_secs <= 0.0 {
            return target;
        }

        let max_step = (delta_secs.max(0.0) / self.duration_secs) * self.span;
        let distance = target - current;
        if distance.abs() <= max_step {
            target
        } else {
            current + max_step.copysign(distance)
        }
    }

    /// Same as [`advance`](Self::advance) for `f32` handle values
    pub fn advance_f32(&self, current: f32, target: f32, delta_secs: f64) -> f32 {
        self.advance(f64::from(current), f64::from(target), delta_secs) as f32
    }
}
