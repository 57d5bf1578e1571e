//! A-B loop over part of the active track

use super::track::seconds_to_samples;
use segue_common::events::PlayerWarning;
use tracing::{debug, warn};

/// Loop bounds in samples
///
/// Bounds persist across ticks until [`unset`](Self::unset) or a track
/// change. `start_sample <= end_sample` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopRegion {
    start_sample: u64,
    end_sample: u64,
    enabled: bool,
}

impl LoopRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the loop between `start_secs` and `end_secs`.
    ///
    /// Both bounds are clamped to `[0, track_duration]`. Reversed bounds are
    /// swapped and reported through the returned warning.
    pub fn set(
        &mut self,
        start_secs: f64,
        end_secs: f64,
        track_duration: f64,
        sample_rate: u32,
    ) -> Option<PlayerWarning> {
        let duration = track_duration.max(0.0);
        let mut start = clamp_secs(start_secs, duration);
        let mut end = clamp_secs(end_secs, duration);

        let warning = if start > end {
            warn!(
                "Loop start {:.3}s is after end {:.3}s, swapping bounds",
                start, end
            );
            std::mem::swap(&mut start, &mut end);
            Some(PlayerWarning::LoopBoundsSwapped {
                start_seconds: start_secs,
                end_seconds: end_secs,
            })
        } else {
            None
        };

        self.start_sample = seconds_to_samples(start, sample_rate);
        self.end_sample = seconds_to_samples(end, sample_rate);
        self.enabled = true;

        debug!(
            "Loop region set: samples {}..{} ({:.3}s..{:.3}s)",
            self.start_sample, self.end_sample, start, end
        );

        warning
    }

    /// Disable the loop and zero the bounds
    pub fn unset(&mut self) {
        *self = Self::default();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn start_sample(&self) -> u64 {
        self.start_sample
    }

    pub fn end_sample(&self) -> u64 {
        self.end_sample
    }

    pub fn length_samples(&self) -> u64 {
        self.end_sample - self.start_sample
    }

    /// Position to rewind to when `position` has reached the loop end.
    ///
    /// Rewinds by exactly the loop length so the overshoot past the end is
    /// carried into the next pass. `None` when disabled or not yet at the end.
    pub fn check(&self, position: u64) -> Option<u64> {
        if !self.enabled || position < self.end_sample {
            return None;
        }

        let length = self.length_samples();
        if length == 0 {
            // Zero-length loop pins the position to the loop point
            return Some(self.start_sample).filter(|&s| s != position);
        }

        // Any overshoot, including several loop lengths, folds back into the loop
        Some(self.start_sample + (position - self.start_sample) % length)
    }
}

fn clamp_secs(value: f64, duration: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, duration)
    } else {
        0.0
    }
}
