//! In-process backend that follows the engine clock
//!
//! `SimulatedHandle` implements [`TrackHandle`] without producing audio. Its
//! position advances by `delta × sample_rate × pitch` on every
//! [`TrackHandle::advance`] call, which makes engine behavior reproducible in
//! tests, benches and the offline driver.

use super::track::{Track, TrackHandle};
use tracing::trace;

/// Offline playback unit
#[derive(Debug, Clone)]
pub struct SimulatedHandle {
    label: &'static str,
    clip: Option<Track>,
    playing: bool,
    paused: bool,
    volume: f32,
    pitch: f32,
    looping: bool,
    /// Fractional sample position so slow rates still advance
    position: f64,
}

impl SimulatedHandle {
    /// Create an empty handle; `label` only shows up in trace logs
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            clip: None,
            playing: false,
            paused: false,
            volume: 1.0,
            pitch: 1.0,
            looping: false,
            position: 0.0,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// True after `pause()` until `unpause()`, `play()` or `stop()`
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn total_samples(&self) -> f64 {
        self.clip.as_ref().map(|c| c.total_samples() as f64).unwrap_or(0.0)
    }

    fn finish(&mut self) {
        trace!("[{}] reached clip boundary, stopping", self.label);
        self.playing = false;
        self.position = 0.0;
    }
}

impl TrackHandle for SimulatedHandle {
    fn load(&mut self, clip: Option<Track>) {
        self.clip = clip;
        self.playing = false;
        self.paused = false;
        self.position = 0.0;
    }

    fn clip(&self) -> Option<&Track> {
        self.clip.as_ref()
    }

    fn play(&mut self) {
        if self.clip.is_some() {
            self.playing = true;
            self.paused = false;
        }
    }

    fn pause(&mut self) {
        if self.playing {
            self.playing = false;
            self.paused = true;
        }
    }

    fn unpause(&mut self) {
        if self.paused {
            self.paused = false;
            self.playing = true;
        }
    }

    fn stop(&mut self) {
        self.playing = false;
        self.paused = false;
        self.position = 0.0;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn pitch(&self) -> f32 {
        self.pitch
    }

    fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch;
    }

    fn looping(&self) -> bool {
        self.looping
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn position_samples(&self) -> u64 {
        self.position as u64
    }

    fn set_position_samples(&mut self, position: u64) {
        self.position = (position as f64).min(self.total_samples());
    }

    fn advance(&mut self, delta_secs: f64) {
        if !self.playing {
            return;
        }
        let Some(clip) = self.clip.as_ref() else {
            return;
        };

        let total = clip.total_samples() as f64;
        let step = delta_secs * f64::from(clip.sample_rate()) * f64::from(self.pitch);
        let next = self.position + step;

        if total <= 0.0 {
            self.finish();
        } else if next >= total {
            if self.looping {
                self.position = next % total;
            } else {
                self.finish();
            }
        } else if next < 0.0 {
            if self.looping {
                self.position = total + (next % total);
            } else {
                self.finish();
            }
        } else {
            self.position = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(duration: f64) -> SimulatedHandle {
        let mut handle = SimulatedHandle::new("test");
        handle.load(Some(Track::new("clip", duration, 1_000).unwrap()));
        handle
    }

    #[test]
    fn test_play_requires_clip() {
        let mut handle = SimulatedHandle::new("empty");
        handle.play();
        assert!(!handle.is_playing());
    }

    #[test]
    fn test_advance_follows_pitch() {
        let mut handle = loaded(10.0);
        handle.play();
        handle.advance(1.0);
        assert_eq!(handle.position_samples(), 1_000);

        handle.set_pitch(0.5);
        handle.advance(1.0);
        assert_eq!(handle.position_samples(), 1_500);
    }

    #[test]
    fn test_end_of_clip_stops_and_rewinds() {
        let mut handle = loaded(1.0);
        handle.play();
        handle.advance(1.5);
        assert!(!handle.is_playing());
        assert_eq!(handle.position_samples(), 0);
    }

    #[test]
    fn test_looping_wraps_with_overshoot() {
        let mut handle = loaded(1.0);
        handle.set_looping(true);
        handle.play();
        handle.advance(1.25);
        assert!(handle.is_playing());
        assert_eq!(handle.position_samples(), 250);
    }

    #[test]
    fn test_reverse_stops_at_start() {
        let mut handle = loaded(2.0);
        handle.play();
        handle.set_position_samples(500);
        handle.set_pitch(-1.0);
        handle.advance(0.25);
        assert_eq!(handle.position_samples(), 250);
        handle.advance(0.5);
        assert!(!handle.is_playing());
    }

    #[test]
    fn test_pause_unpause_keeps_position() {
        let mut handle = loaded(5.0);
        handle.play();
        handle.advance(1.0);
        handle.pause();
        handle.advance(1.0);
        assert!(handle.is_paused());
        assert_eq!(handle.position_samples(), 1_000);

        handle.unpause();
        assert!(handle.is_playing());
        handle.advance(1.0);
        assert_eq!(handle.position_samples(), 2_000);
    }

    #[test]
    fn test_load_resets_transport() {
        let mut handle = loaded(5.0);
        handle.play();
        handle.advance(2.0);
        handle.load(Some(Track::new("other", 3.0, 1_000).unwrap()));
        assert!(!handle.is_playing());
        assert_eq!(handle.position_samples(), 0);
        assert_eq!(handle.duration(), 3.0);
    }
}
