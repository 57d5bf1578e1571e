//! Tracks and the audio backend contract
//!
//! The engine never touches samples. It drives two [`TrackHandle`]s supplied
//! by an audio backend and reads back their position, duration and state.

use crate::error::{Error, Result};
use segue_common::asset_advice::{AssetSizeAdvice, LoadStrategy};
use segue_common::config::TrackEntry;
use uuid::Uuid;

/// One playable unit in the playlist
///
/// Immutable once constructed. Identity is the UUID, so two tracks with the
/// same name and duration are still distinct playlist entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    id: Uuid,
    name: String,
    duration_secs: f64,
    sample_rate: u32,
    /// Encoded size in bytes and how the backend keeps it in memory
    asset: Option<(u64, LoadStrategy)>,
}

impl Track {
    /// Create a track, validating duration and sample rate
    pub fn new(name: impl Into<String>, duration_secs: f64, sample_rate: u32) -> Result<Self> {
        let name = name.into();

        if sample_rate == 0 {
            return Err(Error::InvalidTrack {
                name,
                reason: "sample rate must be non-zero".to_string(),
            });
        }
        if !duration_secs.is_finite() || duration_secs < 0.0 {
            return Err(Error::InvalidTrack {
                name,
                reason: format!("duration {} is not a non-negative number", duration_secs),
            });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            duration_secs,
            sample_rate,
            asset: None,
        })
    }

    /// Attach the encoded asset size and its load strategy
    pub fn with_asset(mut self, size_bytes: u64, strategy: LoadStrategy) -> Self {
        self.asset = Some((size_bytes, strategy));
        self
    }

    /// Build a track from a config file entry
    pub fn from_entry(entry: &TrackEntry) -> Result<Self> {
        let track = Self::new(entry.name.clone(), entry.duration_seconds, entry.sample_rate)?;
        Ok(match (entry.file_size_bytes, entry.load_strategy) {
            (Some(size), Some(strategy)) => track.with_asset(size, strategy),
            _ => track,
        })
    }

    /// Advice when the attached load strategy does not fit the asset size
    pub fn load_advice(&self) -> Option<AssetSizeAdvice> {
        let (size, strategy) = self.asset?;
        AssetSizeAdvice::check(&self.name, size, strategy)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length in seconds
    pub fn duration(&self) -> f64 {
        self.duration_secs
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total length in samples, truncated
    pub fn total_samples(&self) -> u64 {
        seconds_to_samples(self.duration_secs, self.sample_rate)
    }
}

/// Convert seconds to a sample position, truncating toward zero.
///
/// Negative input maps to sample 0.
pub fn seconds_to_samples(seconds: f64, sample_rate: u32) -> u64 {
    (seconds.max(0.0) * f64::from(sample_rate)) as u64
}

/// Convert a sample position back to seconds.
pub fn samples_to_seconds(samples: u64, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    samples as f64 / f64::from(sample_rate)
}

/// Playback unit supplied by the audio backend
///
/// The engine owns exactly two of these for its entire lifetime and only
/// swaps which one is active and which clip each one holds.
pub trait TrackHandle {
    /// Replace the loaded clip. Stops playback and rewinds to sample 0.
    fn load(&mut self, clip: Option<Track>);

    /// Currently loaded clip, if any
    fn clip(&self) -> Option<&Track>;

    /// Start from the current position
    fn play(&mut self);

    fn pause(&mut self);

    fn unpause(&mut self);

    /// Halt playback and rewind to sample 0
    fn stop(&mut self);

    fn is_playing(&self) -> bool;

    fn volume(&self) -> f32;

    fn set_volume(&mut self, volume: f32);

    /// Signed playback rate multiplier
    fn pitch(&self) -> f32;

    fn set_pitch(&mut self, pitch: f32);

    /// Native single-buffer looping of the whole clip
    fn looping(&self) -> bool;

    fn set_looping(&mut self, looping: bool);

    fn position_samples(&self) -> u64;

    fn set_position_samples(&mut self, position: u64);

    /// Length of the loaded clip in seconds (0 when empty)
    fn duration(&self) -> f64 {
        self.clip().map(Track::duration).unwrap_or(0.0)
    }

    /// Sample rate of the loaded clip (0 when empty)
    fn sample_rate(&self) -> u32 {
        self.clip().map(Track::sample_rate).unwrap_or(0)
    }

    /// Advance the backend clock by `delta_secs`.
    ///
    /// Real-time backends run on their own clock and keep the default no-op.
    /// Offline backends use this to follow the engine's tick.
    fn advance(&mut self, _delta_secs: f64) {}
}
