//! # Segue Player Library (segue-player)
//!
//! Tick-driven continuous playlist player with crossfading.
//!
//! **Purpose:** Pick tracks from a playlist (ordered or shuffled, with play
//! history), crossfade between them on two backend playback units, ramp
//! volume and rate, and loop a region of the active track.
//!
//! **Architecture:** The engine owns two [`playback::TrackHandle`]s supplied
//! by an audio backend and is advanced by the caller through
//! [`PlaybackEngine::update`]. State changes are reported as
//! [`segue_common::PlayerEvent`]s over an optional channel.

pub mod config;
pub mod error;
pub mod playback;

pub use config::PlayerConfig;
pub use error::{Error, Result};
pub use playback::PlaybackEngine;
